pub mod analyze;
pub mod cache;
pub mod cache_key;
pub mod config;
pub mod report;

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Deserialize;
use workhealth_core::source::parse_timezone;
use workhealth_core::{RawEvent, WorkHealthService};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Where the day's events come from.
#[derive(Args, Debug, Clone)]
pub struct EventInput {
    /// Calendar day (YYYY-MM-DD); defaults to today in the configured timezone
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Read events from a JSON file instead of the configured source
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// A bare event array or a provider page with `items`.
#[derive(Deserialize)]
#[serde(untagged)]
enum EventFile {
    List(Vec<RawEvent>),
    Page { items: Vec<RawEvent> },
}

pub fn read_events(path: &Path) -> Result<Vec<RawEvent>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let parsed: EventFile = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not an event list: {e}", path.display()))?;
    Ok(match parsed {
        EventFile::List(events) | EventFile::Page { items: events } => events,
    })
}

impl EventInput {
    pub fn date(
        &self,
        service: &WorkHealthService,
    ) -> Result<NaiveDate, Box<dyn std::error::Error>> {
        match self.date {
            Some(date) => Ok(date),
            None => {
                let tz = parse_timezone(&service.context().timezone)?;
                Ok(Utc::now().with_timezone(&tz).date_naive())
            }
        }
    }

    /// Events of the day, from the file or the configured source.
    pub async fn events(
        &self,
        service: &WorkHealthService,
        date: NaiveDate,
    ) -> Result<Vec<RawEvent>, Box<dyn std::error::Error>> {
        match &self.file {
            Some(path) => read_events(path),
            None => Ok(service.fetch(date).await?),
        }
    }
}

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> CmdResult {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
