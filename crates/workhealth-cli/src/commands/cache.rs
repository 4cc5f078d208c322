use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;
use workhealth_core::{Config, InsightCache, SqliteInsightCache, TabType};

use super::CmdResult;

#[derive(Subcommand)]
pub enum CacheAction {
    /// List cached insight entries of the configured user
    Show,
    /// Remove all cached insights of the configured user
    Clear,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntrySummary {
    tab: TabType,
    cache_key: String,
    timestamp: String,
    age_minutes: i64,
    fresh: bool,
}

pub fn run(action: CacheAction) -> CmdResult {
    let config = Config::load()?;
    let cache = SqliteInsightCache::open(config.cache.capacity_per_user)?;
    let user_id = config.user.id.as_str();

    match action {
        CacheAction::Show => {
            let now = Utc::now();
            let entries: Vec<EntrySummary> = cache
                .entries(user_id)?
                .into_iter()
                .map(|(tab, entry)| EntrySummary {
                    tab,
                    age_minutes: entry.age(now).num_minutes(),
                    fresh: entry.is_fresh(now),
                    timestamp: entry.timestamp.to_rfc3339(),
                    cache_key: entry.cache_key,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        CacheAction::Clear => {
            let removed = cache.clear(user_id)?;
            println!("removed {removed} cached entries for {user_id}");
        }
    }
    Ok(())
}
