//! Google Calendar v3 event source.
//!
//! Fetches the owner's events for one local day with a bearer token. Token
//! acquisition and refresh happen elsewhere; this source performs no retries.

use async_trait::async_trait;
use chrono::{NaiveDate, SecondsFormat};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{day_window, EventSource};
use crate::calendar::RawEvent;
use crate::error::UpstreamFetchError;

pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Upper bound on pages fetched for one day.
const MAX_PAGES: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<RawEvent>,
    next_page_token: Option<String>,
}

pub struct GoogleCalendarSource {
    client: Client,
    base_url: String,
    calendar_id: String,
    access_token: Option<String>,
}

impl GoogleCalendarSource {
    pub fn new(calendar_id: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: GOOGLE_CALENDAR_API.to_string(),
            calendar_id: calendar_id.into(),
            access_token: access_token.filter(|t| !t.is_empty()),
        }
    }

    /// Point at a different API root (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn events_url(
        &self,
        date: NaiveDate,
        tz: Tz,
        page_token: Option<&str>,
    ) -> Result<Url, UpstreamFetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| UpstreamFetchError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamFetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);

        let (start, end) = day_window(date, tz);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("timeMin", &start.to_rfc3339_opts(SecondsFormat::Secs, true))
                .append_pair("timeMax", &end.to_rfc3339_opts(SecondsFormat::Secs, true))
                .append_pair("timeZone", tz.name())
                .append_pair("singleEvents", "true")
                .append_pair("orderBy", "startTime")
                .append_pair("maxResults", "250");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl EventSource for GoogleCalendarSource {
    fn name(&self) -> &str {
        "google"
    }

    async fn fetch_day(
        &self,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<Vec<RawEvent>, UpstreamFetchError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(UpstreamFetchError::Unauthenticated)?;

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let url = self.events_url(date, tz, page_token.as_deref())?;
            let resp = self.client.get(url).bearer_auth(token).send().await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(UpstreamFetchError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let page: EventsPage = resp
                .json()
                .await
                .map_err(|e| UpstreamFetchError::MalformedResponse(e.to_string()))?;
            events.extend(page.items);

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if page_token.is_some() {
            warn!(
                %date,
                pages = MAX_PAGES,
                fetched = events.len(),
                "page limit reached, remaining calendar events were not fetched"
            );
        }

        debug!(count = events.len(), %date, "fetched calendar events");
        Ok(events)
    }
}
