//! Where a day's raw events come from.
//!
//! Live and demo data are two implementations of [`EventSource`], chosen once
//! at startup from configuration.

pub mod google;
pub mod mock;

pub use google::GoogleCalendarSource;
pub use mock::MockEventSource;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::calendar::RawEvent;
use crate::error::UpstreamFetchError;

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Raw events between local midnight of `date` and the next local midnight.
    async fn fetch_day(&self, date: NaiveDate, tz: Tz) -> Result<Vec<RawEvent>, UpstreamFetchError>;
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, UpstreamFetchError> {
    name.parse::<Tz>()
        .map_err(|_| UpstreamFetchError::UnknownTimezone(name.to_string()))
}

/// `[start, end)` of the local day in UTC.
pub fn day_window(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = date.succ_opt().unwrap_or(date);
    (local_start_of_day(date, tz), local_start_of_day(next, tz))
}

/// First instant of `date` in `tz`. Handles zones whose midnight falls in a
/// DST gap by moving to the first valid hour.
pub(crate) fn local_start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    (0..24)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| tz.from_local_datetime(&date.and_time(time)).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN).and_utc())
}
