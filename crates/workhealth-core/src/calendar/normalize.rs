//! Converts raw provider events into a [`NormalizedSchedule`].
//!
//! Drops everything that does not occupy concrete busy time on the owner's
//! calendar: cancelled/tentative events, free (transparent) blocks, events the
//! owner declined, and all-day entries. Malformed events are logged and
//! skipped; one bad event never aborts the analysis.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use super::{CalendarEvent, EventTime, NormalizedSchedule, RawEvent};
use crate::error::InvalidEventError;

const UNTITLED: &str = "(No title)";

/// Stateless converter from provider events to the canonical schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventNormalizer;

impl EventNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a day's raw events. Pure: same input, same output.
    pub fn normalize(&self, raw: &[RawEvent]) -> NormalizedSchedule {
        let mut events = Vec::with_capacity(raw.len());
        for item in raw {
            if let Some(reason) = exclusion_reason(item) {
                debug!(event_id = %item.id, reason, "excluding event");
                continue;
            }
            match self.normalize_event(item) {
                Ok(event) => events.push(event),
                Err(err @ InvalidEventError::MissingTimestamps { .. }) => {
                    debug!(error = %err, "skipping untimed event");
                }
                Err(err) => {
                    warn!(error = %err, "skipping invalid event");
                }
            }
        }
        NormalizedSchedule::from_events(events)
    }

    /// Validate and convert a single event.
    ///
    /// Does not apply the busy/accepted filters, only shape checks.
    pub fn normalize_event(&self, raw: &RawEvent) -> Result<CalendarEvent, InvalidEventError> {
        let start = parse_instant(&raw.id, raw.start.as_ref())?;
        let end = parse_instant(&raw.id, raw.end.as_ref())?;

        let duration_minutes = (end - start).num_minutes();
        if duration_minutes <= 0 {
            return Err(InvalidEventError::NonPositiveDuration {
                id: raw.id.clone(),
                minutes: duration_minutes,
            });
        }

        let attendee_count = raw
            .attendees
            .as_ref()
            .map(|a| a.len() as u32)
            .filter(|n| *n > 0)
            .unwrap_or(1);

        Ok(CalendarEvent {
            id: raw.id.clone(),
            summary: raw
                .summary
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNTITLED)
                .to_string(),
            start,
            end,
            duration_minutes,
            attendee_count,
            is_recurring: raw.recurring_event_id.is_some()
                || raw.recurrence.as_ref().is_some_and(|r| !r.is_empty()),
            category: raw.category.unwrap_or_default(),
        })
    }
}

/// Why an event does not count as busy time, if it doesn't.
fn exclusion_reason(raw: &RawEvent) -> Option<&'static str> {
    match raw.status.as_deref() {
        Some("cancelled") => return Some("cancelled"),
        Some("tentative") => return Some("tentative"),
        _ => {}
    }
    if raw.transparency.as_deref() == Some("transparent") {
        return Some("free time");
    }
    match raw.self_response() {
        Some("declined") => Some("declined"),
        Some("tentative") => Some("tentative response"),
        _ => None,
    }
}

fn parse_instant(
    id: &str,
    time: Option<&EventTime>,
) -> Result<DateTime<FixedOffset>, InvalidEventError> {
    let value = time
        .and_then(|t| t.date_time.as_deref())
        .ok_or_else(|| InvalidEventError::MissingTimestamps { id: id.to_string() })?;
    DateTime::parse_from_rfc3339(value).map_err(|_| InvalidEventError::UnparseableTimestamp {
        id: id.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Attendee, MeetingCategory};

    fn at(hm: &str) -> String {
        format!("2024-03-04T{hm}:00+00:00")
    }

    #[test]
    fn test_sorts_by_start() {
        let raw = vec![
            RawEvent::timed("b", "Later", at("14:00"), at("15:00")),
            RawEvent::timed("a", "Earlier", at("09:00"), at("10:00")),
        ];
        let schedule = EventNormalizer::new().normalize(&raw);
        let ids: Vec<_> = schedule.events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_ties_keep_provider_order() {
        let raw = vec![
            RawEvent::timed("x", "First", at("10:00"), at("11:00")),
            RawEvent::timed("y", "Second", at("10:00"), at("10:30")),
            RawEvent::timed("z", "Third", at("10:00"), at("10:45")),
        ];
        let schedule = EventNormalizer::new().normalize(&raw);
        let ids: Vec<_> = schedule.events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_drops_all_day_and_invalid_events() {
        let mut all_day = RawEvent::timed("allday", "Offsite", "", "");
        all_day.start = Some(EventTime::all_day("2024-03-04"));
        all_day.end = Some(EventTime::all_day("2024-03-05"));

        let raw = vec![
            all_day,
            RawEvent::timed("zero", "Zero", at("09:00"), at("09:00")),
            RawEvent::timed("backwards", "Backwards", at("11:00"), at("10:00")),
            RawEvent::timed("garbled", "Garbled", "not a date", at("10:00")),
            RawEvent::timed("ok", "Fine", at("13:00"), at("13:30")),
        ];
        let schedule = EventNormalizer::new().normalize(&raw);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.events()[0].id, "ok");
        assert_eq!(schedule.events()[0].duration_minutes, 30);
    }

    #[test]
    fn test_normalize_event_reports_error_kind() {
        let normalizer = EventNormalizer::new();
        let zero = RawEvent::timed("zero", "Zero", at("09:00"), at("09:00"));
        assert_eq!(
            normalizer.normalize_event(&zero),
            Err(InvalidEventError::NonPositiveDuration {
                id: "zero".into(),
                minutes: 0
            })
        );

        let mut untimed = RawEvent::timed("untimed", "Untimed", at("09:00"), at("10:00"));
        untimed.end = None;
        assert!(matches!(
            normalizer.normalize_event(&untimed),
            Err(InvalidEventError::MissingTimestamps { .. })
        ));
    }

    #[test]
    fn test_excludes_free_cancelled_and_declined() {
        let mut free = RawEvent::timed("free", "Focus block", at("09:00"), at("10:00"));
        free.transparency = Some("transparent".into());
        let mut cancelled = RawEvent::timed("cancelled", "Gone", at("10:00"), at("11:00"));
        cancelled.status = Some("cancelled".into());
        let mut declined = RawEvent::timed("declined", "Nope", at("11:00"), at("12:00"));
        declined.attendees = Some(vec![Attendee {
            email: Some("me@example.com".into()),
            is_self: true,
            response_status: Some("declined".into()),
        }]);
        let kept = RawEvent::timed("kept", "Review", at("13:00"), at("14:00"));

        let schedule = EventNormalizer::new().normalize(&[free, cancelled, declined, kept]);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.events()[0].id, "kept");
    }

    #[test]
    fn test_derived_fields() {
        let mut raw = RawEvent::timed("r", "  ", at("09:00"), at("10:30"))
            .with_attendees(9)
            .with_category(MeetingCategory::Strategic);
        raw.recurring_event_id = Some("series".into());

        let event = EventNormalizer::new().normalize_event(&raw).unwrap();
        assert_eq!(event.summary, "(No title)");
        assert_eq!(event.duration_minutes, 90);
        assert_eq!(event.attendee_count, 9);
        assert!(event.is_recurring);
        assert_eq!(event.category, MeetingCategory::Strategic);
    }

    #[test]
    fn test_attendee_count_defaults_to_one() {
        let raw = RawEvent::timed("solo", "Solo", at("09:00"), at("10:00"));
        let event = EventNormalizer::new().normalize_event(&raw).unwrap();
        assert_eq!(event.attendee_count, 1);
        assert_eq!(event.category, MeetingCategory::Collaborative);
        assert!(!event.is_recurring);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = vec![
            RawEvent::timed("b", "B", at("11:00"), at("12:00")),
            RawEvent::timed("a", "A", at("09:00"), at("10:00")),
            RawEvent::timed("c", "C", at("09:00"), at("09:30")),
        ];
        let normalizer = EventNormalizer::new();
        let first = normalizer.normalize(&raw);
        let second = normalizer.normalize(&raw);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
