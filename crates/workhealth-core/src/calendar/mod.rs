//! Calendar event types at the provider boundary and after normalization.
//!
//! [`RawEvent`] mirrors the Google Calendar v3 event resource closely enough
//! to deserialize it directly. [`CalendarEvent`] is the canonical, timed,
//! validated form the scoring models work on, and [`NormalizedSchedule`] is
//! a day's worth of them in start order.

pub mod normalize;

pub use normalize::EventNormalizer;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Closed set of meeting categories.
///
/// Only used as context for insight generation and cache keys, never for scoring
/// (beyond the resilience context-switch proxy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingCategory {
    #[default]
    Collaborative,
    Strategic,
    Operational,
    OneOnOne,
    External,
    Social,
}

impl std::fmt::Display for MeetingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MeetingCategory::Collaborative => "collaborative",
            MeetingCategory::Strategic => "strategic",
            MeetingCategory::Operational => "operational",
            MeetingCategory::OneOnOne => "one_on_one",
            MeetingCategory::External => "external",
            MeetingCategory::Social => "social",
        };
        f.write_str(s)
    }
}

/// Start or end of a provider event. Timed events carry `dateTime`,
/// all-day events only `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn at(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Default::default()
        }
    }

    pub fn all_day(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether this attendee is the calendar owner.
    #[serde(default, rename = "self")]
    pub is_self: bool,
    /// `needsAction`, `declined`, `tentative` or `accepted`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

/// A calendar event as delivered by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    /// `opaque` (busy) or `transparent` (free).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<String>,
    /// `confirmed`, `tentative` or `cancelled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Category assigned by an upstream classifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MeetingCategory>,
}

impl RawEvent {
    /// A confirmed, busy, timed event. Handy for fixtures.
    pub fn timed(
        id: impl Into<String>,
        summary: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            summary: Some(summary.into()),
            start: Some(EventTime::at(start)),
            end: Some(EventTime::at(end)),
            ..Default::default()
        }
    }

    pub fn with_attendees(mut self, count: usize) -> Self {
        self.attendees = Some(
            (0..count)
                .map(|i| Attendee {
                    email: Some(format!("attendee{i}@example.com")),
                    is_self: i == 0,
                    response_status: Some("accepted".to_string()),
                })
                .collect(),
        );
        self
    }

    pub fn with_category(mut self, category: MeetingCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Response status of the calendar owner, if they are on the attendee list.
    pub fn self_response(&self) -> Option<&str> {
        self.attendees
            .as_ref()?
            .iter()
            .find(|a| a.is_self)
            .and_then(|a| a.response_status.as_deref())
    }
}

/// A validated, timed meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub duration_minutes: i64,
    pub attendee_count: u32,
    pub is_recurring: bool,
    pub category: MeetingCategory,
}

/// A day's meetings, sorted by start time ascending (stable on ties).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSchedule {
    events: Vec<CalendarEvent>,
    /// Calendar day the work window is anchored to.
    #[serde(skip)]
    day: Option<NaiveDate>,
}

impl NormalizedSchedule {
    /// Build a schedule from already-validated events, sorting them by start.
    pub fn from_events(mut events: Vec<CalendarEvent>) -> Self {
        // sort_by_key is stable: ties keep provider order
        events.sort_by_key(|e| e.start);
        Self { events, day: None }
    }

    /// Anchor the 9:00-17:00 work window to `day`.
    pub fn with_day(mut self, day: NaiveDate) -> Self {
        self.day = Some(day);
        self
    }

    /// The anchored day, or the local start date of the first meeting.
    pub fn day(&self) -> Option<NaiveDate> {
        self.day
            .or_else(|| self.events.first().map(|e| e.start.date_naive()))
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first(&self) -> Option<&CalendarEvent> {
        self.events.first()
    }

    pub fn last(&self) -> Option<&CalendarEvent> {
        self.events.last()
    }

    /// Time between each adjacent pair (`next.start - prev.end`), to the
    /// second.
    ///
    /// Overlapping events yield negative values.
    pub fn gaps(&self) -> impl Iterator<Item = Duration> + '_ {
        self.events.windows(2).map(|pair| pair[1].start - pair[0].end)
    }

    /// Sum of all meeting durations in minutes.
    pub fn total_minutes(&self) -> i64 {
        self.events.iter().map(|e| e.duration_minutes).sum()
    }

    pub fn into_events(self) -> Vec<CalendarEvent> {
        self.events
    }
}
