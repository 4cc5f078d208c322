//! Deterministic demo day, used when no live calendar is connected.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use super::EventSource;
use crate::calendar::{Attendee, EventTime, MeetingCategory, RawEvent};
use crate::error::UpstreamFetchError;

struct DemoMeeting {
    id: &'static str,
    summary: &'static str,
    start: (u32, u32),
    end: (u32, u32),
    attendees: usize,
    recurring: bool,
    category: MeetingCategory,
}

const DEMO_DAY: &[DemoMeeting] = &[
    DemoMeeting {
        id: "demo-standup",
        summary: "Team standup",
        start: (9, 0),
        end: (9, 15),
        attendees: 8,
        recurring: true,
        category: MeetingCategory::Operational,
    },
    DemoMeeting {
        id: "demo-planning",
        summary: "Quarterly planning",
        start: (9, 30),
        end: (10, 30),
        attendees: 6,
        recurring: false,
        category: MeetingCategory::Strategic,
    },
    DemoMeeting {
        id: "demo-1on1",
        summary: "1:1 with manager",
        start: (10, 40),
        end: (11, 10),
        attendees: 2,
        recurring: true,
        category: MeetingCategory::OneOnOne,
    },
    DemoMeeting {
        id: "demo-customer",
        summary: "Customer onboarding call",
        start: (13, 0),
        end: (14, 0),
        attendees: 4,
        recurring: false,
        category: MeetingCategory::External,
    },
    DemoMeeting {
        id: "demo-review",
        summary: "Design review",
        start: (16, 0),
        end: (16, 45),
        attendees: 5,
        recurring: false,
        category: MeetingCategory::Collaborative,
    },
];

/// Returns the same demo day for any date, anchored in the requested zone.
///
/// Also includes an all-day entry and a declined meeting, which the
/// normalizer is expected to drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockEventSource;

impl MockEventSource {
    pub fn new() -> Self {
        Self
    }

    pub fn events_for(&self, date: NaiveDate, tz: Tz) -> Vec<RawEvent> {
        let stamp = |(h, m): (u32, u32)| -> Option<String> {
            let local = date.and_time(NaiveTime::from_hms_opt(h, m, 0)?);
            tz.from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.to_rfc3339())
        };

        let mut events: Vec<RawEvent> = DEMO_DAY
            .iter()
            .filter_map(|m| {
                let mut raw = RawEvent::timed(m.id, m.summary, stamp(m.start)?, stamp(m.end)?)
                    .with_attendees(m.attendees)
                    .with_category(m.category);
                if m.recurring {
                    raw.recurring_event_id = Some(format!("{}-series", m.id));
                }
                Some(raw)
            })
            .collect();

        events.push(RawEvent {
            id: "demo-holiday".to_string(),
            summary: Some("Company offsite".to_string()),
            start: Some(EventTime::all_day(date.to_string())),
            end: Some(EventTime::all_day(date.succ_opt().unwrap_or(date).to_string())),
            ..Default::default()
        });

        if let (Some(start), Some(end)) = (stamp((15, 0)), stamp((15, 30))) {
            let mut declined = RawEvent::timed("demo-declined", "Vendor pitch", start, end);
            declined.attendees = Some(vec![Attendee {
                email: Some("me@example.com".to_string()),
                is_self: true,
                response_status: Some("declined".to_string()),
            }]);
            events.push(declined);
        }

        events
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_day(
        &self,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<Vec<RawEvent>, UpstreamFetchError> {
        Ok(self.events_for(date, tz))
    }
}
