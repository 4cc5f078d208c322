//! Cache key derivation for generated insights.
//!
//! The key is a SHA-256 digest over every input that can change the generated
//! text: each event's summary/start/end/category/attendee count, the scoring
//! metrics, the user's work hours and meeting preference, the tab, and the
//! calendar day. Fields are fed to the hasher in a fixed order with length
//! prefixes, so the encoding is unambiguous and order-sensitive.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::analysis::WorkHealthMetrics;
use crate::calendar::CalendarEvent;
use crate::context::UserContext;
use crate::insights::TabType;

/// Bumped whenever the set or encoding of hashed fields changes.
const KEY_VERSION: u32 = 1;

/// Derives insight cache keys. Pure; performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightCacheKeyDeriver;

impl InsightCacheKeyDeriver {
    pub fn new() -> Self {
        Self
    }

    /// 64-character lowercase hex fingerprint.
    pub fn derive(
        &self,
        metrics: &WorkHealthMetrics,
        events: &[CalendarEvent],
        context: &UserContext,
        tab: TabType,
        date: NaiveDate,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(KEY_VERSION.to_le_bytes());

        hasher.update((events.len() as u64).to_le_bytes());
        for event in events {
            put_str(&mut hasher, &event.summary);
            put_str(&mut hasher, &event.start.to_rfc3339());
            put_str(&mut hasher, &event.end.to_rfc3339());
            put_str(&mut hasher, &event.category.to_string());
            hasher.update(event.attendee_count.to_le_bytes());
        }

        let schedule = &metrics.schedule;
        hasher.update(metrics.adaptive_performance_index.to_le_bytes());
        hasher.update(metrics.cognitive_resilience.to_le_bytes());
        hasher.update(metrics.work_rhythm_recovery.to_le_bytes());
        hasher.update(schedule.meeting_count.to_le_bytes());
        hasher.update(schedule.back_to_back_count.to_le_bytes());
        hasher.update(schedule.focus_time_minutes.to_le_bytes());
        hasher.update(schedule.fragmentation_score.to_le_bytes());

        hasher.update(context.work_start_hour.to_le_bytes());
        hasher.update(context.work_end_hour.to_le_bytes());
        put_str(&mut hasher, &context.meeting_preference.to_string());

        put_str(&mut hasher, tab.as_str());
        put_str(&mut hasher, &date.format("%Y-%m-%d").to_string());

        hex::encode(hasher.finalize())
    }
}

fn put_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::calendar::{EventNormalizer, MeetingCategory, RawEvent};
    use crate::context::MeetingPreference;
    use crate::testutil::at;

    fn day() -> Vec<RawEvent> {
        vec![
            RawEvent::timed("a", "Standup", at("09:00"), at("09:15")).with_attendees(6),
            RawEvent::timed("b", "Design review", at("11:00"), at("12:00"))
                .with_category(MeetingCategory::Strategic),
        ]
    }

    fn key_for(raw: &[RawEvent], context: &UserContext, tab: TabType, date: NaiveDate) -> String {
        let schedule = EventNormalizer::new().normalize(raw);
        let metrics = analyze(&schedule);
        InsightCacheKeyDeriver::new().derive(&metrics, schedule.events(), context, tab, date)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_key_is_deterministic_and_fixed_length() {
        let ctx = UserContext::default();
        let a = key_for(&day(), &ctx, TabType::Overview, date(4));
        let b = key_for(&day(), &ctx, TabType::Overview, date(4));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_summary_change_changes_key() {
        let ctx = UserContext::default();
        let base = key_for(&day(), &ctx, TabType::Overview, date(4));
        let mut changed = day();
        changed[0].summary = Some("Stand-up".into());
        assert_ne!(base, key_for(&changed, &ctx, TabType::Overview, date(4)));
    }

    #[test]
    fn test_next_day_changes_key() {
        let ctx = UserContext::default();
        assert_ne!(
            key_for(&day(), &ctx, TabType::Overview, date(4)),
            key_for(&day(), &ctx, TabType::Overview, date(5))
        );
    }

    #[test]
    fn test_tab_and_context_change_key() {
        let ctx = UserContext::default();
        let base = key_for(&day(), &ctx, TabType::Overview, date(4));
        assert_ne!(base, key_for(&day(), &ctx, TabType::Resilience, date(4)));

        let later = UserContext {
            work_start_hour: 10,
            ..UserContext::default()
        };
        assert_ne!(base, key_for(&day(), &later, TabType::Overview, date(4)));

        let minimal = UserContext {
            meeting_preference: MeetingPreference::Minimal,
            ..UserContext::default()
        };
        assert_ne!(base, key_for(&day(), &minimal, TabType::Overview, date(4)));
    }

    #[test]
    fn test_event_fields_change_key() {
        let ctx = UserContext::default();
        let base = key_for(&day(), &ctx, TabType::Overview, date(4));

        let mut attendees = day();
        attendees[1] = attendees[1].clone().with_attendees(3);
        assert_ne!(base, key_for(&attendees, &ctx, TabType::Overview, date(4)));

        let mut category = day();
        category[1].category = Some(MeetingCategory::External);
        assert_ne!(base, key_for(&category, &ctx, TabType::Overview, date(4)));

        let mut moved = day();
        moved[1].end = Some(crate::calendar::EventTime::at(at("12:30")));
        assert_ne!(base, key_for(&moved, &ctx, TabType::Overview, date(4)));
    }

    #[test]
    fn test_metric_change_changes_key() {
        let ctx = UserContext::default();
        let schedule = EventNormalizer::new().normalize(&day());
        let metrics = analyze(&schedule);
        let deriver = InsightCacheKeyDeriver::new();
        let base = deriver.derive(&metrics, schedule.events(), &ctx, TabType::Overview, date(4));

        let mut bumped = metrics.clone();
        bumped.schedule.fragmentation_score += 1;
        assert_ne!(
            base,
            deriver.derive(&bumped, schedule.events(), &ctx, TabType::Overview, date(4))
        );
    }

    #[test]
    fn test_summary_boundaries_are_unambiguous() {
        let ctx = UserContext::default();
        let mut a = day();
        a[0].summary = Some("ab".into());
        a[1].summary = Some("c".into());
        let mut b = day();
        b[0].summary = Some("a".into());
        b[1].summary = Some("bc".into());
        assert_ne!(
            key_for(&a, &ctx, TabType::Overview, date(4)),
            key_for(&b, &ctx, TabType::Overview, date(4))
        );
    }
}
