//! Integration tests for the scoring pipeline.
//!
//! Raw provider events go through the normalizer and the full analysis, the
//! way the service runs them.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use proptest::prelude::*;
use workhealth_core::analysis::{analyze, performance_index, PerformanceStatus};
use workhealth_core::calendar::{EventNormalizer, RawEvent};

fn at(hm: &str) -> String {
    format!("2024-03-04T{hm}:00Z")
}

fn day(spans: &[(&str, &str)]) -> Vec<RawEvent> {
    spans
        .iter()
        .enumerate()
        .map(|(i, (start, end))| RawEvent::timed(format!("e{i}"), "Meeting", at(start), at(end)))
        .collect()
}

// ============================================================================
// Fixed scenarios
// ============================================================================

#[test]
fn test_empty_day_baseline() {
    let metrics = analyze(&EventNormalizer::new().normalize(&[]));
    assert_eq!(metrics.cognitive_load, 15);
    assert_eq!(metrics.schedule.focus_time_minutes, 480);
    assert_eq!(metrics.schedule.fragmentation_score, 100);
    assert_eq!(metrics.schedule.buffer_time_minutes, 480);
}

#[test]
fn test_single_meeting_fragmentation_is_special_cased() {
    let metrics = analyze(&EventNormalizer::new().normalize(&day(&[("09:00", "09:30")])));
    assert_eq!(metrics.schedule.fragmentation_score, 85);
}

#[test]
fn test_back_to_back_boundary() {
    let count = |second_start: &str| {
        let raw = day(&[("09:00", "10:00"), (second_start, "11:30")]);
        analyze(&EventNormalizer::new().normalize(&raw))
            .schedule
            .back_to_back_count
    };
    assert_eq!(count("10:10"), 1);
    assert_eq!(count("10:15"), 1);
    assert_eq!(count("10:16"), 0);
}

#[test]
fn test_eight_hour_long_meetings_hit_heaviest_bands() {
    let spans: Vec<(String, String)> = (9..17)
        .map(|h| (format!("{h:02}:00"), format!("{:02}:00", h + 1)))
        .collect();
    let spans: Vec<(&str, &str)> = spans.iter().map(|(s, e)| (s.as_str(), e.as_str())).collect();
    let metrics = analyze(&EventNormalizer::new().normalize(&day(&spans)));

    assert_eq!(metrics.schedule.meeting_count, 8);
    assert_eq!(metrics.schedule.focus_time_minutes, 0);
    // 20 + 45 + 25 + 20 clamps at the ceiling
    assert_eq!(metrics.cognitive_load, 95);
    assert_eq!(metrics.schedule.fragmentation_score, 0);
    assert_eq!(metrics.status, PerformanceStatus::NeedsAttention);
}

#[test]
fn test_mixed_day_end_to_end() {
    let raw = day(&[("09:00", "10:00"), ("10:05", "11:00"), ("14:00", "15:30")]);
    let metrics = analyze(&EventNormalizer::new().normalize(&raw));

    assert_eq!(metrics.schedule.meeting_count, 3);
    assert_eq!(metrics.schedule.back_to_back_count, 1);
    // 11:00-14:00 plus 15:30-17:00
    assert_eq!(metrics.schedule.focus_time_minutes, 270);
    // 205 minutes of meetings land in the 3h duration band: 20 + 10 + 8 + 6
    assert_eq!(metrics.cognitive_load, 44);
    assert_eq!(metrics.schedule.fragmentation_score, 47);
    assert_eq!(metrics.adaptive_performance_index, 58);
    assert_eq!(metrics.status, PerformanceStatus::Moderate);
}

#[test]
fn test_two_and_a_half_hour_day_has_load_38() {
    let raw = day(&[("09:00", "10:00"), ("10:05", "10:35"), ("14:00", "15:00")]);
    let metrics = analyze(&EventNormalizer::new().normalize(&raw));
    assert!((metrics.schedule.total_duration_hours - 2.5).abs() < 1e-9);
    assert_eq!(metrics.cognitive_load, 38);
}

#[test]
fn test_metrics_serialize_with_dashboard_field_names() {
    let raw = day(&[("09:00", "10:00")]);
    let metrics = analyze(&EventNormalizer::new().normalize(&raw));
    let json = serde_json::to_value(&metrics).unwrap();

    for field in [
        "cognitiveLoad",
        "adaptivePerformanceIndex",
        "cognitiveResilience",
        "workRhythmRecovery",
        "status",
        "schedule",
        "breakdown",
    ] {
        assert!(json.get(field).is_some(), "missing {field}");
    }
    for field in [
        "meetingCount",
        "backToBackCount",
        "totalDurationHours",
        "focusTimeMinutes",
        "bufferTimeMinutes",
        "fragmentationScore",
    ] {
        assert!(json["schedule"].get(field).is_some(), "missing schedule.{field}");
    }
    assert!(json["breakdown"]["contributors"].is_array());
    assert!(json["breakdown"]["primaryFactors"].is_array());
}

// ============================================================================
// Properties
// ============================================================================

fn base() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-03-03T22:00:00+00:00").unwrap()
}

fn analyzed_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

/// (offset from 22:00 the evening before, duration, attendees), to the second.
/// Events may overlap and may cross either midnight.
fn raw_day() -> impl Strategy<Value = Vec<RawEvent>> {
    prop::collection::vec((0i64..28 * 3600, 1i64..4 * 3600, 0usize..12), 0..14).prop_map(
        |spans| {
            spans
                .into_iter()
                .enumerate()
                .map(|(i, (offset, seconds, attendees))| {
                    let start = base() + Duration::seconds(offset);
                    let end = start + Duration::seconds(seconds);
                    let (start, end) = (start.to_rfc3339(), end.to_rfc3339());
                    RawEvent::timed(format!("p{i}"), "Meeting", start, end)
                        .with_attendees(attendees)
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn prop_scores_stay_in_range(raw in raw_day()) {
        let schedule = EventNormalizer::new().normalize(&raw).with_day(analyzed_day());
        let metrics = analyze(&schedule);
        prop_assert!((15..=95).contains(&metrics.cognitive_load));
        prop_assert!((10..=100).contains(&metrics.adaptive_performance_index));
        prop_assert!((10..=100).contains(&metrics.cognitive_resilience));
        prop_assert!((10..=100).contains(&metrics.work_rhythm_recovery));
        prop_assert!(metrics.schedule.fragmentation_score <= 100);
        prop_assert!(metrics.schedule.buffer_time_minutes >= 0);
        prop_assert!(metrics.schedule.back_to_back_count < metrics.schedule.meeting_count.max(1));
    }

    #[test]
    fn prop_focus_time_stays_within_work_window(raw in raw_day()) {
        let schedule = EventNormalizer::new().normalize(&raw).with_day(analyzed_day());
        let focus = analyze(&schedule).schedule.focus_time_minutes;

        let work_start = DateTime::parse_from_rfc3339("2024-03-04T09:00:00+00:00").unwrap();
        let work_end = DateTime::parse_from_rfc3339("2024-03-04T17:00:00+00:00").unwrap();
        // focus can only come from 9:00-17:00 and the stretches between meetings
        let bound = match (schedule.first(), schedule.last()) {
            (Some(first), Some(_)) => {
                let latest_end = schedule.events().iter().map(|e| e.end).max().unwrap();
                (work_end.max(latest_end) - work_start.min(first.start)).num_minutes()
            }
            _ => 480,
        };
        prop_assert!(focus <= bound, "focus {} exceeds {}", focus, bound);
    }

    #[test]
    fn prop_back_to_back_uses_exact_gaps(raw in raw_day()) {
        let schedule = EventNormalizer::new().normalize(&raw);
        let expected = schedule
            .events()
            .windows(2)
            .filter(|pair| {
                let gap = (pair[1].start - pair[0].end).num_seconds();
                (0..=15 * 60).contains(&gap)
            })
            .count() as u32;
        prop_assert_eq!(analyze(&schedule).schedule.back_to_back_count, expected);
    }

    #[test]
    fn prop_normalizer_is_idempotent(raw in raw_day()) {
        let normalizer = EventNormalizer::new();
        let first = normalizer.normalize(&raw);
        let second = normalizer.normalize(&raw);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        let starts: Vec<_> = first.events().iter().map(|e| e.start).collect();
        prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_index_non_increasing_in_meeting_bands(load in 15u32..=95, frag in 0u32..=100) {
        let indices: Vec<u32> = [3, 4, 6, 8]
            .iter()
            .map(|&count| performance_index(load, frag, count))
            .collect();
        prop_assert!(indices.windows(2).all(|w| w[0] >= w[1]), "{:?}", indices);
    }
}
