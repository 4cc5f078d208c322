//! Schedule shape metrics: meeting load, back-to-back density, focus time,
//! buffer time.
//!
//! Windowing uses a fixed 9:00-17:00 workday on the schedule's anchor day, in
//! the UTC offset of the bounding meeting. Gaps are compared to the second.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::fragmentation;
use crate::calendar::NormalizedSchedule;

/// Hour the work window opens.
pub const WORK_START_HOUR: u32 = 9;

/// Hour the work window closes.
pub const WORK_END_HOUR: u32 = 17;

/// Length of the fixed workday.
pub const WORKDAY_MINUTES: i64 = 480;

/// Largest gap (inclusive) that still makes two meetings back-to-back.
pub const BACK_TO_BACK_MAX_GAP_MINUTES: i64 = 15;

/// Smallest window that counts as focus time.
pub const FOCUS_BLOCK_MIN_MINUTES: i64 = 90;

/// Transition allowance charged per meeting against buffer time.
pub const TRANSITION_MINUTES_PER_MEETING: i64 = 15;

/// Derived, immutable per-request schedule metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMetrics {
    pub meeting_count: u32,
    pub back_to_back_count: u32,
    pub total_duration_hours: f64,
    pub focus_time_minutes: i64,
    pub buffer_time_minutes: i64,
    /// 0-100, higher = better preserved focus structure.
    pub fragmentation_score: u32,
}

impl ScheduleMetrics {
    pub fn compute(schedule: &NormalizedSchedule) -> Self {
        let focus_time_minutes = focus_time_minutes(schedule);
        Self {
            meeting_count: schedule.len() as u32,
            back_to_back_count: back_to_back_count(schedule),
            total_duration_hours: total_duration_hours(schedule),
            focus_time_minutes,
            buffer_time_minutes: buffer_time_minutes(schedule),
            fragmentation_score: fragmentation::fragmentation_score(schedule, focus_time_minutes),
        }
    }
}

/// Adjacent pairs separated by `0..=15` minutes. Overlaps (negative gaps) are
/// not back-to-back.
pub fn back_to_back_count(schedule: &NormalizedSchedule) -> u32 {
    let max_gap = Duration::minutes(BACK_TO_BACK_MAX_GAP_MINUTES);
    schedule
        .gaps()
        .filter(|gap| *gap >= Duration::zero() && *gap <= max_gap)
        .count() as u32
}

pub fn total_duration_hours(schedule: &NormalizedSchedule) -> f64 {
    schedule.total_minutes() as f64 / 60.0
}

/// Minutes in qualifying (>= 90 min) windows: before the first meeting,
/// between meetings, and after the last one.
///
/// Both work window edges sit on [`NormalizedSchedule::day`], so a meeting
/// running past midnight does not open a window on the next day.
/// An empty day is one uninterrupted workday.
pub fn focus_time_minutes(schedule: &NormalizedSchedule) -> i64 {
    let (Some(first), Some(last), Some(day)) = (schedule.first(), schedule.last(), schedule.day())
    else {
        return WORKDAY_MINUTES;
    };

    let mut focus = 0;

    if let Some(work_start) = at_hour(day, WORK_START_HOUR, &first.start) {
        if first.start > work_start {
            focus += qualifying(first.start - work_start);
        }
    }

    focus += schedule.gaps().map(qualifying).sum::<i64>();

    if let Some(work_end) = at_hour(day, WORK_END_HOUR, &last.end) {
        if last.end < work_end {
            focus += qualifying(work_end - last.end);
        }
    }

    focus
}

/// Workday minutes left after meetings and per-meeting transitions, floored at 0.
pub fn buffer_time_minutes(schedule: &NormalizedSchedule) -> i64 {
    let used = schedule.total_minutes() + schedule.len() as i64 * TRANSITION_MINUTES_PER_MEETING;
    (WORKDAY_MINUTES - used).max(0)
}

/// Whole minutes of a window at least [`FOCUS_BLOCK_MIN_MINUTES`] long.
fn qualifying(window: Duration) -> i64 {
    if window >= Duration::minutes(FOCUS_BLOCK_MIN_MINUTES) {
        window.num_minutes()
    } else {
        0
    }
}

/// `hour:00` on `day`, in the offset of `reference`.
fn at_hour(
    day: NaiveDate,
    hour: u32,
    reference: &DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    day.and_time(time)
        .and_local_timezone(*reference.offset())
        .single()
}
