//! Fragmentation model: how well a day preserves contiguous focus blocks.
//!
//! ```text
//! score = focus/480 * 60                    (focus share, up to 60)
//!       + sum(gap points)/meetings * 40     (gap quality, up to 40)
//!       - density penalty                   (-20 at >= 8 meetings, -10 at >= 6)
//! ```
//!
//! Gap points: 1.0 for a gap >= 90 min, 0.5 for a gap in [30, 90).
//! An empty day scores 100 and a single meeting 85; both bypass the formula.

use chrono::Duration;

use super::schedule::{FOCUS_BLOCK_MIN_MINUTES, WORKDAY_MINUTES};
use crate::calendar::NormalizedSchedule;

/// Smallest gap that earns partial quality credit.
pub const QUALITY_GAP_MIN_MINUTES: i64 = 30;

const FOCUS_SHARE_WEIGHT: f64 = 60.0;
const GAP_QUALITY_WEIGHT: f64 = 40.0;

const EMPTY_DAY_SCORE: u32 = 100;
const SINGLE_MEETING_SCORE: u32 = 85;

/// Fragmentation score in `0..=100`, higher is better.
pub fn fragmentation_score(schedule: &NormalizedSchedule, focus_time_minutes: i64) -> u32 {
    match schedule.len() {
        0 => return EMPTY_DAY_SCORE,
        1 => return SINGLE_MEETING_SCORE,
        _ => {}
    }

    let meeting_count = schedule.len();
    let base = focus_time_minutes as f64 / WORKDAY_MINUTES as f64 * FOCUS_SHARE_WEIGHT;

    let gap_points: f64 = schedule.gaps().map(gap_quality).sum();
    let bonus = gap_points / meeting_count as f64 * GAP_QUALITY_WEIGHT;

    let score = base + bonus - density_penalty(meeting_count);
    score.clamp(0.0, 100.0).round() as u32
}

fn gap_quality(gap: Duration) -> f64 {
    if gap >= Duration::minutes(FOCUS_BLOCK_MIN_MINUTES) {
        1.0
    } else if gap >= Duration::minutes(QUALITY_GAP_MIN_MINUTES) {
        0.5
    } else {
        0.0
    }
}

fn density_penalty(meeting_count: usize) -> f64 {
    if meeting_count >= 8 {
        20.0
    } else if meeting_count >= 6 {
        10.0
    } else {
        0.0
    }
}
