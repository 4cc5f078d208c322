//! Cognitive load model: 0-100, higher means more load.
//!
//! | Factor | Band | Points |
//! |--------|------|--------|
//! | base | any non-empty day | 20 |
//! | meetings | >=8 / >=6 / >=4 / else | 45 / 30 / 20 / 10 |
//! | back-to-back | >=4 / >=2 / >=1 / 0 | 25 / 15 / 8 / 0 |
//! | duration | >=7h / >=5h / >=3h / else | 20 / 12 / 6 / 0 |
//! | large meetings | each with >=8 attendees | 5 |
//!
//! Result is clamped to `[15, 95]`. An empty day is the idle baseline, 15.

use super::schedule::{back_to_back_count, total_duration_hours};
use crate::calendar::NormalizedSchedule;

pub const MIN_LOAD: u32 = 15;
pub const MAX_LOAD: u32 = 95;

/// Context-switch overhead of any working day.
const BASE_LOAD: u32 = 20;

/// Attendee count at which a meeting counts as large.
pub const LARGE_MEETING_ATTENDEES: u32 = 8;

const LARGE_MEETING_PENALTY: u32 = 5;

pub fn cognitive_load(schedule: &NormalizedSchedule) -> u32 {
    if schedule.is_empty() {
        return MIN_LOAD;
    }

    let large_meetings = schedule
        .events()
        .iter()
        .filter(|e| e.attendee_count >= LARGE_MEETING_ATTENDEES)
        .count() as u32;

    let load = BASE_LOAD
        + meeting_band(schedule.len() as u32)
        + back_to_back_band(back_to_back_count(schedule))
        + duration_band(total_duration_hours(schedule))
        + large_meetings * LARGE_MEETING_PENALTY;

    load.clamp(MIN_LOAD, MAX_LOAD)
}

pub(crate) fn meeting_band(meeting_count: u32) -> u32 {
    match meeting_count {
        n if n >= 8 => 45,
        n if n >= 6 => 30,
        n if n >= 4 => 20,
        _ => 10,
    }
}

pub(crate) fn back_to_back_band(back_to_back: u32) -> u32 {
    match back_to_back {
        n if n >= 4 => 25,
        n if n >= 2 => 15,
        n if n >= 1 => 8,
        _ => 0,
    }
}

pub(crate) fn duration_band(hours: f64) -> u32 {
    if hours >= 7.0 {
        20
    } else if hours >= 5.0 {
        12
    } else if hours >= 3.0 {
        6
    } else {
        0
    }
}
