//! Performance index and the two secondary indices.
//!
//! All three are weighted sums of banded component scores, clamped to
//! `[10, 100]` and rounded. Each index keeps its own severity bands; they are
//! intentionally not unified.
//!
//! ## Adaptive performance index
//!
//! ```text
//! index = (100 - cognitive_load) * 0.5 + fragmentation * 0.3 + density * 0.2
//! ```
//!
//! | Meetings | Density score |
//! |----------|---------------|
//! | <= 3 | 80 |
//! | <= 5 | 65 |
//! | <= 7 | 45 |
//! | > 7 | 25 |
//!
//! Status: `>=85` excellent, `>=70` good, `>=55` moderate, else needs attention.
//!
//! ## Cognitive resilience
//!
//! ```text
//! resilience = switches * 0.4 + decisions * 0.3 + back_to_back * 0.3
//! ```
//!
//! Bands: `<=40` critical, `<=65` moderate, `>65` strong.
//!
//! ## Sustainability (work rhythm recovery)
//!
//! ```text
//! sustainability = recovery * 0.4 + balance * 0.3 + duration * 0.3
//! ```
//!
//! Bands: `<=45` unsustainable, `<=70` adequate, `>70` excellent.

use chrono::{Duration, Timelike};
use serde::{Deserialize, Serialize};

use super::fragmentation::QUALITY_GAP_MIN_MINUTES;
use super::schedule::{back_to_back_count, total_duration_hours};
use crate::calendar::{MeetingCategory, NormalizedSchedule};

pub const MIN_INDEX: f64 = 10.0;
pub const MAX_INDEX: f64 = 100.0;

/// Attendee count at which a meeting is treated as decision-heavy.
const DECISION_MEETING_ATTENDEES: u32 = 5;

/// Local hour splitting morning from afternoon load.
const MIDDAY_HOUR: u32 = 12;

/// Discrete label for the adaptive performance index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceStatus {
    Excellent,
    Good,
    Moderate,
    NeedsAttention,
}

impl PerformanceStatus {
    pub fn from_index(index: u32) -> Self {
        match index {
            i if i >= 85 => PerformanceStatus::Excellent,
            i if i >= 70 => PerformanceStatus::Good,
            i if i >= 55 => PerformanceStatus::Moderate,
            _ => PerformanceStatus::NeedsAttention,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceStatus::Excellent => "Excellent",
            PerformanceStatus::Good => "Good",
            PerformanceStatus::Moderate => "Moderate",
            PerformanceStatus::NeedsAttention => "Needs attention",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResilienceBand {
    Critical,
    Moderate,
    Strong,
}

impl ResilienceBand {
    pub fn from_score(score: u32) -> Self {
        if score <= 40 {
            ResilienceBand::Critical
        } else if score <= 65 {
            ResilienceBand::Moderate
        } else {
            ResilienceBand::Strong
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SustainabilityBand {
    Unsustainable,
    Adequate,
    Excellent,
}

impl SustainabilityBand {
    pub fn from_score(score: u32) -> Self {
        if score <= 45 {
            SustainabilityBand::Unsustainable
        } else if score <= 70 {
            SustainabilityBand::Adequate
        } else {
            SustainabilityBand::Excellent
        }
    }
}

/// Primary capacity index in `10..=100`.
pub fn performance_index(cognitive_load: u32, fragmentation_score: u32, meeting_count: u32) -> u32 {
    let cognitive_score = 100.0 - f64::from(cognitive_load.min(100));
    let index = cognitive_score * 0.5
        + f64::from(fragmentation_score) * 0.3
        + density_score(meeting_count) * 0.2;
    clamp_index(index)
}

fn density_score(meeting_count: u32) -> f64 {
    match meeting_count {
        0..=3 => 80.0,
        4..=5 => 65.0,
        6..=7 => 45.0,
        _ => 25.0,
    }
}

/// Tolerance to context switching and decision fatigue, `10..=100`.
pub fn cognitive_resilience(schedule: &NormalizedSchedule) -> u32 {
    let events = schedule.events();

    let switches = events
        .windows(2)
        .filter(|pair| pair[0].category != pair[1].category)
        .count();
    let switch_score = match switches {
        0..=1 => 85.0,
        2..=3 => 70.0,
        4..=5 => 50.0,
        _ => 30.0,
    };

    let decisions = events
        .iter()
        .filter(|e| {
            e.category == MeetingCategory::Strategic
                || e.attendee_count >= DECISION_MEETING_ATTENDEES
        })
        .count();
    let decision_score = match decisions {
        0..=1 => 85.0,
        2..=3 => 65.0,
        _ => 40.0,
    };

    let recovery_score = match back_to_back_count(schedule) {
        0 => 85.0,
        1..=2 => 65.0,
        _ => 40.0,
    };

    clamp_index(switch_score * 0.4 + decision_score * 0.3 + recovery_score * 0.3)
}

/// Long-term maintainability of the day's pace, `10..=100`.
pub fn work_rhythm_recovery(schedule: &NormalizedSchedule) -> u32 {
    let gaps: Vec<Duration> = schedule.gaps().collect();
    let recovery_score = if gaps.is_empty() {
        90.0
    } else {
        let min_recovery = Duration::minutes(QUALITY_GAP_MIN_MINUTES);
        let adequate = gaps.iter().filter(|g| **g >= min_recovery).count();
        let share = adequate as f64 / gaps.len() as f64;
        if share >= 0.75 {
            90.0
        } else if share >= 0.5 {
            70.0
        } else if share >= 0.25 {
            50.0
        } else {
            30.0
        }
    };

    let (morning, afternoon) = schedule
        .events()
        .iter()
        .fold((0i64, 0i64), |(am, pm), e| {
            if e.start.hour() < MIDDAY_HOUR {
                (am + e.duration_minutes, pm)
            } else {
                (am, pm + e.duration_minutes)
            }
        });
    let total = morning + afternoon;
    let balance_score = if total == 0 {
        85.0
    } else {
        let imbalance = (morning - afternoon).abs() as f64 / total as f64;
        if imbalance <= 0.3 {
            85.0
        } else if imbalance <= 0.6 {
            65.0
        } else {
            45.0
        }
    };

    let hours = total_duration_hours(schedule);
    let duration_score = if hours < 3.0 {
        85.0
    } else if hours < 5.0 {
        65.0
    } else if hours < 7.0 {
        45.0
    } else {
        25.0
    };

    clamp_index(recovery_score * 0.4 + balance_score * 0.3 + duration_score * 0.3)
}

fn clamp_index(value: f64) -> u32 {
    value.clamp(MIN_INDEX, MAX_INDEX).round() as u32
}
