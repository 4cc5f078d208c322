//! Packages every metric into the [`WorkHealthMetrics`] API contract, with
//! deterministic contributor and primary-factor strings.

use serde::{Deserialize, Serialize};

use super::cognitive_load::cognitive_load;
use super::performance::{
    cognitive_resilience, performance_index, work_rhythm_recovery, PerformanceStatus,
    ResilienceBand, SustainabilityBand,
};
use super::schedule::{ScheduleMetrics, FOCUS_BLOCK_MIN_MINUTES};
use crate::calendar::NormalizedSchedule;

/// Cognitive load at or above which the day counts as high demand.
pub const HIGH_LOAD_THRESHOLD: u32 = 70;

/// Human-readable explanation of the scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub contributors: Vec<String>,
    pub primary_factors: Vec<String>,
}

/// The assembled analysis of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkHealthMetrics {
    /// 0-100, higher is worse.
    pub cognitive_load: u32,
    /// 0-100, higher is better.
    #[serde(alias = "readiness")]
    pub adaptive_performance_index: u32,
    pub cognitive_resilience: u32,
    pub work_rhythm_recovery: u32,
    pub status: PerformanceStatus,
    pub resilience_band: ResilienceBand,
    pub sustainability_band: SustainabilityBand,
    pub schedule: ScheduleMetrics,
    pub breakdown: Breakdown,
}

impl WorkHealthMetrics {
    /// Alias used by older dashboards.
    pub fn readiness(&self) -> u32 {
        self.adaptive_performance_index
    }
}

/// Run every model over the schedule and assemble the result.
pub fn analyze(schedule: &NormalizedSchedule) -> WorkHealthMetrics {
    let metrics = ScheduleMetrics::compute(schedule);
    let load = cognitive_load(schedule);
    let index = performance_index(load, metrics.fragmentation_score, metrics.meeting_count);
    let resilience = cognitive_resilience(schedule);
    let sustainability = work_rhythm_recovery(schedule);

    assemble(load, index, resilience, sustainability, metrics)
}

/// Assemble already-computed scores. Total over well-formed inputs.
pub fn assemble(
    cognitive_load: u32,
    adaptive_performance_index: u32,
    cognitive_resilience: u32,
    work_rhythm_recovery: u32,
    schedule: ScheduleMetrics,
) -> WorkHealthMetrics {
    let breakdown = Breakdown {
        contributors: contributors(&schedule, cognitive_load),
        primary_factors: primary_factors(&schedule, cognitive_load),
    };

    WorkHealthMetrics {
        cognitive_load,
        adaptive_performance_index,
        cognitive_resilience,
        work_rhythm_recovery,
        status: PerformanceStatus::from_index(adaptive_performance_index),
        resilience_band: ResilienceBand::from_score(cognitive_resilience),
        sustainability_band: SustainabilityBand::from_score(work_rhythm_recovery),
        schedule,
        breakdown,
    }
}

fn contributors(schedule: &ScheduleMetrics, cognitive_load: u32) -> Vec<String> {
    vec![
        format!(
            "Meeting load: {} meetings, {:.1}h total ({})",
            schedule.meeting_count,
            schedule.total_duration_hours,
            meeting_tag(schedule.meeting_count)
        ),
        format!(
            "Focus time: {} min in uninterrupted blocks ({})",
            schedule.focus_time_minutes,
            focus_tag(schedule.focus_time_minutes)
        ),
        format!(
            "Cognitive load: {}/100 ({})",
            cognitive_load,
            load_tag(cognitive_load)
        ),
    ]
}

fn primary_factors(schedule: &ScheduleMetrics, cognitive_load: u32) -> Vec<String> {
    let mut factors = Vec::with_capacity(2);

    if schedule.meeting_count <= 3 && schedule.fragmentation_score >= 80 {
        factors.push(
            "Optimal conditions: light meeting load with well-preserved focus blocks".to_string(),
        );
    } else if cognitive_load >= HIGH_LOAD_THRESHOLD {
        factors.push(
            "High cognitive demand from meeting density and total meeting time".to_string(),
        );
    } else {
        factors.push("Moderate workload with a manageable meeting distribution".to_string());
    }

    if schedule.back_to_back_count >= 2 {
        factors.push(format!(
            "{} back-to-back transitions leave little recovery between meetings",
            schedule.back_to_back_count
        ));
    }

    factors
}

// Tag cut points reuse the cognitive-load meeting bands (4, 6).
fn meeting_tag(meeting_count: u32) -> &'static str {
    match meeting_count {
        n if n >= 6 => "Heavy",
        n if n >= 4 => "Moderate",
        _ => "Light",
    }
}

fn focus_tag(focus_minutes: i64) -> &'static str {
    if focus_minutes >= 2 * FOCUS_BLOCK_MIN_MINUTES {
        "Ample"
    } else if focus_minutes >= FOCUS_BLOCK_MIN_MINUTES {
        "Limited"
    } else {
        "Minimal"
    }
}

fn load_tag(cognitive_load: u32) -> &'static str {
    if cognitive_load >= HIGH_LOAD_THRESHOLD {
        "Heavy"
    } else if cognitive_load >= 40 {
        "Moderate"
    } else {
        "Light"
    }
}
