//! Rule-based insights used when the generator fails or returns garbage.
//!
//! Uses the same thresholds as the scoring models, so the fallback never
//! contradicts the numbers it sits next to.

use super::{Impact, Insight, InsightSet, TabType};
use crate::analysis::assembler::HIGH_LOAD_THRESHOLD;
use crate::analysis::schedule::FOCUS_BLOCK_MIN_MINUTES;
use crate::analysis::{PerformanceStatus, ResilienceBand, SustainabilityBand, WorkHealthMetrics};

pub fn fallback_insights(metrics: &WorkHealthMetrics, tab: TabType) -> InsightSet {
    let schedule = &metrics.schedule;

    let mut risk_factors = Vec::new();
    if metrics.cognitive_load >= HIGH_LOAD_THRESHOLD {
        risk_factors.push(format!(
            "Cognitive load of {}/100 is in the high-demand range",
            metrics.cognitive_load
        ));
    }
    if schedule.back_to_back_count >= 2 {
        risk_factors.push(format!(
            "{} back-to-back meetings with no recovery time",
            schedule.back_to_back_count
        ));
    }
    if schedule.meeting_count > 0 && schedule.focus_time_minutes < FOCUS_BLOCK_MIN_MINUTES {
        risk_factors.push("No uninterrupted focus block of 90 minutes or more".to_string());
    }

    let mut opportunities = Vec::new();
    if schedule.focus_time_minutes >= FOCUS_BLOCK_MIN_MINUTES {
        opportunities.push(format!(
            "Reserve the {} minutes of focus time for deep work",
            schedule.focus_time_minutes
        ));
    }
    if schedule.buffer_time_minutes > 0 {
        opportunities.push(format!(
            "{} minutes of buffer can absorb overruns and short breaks",
            schedule.buffer_time_minutes
        ));
    }

    let mut predictive_alerts = Vec::new();
    if metrics.sustainability_band == SustainabilityBand::Unsustainable {
        predictive_alerts
            .push("Repeating this pace for several days risks accumulating fatigue".to_string());
    }
    if metrics.resilience_band == ResilienceBand::Critical {
        predictive_alerts
            .push("Frequent context switches are likely to slow decisions later today".to_string());
    }

    let (overall_score, insights, summary) = match tab {
        TabType::Overview | TabType::Performance => {
            let impact = match metrics.status {
                PerformanceStatus::Excellent | PerformanceStatus::Good => Impact::Low,
                PerformanceStatus::Moderate => Impact::Medium,
                PerformanceStatus::NeedsAttention => Impact::High,
            };
            let insights = metrics
                .breakdown
                .primary_factors
                .iter()
                .map(|factor| Insight {
                    title: format!("Performance: {}", metrics.status.label()),
                    description: factor.clone(),
                    impact,
                })
                .collect();
            let summary = format!(
                "Adaptive performance index {} ({}) across {} meetings.",
                metrics.adaptive_performance_index,
                metrics.status.label(),
                schedule.meeting_count
            );
            (metrics.adaptive_performance_index, insights, summary)
        }
        TabType::Resilience => {
            let (impact, description) = match metrics.resilience_band {
                ResilienceBand::Critical => (
                    Impact::High,
                    "Context switching and decision load are high; batch similar meetings",
                ),
                ResilienceBand::Moderate => (
                    Impact::Medium,
                    "Some switching pressure; keep short gaps between unrelated meetings",
                ),
                ResilienceBand::Strong => (
                    Impact::Low,
                    "Meeting mix leaves room to absorb interruptions",
                ),
            };
            let summary = format!(
                "Cognitive resilience {} ({:?}).",
                metrics.cognitive_resilience, metrics.resilience_band
            );
            (
                metrics.cognitive_resilience,
                vec![Insight {
                    title: "Cognitive resilience".to_string(),
                    description: description.to_string(),
                    impact,
                }],
                summary,
            )
        }
        TabType::Sustainability => {
            let (impact, description) = match metrics.sustainability_band {
                SustainabilityBand::Unsustainable => (
                    Impact::High,
                    "Recovery gaps are scarce and load is uneven across the day",
                ),
                SustainabilityBand::Adequate => (
                    Impact::Medium,
                    "Pace is workable; add a recovery gap around the busiest stretch",
                ),
                SustainabilityBand::Excellent => (
                    Impact::Low,
                    "Meetings are spread out with regular recovery time",
                ),
            };
            let summary = format!(
                "Work rhythm recovery {} ({:?}).",
                metrics.work_rhythm_recovery, metrics.sustainability_band
            );
            (
                metrics.work_rhythm_recovery,
                vec![Insight {
                    title: "Sustainability".to_string(),
                    description: description.to_string(),
                    impact,
                }],
                summary,
            )
        }
    };

    InsightSet {
        insights,
        summary,
        overall_score,
        risk_factors,
        opportunities,
        predictive_alerts,
    }
}
