//! Schedule analysis and scoring.
//!
//! Data flows one way: [`NormalizedSchedule`](crate::calendar::NormalizedSchedule)
//! → schedule metrics, cognitive load, fragmentation → performance indices →
//! [`WorkHealthMetrics`]. Every function here is pure.

pub mod assembler;
pub mod cognitive_load;
pub mod fragmentation;
pub mod performance;
pub mod schedule;

pub use assembler::{analyze, assemble, Breakdown, WorkHealthMetrics};
pub use cognitive_load::cognitive_load;
pub use fragmentation::fragmentation_score;
pub use performance::{
    cognitive_resilience, performance_index, work_rhythm_recovery, PerformanceStatus,
    ResilienceBand, SustainabilityBand,
};
pub use schedule::ScheduleMetrics;
