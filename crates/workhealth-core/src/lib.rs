//! # Work Health Core Library
//!
//! Scores a single calendar day for meeting load, focus-time fragmentation
//! and cognitive capacity. The scoring engine is pure and deterministic; the
//! layers around it fetch events, explain the scores and cache those
//! explanations.
//!
//! ## Architecture
//!
//! - **Calendar**: provider events normalized into a sorted [`NormalizedSchedule`]
//! - **Analysis**: schedule metrics, cognitive load, fragmentation and the
//!   performance indices, assembled into [`WorkHealthMetrics`]
//! - **Insights**: boundary to an external text generator, with structural
//!   validation and rule-based fallback
//! - **Cache**: fingerprinted insight cache with a fixed 4 hour lifetime
//! - **Source**: injected event source, demo data or Google Calendar
//! - **Storage**: TOML configuration and the data directory
//!
//! ## Key Components
//!
//! - [`EventNormalizer`]: raw events to a canonical schedule
//! - [`analyze`]: schedule to metrics
//! - [`InsightCacheKeyDeriver`]: cache fingerprint
//! - [`WorkHealthService`]: fetch, score and explain one day

pub mod analysis;
pub mod cache;
pub mod calendar;
pub mod context;
pub mod error;
pub mod insights;
pub mod service;
pub mod source;
pub mod storage;

pub use analysis::{analyze, PerformanceStatus, ScheduleMetrics, WorkHealthMetrics};
pub use cache::{
    CacheEntry, InsightCache, InsightCacheKeyDeriver, MemoryInsightCache, SqliteInsightCache,
};
pub use calendar::{CalendarEvent, EventNormalizer, MeetingCategory, NormalizedSchedule, RawEvent};
pub use context::{MeetingPreference, UserContext};
pub use error::{
    CacheReadError, ConfigError, CoreError, InsightGenerationError, InvalidEventError,
    UpstreamFetchError,
};
pub use insights::{InsightGenerator, InsightResponse, InsightSet, TabType};
pub use service::{DayReport, InsightOrigin, WorkHealthService};
pub use source::{EventSource, GoogleCalendarSource, MockEventSource};
pub use storage::Config;
