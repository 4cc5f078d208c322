//! Day report orchestration.
//!
//! [`WorkHealthService`] wires an [`EventSource`], an [`InsightGenerator`] and
//! an [`InsightCache`] together. Scoring is pure and always succeeds; only the
//! upstream fetch may fail the request. Generator and cache failures degrade to
//! fallback insights and cache misses.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{analyze, WorkHealthMetrics};
use crate::cache::{CacheEntry, InsightCache, InsightCacheKeyDeriver, SqliteInsightCache};
use crate::calendar::{CalendarEvent, EventNormalizer, NormalizedSchedule, RawEvent};
use crate::context::UserContext;
use crate::error::{InsightGenerationError, Result};
use crate::insights::{
    fallback_insights, validate_response, DisabledInsightGenerator, HttpInsightGenerator,
    InsightGenerator, InsightRequest, InsightResponse, InsightSet, TabType,
};
use crate::source::{parse_timezone, EventSource, GoogleCalendarSource, MockEventSource};
use crate::storage::{Config, SourceKind};

/// Where the insights of a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightOrigin {
    Cache,
    Generated,
    Fallback,
}

/// Everything shown for one tab of one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReport {
    pub date: NaiveDate,
    pub tab: TabType,
    pub metrics: WorkHealthMetrics,
    pub events: Vec<CalendarEvent>,
    pub insights: InsightSet,
    pub origin: InsightOrigin,
    pub cache_key: String,
}

pub struct WorkHealthService {
    source: Box<dyn EventSource>,
    generator: Box<dyn InsightGenerator>,
    cache: Arc<dyn InsightCache>,
    context: UserContext,
    normalizer: EventNormalizer,
    keys: InsightCacheKeyDeriver,
}

impl WorkHealthService {
    pub fn new(
        source: Box<dyn EventSource>,
        generator: Box<dyn InsightGenerator>,
        cache: Arc<dyn InsightCache>,
    ) -> Self {
        Self {
            source,
            generator,
            cache,
            context: UserContext::default(),
            normalizer: EventNormalizer::new(),
            keys: InsightCacheKeyDeriver::new(),
        }
    }

    pub fn with_context(mut self, context: UserContext) -> Self {
        self.context = context;
        self
    }

    /// Build the service described by a [`Config`], with the on-disk cache.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = SqliteInsightCache::open(config.cache.capacity_per_user)?;
        Ok(Self::from_config_with_cache(config, Arc::new(cache)))
    }

    pub fn from_config_with_cache(config: &Config, cache: Arc<dyn InsightCache>) -> Self {
        let source: Box<dyn EventSource> = match config.source.kind {
            SourceKind::Mock => Box::new(MockEventSource::new()),
            SourceKind::Google => Box::new(GoogleCalendarSource::new(
                config.source.calendar_id.clone(),
                config.source_token(),
            )),
        };

        let generator: Box<dyn InsightGenerator> = match &config.insights.endpoint {
            Some(endpoint) => Box::new(
                HttpInsightGenerator::new(endpoint.clone(), config.insights.model.clone())
                    .with_api_key(config.insights_api_key())
                    .with_timeout(Duration::from_secs(config.insights.timeout_secs)),
            ),
            None => Box::new(DisabledInsightGenerator),
        };

        Self::new(source, generator, cache).with_context(config.user_context())
    }

    pub fn context(&self) -> &UserContext {
        &self.context
    }

    pub fn cache(&self) -> &Arc<dyn InsightCache> {
        &self.cache
    }

    /// Normalize and score the raw events of `date`. No I/O.
    pub fn analyze_events(
        &self,
        raw: &[RawEvent],
        date: NaiveDate,
    ) -> (NormalizedSchedule, WorkHealthMetrics) {
        let schedule = self.normalizer.normalize(raw).with_day(date);
        let metrics = analyze(&schedule);
        (schedule, metrics)
    }

    /// Fetch the events of `date` in the user's timezone.
    pub async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawEvent>> {
        let tz = parse_timezone(&self.context.timezone)?;
        let raw = self.source.fetch_day(date, tz).await?;
        debug!(source = self.source.name(), %date, count = raw.len(), "fetched events");
        Ok(raw)
    }

    /// Cache key for one tab of already fetched events.
    pub fn cache_key(&self, raw: &[RawEvent], tab: TabType, date: NaiveDate) -> String {
        let (schedule, metrics) = self.analyze_events(raw, date);
        self.keys
            .derive(&metrics, schedule.events(), &self.context, tab, date)
    }

    /// Fetch, score and explain one day.
    ///
    /// # Errors
    ///
    /// Only an upstream fetch failure is returned.
    pub async fn report(
        &self,
        user_id: &str,
        tab: TabType,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<DayReport> {
        let raw = self.fetch(date).await?;
        Ok(self.report_for_events(user_id, tab, date, &raw, now).await)
    }

    /// Same as [`report`](Self::report) for events obtained elsewhere.
    pub async fn report_for_events(
        &self,
        user_id: &str,
        tab: TabType,
        date: NaiveDate,
        raw: &[RawEvent],
        now: DateTime<Utc>,
    ) -> DayReport {
        let (schedule, metrics) = self.analyze_events(raw, date);
        let cache_key = self
            .keys
            .derive(&metrics, schedule.events(), &self.context, tab, date);

        match self.cache.lookup(user_id, tab, &cache_key, now) {
            Ok(Some(entry)) => {
                info!(user_id, %tab, %date, "serving cached insights");
                return DayReport {
                    date,
                    tab,
                    metrics,
                    events: schedule.into_events(),
                    insights: entry.insights,
                    origin: InsightOrigin::Cache,
                    cache_key,
                };
            }
            Ok(None) => debug!(user_id, %tab, "insight cache miss"),
            Err(e) => {
                warn!(user_id, %tab, error = %e, "insight cache read failed; treating as miss")
            }
        }

        let request = InsightRequest {
            metrics,
            events: schedule.into_events(),
            tab,
            timezone: self.context.timezone.clone(),
            context: self.context.clone(),
        };

        let (insights, origin) = match self.generate(&request).await {
            Some(insights) => {
                let entry = CacheEntry::new(cache_key.clone(), insights.clone(), now);
                if let Err(e) = self.cache.put(user_id, tab, entry) {
                    warn!(user_id, %tab, error = %e, "failed to store insights in cache");
                }
                (insights, InsightOrigin::Generated)
            }
            None => (fallback_insights(&request.metrics, tab), InsightOrigin::Fallback),
        };

        info!(
            user_id,
            %tab,
            %date,
            index = request.metrics.adaptive_performance_index,
            ?origin,
            "assembled day report"
        );

        DayReport {
            date,
            tab,
            metrics: request.metrics,
            events: request.events,
            insights,
            origin,
            cache_key,
        }
    }

    /// Validated generator output, or `None` when fallback insights are needed.
    async fn generate(&self, request: &InsightRequest) -> Option<InsightSet> {
        let body = match self.generator.generate(request).await {
            Ok(body) => body,
            Err(InsightGenerationError::NotConfigured) => {
                debug!("no insight generator configured");
                return None;
            }
            Err(e) => {
                warn!(generator = self.generator.name(), error = %e, "insight generation failed");
                return None;
            }
        };

        match validate_response(&body) {
            InsightResponse::Valid(set) => Some(set),
            InsightResponse::Malformed { reason } => {
                warn!(generator = self.generator.name(), %reason, "discarding malformed insights");
                None
            }
        }
    }
}
