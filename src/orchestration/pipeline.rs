use crate::cache::memo::DEFAULT_RETRY_AFTER_SECS;
use crate::cache::{Memo, RefreshPolicy};
use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{Event, MergedPoint, MergedSeries, Obstacle};
use crate::engine::{self, DEFAULT_DRAWDOWN_THRESHOLD, DEFAULT_MA_WINDOW};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Tunables for the price pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub ma_window: usize,
    pub drawdown_threshold: f64,
    pub cache_ttl: Duration,
    /// How long a stale result is served after a failed recompute.
    pub retry_after: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            ma_window: DEFAULT_MA_WINDOW,
            drawdown_threshold: DEFAULT_DRAWDOWN_THRESHOLD,
            cache_ttl: Duration::hours(1),
            retry_after: Duration::seconds(DEFAULT_RETRY_AFTER_SECS),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

/// Cache-aware entry point to the price pipeline.
///
/// Holds the memoized results and the daily refresh gate; handlers share one
/// instance behind an `Arc`.
#[derive(Debug)]
pub struct Pipeline {
    datasource: Arc<dyn DataSource>,
    settings: PipelineSettings,
    series: Memo<usize, MergedSeries>,
    obstacles: Memo<(usize, u64), Vec<Obstacle>>,
    events: Memo<(), Vec<Event>>,
    refresh: RefreshPolicy,
}

impl Pipeline {
    pub fn new(datasource: Arc<dyn DataSource>, settings: PipelineSettings) -> Self {
        Self {
            datasource,
            settings,
            series: Memo::new("merged_series", settings.cache_ttl)
                .with_retry_after(settings.retry_after),
            obstacles: Memo::new("obstacles", settings.cache_ttl)
                .with_retry_after(settings.retry_after),
            events: Memo::new("events", settings.cache_ttl).with_retry_after(settings.retry_after),
            refresh: RefreshPolicy::new(),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Merged series with the configured moving-average window.
    pub async fn merged_series(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Arc<MergedSeries>, PipelineError> {
        self.merged_series_with(self.settings.ma_window, now).await
    }

    pub async fn merged_series_with(
        &self,
        window: usize,
        now: DateTime<Utc>,
    ) -> Result<Arc<MergedSeries>, PipelineError> {
        self.series
            .get_or_compute(window, now, || async {
                let (historical, recent) = futures::try_join!(
                    self.datasource.load_historical(),
                    self.datasource.load_recent()
                )?;
                let merged = engine::merge(&historical, &recent, window);
                info!(
                    historical = historical.len(),
                    recent = recent.len(),
                    merged = merged.len(),
                    window,
                    "Merged price series"
                );
                Ok::<_, PipelineError>(merged)
            })
            .await
    }

    /// Obstacles with the configured threshold.
    pub async fn obstacles(&self, now: DateTime<Utc>) -> Result<Arc<Vec<Obstacle>>, PipelineError> {
        self.obstacles_with(self.settings.drawdown_threshold, now)
            .await
    }

    /// Obstacles never stay fresh longer than the series they were detected
    /// on, so a series served stale during an outage is not baked in for a
    /// full TTL.
    pub async fn obstacles_with(
        &self,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Result<Arc<Vec<Obstacle>>, PipelineError> {
        let window = self.settings.ma_window;
        self.obstacles
            .get_or_compute_until((window, threshold.to_bits()), now, || async {
                let series = self.merged_series_with(window, now).await?;
                let series_expires_at = self.series.expires_at(&window);
                let obstacles = engine::detect_obstacles(series.points(), threshold);
                info!(count = obstacles.len(), threshold, "Detected obstacles");
                Ok::<_, PipelineError>((obstacles, series_expires_at))
            })
            .await
    }

    pub async fn events(&self, now: DateTime<Utc>) -> Result<Arc<Vec<Event>>, PipelineError> {
        self.events
            .get_or_compute((), now, || async {
                let mut events = self.datasource.load_events().await?;
                events.sort_by_key(|e| e.date);
                Ok::<_, PipelineError>(events)
            })
            .await
    }

    /// Random points from the (cached) merged series. Never cached itself.
    pub async fn enemies(
        &self,
        n: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<MergedPoint>, PipelineError> {
        let series = self.merged_series(now).await?;
        Ok(engine::sample(series.points(), n))
    }

    /// Run the daily sweep if a UTC day boundary has passed since the last
    /// one. Returns whether a sweep happened.
    pub fn maybe_daily_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.refresh.check_and_maybe_invalidate(now) {
            Ok(true) => {
                self.invalidate_all();
                info!(at = %now, "Daily cache refresh");
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(error = %e, "Refresh check failed");
                false
            }
        }
    }

    /// Administrative sweep, regardless of the daily gate.
    pub fn clear_cache(&self, now: DateTime<Utc>) {
        self.invalidate_all();
        if let Err(e) = self.refresh.force(now) {
            warn!(error = %e, "Failed to record forced refresh");
        }
        info!(at = %now, "Cache cleared on demand");
    }

    fn invalidate_all(&self) {
        for result in [
            (self.series.name(), self.series.invalidate()),
            (self.obstacles.name(), self.obstacles.invalidate()),
            (self.events.name(), self.events.invalidate()),
        ] {
            if let (name, Err(e)) = result {
                warn!(cache = name, error = %e, "Failed to invalidate cache");
            }
        }
    }
}
