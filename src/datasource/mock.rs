//! Mock data source for testing without files or network calls.

use super::{DataSource, DataSourceError};
use crate::domain::{Event, PricePoint};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock data source that returns predefined test data.
///
/// Clones share the call counters and the failure switch, so a test can keep
/// a handle after passing the source into the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    historical: Vec<PricePoint>,
    recent: Vec<PricePoint>,
    events: Vec<Event>,
    fail_recent: Arc<AtomicBool>,
    recent_calls: Arc<AtomicUsize>,
    historical_calls: Arc<AtomicUsize>,
    events_calls: Arc<AtomicUsize>,
}

impl MockDataSource {
    /// Create a new mock data source with empty data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the historical archive contents.
    pub fn with_historical(mut self, points: Vec<PricePoint>) -> Self {
        self.historical = points;
        self
    }

    /// Set the recent-window contents.
    pub fn with_recent(mut self, points: Vec<PricePoint>) -> Self {
        self.recent = points;
        self
    }

    /// Set the events archive contents.
    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    /// Make `load_recent` fail with a network error until switched back.
    pub fn set_recent_unreachable(&self, unreachable: bool) {
        self.fail_recent.store(unreachable, Ordering::SeqCst);
    }

    pub fn recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::SeqCst)
    }

    pub fn historical_calls(&self) -> usize {
        self.historical_calls.load(Ordering::SeqCst)
    }

    pub fn events_calls(&self) -> usize {
        self.events_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn load_historical(&self) -> Result<Vec<PricePoint>, DataSourceError> {
        self.historical_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.historical.clone())
    }

    async fn load_recent(&self) -> Result<Vec<PricePoint>, DataSourceError> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recent.load(Ordering::SeqCst) {
            return Err(DataSourceError::NetworkError(
                "mock source unreachable".to_string(),
            ));
        }
        Ok(self.recent.clone())
    }

    async fn load_events(&self) -> Result<Vec<Event>, DataSourceError> {
        self.events_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.events.clone())
    }
}
