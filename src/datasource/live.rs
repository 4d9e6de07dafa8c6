//! Production data source: CSV archives on disk plus the CoinGecko API.

use super::archive::{parse_events, parse_historical, read_file};
use super::{CoinGeckoClient, DataSource, DataSourceError};
use crate::domain::{Event, PricePoint};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LiveDataSource {
    historical_path: PathBuf,
    events_path: PathBuf,
    coingecko: CoinGeckoClient,
}

impl LiveDataSource {
    pub fn new(
        historical_path: impl Into<PathBuf>,
        events_path: impl Into<PathBuf>,
        coingecko: CoinGeckoClient,
    ) -> Self {
        Self {
            historical_path: historical_path.into(),
            events_path: events_path.into(),
            coingecko,
        }
    }
}

#[async_trait]
impl DataSource for LiveDataSource {
    async fn load_historical(&self) -> Result<Vec<PricePoint>, DataSourceError> {
        debug!(path = %self.historical_path.display(), "Loading historical archive");
        let bytes = read_file(&self.historical_path).await?;
        parse_historical(&bytes)
    }

    async fn load_recent(&self) -> Result<Vec<PricePoint>, DataSourceError> {
        self.coingecko.fetch_recent().await
    }

    async fn load_events(&self) -> Result<Vec<Event>, DataSourceError> {
        debug!(path = %self.events_path.display(), "Loading events archive");
        let bytes = read_file(&self.events_path).await?;
        parse_events(&bytes)
    }
}
