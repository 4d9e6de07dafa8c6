//! Data source abstraction for the price archive, the recent-window API and
//! the events archive.

use crate::domain::{Event, PricePoint};
use async_trait::async_trait;
use std::fmt;

pub mod archive;
pub mod coingecko;
pub mod live;
pub mod mock;

pub use coingecko::CoinGeckoClient;
pub use live::LiveDataSource;
pub use mock::MockDataSource;

/// Data source trait for the three raw inputs of the pipeline.
///
/// Implementations return normalized, day-granular records and must bound
/// network calls with a timeout.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Load the static historical archive.
    ///
    /// # Returns
    /// Price points sorted ascending by date.
    async fn load_historical(&self) -> Result<Vec<PricePoint>, DataSourceError>;

    /// Fetch the trailing 365-day window from the live source.
    ///
    /// # Returns
    /// Price points in source order, each truncated to its UTC day. Several
    /// points may share a day; the merger keeps the last one.
    async fn load_recent(&self) -> Result<Vec<PricePoint>, DataSourceError>;

    /// Load the dated events archive.
    ///
    /// # Returns
    /// Events sorted ascending by date.
    async fn load_events(&self) -> Result<Vec<Event>, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 5xx server error, 404)
    HttpError { status: u16, message: String },
    /// Parsing error (malformed CSV row or JSON body)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// Local file could not be read
    Io(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
