//! CoinGecko market-chart client for the trailing 365-day price window.

use super::DataSourceError;
use crate::domain::{day_from_millis, PricePoint};
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Length of the recent window, in days.
pub const RECENT_WINDOW_DAYS: u32 = 365;

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    max_elapsed: Duration,
}

impl CoinGeckoClient {
    /// Create a client with a per-request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_elapsed: Duration::from_secs(30),
        })
    }

    /// Bound the total time spent retrying transient failures.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    pub fn market_chart_url(&self) -> String {
        format!(
            "{}/coins/bitcoin/market_chart?vs_currency=usd&days={}",
            self.base_url, RECENT_WINDOW_DAYS
        )
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, DataSourceError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self.client.get(url).send().await.map_err(|e| {
                backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
            })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }

    /// Fetch the trailing window and normalize it to day-granular points.
    pub async fn fetch_recent(&self) -> Result<Vec<PricePoint>, DataSourceError> {
        let url = self.market_chart_url();
        debug!(url = %url, "Fetching recent prices");
        let body = self.get_json(&url).await?;
        let points = parse_market_chart(&body)?;
        debug!(count = points.len(), "Fetched recent prices");
        Ok(points)
    }
}

/// Parse `{"prices": [[ms, price], ...]}`.
///
/// Pairs with a non-numeric field or a non-positive price are skipped with a
/// warning; a missing `prices` array is an error.
pub fn parse_market_chart(body: &serde_json::Value) -> Result<Vec<PricePoint>, DataSourceError> {
    let prices = body
        .get("prices")
        .and_then(|v| v.as_array())
        .ok_or_else(|| DataSourceError::ParseError("Missing prices array".to_string()))?;

    let mut points = Vec::with_capacity(prices.len());
    for pair in prices {
        match parse_pair(pair) {
            Some(point) => points.push(point),
            None => warn!(pair = %pair, "Skipping malformed price pair"),
        }
    }
    Ok(points)
}

fn parse_pair(pair: &serde_json::Value) -> Option<PricePoint> {
    let pair = pair.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    // Timestamps can arrive as floats.
    let ms = pair[0].as_i64().or_else(|| pair[0].as_f64().map(|f| f as i64))?;
    let price = pair[1].as_f64().filter(|p| p.is_finite() && *p > 0.0)?;
    Some(PricePoint::new(day_from_millis(ms)?, price))
}
