use crate::orchestration::PipelineSettings;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: IpAddr,
    pub database_path: String,
    pub historical_csv_path: PathBuf,
    pub events_csv_path: PathBuf,
    pub coingecko_api_url: String,
    pub fetch_timeout: Duration,
    pub cache_ttl_secs: u64,
    pub stale_retry_secs: u64,
    pub ma_window: usize,
    pub drawdown_threshold: f64,
    pub num_enemies: usize,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
    expected: &str,
) -> Result<T, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.as_str())
        .unwrap_or(default)
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), format!("must be {}", expected)))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or::<u16>(&env_map, "PORT", "8080", "a valid u16")?;
        let bind_addr = parse_or::<IpAddr>(&env_map, "BIND_ADDR", "127.0.0.1", "an IP address")?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let historical_csv_path = env_map
            .get("HISTORICAL_CSV_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("bitcoin_historical.csv"));

        let events_csv_path = env_map
            .get("EVENTS_CSV_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("bitcoin_events.csv"));

        let coingecko_api_url = env_map
            .get("COINGECKO_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.coingecko.com/api/v3".to_string());

        let fetch_timeout_secs =
            parse_or::<u64>(&env_map, "FETCH_TIMEOUT_SECS", "10", "a positive integer")?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "FETCH_TIMEOUT_SECS".to_string(),
                "must be a positive integer".to_string(),
            ));
        }

        let cache_ttl_secs =
            parse_or::<u64>(&env_map, "CACHE_TTL_SECS", "3600", "a non-negative integer")?;
        // chrono durations are bounded; a century is more than enough.
        if cache_ttl_secs > 100 * 365 * 86_400 {
            return Err(ConfigError::InvalidValue(
                "CACHE_TTL_SECS".to_string(),
                "is unreasonably large".to_string(),
            ));
        }

        let stale_retry_secs =
            parse_or::<u64>(&env_map, "STALE_RETRY_SECS", "60", "a non-negative integer")?;
        if stale_retry_secs > 100 * 365 * 86_400 {
            return Err(ConfigError::InvalidValue(
                "STALE_RETRY_SECS".to_string(),
                "is unreasonably large".to_string(),
            ));
        }

        let ma_window = parse_or::<usize>(&env_map, "MA_WINDOW", "7", "a positive integer")?;
        if ma_window == 0 {
            return Err(ConfigError::InvalidValue(
                "MA_WINDOW".to_string(),
                "must be a positive integer".to_string(),
            ));
        }

        let drawdown_threshold =
            parse_or::<f64>(&env_map, "DRAWDOWN_THRESHOLD", "0.1", "a number in (0, 1]")?;
        if !(drawdown_threshold > 0.0 && drawdown_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue(
                "DRAWDOWN_THRESHOLD".to_string(),
                format!("must be a number in (0, 1], got {}", drawdown_threshold),
            ));
        }

        let num_enemies = parse_or::<usize>(&env_map, "NUM_ENEMIES", "60", "a non-negative integer")?;

        let static_dir = env_map
            .get("STATIC_DIR")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Config {
            port,
            bind_addr,
            database_path,
            historical_csv_path,
            events_csv_path,
            coingecko_api_url,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            cache_ttl_secs,
            stale_retry_secs,
            ma_window,
            drawdown_threshold,
            num_enemies,
            static_dir,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            ma_window: self.ma_window,
            drawdown_threshold: self.drawdown_threshold,
            cache_ttl: chrono::Duration::seconds(self.cache_ttl_secs as i64),
            retry_after: chrono::Duration::seconds(self.stale_retry_secs as i64),
        }
    }
}
