pub mod api;
pub mod cache;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use datasource::{DataSource, DataSourceError, LiveDataSource, MockDataSource};
pub use db::{init_db, Repository};
pub use domain::{DateUnix, Event, LeaderboardEntry, MergedPoint, MergedSeries, Obstacle, PricePoint};
pub use error::AppError;
pub use orchestration::{Pipeline, PipelineError, PipelineSettings};
