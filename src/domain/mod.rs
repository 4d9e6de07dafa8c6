//! Domain types for the price terrain service.
//!
//! This module provides:
//! - Day-precision timestamps (`DateUnix`) and archive date parsing
//! - Price, merged-series, obstacle and event types
//! - Leaderboard entries and submission validation

pub mod event;
pub mod leaderboard;
pub mod obstacle;
pub mod price;
pub mod primitives;

pub use event::Event;
pub use leaderboard::{LeaderboardEntry, NewScore, SortField, SortOrder, ValidationError};
pub use obstacle::Obstacle;
pub use price::{MergedPoint, MergedSeries, PricePoint};
pub use primitives::{day_from_millis, parse_day, DateUnix};
