//! Database module for the durable leaderboard.
//!
//! This module provides:
//! - SQLite initialization, pragmas and schema migration
//! - Repository for creating and paging leaderboard entries

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{LeaderboardPage, Repository};
