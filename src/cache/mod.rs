//! Caching primitives: a TTL memo store and the daily refresh gate.

pub mod memo;
pub mod policy;
pub mod store;

pub use memo::Memo;
pub use policy::RefreshPolicy;
pub use store::{Lookup, TtlCache};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache lock poisoned")]
    Poisoned,
}
