//! Snapshot cache for the data-access layer.
//!
//! - [`Cache`] trait: GET/SET with per-key TTL, exact-key delete and
//!   namespace purge
//! - [`CacheKey`]: the `"<entity>:<id>"` / `"<entity>:<field>:<value>"` grammar
//! - [`InMemoryCache`]: process-local implementation tracking the key set
//!   of every namespace so a purge is bounded and exact

pub mod error;
pub mod key;
pub mod memory;
pub mod store;

use std::time::Duration;

pub use error::{CacheError, Result};
pub use key::CacheKey;
pub use memory::InMemoryCache;
pub use store::Cache;

/// Lifetime of every cached snapshot.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(60 * 60);
