//! Cache Entry Module
//!
//! Defines the cached snapshot of one sheet together with its fetch metadata.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::source::Table;

// == Cache Entry ==
/// Last successfully fetched contents of one table.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Sheet identifier the table was fetched from
    pub table_id: String,
    /// The fetched table, shared with readers
    pub table: Arc<Table>,
    /// Monotonic fetch time, used for TTL decisions
    pub fetched_at: Instant,
    /// Wall-clock fetch time, reported to users
    pub fetched_wall: DateTime<Utc>,
    /// Invalidation epoch observed when the fetch started
    pub epoch: u64,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(table_id: &str, table: Arc<Table>, fetched_at: Instant, epoch: u64) -> Self {
        Self {
            table_id: table_id.to_string(),
            table,
            fetched_at,
            fetched_wall: Utc::now(),
            epoch,
        }
    }

    // == Age ==
    /// Time elapsed since the fetch, saturating at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    // == Is Fresh ==
    /// Checks whether the entry may be served without refetching.
    ///
    /// Boundary condition: an entry whose age equals the TTL is still fresh;
    /// it goes stale once `now - fetched_at > ttl`. Any invalidation issued
    /// after the fetch started makes it stale immediately.
    pub fn is_fresh(&self, now: Instant, ttl: Duration, current_epoch: u64) -> bool {
        self.epoch == current_epoch && self.age(now) <= ttl
    }
}
