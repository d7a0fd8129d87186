//! Table Cache Module
//!
//! Read-through cache in front of a [`TabularSource`] with TTL expiry,
//! explicit invalidation, single-flight fetching and stale-on-error fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, Clock};
use crate::error::Result;
use crate::source::{TabularSource, Table};

// == Slot ==
/// Per-table state.
///
/// `entry` is held across the fetch, so concurrent readers of the same table
/// queue behind a single fetch. `epoch` lives outside that lock so an
/// invalidation never has to wait for the fetch in flight.
#[derive(Debug, Default)]
struct Slot {
    epoch: AtomicU64,
    entry: tokio::sync::Mutex<Option<CacheEntry>>,
}

// == Table Cache ==
pub struct TableCache {
    source: Arc<dyn TabularSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    slots: Mutex<HashMap<String, Arc<Slot>>>,
    stats: Mutex<CacheStats>,
}

impl TableCache {
    // == Constructor ==
    /// Creates a cache over `source`.
    ///
    /// # Arguments
    /// * `source` - Where tables are fetched from on a miss
    /// * `clock` - Time source for TTL decisions
    /// * `ttl` - Maximum age of a snapshot that may be served without refetching
    pub fn new(source: Arc<dyn TabularSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            slots: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn slot(&self, table_id: &str) -> Arc<Slot> {
        self.slots
            .lock()
            .entry(table_id.to_string())
            .or_default()
            .clone()
    }

    // == Get ==
    /// Returns the table, fetching it when the cached copy is absent, older
    /// than the TTL or invalidated.
    pub async fn get(&self, table_id: &str) -> Result<Arc<Table>> {
        self.get_entry(table_id).await.map(|entry| entry.table)
    }

    // == Get Entry ==
    /// Like [`TableCache::get`] but also returns the fetch metadata.
    ///
    /// When the fetch fails and an earlier snapshot exists, that snapshot is
    /// returned and the failure is only logged. The error is returned when
    /// there is nothing to fall back on.
    pub async fn get_entry(&self, table_id: &str) -> Result<CacheEntry> {
        let slot = self.slot(table_id);
        let mut guard = slot.entry.lock().await;

        // Read after acquiring the lock: an invalidation issued while we queued
        // behind another fetch must apply to the entry that fetch stored.
        let epoch = slot.epoch.load(Ordering::Acquire);

        if let Some(entry) = guard.as_ref() {
            if entry.is_fresh(self.clock.now(), self.ttl, epoch) {
                self.stats.lock().record_hit();
                debug!(table_id, "Cache hit");
                return Ok(entry.clone());
            }
        }

        self.stats.lock().record_miss();
        debug!(table_id, epoch, "Cache miss, fetching");

        match self.source.fetch_rows(table_id).await {
            Ok(table) => {
                let entry = CacheEntry::new(table_id, Arc::new(table), self.clock.now(), epoch);
                let is_new = guard.is_none();
                *guard = Some(entry.clone());

                let mut stats = self.stats.lock();
                stats.record_fetch();
                if is_new {
                    let total = stats.total_entries + 1;
                    stats.set_total_entries(total);
                }
                Ok(entry)
            }
            Err(err) => {
                self.stats.lock().record_fetch_error();
                match guard.as_ref() {
                    Some(previous) => {
                        warn!(
                            table_id,
                            error = %err,
                            age_secs = previous.age(self.clock.now()).as_secs(),
                            "Fetch failed, serving previous snapshot"
                        );
                        self.stats.lock().record_stale_served();
                        Ok(previous.clone())
                    }
                    None => Err(err),
                }
            }
        }
    }

    // == Invalidate ==
    /// Forces the next `get` for `table_id` to fetch, regardless of age.
    ///
    /// Does not wait for a fetch in flight; the snapshot that fetch stores is
    /// already considered stale.
    pub fn invalidate(&self, table_id: &str) {
        let slot = self.slot(table_id);
        let epoch = slot.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        self.stats.lock().record_invalidation();
        debug!(table_id, epoch, "Cache invalidated");
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}

impl std::fmt::Debug for TableCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableCache")
            .field("ttl", &self.ttl)
            .field("tables", &self.slots.lock().len())
            .finish()
    }
}
