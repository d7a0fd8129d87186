//! Cache Module
//!
//! Provides the in-memory read-through cache of sheet snapshots with TTL
//! expiry and forced invalidation.

mod clock;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::TableCache;

// == Public Constants ==
/// Default TTL in seconds for cached sheets
pub const DEFAULT_TTL_SECS: u64 = 60;
