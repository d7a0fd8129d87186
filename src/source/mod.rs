//! Source Module
//!
//! Access to the spreadsheet that holds the ledger. The rest of the crate only
//! sees the [`TabularSource`] trait, so the live sheet export and the
//! in-memory source are interchangeable.

mod memory;
mod sheet_export;
mod table;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemorySource;
pub use sheet_export::{SheetExportSource, DEFAULT_EXPORT_BASE};
pub use table::{parse_delimited, Row, Table};

// == Tabular Source ==
/// Fetches one sheet as a parsed [`Table`].
///
/// Implementations perform I/O only; caching and retries live in the callers.
#[async_trait]
pub trait TabularSource: Send + Sync {
    /// Fetches the sheet identified by `table_id`.
    ///
    /// Network and format problems are reported as `LedgerError::Fetch`.
    async fn fetch_rows(&self, table_id: &str) -> Result<Table>;
}
