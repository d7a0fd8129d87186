//! Sheet Export Source
//!
//! Reads a sheet through the spreadsheet's public CSV export URL.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{parse_delimited, TabularSource, Table};
use crate::error::{LedgerError, Result};

/// Default export host for Google Sheets documents.
pub const DEFAULT_EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d";

// == Sheet Export Source ==
/// [`TabularSource`] backed by `GET {base}/{document}/export?format=csv&gid={sheet}`.
#[derive(Debug, Clone)]
pub struct SheetExportSource {
    client: reqwest::Client,
    base_url: String,
    document_id: String,
}

impl SheetExportSource {
    /// Creates a source for one spreadsheet document.
    ///
    /// # Arguments
    /// * `base_url` - Export host prefix, e.g. [`DEFAULT_EXPORT_BASE`]
    /// * `document_id` - Spreadsheet document identifier
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, document_id: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Config(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            document_id: document_id.to_string(),
        })
    }

    /// Export URL for one sheet of the document.
    pub fn export_url(&self, sheet_id: &str) -> String {
        format!(
            "{}/{}/export?format=csv&gid={}",
            self.base_url, self.document_id, sheet_id
        )
    }
}

#[async_trait]
impl TabularSource for SheetExportSource {
    async fn fetch_rows(&self, table_id: &str) -> Result<Table> {
        let url = self.export_url(table_id);
        debug!(table_id, %url, "Requesting sheet export");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::fetch(table_id, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::fetch(
                table_id,
                format!("export returned status {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::fetch(table_id, format!("unreadable body: {}", e)))?;

        parse_delimited(table_id, &body)
    }
}
