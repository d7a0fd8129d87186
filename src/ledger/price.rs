//! Price Lookup Module
//!
//! Exact-or-prefix item search over the price sheet.

use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::source::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceEntry {
    pub item: String,
    /// Price cell as written in the sheet
    pub price: String,
}

/// Header names of the price sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceColumns {
    pub item: String,
    pub price: String,
}

impl Default for PriceColumns {
    fn default() -> Self {
        Self {
            item: "Товар".to_string(),
            price: "Цена".to_string(),
        }
    }
}

/// Outcome of a price query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceMatch {
    /// The query named an item exactly
    Exact(PriceEntry),
    /// Items whose name starts with the query, in sheet order
    Prefix(Vec<PriceEntry>),
}

impl PriceMatch {
    pub fn is_exact(&self) -> bool {
        matches!(self, PriceMatch::Exact(_))
    }

    pub fn entries(&self) -> Vec<PriceEntry> {
        match self {
            PriceMatch::Exact(entry) => vec![entry.clone()],
            PriceMatch::Prefix(entries) => entries.clone(),
        }
    }
}

// == Price Reader ==
#[derive(Debug, Clone, Default)]
pub struct PriceReader {
    columns: PriceColumns,
}

impl PriceReader {
    pub fn new(columns: PriceColumns) -> Self {
        Self { columns }
    }

    /// Looks up `query` case-insensitively. An exact item match wins over
    /// prefix matches; the first exact match in sheet order is used.
    pub fn lookup(&self, table: &Table, query: &str) -> Result<PriceMatch> {
        let wanted = query.trim().to_lowercase();
        if wanted.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "price query must not be empty".to_string(),
            ));
        }

        let item_column = table.require_column(&self.columns.item)?;
        let price_column = table.require_column(&self.columns.price)?;

        let mut prefixed = Vec::new();
        for row in table.rows() {
            let item = row.cells[item_column].trim();
            let normalized = item.to_lowercase();
            let entry = || PriceEntry {
                item: item.to_string(),
                price: row.cells[price_column].trim().to_string(),
            };

            if normalized == wanted {
                return Ok(PriceMatch::Exact(entry()));
            }
            if normalized.starts_with(&wanted) {
                prefixed.push(entry());
            }
        }

        if prefixed.is_empty() {
            Err(LedgerError::PriceNotFound(query.trim().to_string()))
        } else {
            Ok(PriceMatch::Prefix(prefixed))
        }
    }
}
