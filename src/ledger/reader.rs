//! Ledger Reader Module
//!
//! Username lookups against a snapshot of the accounts sheet.

use tracing::warn;

use super::{normalize_username, Account, AccountColumns};
use crate::error::{LedgerError, Result};
use crate::source::{Row, Table};

// == Ledger Reader ==
#[derive(Debug, Clone, Default)]
pub struct LedgerReader {
    columns: AccountColumns,
}

impl LedgerReader {
    pub fn new(columns: AccountColumns) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &AccountColumns {
        &self.columns
    }

    // == Find By Username ==
    /// Finds the account whose username matches `username`.
    ///
    /// Both sides are compared in normalized form, so `Alice123`, `alice123`
    /// and `@alice123` all find a row stored as `alice123` (or `@Alice123`).
    /// When several rows carry the same username the first one in sheet order
    /// wins.
    ///
    /// # Errors
    /// - `AccountNotFound` with the normalized username on a miss
    /// - `MissingColumn` when the username or balance column is absent
    /// - `InvalidBalance` when the matched row's balance is not a number
    pub fn find_by_username(&self, table: &Table, username: &str) -> Result<Account> {
        let wanted = normalize_username(username);
        if wanted.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "username must not be empty".to_string(),
            ));
        }

        let column = table.require_column(&self.columns.username)?;
        let mut matches = table
            .rows()
            .iter()
            .filter(|row| normalize_username(&row.cells[column]) == wanted);

        let first = matches
            .next()
            .ok_or_else(|| LedgerError::AccountNotFound(wanted.clone()))?;

        let duplicates: Vec<u64> = matches.map(|row| row.line).collect();
        if !duplicates.is_empty() {
            warn!(
                username = %wanted,
                used_line = first.line,
                ignored_lines = ?duplicates,
                "Duplicate username in sheet, using the first row"
            );
        }

        self.account_from_row(table, first)
    }

    // == Find Recipient ==
    /// Resolves a transfer recipient by username, then by display name.
    ///
    /// The display-name fallback compares trimmed, lowercased text and also
    /// takes the first match in sheet order.
    pub fn find_recipient(&self, table: &Table, query: &str) -> Result<Account> {
        match self.find_by_username(table, query) {
            Err(LedgerError::AccountNotFound(username)) => {
                let wanted = query.trim().to_lowercase();
                let by_name = table
                    .column_index(&self.columns.display_name)
                    .and_then(|column| {
                        table
                            .rows()
                            .iter()
                            .find(|row| row.cells[column].trim().to_lowercase() == wanted)
                    });
                match by_name {
                    Some(row) => self.account_from_row(table, row),
                    None => Err(LedgerError::AccountNotFound(username)),
                }
            }
            other => other,
        }
    }

    fn account_from_row(&self, table: &Table, row: &Row) -> Result<Account> {
        let username_column = table.require_column(&self.columns.username)?;
        let balance_column = table.require_column(&self.columns.balance)?;
        let username = normalize_username(&row.cells[username_column]);

        let raw_balance = &row.cells[balance_column];
        let balance = raw_balance
            .parse()
            .map_err(|_| LedgerError::InvalidBalance {
                username: username.clone(),
                value: raw_balance.clone(),
            })?;

        let display_name = table
            .column_index(&self.columns.display_name)
            .map(|column| row.cells[column].trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| username.clone());

        Ok(Account {
            display_name,
            username,
            balance,
        })
    }
}
