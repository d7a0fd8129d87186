//! Account Module
//!
//! The per-user view derived from a row of the accounts sheet.

use serde::Serialize;

use super::Amount;

// == Account ==
/// One user's ledger line. Recomputed from the sheet on every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Name shown to users; falls back to the username when the cell is blank
    pub display_name: String,
    /// Normalized username (see [`normalize_username`])
    pub username: String,
    pub balance: Amount,
}

// == Account Columns ==
/// Header names of the accounts sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountColumns {
    pub username: String,
    pub display_name: String,
    pub balance: String,
}

impl Default for AccountColumns {
    fn default() -> Self {
        Self {
            username: "Username".to_string(),
            display_name: "Имя".to_string(),
            balance: "Баланс".to_string(),
        }
    }
}

/// Canonical form used to compare usernames: trimmed, one leading `@`
/// removed, lowercased.
pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}
