//! Request DTOs for the command API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::ledger::Amount;

/// Request body for a transfer (POST /pay)
///
/// `amount` accepts either a JSON number or a string such as `"12,50"`.
/// Parties and amount are checked when the transfer intent is built.
#[derive(Debug, Clone, Deserialize)]
pub struct PayRequest {
    /// Username of the payer, with or without a leading `@`
    pub from: String,
    /// Recipient username or display name
    pub to: String,
    pub amount: Amount,
}
