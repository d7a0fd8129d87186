//! Transfer Intent
//!
//! What a `/pay` command asks the ledger to record.

use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::ledger::{normalize_username, Amount};

// == Transfer Intent ==
/// A single transfer request. Its only durable form is the form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferIntent {
    /// Normalized username of the payer
    pub from_username: String,
    /// Recipient as it should appear in the ledger (username or display name)
    pub to_username_or_name: String,
    pub amount: Amount,
}

impl TransferIntent {
    /// Builds an intent, rejecting empty parties, self-transfers and
    /// non-positive amounts.
    pub fn new(from: &str, to: &str, amount: Amount) -> Result<Self> {
        let from_username = normalize_username(from);
        let to_username_or_name = to.trim().trim_start_matches('@').trim().to_string();

        if from_username.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "payer username must not be empty".to_string(),
            ));
        }
        if to_username_or_name.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "recipient must not be empty".to_string(),
            ));
        }
        if !amount.is_positive() {
            return Err(LedgerError::InvalidRequest(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        if normalize_username(&to_username_or_name) == from_username {
            return Err(LedgerError::InvalidRequest(
                "cannot transfer to yourself".to_string(),
            ));
        }

        Ok(Self {
            from_username,
            to_username_or_name,
            amount,
        })
    }
}
