//! Error types for the ledger bot
//!
//! Provides unified error handling using thiserror. Every variant renders a
//! message that can be shown to the chat user as-is.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Ledger Error Enum ==
/// Unified error type for the ledger bot.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The source sheet could not be reached or its export could not be parsed
    #[error("Could not read sheet {table_id}: {reason}")]
    Fetch { table_id: String, reason: String },

    /// No row carries the requested username
    #[error("User @{0} was not found in the ledger")]
    AccountNotFound(String),

    /// A data row whose length differs from the header row
    #[error("Malformed row at line {line}: expected {expected} columns, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// The transfer form rejected the submission or was unreachable
    #[error("Transfer was not recorded: {0}")]
    WriteFailure(String),

    /// A configured column is absent from the sheet header
    #[error("Column '{0}' is missing from the sheet")]
    MissingColumn(String),

    /// The balance cell of a matched row is not a number
    #[error("Balance '{value}' of @{username} is not a valid amount")]
    InvalidBalance { username: String, value: String },

    /// Price lookup miss
    #[error("No price found for '{0}'")]
    PriceNotFound(String),

    /// Invalid command arguments
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Feature disabled because its configuration is absent
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Missing or invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Builds a `Fetch` error from anything displayable.
    pub fn fetch(table_id: &str, reason: impl std::fmt::Display) -> Self {
        LedgerError::Fetch {
            table_id: table_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status used when the error reaches the command API.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::AccountNotFound(_) | LedgerError::PriceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            LedgerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LedgerError::Fetch { .. } | LedgerError::WriteFailure(_) => StatusCode::BAD_GATEWAY,
            LedgerError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::MalformedRow { .. }
            | LedgerError::MissingColumn(_)
            | LedgerError::InvalidBalance { .. }
            | LedgerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for LedgerError {
    fn from(rejection: JsonRejection) -> Self {
        LedgerError::InvalidRequest(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the ledger bot.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (
                LedgerError::AccountNotFound("bobby".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                LedgerError::PriceNotFound("tea".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                LedgerError::InvalidRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::fetch("0", "timeout"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                LedgerError::WriteFailure("500".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                LedgerError::NotConfigured("Price lookup"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                LedgerError::MissingColumn("Username".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_messages_are_distinct() {
        let not_found = LedgerError::AccountNotFound("bobby".to_string()).to_string();
        let write = LedgerError::WriteFailure("form returned 500".to_string()).to_string();
        let fetch = LedgerError::fetch("123", "connection refused").to_string();

        assert_eq!(not_found, "User @bobby was not found in the ledger");
        assert!(write.starts_with("Transfer was not recorded"));
        assert!(fetch.contains("123"));
        assert!(fetch.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = LedgerError::AccountNotFound("bobby".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "User @bobby was not found in the ledger");
    }
}
