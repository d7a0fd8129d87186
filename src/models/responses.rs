//! Response DTOs for the command API
//!
//! Defines the structure of outgoing HTTP response bodies. Each body carries
//! a ready-to-send `message` for the chat adapter.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::ledger::{Amount, PriceEntry, PriceMatch};
use crate::reconcile::Reconciled;
use crate::service::Balance;

/// Response body for GET /balance/:username
#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub username: String,
    pub display_name: String,
    pub balance: Amount,
    /// When the sheet snapshot behind this answer was fetched
    pub as_of: DateTime<Utc>,
    pub message: String,
}

impl From<Balance> for BalanceResponse {
    fn from(balance: Balance) -> Self {
        let account = balance.account;
        Self {
            message: format!("{}, your balance is {}", account.display_name, account.balance),
            username: account.username,
            display_name: account.display_name,
            balance: account.balance,
            as_of: balance.as_of,
        }
    }
}

/// Response body for POST /pay
///
/// `status` is `confirmed` when the new balance was read back from the
/// sheet, `unconfirmed` when polling gave up first.
#[derive(Debug, Clone, Serialize)]
pub struct PayResponse {
    pub status: String,
    pub message: String,
    pub username: String,
    /// Last balance read for the payer
    pub balance: Amount,
    /// Number of sheet reads after the write
    pub attempts: u32,
}

impl From<Reconciled> for PayResponse {
    fn from(outcome: Reconciled) -> Self {
        let attempts = outcome.attempts();
        let (status, account) = match outcome {
            Reconciled::Confirmed { account, .. } => ("confirmed", account),
            Reconciled::Stale { account, .. } => ("unconfirmed", account),
        };
        let message = if status == "confirmed" {
            format!("Transfer recorded. Your balance is now {}", account.balance)
        } else {
            "Transfer submitted, but the ledger has not updated yet. Please check again shortly"
                .to_string()
        };
        Self {
            status: status.to_string(),
            message,
            username: account.username,
            balance: account.balance,
            attempts,
        }
    }
}

/// Response body for GET /price/:query
#[derive(Debug, Clone, Serialize)]
pub struct PriceResponse {
    pub query: String,
    /// True when `query` named a single item exactly
    pub exact: bool,
    pub matches: Vec<PriceEntry>,
    pub message: String,
}

impl PriceResponse {
    pub fn new(query: impl Into<String>, found: PriceMatch) -> Self {
        let matches = found.entries();
        let message = matches
            .iter()
            .map(|entry| format!("{}: {}", entry.item, entry.price))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            query: query.into(),
            exact: found.is_exact(),
            matches,
            message,
        }
    }
}

/// Response body for DELETE /cache/:table
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub message: String,
    pub table: String,
}

impl InvalidateResponse {
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            message: format!("Table '{}' will be re-read on next access", table),
            table,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub fetch_errors: u64,
    pub stale_served: u64,
    pub invalidations: u64,
    /// Tables currently cached
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            fetches: stats.fetches,
            fetch_errors: stats.fetch_errors,
            stale_served: stats.stale_served,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health check endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (always "healthy" if server is responding)
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Account;

    fn alice(balance: i64) -> Account {
        Account {
            display_name: "Alice".to_string(),
            username: "alice123".to_string(),
            balance: Amount::from_units(balance),
        }
    }

    #[test]
    fn test_balance_response_serialize() {
        let resp = BalanceResponse::from(Balance {
            account: alice(120),
            as_of: Utc::now(),
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["username"], "alice123");
        assert_eq!(json["balance"], "120");
        assert!(json["message"].as_str().unwrap().contains("120"));
    }

    #[test]
    fn test_pay_response_confirmed() {
        let resp = PayResponse::from(Reconciled::Confirmed {
            account: alice(100),
            attempts: 2,
        });
        assert_eq!(resp.status, "confirmed");
        assert_eq!(resp.attempts, 2);
        assert!(resp.message.contains("100"));
    }

    #[test]
    fn test_pay_response_unconfirmed() {
        let resp = PayResponse::from(Reconciled::Stale {
            account: alice(120),
            attempts: 3,
        });
        assert_eq!(resp.status, "unconfirmed");
        assert!(resp.message.contains("check again"));
    }

    #[test]
    fn test_price_response_lists_matches() {
        let found = PriceMatch::Prefix(vec![
            PriceEntry {
                item: "Tea black".to_string(),
                price: "50".to_string(),
            },
            PriceEntry {
                item: "Tea green".to_string(),
                price: "55".to_string(),
            },
        ]);
        let resp = PriceResponse::new("tea", found);
        assert!(!resp.exact);
        assert_eq!(resp.matches.len(), 2);
        assert_eq!(resp.message, "Tea black: 50\nTea green: 55");
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::new());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
