//! Configuration Module
//!
//! Handles loading and managing bot configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_SECS;
use crate::error::{LedgerError, Result};
use crate::form::FormFields;
use crate::ledger::{AccountColumns, PriceColumns};
use crate::reconcile::PollSchedule;
use crate::source::DEFAULT_EXPORT_BASE;

/// Transfer form settings. Present only when `FORM_URL` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    pub url: String,
    pub fields: FormFields,
}

/// Bot configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Spreadsheet document identifier
    pub sheet_id: String,
    /// Sheet id of the accounts table
    pub accounts_gid: String,
    /// Sheet id of the price table, enables price lookups
    pub prices_gid: Option<String>,
    /// Export host prefix
    pub export_base_url: String,
    /// Cache TTL in seconds
    pub cache_ttl: u64,
    /// Timeout in seconds for sheet and form requests
    pub http_timeout: u64,
    /// Transfer form, enables `/pay`
    pub form: Option<FormConfig>,
    /// Reconciliation polls after a transfer
    pub reconcile_max_attempts: u32,
    /// Wait before the second poll, in milliseconds
    pub reconcile_interval_ms: u64,
    /// Multiplier applied to the wait after each poll
    pub reconcile_backoff: f64,
    /// Upper bound for a single wait, in milliseconds
    pub reconcile_max_interval_ms: u64,
    pub account_columns: AccountColumns,
    pub price_columns: PriceColumns,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SHEET_ID`, `GID_ACCOUNTS` - required
    /// - `GID_PRICES` - optional price sheet
    /// - `EXPORT_BASE_URL` - export host (default: Google Sheets)
    /// - `CACHE_TTL` - cache TTL in seconds (default: 60)
    /// - `HTTP_TIMEOUT` - request timeout in seconds (default: 10)
    /// - `FORM_URL` with `FORM_FIELD_PAYER`, `FORM_FIELD_PAYEE`, `FORM_FIELD_AMOUNT`
    /// - `RECONCILE_MAX_ATTEMPTS` (5), `RECONCILE_INTERVAL_MS` (1500),
    ///   `RECONCILE_BACKOFF` (1.0), `RECONCILE_MAX_INTERVAL_MS` (10000)
    /// - `COL_USERNAME`, `COL_NAME`, `COL_BALANCE`, `COL_PRICE_ITEM`, `COL_PRICE`
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with values taken from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| LedgerError::Config(format!("{} is not set", key)))
        };
        let defaults = Config::default();

        let form = match get("FORM_URL") {
            Some(url) => Some(FormConfig {
                url,
                fields: FormFields {
                    payer: required("FORM_FIELD_PAYER")?,
                    payee: required("FORM_FIELD_PAYEE")?,
                    amount: required("FORM_FIELD_AMOUNT")?,
                },
            }),
            None => None,
        };

        Ok(Self {
            sheet_id: required("SHEET_ID")?,
            accounts_gid: required("GID_ACCOUNTS")?,
            prices_gid: get("GID_PRICES"),
            export_base_url: get("EXPORT_BASE_URL").unwrap_or(defaults.export_base_url),
            cache_ttl: parse_or(&get, "CACHE_TTL", defaults.cache_ttl)?,
            http_timeout: parse_or(&get, "HTTP_TIMEOUT", defaults.http_timeout)?,
            form,
            reconcile_max_attempts: parse_or(
                &get,
                "RECONCILE_MAX_ATTEMPTS",
                defaults.reconcile_max_attempts,
            )?,
            reconcile_interval_ms: parse_or(
                &get,
                "RECONCILE_INTERVAL_MS",
                defaults.reconcile_interval_ms,
            )?,
            reconcile_backoff: parse_or(&get, "RECONCILE_BACKOFF", defaults.reconcile_backoff)?,
            reconcile_max_interval_ms: parse_or(
                &get,
                "RECONCILE_MAX_INTERVAL_MS",
                defaults.reconcile_max_interval_ms,
            )?,
            account_columns: AccountColumns {
                username: get("COL_USERNAME").unwrap_or(defaults.account_columns.username),
                display_name: get("COL_NAME").unwrap_or(defaults.account_columns.display_name),
                balance: get("COL_BALANCE").unwrap_or(defaults.account_columns.balance),
            },
            price_columns: PriceColumns {
                item: get("COL_PRICE_ITEM").unwrap_or(defaults.price_columns.item),
                price: get("COL_PRICE").unwrap_or(defaults.price_columns.price),
            },
            server_port: parse_or(&get, "SERVER_PORT", defaults.server_port)?,
        })
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }

    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule::new(
            self.reconcile_max_attempts,
            Duration::from_millis(self.reconcile_interval_ms),
            self.reconcile_backoff,
            Duration::from_millis(self.reconcile_max_interval_ms),
        )
    }
}

/// Parses an optional value, reporting unparsable input instead of silently
/// using the default.
fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| LedgerError::Config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            accounts_gid: String::new(),
            prices_gid: None,
            export_base_url: DEFAULT_EXPORT_BASE.to_string(),
            cache_ttl: DEFAULT_TTL_SECS,
            http_timeout: 10,
            form: None,
            reconcile_max_attempts: 5,
            reconcile_interval_ms: 1500,
            reconcile_backoff: 1.0,
            reconcile_max_interval_ms: 10_000,
            account_columns: AccountColumns::default(),
            price_columns: PriceColumns::default(),
            server_port: 3000,
        }
    }
}
