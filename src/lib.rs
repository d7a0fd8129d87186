//! Ledger Bot - chat commands over a spreadsheet ledger
//!
//! Reads balances and prices from exported spreadsheet tables through a TTL
//! cache, records transfers through a web form and polls the sheet until the
//! transfer shows up.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod form;
pub mod ledger;
pub mod models;
pub mod reconcile;
pub mod service;
pub mod source;

pub use api::AppState;
pub use config::Config;
pub use error::{LedgerError, Result};
pub use service::LedgerService;
