//! Ledger Module
//!
//! Domain view over the sheets: accounts, amounts and prices.

mod account;
mod amount;
mod price;
mod reader;

pub use account::{normalize_username, Account, AccountColumns};
pub use amount::{Amount, ParseAmountError};
pub use price::{PriceColumns, PriceEntry, PriceMatch, PriceReader};
pub use reader::LedgerReader;
