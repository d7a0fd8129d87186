//! Form Module
//!
//! The write side of the ledger: transfers are appended by submitting an
//! external form, never written locally.

mod intent;
mod submitter;

pub use intent::TransferIntent;
pub use submitter::{FormFields, FormSubmitter, HttpFormSubmitter};
