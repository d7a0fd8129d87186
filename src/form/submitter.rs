//! Form Submitter
//!
//! Records transfers by posting them to the form that appends rows to the
//! ledger sheet.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use tracing::{info, warn};

use super::TransferIntent;
use crate::error::{LedgerError, Result};

// == Form Submitter ==
/// Single-attempt write of a transfer. Retrying is left to the caller.
#[async_trait]
pub trait FormSubmitter: Send + Sync {
    /// Submits `intent`; any rejection or transport error is `WriteFailure`.
    async fn submit(&self, intent: &TransferIntent) -> Result<()>;
}

/// Field identifiers of the transfer form (`entry.NNNN` for Google Forms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub payer: String,
    pub payee: String,
    pub amount: String,
}

// == HTTP Form Submitter ==
#[derive(Debug, Clone)]
pub struct HttpFormSubmitter {
    client: reqwest::Client,
    url: String,
    fields: FormFields,
}

impl HttpFormSubmitter {
    /// Creates a submitter posting to `url`.
    ///
    /// Redirects are not followed: form endpoints answer a successful post
    /// with a redirect to a confirmation page, and that answer is the success
    /// signal.
    pub fn new(url: &str, fields: FormFields, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| LedgerError::Config(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            fields,
        })
    }

    /// Form body for `intent`, in field order payer, payee, amount.
    pub fn form_params(&self, intent: &TransferIntent) -> Vec<(String, String)> {
        vec![
            (self.fields.payer.clone(), intent.from_username.clone()),
            (self.fields.payee.clone(), intent.to_username_or_name.clone()),
            (self.fields.amount.clone(), intent.amount.to_string()),
        ]
    }
}

#[async_trait]
impl FormSubmitter for HttpFormSubmitter {
    async fn submit(&self, intent: &TransferIntent) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .form(&self.form_params(intent))
            .send()
            .await
            .map_err(|e| LedgerError::WriteFailure(format!("form endpoint unreachable: {}", e)))?;

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            info!(
                from = %intent.from_username,
                to = %intent.to_username_or_name,
                amount = %intent.amount,
                %status,
                "Transfer submitted"
            );
            Ok(())
        } else {
            warn!(%status, "Form endpoint rejected transfer");
            Err(LedgerError::WriteFailure(format!(
                "form endpoint responded with {}",
                status
            )))
        }
    }
}
