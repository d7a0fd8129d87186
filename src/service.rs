//! Ledger Service
//!
//! The three bot commands (balance, pay, price) on top of the cache, the
//! readers, the form submitter and the reconciler.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::cache::{CacheStats, SystemClock, TableCache};
use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::form::{FormSubmitter, HttpFormSubmitter, TransferIntent};
use crate::ledger::{Account, Amount, LedgerReader, PriceMatch, PriceReader};
use crate::reconcile::{Delay, Expectation, PollSchedule, Reconciled, Reconciler, TokioDelay};
use crate::source::SheetExportSource;

/// Name under which the accounts sheet is addressed by the command API.
pub const ACCOUNTS_TABLE: &str = "accounts";
/// Name under which the price sheet is addressed by the command API.
pub const PRICES_TABLE: &str = "prices";

/// A balance together with the time its sheet snapshot was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub account: Account,
    pub as_of: DateTime<Utc>,
}

// == Ledger Service ==
pub struct LedgerService {
    cache: Arc<TableCache>,
    reader: LedgerReader,
    accounts_table: String,
    prices: Option<(String, PriceReader)>,
    submitter: Option<Arc<dyn FormSubmitter>>,
    reconciler: Reconciler,
}

impl LedgerService {
    // == Constructor ==
    /// Creates a service reading accounts from `accounts_table`.
    ///
    /// Price lookups and transfers stay disabled until configured with
    /// [`LedgerService::with_prices`] and [`LedgerService::with_submitter`].
    pub fn new(cache: Arc<TableCache>, reader: LedgerReader, accounts_table: &str) -> Self {
        let reconciler = Reconciler::new(
            cache.clone(),
            reader.clone(),
            accounts_table,
            Arc::new(TokioDelay),
            PollSchedule::default(),
        );
        Self {
            cache,
            reader,
            accounts_table: accounts_table.to_string(),
            prices: None,
            submitter: None,
            reconciler,
        }
    }

    /// Builds the live service: sheet export source, system clock, HTTP form.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = SheetExportSource::new(
            &config.export_base_url,
            &config.sheet_id,
            config.timeout(),
        )?;
        let cache = Arc::new(TableCache::new(
            Arc::new(source),
            Arc::new(SystemClock),
            config.ttl(),
        ));

        let mut service = Self::new(
            cache,
            LedgerReader::new(config.account_columns.clone()),
            &config.accounts_gid,
        )
        .with_reconcile(Arc::new(TokioDelay), config.poll_schedule());

        if let Some(prices_gid) = &config.prices_gid {
            service = service.with_prices(prices_gid, PriceReader::new(config.price_columns.clone()));
        }
        if let Some(form) = &config.form {
            let submitter = HttpFormSubmitter::new(&form.url, form.fields.clone(), config.timeout())?;
            service = service.with_submitter(Arc::new(submitter));
        }
        Ok(service)
    }

    pub fn with_prices(mut self, table_id: &str, reader: PriceReader) -> Self {
        self.prices = Some((table_id.to_string(), reader));
        self
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn FormSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Replaces the delay and poll schedule used after transfers.
    pub fn with_reconcile(mut self, delay: Arc<dyn Delay>, schedule: PollSchedule) -> Self {
        self.reconciler = Reconciler::new(
            self.cache.clone(),
            self.reader.clone(),
            &self.accounts_table,
            delay,
            schedule,
        );
        self
    }

    // == Balance ==
    /// Balance of the caller identified by `username`.
    pub async fn balance(&self, username: &str) -> Result<Balance> {
        let entry = self.cache.get_entry(&self.accounts_table).await?;
        let account = self.reader.find_by_username(&entry.table, username)?;
        Ok(Balance {
            account,
            as_of: entry.fetched_wall,
        })
    }

    // == Pay ==
    /// Transfers `amount` from `from` to `to` and waits for the ledger to
    /// reflect it.
    ///
    /// Both parties must exist in the accounts sheet before the form is
    /// submitted. The payer's balance is re-read from the sheet right before
    /// the write, and the transfer is confirmed only once the sheet shows
    /// exactly that balance minus `amount`.
    pub async fn pay(&self, from: &str, to: &str, amount: Amount) -> Result<Reconciled> {
        let draft = TransferIntent::new(from, to, amount)?;
        let submitter = self
            .submitter
            .as_ref()
            .ok_or(LedgerError::NotConfigured("Transfers"))?;

        self.cache.invalidate(&self.accounts_table);
        let table = self.cache.get(&self.accounts_table).await?;
        let payer = self.reader.find_by_username(&table, &draft.from_username)?;
        let payee = self
            .reader
            .find_recipient(&table, &draft.to_username_or_name)?;
        let recipient = if payee.username.is_empty() {
            &payee.display_name
        } else {
            &payee.username
        };
        let intent = TransferIntent::new(&payer.username, recipient, amount)?;
        let expected = payer.balance.checked_sub(amount).ok_or_else(|| {
            LedgerError::InvalidRequest(format!("amount {} is out of range", amount))
        })?;

        info!(
            from = %intent.from_username,
            to = %intent.to_username_or_name,
            amount = %amount,
            balance_before = %payer.balance,
            "Submitting transfer"
        );

        self.reconciler
            .submit_and_reconcile(
                submitter.as_ref(),
                &intent,
                Expectation::BalanceEquals(expected),
            )
            .await
    }

    // == Price ==
    pub async fn price(&self, query: &str) -> Result<PriceMatch> {
        let (table_id, reader) = self
            .prices
            .as_ref()
            .ok_or(LedgerError::NotConfigured("Price lookup"))?;
        let table = self.cache.get(table_id).await?;
        reader.lookup(&table, query)
    }

    // == Invalidate ==
    /// Invalidates a sheet by its API name (`accounts` or `prices`).
    pub fn invalidate(&self, name: &str) -> Result<()> {
        let table_id = match name {
            ACCOUNTS_TABLE => self.accounts_table.as_str(),
            PRICES_TABLE => self
                .prices
                .as_ref()
                .map(|(table_id, _)| table_id.as_str())
                .ok_or(LedgerError::NotConfigured("Price lookup"))?,
            other => {
                return Err(LedgerError::InvalidRequest(format!(
                    "unknown table '{}'",
                    other
                )))
            }
        };
        self.cache.invalidate(table_id);
        Ok(())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
