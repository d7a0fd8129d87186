//! Reconciler
//!
//! Write-then-read loop: after a transfer is submitted, re-read the accounts
//! sheet until the write shows up or the poll budget runs out.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Delay, PollSchedule};
use crate::cache::TableCache;
use crate::error::{LedgerError, Result};
use crate::form::{FormSubmitter, TransferIntent};
use crate::ledger::{Account, Amount, LedgerReader};

// == Expectation ==
/// What a read must show for the write to count as visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The account row exists
    RowPresent,
    /// The balance differs from the pre-write snapshot
    BalanceChangedFrom(Amount),
    /// The balance equals a known value
    BalanceEquals(Amount),
}

impl Expectation {
    pub fn is_met(&self, account: &Account) -> bool {
        match self {
            Expectation::RowPresent => true,
            Expectation::BalanceChangedFrom(before) => account.balance != *before,
            Expectation::BalanceEquals(expected) => account.balance == *expected,
        }
    }
}

// == Phase ==
/// Steps of one write-and-reconcile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Writing,
    Invalidated,
    Polling { attempt: u32 },
    Confirmed { attempt: u32 },
    Stale { attempts: u32 },
}

// == Reconciled ==
/// Result of reconciliation. Neither variant is an error: `Stale` still
/// carries the freshest account that could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// The write is visible in `account`
    Confirmed { account: Account, attempts: u32 },
    /// The write could not be observed within the poll budget; `account` may
    /// predate it
    Stale { account: Account, attempts: u32 },
}

impl Reconciled {
    pub fn account(&self) -> &Account {
        match self {
            Reconciled::Confirmed { account, .. } | Reconciled::Stale { account, .. } => account,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Reconciled::Confirmed { attempts, .. } | Reconciled::Stale { attempts, .. } => *attempts,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Reconciled::Confirmed { .. })
    }
}

// == Reconciler ==
pub struct Reconciler {
    cache: Arc<TableCache>,
    reader: LedgerReader,
    table_id: String,
    delay: Arc<dyn Delay>,
    schedule: PollSchedule,
}

impl Reconciler {
    /// Creates a reconciler for the accounts sheet `table_id`.
    pub fn new(
        cache: Arc<TableCache>,
        reader: LedgerReader,
        table_id: &str,
        delay: Arc<dyn Delay>,
        schedule: PollSchedule,
    ) -> Self {
        Self {
            cache,
            reader,
            table_id: table_id.to_string(),
            delay,
            schedule,
        }
    }

    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    // == Submit And Reconcile ==
    /// Submits `intent` and then reconciles the payer's account.
    ///
    /// A failed submission returns `WriteFailure` without touching the cache.
    pub async fn submit_and_reconcile(
        &self,
        submitter: &dyn FormSubmitter,
        intent: &TransferIntent,
        expectation: Expectation,
    ) -> Result<Reconciled> {
        self.run(Some((submitter, intent)), &intent.from_username, expectation)
            .await
    }

    // == Reconcile After Write ==
    /// Re-reads `username` until `expectation` holds or the schedule is
    /// exhausted.
    ///
    /// Every read bypasses the TTL. Returns `Confirmed` as soon as a read
    /// satisfies the expectation, otherwise `Stale` with the last account
    /// read. If the account could never be read at all, the last read error
    /// is returned.
    pub async fn reconcile_after_write(
        &self,
        username: &str,
        expectation: Expectation,
    ) -> Result<Reconciled> {
        self.run(None, username, expectation).await
    }

    /// Drives the phase machine. With a pending write it starts at
    /// `Writing`, otherwise at `Invalidated`.
    async fn run(
        &self,
        write: Option<(&dyn FormSubmitter, &TransferIntent)>,
        username: &str,
        expectation: Expectation,
    ) -> Result<Reconciled> {
        let mut last_seen: Option<Account> = None;
        let mut last_error: Option<LedgerError> = None;
        let mut phase = if write.is_some() {
            Phase::Writing
        } else {
            Phase::Invalidated
        };

        loop {
            debug!(?phase, username, "Reconcile step");
            phase = match phase {
                Phase::Writing => {
                    if let Some((submitter, intent)) = write {
                        submitter.submit(intent).await?;
                    }
                    Phase::Invalidated
                }
                Phase::Invalidated => {
                    self.cache.invalidate(&self.table_id);
                    Phase::Polling { attempt: 1 }
                }
                Phase::Polling { attempt } => {
                    if attempt > 1 {
                        self.delay.sleep(self.schedule.delay_before(attempt)).await;
                        self.cache.invalidate(&self.table_id);
                    }

                    match self.read(username).await {
                        Ok(account) if expectation.is_met(&account) => {
                            last_seen = Some(account);
                            Phase::Confirmed { attempt }
                        }
                        Ok(account) => {
                            last_seen = Some(account);
                            self.next_poll(attempt)
                        }
                        Err(err) => {
                            warn!(username, attempt, error = %err, "Reconcile read failed");
                            last_error = Some(err);
                            self.next_poll(attempt)
                        }
                    }
                }
                Phase::Confirmed { attempt } => {
                    let account = last_seen.take().ok_or_else(|| {
                        LedgerError::AccountNotFound(username.to_string())
                    })?;
                    info!(username, attempts = attempt, balance = %account.balance, "Write confirmed");
                    return Ok(Reconciled::Confirmed {
                        account,
                        attempts: attempt,
                    });
                }
                Phase::Stale { attempts } => {
                    return match last_seen.take() {
                        Some(account) => {
                            warn!(username, attempts, "Write not visible yet, returning last read");
                            Ok(Reconciled::Stale { account, attempts })
                        }
                        None => Err(last_error
                            .take()
                            .unwrap_or_else(|| LedgerError::AccountNotFound(username.to_string()))),
                    };
                }
            };
        }
    }

    fn next_poll(&self, attempt: u32) -> Phase {
        if attempt >= self.schedule.max_attempts {
            Phase::Stale { attempts: attempt }
        } else {
            Phase::Polling {
                attempt: attempt + 1,
            }
        }
    }

    async fn read(&self, username: &str) -> Result<Account> {
        let table = self.cache.get(&self.table_id).await?;
        self.reader.find_by_username(&table, username)
    }
}
