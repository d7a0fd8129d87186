//! In-Memory Source
//!
//! Scripted [`TabularSource`] used to stand in for the spreadsheet. Each table
//! id has a queue of responses: every fetch takes the next one, and the last
//! response keeps being served once the queue is down to one element.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::{parse_delimited, TabularSource, Table};
use crate::error::{LedgerError, Result};

type Scripted = std::result::Result<Table, String>;

// == Memory Source ==
#[derive(Debug, Default)]
pub struct MemorySource {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    started: Mutex<HashMap<String, usize>>,
    gate: Option<Arc<Semaphore>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every fetch wait for a permit on `gate` before answering.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Queues a response parsed from delimited text.
    ///
    /// # Panics
    /// Panics if `text` has no header row.
    pub fn push_csv(&self, table_id: &str, text: &str) {
        let table = parse_delimited(table_id, text).expect("scripted export must have a header");
        self.push_table(table_id, table);
    }

    /// Queues an already-built table.
    pub fn push_table(&self, table_id: &str, table: Table) {
        self.scripts
            .lock()
            .entry(table_id.to_string())
            .or_default()
            .push_back(Ok(table));
    }

    /// Queues a failed fetch.
    pub fn push_failure(&self, table_id: &str, reason: &str) {
        self.scripts
            .lock()
            .entry(table_id.to_string())
            .or_default()
            .push_back(Err(reason.to_string()));
    }

    /// Drops queued responses and serves `text` from now on.
    pub fn replace_csv(&self, table_id: &str, text: &str) {
        self.scripts.lock().remove(table_id);
        self.push_csv(table_id, text);
    }

    /// Number of fetches started for `table_id`.
    pub fn fetch_count(&self, table_id: &str) -> usize {
        self.started.lock().get(table_id).copied().unwrap_or(0)
    }

    fn next_response(&self, table_id: &str) -> Scripted {
        let mut scripts = self.scripts.lock();
        let queue = match scripts.get_mut(table_id) {
            Some(queue) if !queue.is_empty() => queue,
            _ => return Err("no such sheet".to_string()),
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Err("no such sheet".to_string()))
        } else {
            queue[0].clone()
        }
    }
}

#[async_trait]
impl TabularSource for MemorySource {
    async fn fetch_rows(&self, table_id: &str) -> Result<Table> {
        *self.started.lock().entry(table_id.to_string()).or_default() += 1;

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| LedgerError::fetch(table_id, e))?
                .forget();
        }

        self.next_response(table_id)
            .map_err(|reason| LedgerError::fetch(table_id, reason))
    }
}
