//! Reconcile Module
//!
//! Bridges the asynchronous sheet with synchronous answers: after a write
//! the accounts sheet is polled until the change shows up.
//!
//! A run moves through `Writing → Invalidated → Polling(n) → Confirmed | Stale`.

mod delay;
mod reconciler;
mod schedule;

pub use delay::{Delay, TokioDelay};
pub use reconciler::{Expectation, Phase, Reconciled, Reconciler};
pub use schedule::PollSchedule;
