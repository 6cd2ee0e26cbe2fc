//! # librarian-ledger
//!
//! The append-only evidence ledger: every claim, verification,
//! contradiction, and outcome the system learns lands here as an immutable
//! entry. Later components never mutate history — resolutions and
//! corrections are new entries.
//!
//! Subscribers are notified synchronously inside `append`, so by the time a
//! trigger fires the ledger already contains the triggering entry.

mod chain;
mod guard;
mod ledger;

pub use ledger::{EvidenceLedger, SubscriptionHandle};
