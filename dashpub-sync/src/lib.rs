//! # dashpub-sync
//!
//! The reconciliation engine: one-way publishing of tagged Grafana
//! dashboards into a git repository.
//!
//! Call [`Publisher::run`] for a single batch pass — check the catalog,
//! write what moved forward, commit once, push once.

pub mod engine;
pub mod error;
pub mod message;
mod writer;

pub use engine::{Publisher, RunSummary, SyncOutcome};
pub use error::PublishError;
pub use message::{commit_message, ChangeEntry};
