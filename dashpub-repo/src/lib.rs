//! Target repository — dashboard tree scanning, git gateway, host queries.
//!
//! Public API surface:
//! - [`store`] — [`TargetStore`], [`TargetRecord`]
//! - [`git`] — [`GitWorkingCopy`], [`RemoteMode`]
//! - [`host`] — [`GitLabHost`]
//! - [`sanitize`] — [`sanitize_component`]
//! - [`error`] — [`RepoError`]

pub mod error;
pub mod git;
pub mod host;
pub mod sanitize;
pub mod store;

pub use error::RepoError;
pub use git::{GitWorkingCopy, RemoteMode};
pub use host::GitLabHost;
pub use sanitize::sanitize_component;
pub use store::{TargetRecord, TargetStore};
