//! Error type shared by the materializer, reconciler and render store
//!
//! Every failure here is a programmer error (malformed tree, adapter misuse),
//! never a transient condition. There is no retry and no rollback: whatever
//! the adapter applied before the failure stays applied.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::string::String;

use thiserror::Error;

/// Errors surfaced by a render or update pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A node lacks what its variant requires (e.g. an element without a tag)
    #[error("malformed virtual tree: {0}")]
    MalformedTree(String),
    /// The real tree has no child where the old virtual tree expects one
    #[error("no real child at index {index} under the parent being reconciled")]
    DetachedNode { index: usize },
    /// The platform adapter rejected an operation
    #[error("platform adapter rejected `{op}`: {message}")]
    Platform { op: &'static str, message: String },
    /// `update_state` was called before any `render`
    #[error("no application state: nothing has been rendered yet")]
    NoState,
}

impl Error {
    /// Shorthand used by adapters to reject an operation
    pub fn platform(op: &'static str, message: impl Into<String>) -> Self {
        Self::Platform {
            op,
            message: message.into(),
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = core::result::Result<T, Error>;
