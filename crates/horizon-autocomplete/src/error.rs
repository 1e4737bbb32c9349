//! Error types for the autocompletion system.

use std::collections::TryReserveError;

use crate::host::ControlId;

/// Result type alias for autocompletion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the autocompletion system.
///
/// These surface from initialization only. Per-keystroke failures never
/// reach the caller: enumeration exhaustion is an ordinary `None`, and
/// allocation failures during a keystroke skip the dependent feature for
/// that keystroke and move on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The field handle did not resolve to a live text field in the host.
    #[error("text field {0:?} does not resolve in the host")]
    InvalidArgument(ControlId),

    /// The controller is already bound to a live text field.
    #[error("controller is already bound to a text field")]
    AlreadyInitialized,

    /// The controller was bound to a field that has since been destroyed.
    /// A controller is bound at most once; it cannot be re-targeted.
    #[error("controller was bound to a field that no longer exists")]
    StaleBinding,

    /// The candidate object cannot enumerate strings.
    #[error("candidate object does not expose a string source")]
    UnsupportedSource,

    /// An owned-buffer reservation failed.
    #[error("buffer reservation failed: {0}")]
    Allocation(#[from] TryReserveError),
}
