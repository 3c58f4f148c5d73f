//! Cross-cutting error types for plate.
//!
//! Collaborator errors (`AuthError`, `LookupError`) live in `plate-auth`;
//! configuration errors in `plate-config`.

use thiserror::Error;

/// Errors raised while validating shared types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A business role string outside `owner`/`manager`/`staff`.
    #[error("invalid business role: {0}")]
    InvalidRole(String),

    /// An app kind string outside `console`/`webapp`.
    #[error("invalid app kind: {0} (expected 'console' or 'webapp')")]
    InvalidAppKind(String),

    /// A data-store row failed validation at the lookup boundary.
    #[error("validation error: {0}")]
    Validation(String),
}
