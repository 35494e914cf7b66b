//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HomeschedError`] via `#[from]` or an explicit `From` impl.

/// Top-level error shared by the domain, application, and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum HomeschedError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// Failure reported by the storage collaborator.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HomeschedError {
    /// Whether this error means the requested record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A domain invariant was violated by caller input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("device kind must be provided")]
    MissingDeviceKind,

    #[error("task must reference a device")]
    MissingDeviceId,

    #[error("invalid time of day {value:?}, expected HH:MM")]
    InvalidTime { value: String },

    #[error("unknown device type {value:?}")]
    UnknownDeviceType { value: String },
}

/// A record with the given identity does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
