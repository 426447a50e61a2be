//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of the triage/cell-walk core
/// (validation, malformed records, rejected sessions). Transport concerns belong
/// to the protocol client boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Geocoding produced nothing, or a coordinate is outside the valid range.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// The remote service rejected the login.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// An inventory record is missing a required field.
    #[error("malformed inventory item: {0}")]
    MalformedInventoryItem(String),

    /// The external release call failed for a scheduled item.
    #[error("disposal of item {item_id} failed: {reason}")]
    DisposalCallFailure { item_id: u64, reason: String },

    /// A value failed validation (e.g. malformed configuration).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_coordinate(msg: impl Into<String>) -> Self {
        Self::InvalidCoordinate(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::AuthenticationFailure(msg.into())
    }

    pub fn malformed_item(msg: impl Into<String>) -> Self {
        Self::MalformedInventoryItem(msg.into())
    }

    pub fn disposal(item_id: u64, reason: impl Into<String>) -> Self {
        Self::DisposalCallFailure {
            item_id,
            reason: reason.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Fatal errors abort the whole run; everything else is isolated per item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidCoordinate(_)
                | DomainError::AuthenticationFailure(_)
                | DomainError::Validation(_)
        )
    }
}
