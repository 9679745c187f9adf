//! The module contains the error the engine can throw.
//!
//! Every variant belongs to one [`ErrorKind`], so the boundary layer can map
//! failures to responses without looking at messages:
//!
//! - [`InvalidAmount`], [`InvalidSplit`], [`InvalidInput`] are validation
//!   errors caused by the caller.
//! - [`KeyNotFound`] is thrown when an identifier does not resolve.
//! - [`Forbidden`] is thrown when the actor may not perform the operation.
//! - [`Internal`] is a server-side failure outside the storage layer, such as
//!   a password hash that could not be computed.
//! - [`Database`] wraps any failure from the storage layer. It is only ever
//!   returned after the in-flight transaction has been rolled back.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidSplit`]: EngineError::InvalidSplit
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Internal`]: EngineError::Internal
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Authorization,
    Authentication,
    Internal,
    Persistence,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_) | Self::InvalidSplit(_) | Self::InvalidInput(_) => {
                ErrorKind::Validation
            }
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::ExistingKey(_) => ErrorKind::Conflict,
            Self::Forbidden(_) => ErrorKind::Authorization,
            Self::Unauthorized(_) => ErrorKind::Authentication,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Database(_) => ErrorKind::Persistence,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidSplit(a), Self::InvalidSplit(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_variants() {
        assert_eq!(
            EngineError::InvalidSplit("x".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EngineError::KeyNotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::Forbidden("x".to_string()).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            EngineError::Internal("x".to_string()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::Persistence
        );
    }
}
