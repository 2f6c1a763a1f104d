//! The module contains the error the engine can throw.
//!
//! The errors are split in three groups:
//!
//! - validation: [`MissingField`], [`InvalidReference`], [`InvalidValue`],
//!   raised before anything touches the store;
//! - lookup: [`NotFound`] when no row matches an identifier;
//! - persistence: [`Persistence`] when the store did not write what was asked,
//!   and [`Database`] for driver failures.
//!
//!  [`MissingField`]: EngineError::MissingField
//!  [`InvalidReference`]: EngineError::InvalidReference
//!  [`InvalidValue`]: EngineError::InvalidValue
//!  [`NotFound`]: EngineError::NotFound
//!  [`Persistence`]: EngineError::Persistence
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("record not loaded: {0}")]
    NotLoaded(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by the caller's input.
    ///
    /// Callers use this to present field-level feedback instead of a generic
    /// failure message.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::InvalidReference(_) | Self::InvalidValue(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::InvalidReference(a), Self::InvalidReference(b)) => a == b,
            (Self::InvalidValue(a), Self::InvalidValue(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::NotLoaded(a), Self::NotLoaded(b)) => a == b,
            (Self::Persistence(a), Self::Persistence(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_flagged() {
        assert!(EngineError::MissingField("amount".to_string()).is_validation());
        assert!(EngineError::InvalidReference("typeid".to_string()).is_validation());
        assert!(EngineError::InvalidValue("comment".to_string()).is_validation());
        assert!(!EngineError::NotFound("expenses 1".to_string()).is_validation());
        assert!(!EngineError::Persistence("0 rows".to_string()).is_validation());
        assert!(!EngineError::Database(DbErr::Custom("boom".to_string())).is_validation());
    }

    #[test]
    fn database_errors_compare_by_message() {
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string())),
            EngineError::Database(DbErr::Custom("boom".to_string()))
        );
        assert_ne!(
            EngineError::NotFound("x".to_string()),
            EngineError::NotLoaded("x".to_string())
        );
    }
}
