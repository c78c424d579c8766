use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::AlreadyExists(_) => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Conflict(_) => 1004,
            ServiceError::Db(_) => 1200,
        }
    }

    /// Classify a store error raised by a write. Unique violations become
    /// `AlreadyExists`; foreign-key violations are mapped by `on_fk` since their
    /// meaning depends on the statement (missing parent vs. existing children).
    pub fn from_write(err: DbErr, on_fk: impl FnOnce() -> ServiceError) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::AlreadyExists(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => on_fk(),
            _ => match err {
                DbErr::RecordNotUpdated => ServiceError::not_found("record"),
                other => ServiceError::Db(other.to_string()),
            },
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self { ServiceError::Db(err.to_string()) }
}
