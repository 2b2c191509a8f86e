use derive_more::{Display, Error};
use sqlx::error::ErrorKind;

/// Failures surfaced by store operations.
///
/// The first four variants are expected, recoverable outcomes of a request;
/// `Database` wraps everything else the driver reports.
#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display(fmt = "duplicate key: {}", _0)]
    DuplicateKey(#[error(not(source))] String),

    #[display(fmt = "invalid reference: {}", _0)]
    InvalidReference(#[error(not(source))] String),

    #[display(fmt = "invalid state: {}", _0)]
    InvalidState(#[error(not(source))] String),

    #[display(fmt = "not found: {}", _0)]
    NotFound(#[error(not(source))] String),

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            let message = db_err.message().to_string();
            match db_err.kind() {
                ErrorKind::UniqueViolation => return StoreError::DuplicateKey(message),
                ErrorKind::ForeignKeyViolation => return StoreError::InvalidReference(message),
                ErrorKind::CheckViolation => return StoreError::InvalidState(message),
                _ => {}
            }
        }

        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("no rows returned".to_string()),
            other => {
                tracing::error!(error = %other, "Storage operation failed");
                StoreError::Database(other)
            }
        }
    }
}

impl StoreError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        StoreError::NotFound(format!("{entity} {id}"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
