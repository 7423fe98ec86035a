//! Column decoding helpers shared by the MySQL repositories

use sqlx::mysql::{MySql, MySqlRow};
use sqlx::{Decode, Row, Type};
use uuid::Uuid;

use dfm_core::errors::DomainError;

/// Read a column, mapping decode failures to `DomainError::Internal`
pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get(name).map_err(|e| DomainError::Internal {
        message: format!("Failed to get {}: {}", name, e),
    })
}

/// Read a CHAR(36) column as a UUID
pub(crate) fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", name, e),
    })
}

/// Map a query failure to `DomainError::Internal`
pub(crate) fn query_error(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::Internal {
        message: format!("{}: {}", context, e),
    }
}

/// Whether an error is a violated unique key
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}
