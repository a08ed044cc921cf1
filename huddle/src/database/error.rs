use rusqlite::{ffi, ErrorCode};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure reported by a [`Store`](super::Store)
///
/// Only [`StoreError::SchemaMissing`] is recoverable by recreating the table,
/// everything else is reported as is.
#[derive(derive_more::Error, derive_more::Display, Debug)]
pub enum StoreError {
    #[display("No such table: {_0}")]
    SchemaMissing(#[error(not(source))] String),
    #[display("Conflict with existing data. {_0}")]
    NonUnique(#[error(not(source))] String),
    #[display("No row matches {_0}")]
    NoMatchingRow(#[error(not(source))] String),
    #[display("Sqlite error. {_0}")]
    Sqlite(rusqlite::Error),
}

const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(
                ffi::Error {
                    code: ErrorCode::Unknown,
                    ..
                },
                Some(ref msg),
            ) if msg.starts_with("no such table:") => StoreError::SchemaMissing(
                msg.trim_start_matches("no such table:").trim().to_owned(),
            ),
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                StoreError::NonUnique(msg.unwrap_or_default())
            }
            _ => StoreError::Sqlite(e),
        }
    }
}

impl StoreError {
    pub fn is_schema_missing(&self) -> bool {
        matches!(self, StoreError::SchemaMissing(_))
    }
}
