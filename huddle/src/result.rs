use crate::{database::StoreError, session::ValidationError, table::CastError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(derive_more::Error, derive_more::Display, derive_more::From, Debug)]
pub enum Error {
    #[display("Table {table} is still unreadable after rebuild. {source}")]
    SchemaRebuildFailed { table: String, source: StoreError },
    #[display("Unexpected store error. {_0}")]
    #[from]
    UnexpectedStore(StoreError),
    #[display("Reading {table}.{column}. {source}")]
    Cast {
        table: &'static str,
        column: &'static str,
        source: CastError,
    },
    #[display("{_0} not found")]
    NotFound(#[error(not(source))] String),
    #[display("Unknown table {_0}")]
    UnknownTable(#[error(not(source))] String),
    #[display("Unknown field {_0}")]
    UnknownField(#[error(not(source))] String),
    #[display("{_0} is part of the key and cannot be changed")]
    ImmutableField(#[error(not(source))] &'static str),
    #[display("Invalid. {_0}")]
    #[from]
    Validation(ValidationError),
    #[display("Saving failed, changes are kept. {_0}")]
    WriteFailure(StoreError),
    #[display("Edit session is closed")]
    SessionClosed,
    #[display("Parsing version information")]
    #[from]
    VersionError(semver::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::UnexpectedStore(StoreError::NoMatchingRow(_))
        )
    }

    pub fn is_non_unique(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedStore(StoreError::NonUnique(_))
                | Error::WriteFailure(StoreError::NonUnique(_))
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Error {
        Error::UnexpectedStore(e.into())
    }
}
