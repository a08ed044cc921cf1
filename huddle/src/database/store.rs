use rusqlite::{params_from_iter, types::Value as SqlValue};

use super::{Database, StoreError, StoreResult};
use crate::table::{quote, TableSpec, Value};

/// The connection every component reads and writes through
///
/// Implemented by [`Database`]; tests wrap it to count or break calls.
pub trait Store {
    /// Read every declared column of the table, uncast
    fn read(&self, spec: &TableSpec) -> StoreResult<Vec<Vec<SqlValue>>>;

    /// Run the creation script of the table in its own transaction
    fn rebuild(&self, spec: &TableSpec) -> StoreResult<()>;

    /// Persist a whole record in a single transaction
    fn write(&self, write: &Write<'_>) -> StoreResult<()>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Update,
}

/// A full record: the key identifying it and every other field
#[derive(Debug)]
pub struct Write<'a> {
    pub table: &'a str,
    pub mode: WriteMode,
    pub key: Vec<(&'a str, Value)>,
    pub fields: Vec<(&'a str, Value)>,
}

impl Write<'_> {
    pub fn key_display(&self) -> String {
        self.key
            .iter()
            .map(|(_, v)| v.to_string())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn statement(&self) -> String {
        match self.mode {
            WriteMode::Insert => {
                let columns = self
                    .key
                    .iter()
                    .chain(self.fields.iter())
                    .map(|(name, _)| quote(name))
                    .collect::<Vec<_>>();
                let placeholders = (1..=columns.len())
                    .map(|i| format!("?{i}"))
                    .collect::<Vec<_>>();

                format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    quote(self.table),
                    columns.join(", "),
                    placeholders.join(", ")
                )
            }
            WriteMode::Update => {
                let set = self
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, (name, _))| format!("{} = ?{}", quote(name), i + 1))
                    .collect::<Vec<_>>();
                let filter = self
                    .key
                    .iter()
                    .enumerate()
                    .map(|(i, (name, _))| {
                        format!("{} = ?{}", quote(name), self.fields.len() + i + 1)
                    })
                    .collect::<Vec<_>>();

                format!(
                    "UPDATE {} SET {} WHERE {}",
                    quote(self.table),
                    set.join(", "),
                    filter.join(" AND ")
                )
            }
        }
    }

    fn params(&self) -> Vec<&Value> {
        match self.mode {
            WriteMode::Insert => self.key.iter().chain(self.fields.iter()),
            WriteMode::Update => self.fields.iter().chain(self.key.iter()),
        }
        .map(|(_, value)| value)
        .collect()
    }
}

impl Store for Database {
    fn read(&self, spec: &TableSpec) -> StoreResult<Vec<Vec<SqlValue>>> {
        let mut statement = self.connection.prepare(&spec.select())?;
        let width = spec.columns.len();

        let rows = statement
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<usize, SqlValue>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn rebuild(&self, spec: &TableSpec) -> StoreResult<()> {
        let transaction = self.connection.unchecked_transaction()?;
        transaction.execute_batch(spec.script)?;
        transaction.commit()?;

        Ok(())
    }

    fn write(&self, write: &Write<'_>) -> StoreResult<()> {
        let transaction = self.connection.unchecked_transaction()?;
        let changed = transaction.execute(&write.statement(), params_from_iter(write.params()))?;

        if changed != 1 {
            return Err(StoreError::NoMatchingRow(format!(
                "{} {}",
                write.table,
                write.key_display()
            )));
        }

        transaction.commit()?;
        Ok(())
    }
}
