use std::path::Path;

use semver::Version;

use rusqlite::{config::DbConfig, Connection};

use crate::Result;

mod error;
pub use error::{StoreError, StoreResult};

mod store;
pub use store::{Store, Write, WriteMode};

pub struct Database {
    pub connection: Connection,
}

impl TryFrom<Connection> for Database {
    type Error = crate::Error;

    /// Take over a connection, turning off double-quoted string literals
    ///
    /// Otherwise a quoted column missing from its table reads back as its
    /// own name instead of failing.
    fn try_from(connection: Connection) -> Result<Self> {
        connection.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DML, false)?;
        connection.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DDL, false)?;

        Ok(Database { connection })
    }
}

impl Database {
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Database> {
        Connection::open(path)?.try_into()
    }

    pub fn memory() -> Result<Database> {
        Connection::open_in_memory()?.try_into()
    }

    pub fn get<K>(&self, key: K) -> Result<Option<String>>
    where
        K: AsRef<str> + rusqlite::ToSql,
    {
        match self
            .connection
            .prepare("SELECT value FROM huddle WHERE key = ?")?
            .query_row([key], |row| row.get::<usize, String>(0))
        {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set<K, V>(&self, key: K, value: V) -> Result<()>
    where
        K: AsRef<str> + rusqlite::ToSql,
        V: AsRef<str> + rusqlite::ToSql,
    {
        self.connection.execute(
            "INSERT INTO huddle(key, value)
                VALUES(:key, :value)
                ON CONFLICT(key)
                DO UPDATE SET value = :value",
            rusqlite::named_params! {":key": key, ":value": value},
        )?;
        Ok(())
    }

    pub fn version(&self) -> Result<Version> {
        let mut statement = self.connection.prepare(
            "
        SELECT
            name
        FROM
            sqlite_schema
        WHERE
            name = 'huddle' AND
            type = 'table';",
        )?;

        {
            let mut rows = statement.query([])?;

            if rows.next()?.is_none() {
                return Ok(Version::new(0, 0, 0));
            }
        }

        if let Some(version) = self.get("version")? {
            Ok(Version::parse(&version)?)
        } else {
            Ok(Version::new(0, 0, 0))
        }
    }

    pub fn current_version(&self) -> Result<Version> {
        Ok(Version::parse(env!("CARGO_PKG_VERSION"))?)
    }

    /// Create the metadata table and bring every known table up to date
    ///
    /// Tables removed afterwards are recreated lazily by
    /// [`SchemaGuardedLoader`](crate::loader::SchemaGuardedLoader).
    pub fn setup(&self) -> Result<()> {
        let version = self.version()?;
        let current = self.current_version()?;

        if version == Version::new(0, 0, 0) {
            self.connection.execute(
                "
            CREATE TABLE IF NOT EXISTS huddle (
                key TEXT NOT NULL UNIQUE,
                value TEXT
            );
            ",
                (),
            )?;
        }

        if version < current {
            self.upgrade_from(&version)?;
        }

        self.set("version", current.to_string())
    }

    fn upgrade_from(&self, version: &Version) -> Result<()> {
        log::info!("Upgrading database schema from {}", version);

        for spec in crate::tables::ALL {
            self.rebuild(spec)?;
        }

        Ok(())
    }
}
