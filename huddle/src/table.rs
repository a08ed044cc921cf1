//! Typed description of the tables the application reads and writes.

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};

#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum ColumnType {
    #[display("text")]
    Text,
    #[display("integer")]
    Integer,
    #[display("real")]
    Real,
    #[display("boolean")]
    Boolean,
}

#[derive(Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("expected {expected}, found {found}")]
pub struct CastError {
    pub expected: ColumnType,
    pub found: String,
}

impl CastError {
    fn new(expected: ColumnType, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}

impl ColumnType {
    /// Convert a raw value read from SQLite to this column type
    ///
    /// SQLite is loosely typed, so integers stored in text columns or numbers
    /// stored as text are accepted as long as they convert losslessly.
    pub fn cast(self, raw: SqlValue) -> Result<Value, CastError> {
        use ColumnType::*;

        Ok(match (self, raw) {
            (_, SqlValue::Null) => Value::Null,
            (Text, SqlValue::Text(s)) => Value::Text(s),
            (Text, SqlValue::Integer(i)) => Value::Text(i.to_string()),
            (Text, SqlValue::Real(f)) => Value::Text(f.to_string()),
            (Integer, SqlValue::Integer(i)) => Value::Integer(i),
            (Integer, SqlValue::Text(s)) => Value::Integer(
                s.trim()
                    .parse()
                    .map_err(|_| CastError::new(self, format!("text {s:?}")))?,
            ),
            (Real, SqlValue::Real(f)) => Value::Real(f),
            (Real, SqlValue::Integer(i)) => Value::Real(i as f64),
            (Real, SqlValue::Text(s)) => Value::Real(
                s.trim()
                    .parse()
                    .map_err(|_| CastError::new(self, format!("text {s:?}")))?,
            ),
            (Boolean, SqlValue::Integer(0)) => Value::Boolean(false),
            (Boolean, SqlValue::Integer(1)) => Value::Boolean(true),
            (Boolean, SqlValue::Text(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Value::Boolean(true),
                "false" | "0" => Value::Boolean(false),
                _ => return Err(CastError::new(self, format!("text {s:?}"))),
            },
            (_, SqlValue::Blob(_)) => return Err(CastError::new(self, "blob")),
            (_, other) => return Err(CastError::new(self, format!("{other:?}"))),
        })
    }

    /// Parse the text of a form field, empty text being NULL
    pub fn parse(self, text: &str) -> Result<Value, CastError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::Null);
        }

        self.cast(SqlValue::Text(text.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

/// Form representation, NULL being the empty string
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Value::Boolean(b) => ToSqlOutput::Owned(SqlValue::Integer(*b as i64)),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind }
    }
}

/// A logical table: its name, the idempotent script creating (and seeding)
/// it, and the typed columns read back from it
#[derive(Debug)]
pub struct TableSpec {
    pub name: &'static str,
    pub script: &'static str,
    pub columns: &'static [Column],
    pub key: &'static [&'static str],
    /// Whether the creation script inserts reference rows
    pub seeded: bool,
}

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn select(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote(c.name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut query = format!("SELECT {} FROM {}", columns, quote(self.name));
        if !self.key.is_empty() {
            query.push_str(" ORDER BY ");
            query.push_str(
                &self
                    .key
                    .iter()
                    .map(|k| quote(k))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        query
    }
}

/// Quote an SQL identifier
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    columns: &'static [Column],
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: &'static [Column], values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| self.values.get(i))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Values of the key columns of the table, in key order
    pub fn key(&self, spec: &TableSpec) -> Vec<Value> {
        spec.key
            .iter()
            .map(|k| self.get(k).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Rows returned by a load, in key order
#[derive(Clone, Debug, PartialEq)]
pub struct Rows {
    pub spec: &'static TableSpec,
    rows: Vec<Row>,
    rebuilt: bool,
}

impl Rows {
    pub(crate) fn new(spec: &'static TableSpec, rows: Vec<Row>, rebuilt: bool) -> Self {
        Self {
            spec,
            rows,
            rebuilt,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Whether the table had to be recreated before it could be read
    pub fn rebuilt(&self) -> bool {
        self.rebuilt
    }

    pub fn find(&self, key: &[Value]) -> Option<&Row> {
        self.rows.iter().find(|row| row.key(self.spec) == key)
    }
}

impl PartialEq for TableSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
