use crate::{
    table::{ColumnType, TableSpec, Value},
    Error, Result,
};

use super::ValidationError;

/// Characters a form field lets through
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CharClass {
    /// ASCII letters and digits
    Alphanumeric,
    /// ASCII digits
    Numeric,
    /// ASCII letters
    Alphabetic,
    /// Letters and digits of any script, spaces and `-'.&`
    Name,
    /// Anything but control characters
    Any,
}

impl CharClass {
    pub fn accepts(self, c: char) -> bool {
        match self {
            CharClass::Alphanumeric => c.is_ascii_alphanumeric(),
            CharClass::Numeric => c.is_ascii_digit(),
            CharClass::Alphabetic => c.is_ascii_alphabetic(),
            CharClass::Name => c.is_alphanumeric() || matches!(c, ' ' | '-' | '\'' | '.' | '&'),
            CharClass::Any => !c.is_control(),
        }
    }
}

#[derive(Debug)]
pub struct FieldPolicy {
    pub name: &'static str,
    pub label: &'static str,
    pub class: CharClass,
    pub max_len: usize,
    pub required: bool,
    /// Inclusive bounds of numeric fields
    pub bounds: Option<(i64, i64)>,
}

impl FieldPolicy {
    pub const fn new(
        name: &'static str,
        label: &'static str,
        class: CharClass,
        max_len: usize,
    ) -> Self {
        Self {
            name,
            label,
            class,
            max_len,
            required: false,
            bounds: None,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn bounded(self, min: i64, max: i64) -> Self {
        Self {
            bounds: Some((min, max)),
            ..self
        }
    }

    /// Drop the characters the field refuses and cut it to its maximum length
    pub fn sanitize(&self, value: &str) -> String {
        value
            .chars()
            .filter(|c| self.class.accepts(*c))
            .take(self.max_len)
            .collect()
    }
}

/// Outcome of a single field change event
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldChange {
    /// Stored as given
    Accepted,
    /// Stored without the refused characters
    Truncated,
    /// Every new character was refused, the value is unchanged
    Rejected,
    /// Same value as before
    Unchanged,
}

impl FieldChange {
    pub fn is_change(self) -> bool {
        matches!(self, FieldChange::Accepted | FieldChange::Truncated)
    }
}

/// The editable fields of one table
#[derive(Debug)]
pub struct Form {
    pub table: &'static TableSpec,
    pub fields: &'static [FieldPolicy],
}

impl Form {
    pub fn field(&self, name: &str) -> Option<&'static FieldPolicy> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.table.key.iter().any(|k| *k == name)
    }

    pub fn column_type(&self, name: &str) -> ColumnType {
        self.table
            .column(name)
            .map(|c| c.kind)
            .unwrap_or(ColumnType::Text)
    }

    /// Parse the text of a field into the type of its column
    pub fn parse(
        &self,
        policy: &FieldPolicy,
        text: &str,
    ) -> std::result::Result<Value, ValidationError> {
        self.column_type(policy.name)
            .parse(text)
            .map_err(|_| ValidationError::NotANumber {
                field: policy.name,
                label: policy.label,
            })
    }

    /// Parse the parts of a primary key given in key order
    pub fn parse_key(&self, parts: &[&str]) -> Result<Vec<Value>> {
        if parts.len() != self.table.key.len() {
            return Err(Error::NotFound(format!(
                "{} key {}",
                self.table.name,
                parts.join("/")
            )));
        }

        self.table
            .key
            .iter()
            .zip(parts)
            .map(|(name, part)| -> Result<Value> {
                let policy = self
                    .field(name)
                    .ok_or_else(|| Error::UnknownField((*name).to_owned()))?;
                Ok(self.parse(policy, part)?)
            })
            .collect()
    }
}

pub fn display_key(key: &[Value]) -> String {
    key.iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("/")
}
