//! Staging of edits to one record until the user agrees to save them
//!
//! An [`EditSession`] is opened from rows returned by the
//! [`SchemaGuardedLoader`] and writes back through the same store. Every
//! accepted field change bumps a dirty counter; nothing reaches the store
//! before [`EditSession::request_commit`] gets a confirmation, and then the
//! whole record is written at once.

use std::collections::BTreeMap;

use crate::{
    database::{Store, Write, WriteMode},
    loader::SchemaGuardedLoader,
    table::Value,
    Error, Result,
};

mod confirm;
pub use confirm::{Answer, Confirm, Prompt};

mod field;
pub use field::{display_key, CharClass, FieldChange, FieldPolicy, Form};

mod intent;
pub use intent::{Intent, Response};

mod validate;
pub use validate::ValidationError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Clean,
    Dirty,
    Committing,
    Closed,
}

/// Commit buttons of the view
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Commit {
    /// Save and keep editing
    Apply,
    /// Save and close
    Ok,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to save
    Unchanged,
    /// The user refused to save, changes are kept
    Declined,
    Saved,
    /// The session closed without saving its changes
    Discarded,
}

#[derive(Debug)]
enum Mode {
    /// Keys of the rows present when the session opened
    Create { existing: Vec<Vec<Value>> },
    Edit { key: Vec<Value> },
}

pub struct EditSession<'s, S: Store + ?Sized> {
    store: &'s S,
    form: &'static Form,
    mode: Mode,
    current: BTreeMap<&'static str, String>,
    original: BTreeMap<&'static str, String>,
    /// Typed values as last read or written, for fields left untouched
    persisted: BTreeMap<&'static str, Value>,
    dirty: u32,
    state: State,
}

impl<'s, S: Store + ?Sized> EditSession<'s, S> {
    /// Open the existing record identified by `key`
    pub fn edit(
        loader: &SchemaGuardedLoader<'s, S>,
        form: &'static Form,
        key: &[Value],
    ) -> Result<Self> {
        let rows = loader.load(form.table)?;
        let row = rows.find(key).ok_or_else(|| {
            Error::NotFound(format!("{} {}", form.table.name, display_key(key)))
        })?;

        let persisted = form
            .fields
            .iter()
            .map(|f| (f.name, row.get(f.name).cloned().unwrap_or(Value::Null)))
            .collect::<BTreeMap<_, _>>();
        let current = persisted
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect::<BTreeMap<_, _>>();

        Ok(Self {
            store: loader.store(),
            form,
            mode: Mode::Edit {
                key: row.key(form.table),
            },
            original: current.clone(),
            current,
            persisted,
            dirty: 0,
            state: State::Clean,
        })
    }

    /// Open a blank record, to be inserted on the first commit
    pub fn create(loader: &SchemaGuardedLoader<'s, S>, form: &'static Form) -> Result<Self> {
        let rows = loader.load(form.table)?;
        let existing = rows.iter().map(|row| row.key(form.table)).collect();

        let current = form
            .fields
            .iter()
            .map(|f| (f.name, String::new()))
            .collect::<BTreeMap<_, _>>();

        Ok(Self {
            store: loader.store(),
            form,
            mode: Mode::Create { existing },
            original: current.clone(),
            current,
            persisted: form.fields.iter().map(|f| (f.name, Value::Null)).collect(),
            dirty: 0,
            state: State::Clean,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of accepted changes since the last successful write
    pub fn dirty(&self) -> u32 {
        self.dirty
    }

    pub fn is_creating(&self) -> bool {
        matches!(self.mode, Mode::Create { .. })
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.current.get(field).map(String::as_str)
    }

    pub fn original(&self, field: &str) -> Option<&str> {
        self.original.get(field).map(String::as_str)
    }

    /// Fields whose value differs from the last persisted one, in form order
    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.form
            .fields
            .iter()
            .map(|f| f.name)
            .filter(|name| self.current.get(name) != self.original.get(name))
            .collect()
    }

    pub fn key_display(&self) -> String {
        match &self.mode {
            Mode::Edit { key } => display_key(key),
            Mode::Create { .. } => self
                .form
                .table
                .key
                .iter()
                .map(|k| self.value(k).unwrap_or_default())
                .collect::<Vec<_>>()
                .join("/"),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == State::Closed {
            Err(Error::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Field change event from the view
    ///
    /// Characters refused by the field policy are dropped instead of failing,
    /// like a form field that does not let them be typed. Only an actual
    /// change of the value counts as a change.
    pub fn apply_field(&mut self, name: &str, value: &str) -> Result<FieldChange> {
        self.ensure_open()?;

        let policy = self
            .form
            .field(name)
            .ok_or_else(|| Error::UnknownField(name.to_owned()))?;

        if !self.is_creating() && self.form.is_key(policy.name) {
            return Err(Error::ImmutableField(policy.name));
        }

        let sanitized = policy.sanitize(value);
        let current = self.current.entry(policy.name).or_default();

        if *current == sanitized {
            if sanitized == value {
                return Ok(FieldChange::Unchanged);
            }

            log::debug!("Rejected {:?} for {}, keeping {:?}", value, name, sanitized);
            return Ok(FieldChange::Rejected);
        }

        let change = if sanitized == value {
            FieldChange::Accepted
        } else {
            FieldChange::Truncated
        };

        *current = sanitized;
        self.dirty += 1;
        self.state = State::Dirty;

        Ok(change)
    }

    /// Check a new record before it is first inserted
    ///
    /// Reports the first problem found: a key already present when the
    /// session opened, then an empty required field, then a number out of its
    /// bounds. Edit sessions only go through the field checks.
    pub fn validate_for_create(&self) -> std::result::Result<(), ValidationError> {
        if let Mode::Create { existing } = &self.mode {
            let key = self
                .form
                .table
                .key
                .iter()
                .map(|name| match self.form.field(name) {
                    Some(policy) => self.form.parse(policy, self.text(name)),
                    None => Ok(Value::Null),
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;

            if existing.contains(&key) {
                return Err(ValidationError::DuplicateKey {
                    table: self.form.table.name,
                    key: display_key(&key),
                });
            }
        }

        self.validate_fields()
    }

    fn text(&self, name: &str) -> &str {
        self.value(name).unwrap_or_default()
    }

    fn validate_fields(&self) -> std::result::Result<(), ValidationError> {
        if let Some(policy) = self
            .form
            .fields
            .iter()
            .find(|f| f.required && self.text(f.name).trim().is_empty())
        {
            return Err(ValidationError::Required {
                field: policy.name,
                label: policy.label,
            });
        }

        for policy in self.form.fields {
            let value = self.form.parse(policy, self.text(policy.name))?;

            if let (Some((min, max)), Some(number)) = (policy.bounds, value.as_i64()) {
                if number < min || number > max {
                    return Err(ValidationError::OutOfRange {
                        field: policy.name,
                        label: policy.label,
                        min,
                        max,
                    });
                }
            }
        }

        Ok(())
    }

    /// The whole record, key included, typed after the table columns
    ///
    /// Only edited fields are parsed from their text. The others keep the
    /// value read from the store, untrimmed and with empty text kept apart
    /// from NULL.
    fn to_write(&self) -> std::result::Result<Write<'static>, ValidationError> {
        let mut key = Vec::new();
        let mut fields = Vec::new();

        for policy in self.form.fields {
            let text = self.text(policy.name);
            let value = match self.persisted.get(policy.name) {
                Some(value) if self.original(policy.name) == Some(text) => value.clone(),
                _ => self.form.parse(policy, text)?,
            };

            if self.form.is_key(policy.name) {
                key.push((policy.name, value));
            } else {
                fields.push((policy.name, value));
            }
        }

        let mode = match &self.mode {
            Mode::Create { .. } => WriteMode::Insert,
            Mode::Edit { key: persisted } => {
                key = self.form.table.key.iter().copied().zip(persisted.iter().cloned()).collect();
                WriteMode::Update
            }
        };

        Ok(Write {
            table: self.form.table.name,
            mode,
            key,
            fields,
        })
    }

    /// Apply or OK from the view
    ///
    /// A clean session has nothing to save: Apply does nothing and OK closes
    /// it. Otherwise `confirm` is asked first. When it declines, Apply keeps
    /// the changes and OK discards them. When it agrees, the record is
    /// validated and written in a single transaction. On a failed write the
    /// session stays dirty with its counter intact.
    pub fn request_commit<C: Confirm + ?Sized>(
        &mut self,
        commit: Commit,
        confirm: &mut C,
    ) -> Result<Outcome> {
        self.ensure_open()?;
        let closing = commit == Commit::Ok;

        if self.state == State::Clean {
            if closing {
                self.state = State::Closed;
            }
            return Ok(Outcome::Unchanged);
        }

        let key = self.key_display();
        let prompt = Prompt {
            table: self.form.table.name,
            key: &key,
            changes: self.dirty,
            closing,
        };

        if !confirm.confirm(&prompt) {
            if closing {
                self.discard();
                return Ok(Outcome::Discarded);
            }
            return Ok(Outcome::Declined);
        }

        self.validate_for_create()?;
        let write = self.to_write()?;

        self.state = State::Committing;
        if let Err(e) = self.store.write(&write) {
            log::error!("Saving {} {} failed: {}", write.table, key, e);
            self.state = State::Dirty;
            return Err(Error::WriteFailure(e));
        }

        log::info!(
            "Saved {} {} ({} changes)",
            write.table,
            key,
            self.dirty
        );

        self.persisted = write
            .key
            .iter()
            .chain(write.fields.iter())
            .map(|(name, value)| (*name, value.clone()))
            .collect();
        if let Mode::Create { .. } = self.mode {
            self.mode = Mode::Edit {
                key: write.key.into_iter().map(|(_, value)| value).collect(),
            };
        }
        self.original = self.current.clone();
        self.dirty = 0;
        self.state = if closing { State::Closed } else { State::Clean };

        Ok(Outcome::Saved)
    }

    /// Cancel from the view: close without writing anything
    pub fn cancel(&mut self) -> Result<Outcome> {
        self.ensure_open()?;

        if self.state == State::Clean {
            self.state = State::Closed;
            Ok(Outcome::Unchanged)
        } else {
            self.discard();
            Ok(Outcome::Discarded)
        }
    }

    fn discard(&mut self) {
        log::info!(
            "Discarding {} unsaved changes to {} {}",
            self.dirty,
            self.form.table.name,
            self.key_display()
        );
        self.state = State::Closed;
    }
}

#[cfg(test)]
mod tests;
