use crate::{
    database::{Store, StoreError},
    table::{Row, Rows, TableSpec},
    Error, Result,
};

/// Reads tables, recreating any that went missing
///
/// A call to [`load`](Self::load) rebuilds at most once and retries at most
/// once, so a broken creation script can not make it loop.
pub struct SchemaGuardedLoader<'s, S: Store + ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> SchemaGuardedLoader<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    pub fn load(&self, spec: &'static TableSpec) -> Result<Rows> {
        let (raw, rebuilt) = match self.store.read(spec) {
            Ok(raw) => (raw, false),
            Err(StoreError::SchemaMissing(table)) => {
                log::warn!(
                    "Table {} is missing (no such table: {}), rebuilding it",
                    spec.name,
                    table
                );

                (self.rebuild_and_retry(spec)?, true)
            }
            Err(e) => {
                log::error!("Unexpected error reading table {}: {}", spec.name, e);
                return Err(Error::UnexpectedStore(e));
            }
        };

        let rows = raw
            .into_iter()
            .map(|values| Self::cast(spec, values))
            .collect::<Result<Vec<_>>>()?;

        if rows.is_empty() {
            if rebuilt {
                log::warn!("Table {} is empty after rebuild", spec.name);
            } else if spec.seeded {
                log::error!(
                    "Table {} should hold reference data but is empty",
                    spec.name
                );
            } else {
                log::debug!("Table {} is empty", spec.name);
            }
        } else {
            log::debug!("Loaded {} rows from {}", rows.len(), spec.name);
        }

        Ok(Rows::new(spec, rows, rebuilt))
    }

    fn rebuild_and_retry(
        &self,
        spec: &'static TableSpec,
    ) -> Result<Vec<Vec<rusqlite::types::Value>>> {
        let failed = |source: StoreError| {
            log::error!("Could not recover table {}: {}", spec.name, source);
            Error::SchemaRebuildFailed {
                table: spec.name.to_owned(),
                source,
            }
        };

        self.store.rebuild(spec).map_err(failed)?;
        self.store.read(spec).map_err(failed)
    }

    fn cast(spec: &'static TableSpec, values: Vec<rusqlite::types::Value>) -> Result<Row> {
        let values = spec
            .columns
            .iter()
            .zip(values)
            .map(|(column, raw)| {
                column.kind.cast(raw).map_err(|source| Error::Cast {
                    table: spec.name,
                    column: column.name,
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Row::new(spec.columns, values))
    }
}
