pub mod database;
pub mod loader;
pub mod session;
pub mod table;
pub mod tables;

pub mod team;

mod result;

pub use database::{Database, Store};
pub use loader::SchemaGuardedLoader;
pub use result::{Error, Result};

pub mod prelude {
    pub use crate::{
        session::{Answer, Commit, Confirm, EditSession, Intent, Outcome, Response, State},
        table::{Row, Rows, TableSpec, Value},
        team::{QueryTeam, Team},
        Database, Error, Result, SchemaGuardedLoader, Store,
    };
}
