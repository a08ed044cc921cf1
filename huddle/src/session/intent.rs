use super::{Commit, Confirm, EditSession, FieldChange, Outcome};
use crate::{database::Store, Result};

/// What the view asks of an edit session
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent<'a> {
    Edit { field: &'a str, value: &'a str },
    Apply,
    Ok,
    Cancel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Field(FieldChange),
    Commit(Outcome),
}

impl<S: Store + ?Sized> EditSession<'_, S> {
    pub fn handle<C: Confirm + ?Sized>(
        &mut self,
        intent: Intent<'_>,
        confirm: &mut C,
    ) -> Result<Response> {
        Ok(match intent {
            Intent::Edit { field, value } => Response::Field(self.apply_field(field, value)?),
            Intent::Apply => Response::Commit(self.request_commit(Commit::Apply, confirm)?),
            Intent::Ok => Response::Commit(self.request_commit(Commit::Ok, confirm)?),
            Intent::Cancel => Response::Commit(self.cancel()?),
        })
    }
}
