use std::fmt;

/// Question asked before unsaved changes are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt<'a> {
    pub table: &'a str,
    pub key: &'a str,
    pub changes: u32,
    /// The session closes whatever the answer
    pub closing: bool,
}

impl fmt::Display for Prompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Save {} unsaved change{} to {} {}?",
            self.changes,
            if self.changes == 1 { "" } else { "s" },
            self.table,
            self.key
        )?;
        if self.closing {
            write!(f, " Otherwise they are discarded.")?;
        }
        Ok(())
    }
}

/// The yes/no dialog shown by the view
pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> bool;
}

/// A fixed answer, given without asking anyone
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Confirm for Answer {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> bool {
        log::debug!("{} {:?}", prompt, self);
        *self == Answer::Yes
    }
}
