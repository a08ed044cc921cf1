#[macro_use]
pub mod table_display;

use anyhow::Result;

use huddle::session::{Confirm, Prompt};

pub fn confirm() -> Result<bool> {
    println!("Do you really want to do that?");

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim() == "yes")
}

/// Asks on the terminal unless the answer was given on the command line
pub struct Terminal {
    pub assume_yes: bool,
}

impl Confirm for Terminal {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> bool {
        if self.assume_yes {
            log::debug!("{} yes (--yes)", prompt);
            return true;
        }

        println!("{} Type yes to confirm", prompt);

        let mut input = String::new();
        match std::io::stdin().read_line(&mut input) {
            Ok(_) => input.trim() == "yes",
            Err(e) => {
                log::error!("Could not read the answer: {}", e);
                false
            }
        }
    }
}
