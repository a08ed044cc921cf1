use clap::{Args, Subcommand};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the tables known to huddle
    List,
    /// Show the rows of a table, recreating it if it went missing
    Show(Show),
}

#[derive(Args, Clone, Debug)]
pub struct Show {
    /// Name of the table
    pub name: String,

    /// Maximum number of rows to show
    #[arg(short = 'c', long)]
    pub count: Option<usize>,
}
