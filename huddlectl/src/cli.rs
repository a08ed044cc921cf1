use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod table;
pub mod team;

/// Huddle control
#[derive(Default, Clone, Debug, Parser)]
#[command(version, infer_subcommands = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Sets a custom config directory
    ///
    /// The default value is $HUDDLE_CONFIG if it is set, or
    /// $XDG_CONFIG_HOME/huddle otherwise
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        global = true,
        help_heading = "Global options"
    )]
    pub config: Option<PathBuf>,

    /// Sets a custom data directory
    ///
    /// The default value is $HUDDLE_DATA if it is set, or
    /// $XDG_DATA_HOME/huddle otherwise
    #[arg(
        short = 'D',
        long,
        value_name = "DIR",
        global = true,
        help_heading = "Global options"
    )]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Inspect the tables of the database
    #[command(subcommand)]
    Table(table::Command),
    /// Team related commands
    #[command(subcommand)]
    Team(team::Command),
    /// Reset the database
    #[command(hide = true)]
    Reset {
        #[arg(long, required = true)]
        confirm: bool,
    },
}
