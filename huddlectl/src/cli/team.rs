use clap::{Args, Subcommand};

use huddle::table::Value;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List teams
    List(List),
    /// Show details about a team
    Show(Show),
    /// Change fields of a team
    Edit(Edit),
    /// Create a new team
    Create(Create),
}

#[derive(Args, Clone, Debug)]
pub struct Key {
    /// League of the team
    pub league: String,

    /// Season of the team
    pub season: i64,

    /// Identifier of the team in the league
    pub team_id: String,
}

impl Key {
    pub fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.league.as_str()),
            Value::from(self.season),
            Value::from(self.team_id.as_str()),
        ]
    }
}

#[derive(Args, Clone, Debug)]
pub struct List {
    /// Show only teams of this league
    ///
    /// The default value is default_league from the configuration
    #[arg(short = 'l', long, help_heading = "Filter teams")]
    pub league: Option<String>,

    /// Show teams of every league
    #[arg(long, conflicts_with = "league", help_heading = "Filter teams")]
    pub all_leagues: bool,

    /// Show only teams of this season
    #[arg(short = 's', long, help_heading = "Filter teams")]
    pub season: Option<i64>,
}

#[derive(Args, Clone, Debug)]
pub struct Show {
    #[command(flatten)]
    pub key: Key,
}

#[derive(Args, Clone, Debug)]
pub struct Edit {
    #[command(flatten)]
    pub key: Key,

    #[command(flatten)]
    pub changes: Changes,

    /// Close the record after saving instead of applying the changes
    #[arg(long)]
    pub ok: bool,
}

#[derive(Args, Clone, Debug)]
pub struct Create {
    #[command(flatten)]
    pub key: Key,

    #[command(flatten)]
    pub changes: Changes,
}

#[derive(Args, Clone, Debug)]
pub struct Changes {
    /// Value to give to a field, can be repeated
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,

    /// Save without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected FIELD=VALUE, got {arg:?}")),
    }
}
