use std::borrow::Cow;

use anyhow::Result;

use huddle::{
    prelude::*,
    session::FieldChange,
    team::{QueryTeam, FORM},
};
use tabled::{builder::Builder as TableBuilder, settings::Panel, Table, Tabled};

use crate::cli::{team::*, Commands};
use crate::config::Config;
use crate::utils::Terminal;

struct CommandContext<'a> {
    config: &'a Config,
    db: &'a Database,
}

#[derive(derive_more::From)]
struct TeamToDisplay(Team);

impl Tabled for TeamToDisplay {
    const LENGTH: usize = 7;

    fn fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.0.league_id.as_str().into(),
            self.0.season.to_string().into(),
            self.0.team_id.as_str().into(),
            self.0.team_city.as_str().into(),
            self.0.team_name.as_str().into(),
            self.0.conference.as_deref().unwrap_or_default().into(),
            self.0.division.as_deref().unwrap_or_default().into(),
        ]
    }

    fn headers() -> Vec<Cow<'static, str>> {
        vec![
            "league".into(),
            "season".into(),
            "id".into(),
            "city".into(),
            "name".into(),
            "conference".into(),
            "division".into(),
        ]
    }
}

pub fn run(config: &Config) -> Result<()> {
    let Some(Commands::Team(command)) = config.command() else {
        anyhow::bail!("wrong command passed: {:?}", config.command());
    };

    let db = &config.database()?;
    let cmd = CommandContext { config, db };

    match command {
        Command::List(args) => cmd.list(args),
        Command::Show(args) => cmd.show(args),
        Command::Edit(args) => cmd.edit(args),
        Command::Create(args) => cmd.create(args),
    }
}

impl CommandContext<'_> {
    fn loader(&self) -> SchemaGuardedLoader<'_, Database> {
        SchemaGuardedLoader::new(self.db)
    }

    fn list(&self, args: &List) -> Result<()> {
        let league_id = if args.all_leagues {
            None
        } else {
            args.league.as_deref().or(self.config.default_league())
        };

        let teams = QueryTeam {
            league_id,
            season: args.season,
        }
        .run(&self.loader())?
        .into_iter()
        .map(TeamToDisplay::from)
        .collect::<Vec<_>>();

        if teams.is_empty() {
            println!("No teams found");
        } else {
            println!("{}", Table::new(teams));
        }

        Ok(())
    }

    fn show(&self, args: &Show) -> Result<()> {
        let Key {
            league,
            season,
            team_id,
        } = &args.key;
        let team = Team::find(&self.loader(), league, *season, team_id)?;

        let mut builder = TableBuilder::new();
        push_record!(builder, "League", team.league_id);
        push_record!(builder, "Season", team.season);
        push_record!(builder, "Team id", team.team_id);
        push_record!(builder, "City", team.team_city);
        push_record!(builder, "Name", team.team_name);
        push_record!(builder, "Abbreviation", team.team_abv);
        push_record!(builder, "Nation", team.team_nation);
        push_record!(builder, "Conference", team.conference);
        push_record!(builder, "Division", team.division);
        push_record!(builder, "Stadium", team.stadium);
        push_record!(builder, "MaxPreps id", team.maxpreps_id);

        println!(
            "{}",
            builder.build().with(Panel::header(format!(
                "{} {}",
                team.team_city, team.team_name
            )))
        );

        Ok(())
    }

    fn edit(&self, args: &Edit) -> Result<()> {
        let loader = self.loader();
        let mut session = EditSession::edit(&loader, &FORM, &args.key.values())?;
        let mut terminal = Terminal {
            assume_yes: args.changes.yes,
        };

        apply(&mut session, assignments(&args.changes), &mut terminal)?;

        let intent = if args.ok { Intent::Ok } else { Intent::Apply };
        commit(&mut session, intent, &mut terminal)
    }

    fn create(&self, args: &Create) -> Result<()> {
        let loader = self.loader();
        let mut session = EditSession::create(&loader, &FORM)?;
        let mut terminal = Terminal {
            assume_yes: args.changes.yes,
        };

        let Key {
            league,
            season,
            team_id,
        } = &args.key;
        let season = season.to_string();
        let key = [
            ("league_id", league.as_str()),
            ("season", season.as_str()),
            ("team_id", team_id.as_str()),
        ];
        apply(
            &mut session,
            key.into_iter().chain(assignments(&args.changes)),
            &mut terminal,
        )?;

        // Refuse before asking anything
        session.validate_for_create()?;

        commit(&mut session, Intent::Ok, &mut terminal)
    }
}

fn assignments(changes: &Changes) -> impl Iterator<Item = (&str, &str)> {
    changes
        .assignments
        .iter()
        .map(|(field, value)| (field.as_str(), value.as_str()))
}

/// Feed field changes to the session, telling about the refused characters
fn apply<'a>(
    session: &mut EditSession<'_, Database>,
    changes: impl IntoIterator<Item = (&'a str, &'a str)>,
    terminal: &mut Terminal,
) -> Result<()> {
    for (field, value) in changes {
        let response = session.handle(Intent::Edit { field, value }, terminal)?;
        let kept = session.value(field).unwrap_or_default();

        match response {
            Response::Field(FieldChange::Rejected) => {
                println!("{field}: refused {value:?}, keeping {kept:?}")
            }
            Response::Field(FieldChange::Truncated) => {
                println!("{field}: stored as {kept:?}")
            }
            _ => {}
        }
    }

    Ok(())
}

fn commit(
    session: &mut EditSession<'_, Database>,
    intent: Intent<'_>,
    terminal: &mut Terminal,
) -> Result<()> {
    let key = session.key_display();

    match session.handle(intent, terminal)? {
        Response::Commit(Outcome::Saved) => println!("Saved team {key}"),
        Response::Commit(Outcome::Unchanged) => println!("Nothing to save for team {key}"),
        Response::Commit(Outcome::Declined) | Response::Commit(Outcome::Discarded) => {
            anyhow::bail!("operation requires confirmation")
        }
        Response::Field(change) => anyhow::bail!("unexpected field change {:?}", change),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::prelude::{assert_eq, *};

    #[test]
    fn display() {
        let team = Team {
            league_id: "DEFL".to_owned(),
            season: 2019,
            team_id: "UGF".to_owned(),
            team_city: "Fairburn".to_owned(),
            team_name: "Gridiron Foxes".to_owned(),
            team_abv: "UGF".to_owned(),
            team_nation: None,
            conference: Some("South".to_owned()),
            division: None,
            stadium: None,
            maxpreps_id: None,
        };

        assert_eq!(
            vec!["DEFL", "2019", "UGF", "Fairburn", "Gridiron Foxes", "South", ""],
            TeamToDisplay(team).fields()
        );
        assert_eq!(TeamToDisplay::LENGTH, TeamToDisplay::headers().len());
    }

    #[test]
    fn edit_from_config() -> Result<()> {
        with_config_args(
            &["team", "edit", "DEFL", "2019", "UGF", "--set", "team_city=Atlanta", "--yes"],
            |config| {
                run(config)?;

                let db = config.database()?;
                let loader = SchemaGuardedLoader::new(&db);
                let team = Team::find(&loader, "DEFL", 2019, "UGF")?;
                assert_eq!("Atlanta", team.team_city);

                Ok(())
            },
        )
    }
}
