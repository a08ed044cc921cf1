use crate::{
    database::Store,
    loader::SchemaGuardedLoader,
    session::{CharClass::*, FieldPolicy, Form},
    table::{CastError, ColumnType, Row, Value},
    tables::TEAMS,
    Error, Result,
};

/// Earliest season a team may be recorded for
pub const FIRST_SEASON: i64 = 1869;
pub const LAST_SEASON: i64 = 2100;
pub const MAXPREPS_ID_MAX: i64 = 99_999_999;

pub static FORM: Form = Form {
    table: &TEAMS,
    fields: &[
        FieldPolicy::new("league_id", "League", Alphanumeric, 8).required(),
        FieldPolicy::new("season", "Season", Numeric, 4)
            .required()
            .bounded(FIRST_SEASON, LAST_SEASON),
        FieldPolicy::new("team_id", "Team id", Alphanumeric, 4).required(),
        FieldPolicy::new("team_city", "City", Name, 40).required(),
        FieldPolicy::new("team_name", "Name", Name, 40).required(),
        FieldPolicy::new("team_abv", "Abbreviation", Alphanumeric, 4).required(),
        FieldPolicy::new("team_nation", "Nation", Alphabetic, 2),
        FieldPolicy::new("conference", "Conference", Name, 40),
        FieldPolicy::new("division", "Division", Name, 40),
        FieldPolicy::new("stadium", "Stadium", Name, 60),
        FieldPolicy::new("maxpreps_id", "MaxPreps id", Numeric, 9).bounded(1, MAXPREPS_ID_MAX),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub league_id: String,
    pub season: i64,
    pub team_id: String,
    pub team_city: String,
    pub team_name: String,
    pub team_abv: String,
    pub team_nation: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub stadium: Option<String>,
    pub maxpreps_id: Option<i64>,
}

fn missing(column: &'static str, expected: ColumnType) -> Error {
    Error::Cast {
        table: TEAMS.name,
        column,
        source: CastError {
            expected,
            found: "NULL".to_owned(),
        },
    }
}

fn text(row: &Row, column: &'static str) -> Result<String> {
    row.text(column)
        .map(str::to_owned)
        .ok_or_else(|| missing(column, ColumnType::Text))
}

fn optional_text(row: &Row, column: &'static str) -> Option<String> {
    row.text(column).map(str::to_owned)
}

impl TryFrom<&Row> for Team {
    type Error = Error;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(Team {
            league_id: text(row, "league_id")?,
            season: row
                .integer("season")
                .ok_or_else(|| missing("season", ColumnType::Integer))?,
            team_id: text(row, "team_id")?,
            team_city: text(row, "team_city")?,
            team_name: text(row, "team_name")?,
            team_abv: text(row, "team_abv")?,
            team_nation: optional_text(row, "team_nation"),
            conference: optional_text(row, "conference"),
            division: optional_text(row, "division"),
            stadium: optional_text(row, "stadium"),
            maxpreps_id: row.integer("maxpreps_id"),
        })
    }
}

impl Team {
    pub fn key(&self) -> Vec<Value> {
        vec![
            self.league_id.as_str().into(),
            self.season.into(),
            self.team_id.as_str().into(),
        ]
    }

    pub fn find<S: Store + ?Sized>(
        loader: &SchemaGuardedLoader<'_, S>,
        league_id: &str,
        season: i64,
        team_id: &str,
    ) -> Result<Self> {
        let key = [
            Value::from(league_id),
            Value::from(season),
            Value::from(team_id),
        ];

        match loader.load(&TEAMS)?.find(&key) {
            Some(row) => row.try_into(),
            None => Err(Error::NotFound(format!(
                "Team {league_id}/{season}/{team_id}"
            ))),
        }
    }
}

#[derive(Default, Debug)]
pub struct QueryTeam<'a> {
    pub league_id: Option<&'a str>,
    pub season: Option<i64>,
}

impl QueryTeam<'_> {
    pub fn run<S: Store + ?Sized>(&self, loader: &SchemaGuardedLoader<'_, S>) -> Result<Vec<Team>> {
        loader
            .load(&TEAMS)?
            .iter()
            .filter(|row| {
                self.league_id
                    .map_or(true, |league| row.text("league_id") == Some(league))
            })
            .filter(|row| {
                self.season
                    .map_or(true, |season| row.integer("season") == Some(season))
            })
            .map(Team::try_from)
            .collect()
    }
}
