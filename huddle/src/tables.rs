//! Every table the application depends on

use crate::table::{Column, ColumnType::*, TableSpec};

pub static TEAMS: TableSpec = TableSpec {
    name: "teams",
    script: include_str!("../sql/teams.sql"),
    columns: &[
        Column::new("league_id", Text),
        Column::new("season", Integer),
        Column::new("team_id", Text),
        Column::new("team_city", Text),
        Column::new("team_name", Text),
        Column::new("team_abv", Text),
        Column::new("team_nation", Text),
        Column::new("conference", Text),
        Column::new("division", Text),
        Column::new("stadium", Text),
        Column::new("maxpreps_id", Integer),
    ],
    key: &["league_id", "season", "team_id"],
    seeded: true,
};

pub static ISO_NATIONS: TableSpec = TableSpec {
    name: "iso_nations",
    script: include_str!("../sql/iso_nations.sql"),
    columns: &[
        Column::new("alpha2", Text),
        Column::new("alpha3", Text),
        Column::new("name", Text),
    ],
    key: &["alpha2"],
    seeded: true,
};

pub static TIMEZONES: TableSpec = TableSpec {
    name: "timezones",
    script: include_str!("../sql/timezones.sql"),
    columns: &[
        Column::new("tz_name", Text),
        Column::new("utc_offset", Text),
        Column::new("observes_dst", Boolean),
    ],
    key: &["tz_name"],
    seeded: true,
};

/// Empty until a game is recorded
pub static PLAY_BY_PLAY: TableSpec = TableSpec {
    name: "play_by_play",
    script: include_str!("../sql/play_by_play.sql"),
    columns: &[
        Column::new("game_id", Text),
        Column::new("play_number", Integer),
        Column::new("quarter", Integer),
        Column::new("clock", Text),
        Column::new("offense", Text),
        Column::new("down", Integer),
        Column::new("distance", Integer),
        Column::new("yard_line", Integer),
        Column::new("description", Text),
    ],
    key: &["game_id", "play_number"],
    seeded: false,
};

pub static ALL: &[&TableSpec] = &[&TEAMS, &ISO_NATIONS, &TIMEZONES, &PLAY_BY_PLAY];

pub fn find(name: &str) -> crate::Result<&'static TableSpec> {
    ALL.iter()
        .copied()
        .find(|spec| spec.name == name)
        .ok_or_else(|| crate::Error::UnknownTable(name.to_owned()))
}
