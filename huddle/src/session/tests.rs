use super::*;
use crate::{
    database::StoreError,
    team::{Team, FORM},
    test::prelude::{assert_eq, Result, *},
};

fn ugf() -> [Value; 3] {
    [Value::from("DEFL"), Value::from(2019i64), Value::from("UGF")]
}

fn fairburn(loader: &SchemaGuardedLoader<'_, impl Store + ?Sized>) -> crate::Result<Team> {
    Team::find(loader, "DEFL", 2019, "UGF")
}

/// Records every prompt and gives the same answer to all of them
struct Dialog {
    answer: bool,
    prompts: Vec<String>,
}

impl Dialog {
    fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Vec::new(),
        }
    }
}

impl Confirm for Dialog {
    fn confirm(&mut self, prompt: &Prompt<'_>) -> bool {
        self.prompts.push(prompt.to_string());
        self.answer
    }
}

#[test]
fn edit_and_apply() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    assert_eq!(State::Clean, session.state());
    assert_eq!(0, session.dirty());
    assert_eq!(Some("Fairburn"), session.value("team_city"));

    assert_eq!(
        FieldChange::Accepted,
        session.apply_field("team_city", "Atlanta")?
    );
    assert_eq!(1, session.dirty());
    assert_eq!(State::Dirty, session.state());
    assert_eq!(vec!["team_city"], session.changed_fields());

    let mut dialog = Dialog::answering(true);
    assert_eq!(
        Outcome::Saved,
        session.request_commit(Commit::Apply, &mut dialog)?
    );
    assert_eq!(
        vec!["Save 1 unsaved change to teams DEFL/2019/UGF?"],
        dialog.prompts
    );
    assert_eq!(0, session.dirty());
    assert_eq!(State::Clean, session.state());
    assert!(session.changed_fields().is_empty());
    assert_eq!(Some("Atlanta"), session.original("team_city"));

    let team = fairburn(&loader)?;
    assert_eq!("Atlanta", team.team_city);
    assert_eq!("Gridiron Foxes", team.team_name);
    assert_eq!(Some("Duncan Park"), team.stadium.as_deref());

    Ok(())
}

#[test]
fn counter_counts_every_accepted_change() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("team_city", "Atlanta")?;
    session.apply_field("team_city", "Atlanta")?;
    session.apply_field("team_city", "Fairburn")?;
    session.apply_field("stadium", "Home Depot Field!")?;

    assert_eq!(3, session.dirty());
    assert_eq!(State::Dirty, session.state());
    // Back to the stored value, but still changes the user made
    assert_eq!(vec!["stadium"], session.changed_fields());
    assert_eq!(Some("Home Depot Field"), session.value("stadium"));

    Ok(())
}

#[test]
fn refused_characters() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    assert_eq!(
        FieldChange::Rejected,
        session.apply_field("team_abv", "UGF!")?
    );
    assert_eq!(Some("UGF"), session.value("team_abv"));
    assert_eq!(0, session.dirty());
    assert_eq!(State::Clean, session.state());

    assert_eq!(
        FieldChange::Truncated,
        session.apply_field("team_abv", "AT L")?
    );
    assert_eq!(Some("ATL"), session.value("team_abv"));
    assert_eq!(
        FieldChange::Truncated,
        session.apply_field("team_nation", "CAN")?
    );
    assert_eq!(Some("CA"), session.value("team_nation"));
    assert_eq!(
        FieldChange::Rejected,
        session.apply_field("team_nation", "CAD")?
    );
    assert_eq!(2, session.dirty());

    assert_eq!(
        FieldChange::Unchanged,
        session.apply_field("team_abv", "ATL")?
    );
    assert_eq!(2, session.dirty());

    Ok(())
}

#[test]
fn declined_apply_keeps_changes() -> Result<()> {
    let db = test::db()?;
    let store = test::Recording::new(&db);
    let loader = SchemaGuardedLoader::new(&store);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("team_city", "Atlanta")?;
    session.apply_field("stadium", "Home Depot Field")?;

    let mut dialog = Dialog::answering(false);
    assert_eq!(
        Outcome::Declined,
        session.request_commit(Commit::Apply, &mut dialog)?
    );
    assert_eq!(1, dialog.prompts.len());
    assert_eq!(State::Dirty, session.state());
    assert_eq!(2, session.dirty());
    assert_eq!(Some("Atlanta"), session.value("team_city"));
    assert_eq!(0, store.writes());
    assert_eq!("Fairburn", fairburn(&loader)?.team_city);

    Ok(())
}

#[test]
fn declined_ok_discards() -> Result<()> {
    let db = test::db()?;
    let store = test::Recording::new(&db);
    let loader = SchemaGuardedLoader::new(&store);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("team_city", "Atlanta")?;

    let mut dialog = Dialog::answering(false);
    assert_eq!(
        Outcome::Discarded,
        session.request_commit(Commit::Ok, &mut dialog)?
    );
    assert_eq!(
        vec!["Save 1 unsaved change to teams DEFL/2019/UGF? Otherwise they are discarded."],
        dialog.prompts
    );
    assert_eq!(State::Closed, session.state());
    assert_eq!(0, store.writes());
    assert_eq!("Fairburn", fairburn(&loader)?.team_city);

    Ok(())
}

#[test]
fn ok_saves_and_closes() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("maxpreps_id", "4242")?;
    assert_eq!(
        Outcome::Saved,
        session.request_commit(Commit::Ok, &mut Answer::Yes)?
    );
    assert_eq!(State::Closed, session.state());
    assert_eq!(Some(4242), fairburn(&loader)?.maxpreps_id);

    Ok(())
}

#[test]
fn clean_session_has_nothing_to_save() -> Result<()> {
    let db = test::db()?;
    let store = test::Recording::new(&db);
    let loader = SchemaGuardedLoader::new(&store);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;
    let mut dialog = Dialog::answering(true);

    assert_eq!(
        Outcome::Unchanged,
        session.request_commit(Commit::Apply, &mut dialog)?
    );
    assert_eq!(State::Clean, session.state());

    assert_eq!(
        Outcome::Unchanged,
        session.request_commit(Commit::Ok, &mut dialog)?
    );
    assert_eq!(State::Closed, session.state());
    assert!(dialog.prompts.is_empty());
    assert_eq!(0, store.writes());

    Ok(())
}

#[test]
fn closed_session_refuses_events() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("team_city", "Atlanta")?;
    assert_eq!(Outcome::Discarded, session.cancel()?);
    assert_eq!(State::Closed, session.state());

    assert!(matches!(
        session.apply_field("team_city", "Fairburn"),
        Err(Error::SessionClosed)
    ));
    assert!(matches!(
        session.request_commit(Commit::Apply, &mut Answer::Yes),
        Err(Error::SessionClosed)
    ));
    assert!(matches!(session.cancel(), Err(Error::SessionClosed)));

    Ok(())
}

#[test]
fn cancel_writes_nothing() -> Result<()> {
    let db = test::db()?;
    let store = test::Recording::new(&db);
    let loader = SchemaGuardedLoader::new(&store);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("team_city", "Atlanta")?;
    session.apply_field("division", "West")?;
    assert_eq!(Outcome::Discarded, session.cancel()?);
    assert_eq!(0, store.writes());

    let reopened = EditSession::edit(&loader, &FORM, &ugf())?;
    assert_eq!(Some("Fairburn"), reopened.value("team_city"));
    assert_eq!(Some("East"), reopened.value("division"));

    Ok(())
}

#[test]
fn failed_write_keeps_session_dirty() -> Result<()> {
    let db = test::db()?;
    let store = test::FailingWrites::new(&db);
    let loader = SchemaGuardedLoader::new(&store);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("team_city", "Atlanta")?;
    session.apply_field("stadium", "Home Depot Field")?;

    assert!(matches!(
        session.request_commit(Commit::Ok, &mut Answer::Yes),
        Err(Error::WriteFailure(StoreError::Sqlite(_)))
    ));
    assert_eq!(State::Dirty, session.state());
    assert_eq!(2, session.dirty());
    assert_eq!(Some("Atlanta"), session.value("team_city"));
    assert_eq!("Fairburn", fairburn(&loader)?.team_city);

    store.failing.set(false);
    assert_eq!(
        Outcome::Saved,
        session.request_commit(Commit::Apply, &mut Answer::Yes)?
    );
    let team = fairburn(&loader)?;
    assert_eq!("Atlanta", team.team_city);
    assert_eq!(Some("Home Depot Field"), team.stadium.as_deref());

    Ok(())
}

#[test]
fn untouched_fields_are_written_as_read() -> Result<()> {
    let db = test::db()?;
    db.connection.execute(
        "UPDATE teams SET stadium = '  Duncan Park  ', division = ''
        WHERE team_id = 'UGF'",
        (),
    )?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("team_city", "Atlanta")?;
    assert_eq!(
        Outcome::Saved,
        session.request_commit(Commit::Apply, &mut Answer::Yes)?
    );

    let read = |db: &Database| -> rusqlite::Result<(String, Option<String>, Option<String>)> {
        db.connection.query_row(
            "SELECT team_city, stadium, division FROM teams WHERE team_id = 'UGF'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
    };
    assert_eq!(
        (
            "Atlanta".to_owned(),
            Some("  Duncan Park  ".to_owned()),
            Some("".to_owned())
        ),
        read(&db)?
    );

    // Edited fields are trimmed, and emptied ones become NULL
    session.apply_field("team_city", " Fairburn ")?;
    session.apply_field("stadium", "")?;
    session.request_commit(Commit::Apply, &mut Answer::Yes)?;
    assert_eq!(
        ("Fairburn".to_owned(), None, Some("".to_owned())),
        read(&db)?
    );

    Ok(())
}

#[test]
fn insert_race_keeps_session_dirty() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::create(&loader, &FORM)?;
    fill_new_team(&mut session, "ATL")?;

    db.connection.execute(
        "INSERT INTO teams (league_id, season, team_id, team_city, team_name, team_abv)
        VALUES ('DEFL', 2019, 'ATL', 'Atlanta', 'Hawks', 'ATL')",
        (),
    )?;

    let error = session
        .request_commit(Commit::Apply, &mut Answer::Yes)
        .unwrap_err();
    assert!(error.is_non_unique());
    assert!(matches!(
        error,
        Error::WriteFailure(StoreError::NonUnique(_))
    ));
    assert_eq!(State::Dirty, session.state());
    assert_eq!(6, session.dirty());
    assert!(session.is_creating());
    assert_eq!(
        "Hawks",
        Team::find(&loader, "DEFL", 2019, "ATL")?.team_name
    );

    Ok(())
}

#[test]
fn aborted_write_leaves_row_intact() -> Result<()> {
    let db = test::db()?;
    db.connection.execute_batch(
        "CREATE TRIGGER freeze_teams BEFORE UPDATE ON teams
        BEGIN SELECT RAISE(ABORT, 'teams are frozen'); END;",
    )?;
    let loader = SchemaGuardedLoader::new(&db);
    let before = fairburn(&loader)?;

    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;
    session.apply_field("team_city", "Atlanta")?;
    session.apply_field("conference", "North")?;

    let error = session
        .request_commit(Commit::Apply, &mut Answer::Yes)
        .unwrap_err();
    assert!(matches!(error, Error::WriteFailure(_)));
    assert_eq!(State::Dirty, session.state());
    assert_eq!(2, session.dirty());
    assert_eq!(before, fairburn(&loader)?);

    Ok(())
}

#[test]
fn key_fields_are_immutable() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    assert!(matches!(
        session.apply_field("season", "2020"),
        Err(Error::ImmutableField("season"))
    ));
    assert!(matches!(
        session.apply_field("coach", "Smith"),
        Err(Error::UnknownField(_))
    ));
    assert_eq!(0, session.dirty());

    Ok(())
}

#[test]
fn edit_missing_record() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);

    let key = [Value::from("DEFL"), Value::from(2019i64), Value::from("ATL")];
    let error = EditSession::edit(&loader, &FORM, &key).err().unwrap();
    assert!(error.is_not_found());

    Ok(())
}

#[test]
fn edit_rebuilds_missing_table() -> Result<()> {
    let db = Database::memory()?;
    let loader = SchemaGuardedLoader::new(&db);

    let session = EditSession::edit(&loader, &FORM, &ugf())?;
    assert_eq!(Some("Gridiron Foxes"), session.value("team_name"));

    Ok(())
}

#[test]
fn required_fields() -> Result<()> {
    let db = test::db()?;
    let store = test::Recording::new(&db);
    let loader = SchemaGuardedLoader::new(&store);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("team_name", "")?;
    session.apply_field("stadium", "")?;

    let error = session
        .request_commit(Commit::Apply, &mut Answer::Yes)
        .unwrap_err();
    assert!(matches!(
        error,
        Error::Validation(ValidationError::Required {
            field: "team_name",
            ..
        })
    ));
    assert_eq!("Invalid. Name is required", error.to_string());
    assert_eq!(State::Dirty, session.state());
    assert_eq!(2, session.dirty());
    assert_eq!(0, store.writes());

    session.apply_field("team_name", "Foxes")?;
    assert_eq!(
        Outcome::Saved,
        session.request_commit(Commit::Apply, &mut Answer::Yes)?
    );
    // Optional fields left empty are stored as NULL
    assert_eq!(None, fairburn(&loader)?.stadium);

    Ok(())
}

#[test]
fn bounds() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::edit(&loader, &FORM, &ugf())?;

    session.apply_field("maxpreps_id", "123456789")?;
    assert!(matches!(
        session.validate_for_create(),
        Err(ValidationError::OutOfRange {
            field: "maxpreps_id",
            min: 1,
            max: 99_999_999,
            ..
        })
    ));

    session.apply_field("maxpreps_id", "0")?;
    assert!(session.validate_for_create().is_err());

    session.apply_field("maxpreps_id", "99999999")?;
    assert_eq!(Ok(()), session.validate_for_create());

    Ok(())
}

fn fill_new_team(session: &mut EditSession<'_, impl Store + ?Sized>, team_id: &str) -> Result<()> {
    for (field, value) in [
        ("league_id", "DEFL"),
        ("season", "2019"),
        ("team_id", team_id),
        ("team_city", "Atlanta"),
        ("team_name", "Falcons"),
        ("team_abv", "ATL"),
    ] {
        assert_eq!(FieldChange::Accepted, session.apply_field(field, value)?);
    }
    Ok(())
}

#[test]
fn create_rejects_existing_key() -> Result<()> {
    let db = test::db()?;
    let store = test::Recording::new(&db);
    let loader = SchemaGuardedLoader::new(&store);
    let mut session = EditSession::create(&loader, &FORM)?;

    fill_new_team(&mut session, "UGF")?;
    assert!(matches!(
        session.validate_for_create(),
        Err(ValidationError::DuplicateKey { table: "teams", ref key }) if key == "DEFL/2019/UGF"
    ));

    let error = session
        .request_commit(Commit::Apply, &mut Answer::Yes)
        .unwrap_err();
    assert_eq!(
        "Invalid. teams DEFL/2019/UGF already exists",
        error.to_string()
    );
    assert_eq!(0, store.writes());
    assert_eq!(State::Dirty, session.state());
    assert_eq!("Fairburn", fairburn(&loader)?.team_city);

    Ok(())
}

#[test]
fn create_then_edit() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::create(&loader, &FORM)?;

    assert!(session.is_creating());
    assert!(matches!(
        session.validate_for_create(),
        Err(ValidationError::Required {
            field: "league_id",
            ..
        })
    ));

    fill_new_team(&mut session, "ATL")?;
    assert_eq!(6, session.dirty());
    assert_eq!("DEFL/2019/ATL", session.key_display());

    let mut dialog = Dialog::answering(true);
    assert_eq!(
        Outcome::Saved,
        session.request_commit(Commit::Apply, &mut dialog)?
    );
    assert_eq!(
        vec!["Save 6 unsaved changes to teams DEFL/2019/ATL?"],
        dialog.prompts
    );
    assert!(!session.is_creating());

    let team = Team::find(&loader, "DEFL", 2019, "ATL")?;
    assert_eq!("Falcons", team.team_name);
    assert_eq!(None, team.team_nation);

    // Now an edit of the inserted row
    assert!(matches!(
        session.apply_field("team_id", "FAL"),
        Err(Error::ImmutableField("team_id"))
    ));
    session.apply_field("team_nation", "US")?;
    assert_eq!(
        Outcome::Saved,
        session.request_commit(Commit::Ok, &mut dialog)?
    );
    assert_eq!(
        Some("US"),
        Team::find(&loader, "DEFL", 2019, "ATL")?
            .team_nation
            .as_deref()
    );
    assert_eq!(
        7,
        crate::team::QueryTeam::default().run(&loader)?.len()
    );

    Ok(())
}

#[test]
fn create_season_out_of_range() -> Result<()> {
    let db = test::db()?;
    let loader = SchemaGuardedLoader::new(&db);
    let mut session = EditSession::create(&loader, &FORM)?;

    fill_new_team(&mut session, "ATL")?;
    session.apply_field("season", "1776")?;

    assert!(matches!(
        session.request_commit(Commit::Ok, &mut Answer::Yes),
        Err(Error::Validation(ValidationError::OutOfRange {
            field: "season",
            ..
        }))
    ));
    assert_eq!(State::Dirty, session.state());

    Ok(())
}
