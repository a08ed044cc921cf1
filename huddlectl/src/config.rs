use std::fs::create_dir_all;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use toml::{Table, Value};

use huddle::Database;

use crate::cli::{Cli, Commands};

const DEFAULT_DB_FILENAME: &str = "db.huddle";

#[derive(Debug)]
pub struct Config {
    pub dir: PathBuf,
    pub data_dir: PathBuf,
    cli: Cli,
    table: Table,
}

impl Config {
    pub fn try_parse() -> Result<Self> {
        Self::try_parse_from(std::env::args_os())
    }

    pub fn try_parse_from<I, T>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        use clap::Parser;

        let cli = Cli::try_parse_from(iter)?;

        let dir = match &cli.config {
            Some(dir) => dir.clone(),
            None => config_home()?,
        };
        let table = match std::fs::read_to_string(dir.join("config.toml")) {
            Ok(content) => content.parse::<Table>()?,
            Err(_) => Table::new(),
        };

        let data_dir = match (&cli.data, table.get("data_dir").and_then(Value::as_str)) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dir)) => PathBuf::from(dir),
            (None, None) => data_home()?,
        };

        if !data_dir.is_dir() {
            return Err(anyhow!(
                "Data directory is not a dir: {}",
                data_dir.display()
            ));
        }

        Ok(Config {
            dir,
            data_dir,
            cli,
            table,
        })
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.cli.verbose.log_level_filter()
    }

    pub fn command(&self) -> Option<&Commands> {
        self.cli.command.as_ref()
    }

    /// League used when a command does not name one
    pub fn default_league(&self) -> Option<&str> {
        self.table.get("default_league").and_then(Value::as_str)
    }

    pub fn database_path(&self) -> PathBuf {
        let db_filename = self
            .table
            .get("db")
            .and_then(Value::as_table)
            .and_then(|db| db.get("filename"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DB_FILENAME);

        self.data_dir.join(db_filename)
    }

    pub fn database(&self) -> Result<Database> {
        let db = Database::open(self.database_path())?;
        db.setup()?;
        Ok(db)
    }
}

fn config_home() -> Result<PathBuf> {
    match std::env::var("HUDDLE_CONFIG") {
        Ok(val) if !val.is_empty() => Ok(PathBuf::from(val)),
        _ => {
            let path = xdg::BaseDirectories::with_prefix("huddle")?.get_config_home();
            if !path.exists() {
                create_dir_all(&path)?;
            }
            Ok(path)
        }
    }
}

fn data_home() -> Result<PathBuf> {
    match std::env::var("HUDDLE_DATA") {
        Ok(val) if !val.is_empty() => Ok(PathBuf::from(val)),
        _ => {
            let path = xdg::BaseDirectories::with_prefix("huddle")?.get_data_home();
            if !path.exists() {
                create_dir_all(&path)?;
            }
            Ok(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::prelude::{assert_eq, *};
    use std::fs::create_dir;

    #[test]
    fn parse() -> Result<()> {
        with_dirs(|confd, datad| {
            let mut config = Config::try_parse_from(["arg0"])?;

            assert_eq!(config.dir, confd.path());
            assert_eq!(config.data_dir, datad.path());
            assert_eq!(config.database_path(), datad.child("db.huddle").path());
            assert_eq!(None, config.default_league());

            confd.child("config.toml").write_str(&format!(
                "data_dir = '{}'",
                datad.child("foo").path().display()
            ))?;

            assert!(Config::try_parse_from(["arg0"]).is_err());
            create_dir(datad.child("foo").path())?;
            config = Config::try_parse_from(["arg0"])?;
            assert_eq!(config.data_dir, datad.child("foo").path());

            config = Config::try_parse_from([
                "arg0",
                "--config",
                datad.child("bar").path().to_str().unwrap(),
            ])?;
            assert_eq!(config.dir, datad.child("bar").path());

            create_dir(datad.child("bar").path())?;
            config = Config::try_parse_from([
                "arg0",
                "-D",
                datad.child("bar").path().to_str().unwrap(),
            ])?;
            assert_eq!(config.data_dir, datad.child("bar").path());

            Ok(())
        })
    }

    #[test]
    fn config_file() -> Result<()> {
        with_dirs(|confd, datad| {
            confd.child("config.toml").write_str(
                "default_league = 'DEFL'

                [db]
                filename = 'league.sqlite'",
            )?;

            let config = Config::try_parse_from(["arg0"])?;
            assert_eq!(Some("DEFL"), config.default_league());
            assert_eq!(
                config.database_path(),
                datad.child("league.sqlite").path()
            );

            config.database()?;
            assert!(datad.child("league.sqlite").path().is_file());

            Ok(())
        })
    }

    #[test]
    fn config_home_default() -> Result<()> {
        temp_env::with_var("HUDDLE_CONFIG", None::<&str>, || -> Result<()> {
            let xdg_dirs = xdg::BaseDirectories::with_prefix("huddle")?;
            assert_eq!(xdg_dirs.get_config_home(), config_home()?);
            Ok(())
        })
    }

    #[test]
    fn config_home_with_var() -> Result<()> {
        temp_env::with_var("HUDDLE_CONFIG", Some("./"), || -> Result<()> {
            assert_eq!(PathBuf::from("./"), config_home()?);
            Ok(())
        })
    }

    #[test]
    fn data_home_default() -> Result<()> {
        temp_env::with_var("HUDDLE_DATA", None::<&str>, || -> Result<()> {
            let xdg_dirs = xdg::BaseDirectories::with_prefix("huddle")?;
            assert_eq!(xdg_dirs.get_data_home(), data_home()?);
            Ok(())
        })
    }

    #[test]
    fn data_home_with_var() -> Result<()> {
        temp_env::with_var("HUDDLE_DATA", Some("./"), || -> Result<()> {
            assert_eq!(PathBuf::from("./"), data_home()?);
            Ok(())
        })
    }
}
