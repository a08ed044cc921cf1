use anyhow::Result;

#[macro_use]
mod utils;

mod cli;
mod config;
mod table;
mod team;


use cli::Commands;
use config::Config;

fn init_logger(level: log::LevelFilter) -> Result<()> {
    if systemd_journal_logger::connected_to_journal() {
        systemd_journal_logger::JournalLog::new()?
            .with_syslog_identifier("huddlectl".to_owned())
            .install()?;
        log::set_max_level(level);
    } else {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .try_init()?;
    }

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::try_parse()?;
    init_logger(config.log_level_filter())?;

    let Some(command) = config.command() else {
        anyhow::bail!("No command provided");
    };

    match command {
        Commands::Table { .. } => table::run(&config)?,
        Commands::Team { .. } => team::run(&config)?,
        Commands::Reset { confirm } => {
            if *confirm && utils::confirm()? {
                std::fs::remove_file(config.database_path())?;
            } else {
                anyhow::bail!("operation requires confirmation");
            }
        }
    }

    Ok(())
}
