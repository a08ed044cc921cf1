use anyhow::Result;

use huddle::{tables, Database, SchemaGuardedLoader};
use tabled::{builder::Builder as TableBuilder, settings::Panel};

use crate::cli::{table::*, Commands};
use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let Some(Commands::Table(command)) = config.command() else {
        anyhow::bail!("wrong command passed: {:?}", config.command());
    };

    match command {
        Command::List => list(),
        Command::Show(args) => show(&config.database()?, args),
    }
}

fn list() -> Result<()> {
    let mut builder = TableBuilder::new();
    push_record!(builder, "name", "columns", "key", "seeded");

    for spec in tables::ALL {
        push_record!(
            builder,
            spec.name,
            spec.columns.len(),
            spec.key.join(", "),
            spec.seeded
        );
    }

    println!("{}", builder.build());

    Ok(())
}

fn show(db: &Database, args: &Show) -> Result<()> {
    let spec = tables::find(&args.name)?;
    let rows = SchemaGuardedLoader::new(db).load(spec)?;

    if rows.rebuilt() {
        println!("Table {} was missing and has been recreated", spec.name);
    }

    if rows.is_empty() {
        println!("Table {} is empty", spec.name);
        return Ok(());
    }

    let mut builder = TableBuilder::new();
    builder.push_record(spec.columns.iter().map(|c| c.name.to_owned()));
    for row in rows.iter().take(args.count.unwrap_or(usize::MAX)) {
        builder.push_record(row.values().iter().map(|v| v.to_string()));
    }

    let shown = args.count.map_or(rows.len(), |count| count.min(rows.len()));
    println!(
        "{}",
        builder
            .build()
            .with(Panel::footer(format!("{} of {} rows", shown, rows.len())))
    );

    Ok(())
}
