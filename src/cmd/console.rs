use anyhow::Result;
use campus_console::config::AppConfig;
use campus_console::console::{Console, LinePrompter};
use campus_console::db::Database;
use std::io::{self, IsTerminal};

pub fn run(db: &Database, config: &AppConfig, seed: Option<u64>) -> Result<()> {
    let missing = db.missing_tables()?;
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|t| t.name()).collect();
        eprintln!(
            "Warning: tables missing: {}. Run `campus-console init` to create them.",
            names.join(", ")
        );
    }

    let prompter = LinePrompter::new(config.console.history)?;
    let mut console = Console::new(db, prompter, io::stdout(), config.console.clone())
        .with_format(config.format)
        .with_progress(io::stderr().is_terminal());
    if let Some(seed) = seed {
        console = console.with_seed(seed);
    }
    console.run()?;
    Ok(())
}
