use anyhow::{Context, Result};
use campus_console::db::Database;
use campus_console::schema::Table;

pub fn run(db: &Database, reset: bool) -> Result<()> {
    if reset {
        eprintln!("Dropping existing campus tables in {}...", db.target());
    }
    db.init_schema(reset)
        .with_context(|| format!("Failed to create tables in {}", db.target()))?;

    for table in Table::ALL {
        eprintln!("  {} ({} rows)", table, db.count(table.name())?);
    }
    eprintln!("Schema ready in {}", db.target());
    Ok(())
}
