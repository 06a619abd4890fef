use anyhow::Result;
use campus_console::db::Database;
use campus_console::output::{OutputFormat, ResultFormatter};
use campus_console::schema::Table;

/// List tables with row counts
pub fn tables(db: &Database) -> Result<()> {
    let tables = db.list_tables()?;
    if tables.is_empty() {
        eprintln!("No tables in {}. Run `campus-console init` first.", db.target());
        return Ok(());
    }
    for table in tables {
        println!("{}\t{}", table, db.count(&table)?);
    }
    Ok(())
}

/// Print up to `limit` rows of `table`
pub fn run(db: &Database, table: &str, limit: usize, format: OutputFormat) -> Result<()> {
    let table: Table = table.parse()?;
    let rows = db.select_all(table.name(), limit)?;
    print!("{}", ResultFormatter::format(&rows, format));
    Ok(())
}
