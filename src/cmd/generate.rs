use anyhow::Result;
use campus_console::db::Database;
use campus_console::generate::BulkGenerator;
use campus_console::schema::Table;
use campus_gen::CampusFaker;
use std::io::{self, IsTerminal};
use std::time::Instant;

pub fn run(
    db: &Database,
    count: usize,
    tables: Option<Vec<String>>,
    seed: Option<u64>,
    progress: bool,
) -> Result<()> {
    let selected: Vec<Table> = match tables {
        Some(names) => names
            .iter()
            .map(|n| n.parse::<Table>())
            .collect::<Result<_, _>>()?,
        None => Table::ALL.to_vec(),
    };

    let seed = seed.unwrap_or_else(rand::random);
    eprintln!("Generating {} rows per table (seed {})...", count, seed);
    let start = Instant::now();

    let outcomes = BulkGenerator::new(db, CampusFaker::seeded(seed))
        .with_progress(progress && io::stderr().is_terminal())
        .generate_all(&selected, count)?;

    for outcome in &outcomes {
        println!("{}", outcome);
    }
    let inserted: usize = outcomes.iter().map(|o| o.inserted).sum();
    eprintln!(
        "Inserted {} rows in {:.2}s",
        inserted,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
