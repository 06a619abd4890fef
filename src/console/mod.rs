//! Interactive numbered menu over the campus database.
//!
//! Every action reads its input through a [`Prompter`] and writes to a plain
//! writer, so a session can be scripted end to end. Core errors are printed
//! and the menu is shown again; only EOF or option 0 ends the session.

pub mod prompt;

pub use prompt::{Input, LinePrompter, Prompter, ScriptedPrompter};

use crate::analytics::{parse_date_bound, parse_min_experience, AnalyticsRunner, TimedQuery};
use crate::coerce::coerce;
use crate::config::ConsoleConfig;
use crate::db::{ColumnInfo, Database, QueryRows, Record, SqlValue};
use crate::error::{Error, Result};
use crate::generate::BulkGenerator;
use crate::output::{plan_tail, OutputFormat, ResultFormatter};
use crate::schema::Table;
use campus_gen::CampusFaker;
use std::io::{self, Write};

/// Plan lines printed after an analytical query
const PLAN_TAIL_LINES: usize = 8;

/// Tokens accepted as "yes" at a confirmation prompt
const AFFIRMATIVE: &[&str] = &["y", "yes", "t", "так"];

const MENU: &str = "
Menu:
 1) List tables
 2) Show table rows
 3) Show row by primary key
 4) Insert row
 5) Update row
 6) Delete row
 7) Generate synthetic data
 8) Run analytical queries
 9) Check for dependent rows
 0) Exit
";

/// Why an action stopped early
#[derive(Debug)]
enum Interrupt {
    Core(Error),
    Cancelled(String),
    Exit,
    Io(io::Error),
}

impl From<Error> for Interrupt {
    fn from(e: Error) -> Self {
        Interrupt::Core(e)
    }
}

impl From<io::Error> for Interrupt {
    fn from(e: io::Error) -> Self {
        Interrupt::Io(e)
    }
}

type Step<T> = std::result::Result<T, Interrupt>;

/// True for a case-insensitive confirmation token
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

pub struct Console<'a, P: Prompter, W: Write> {
    db: &'a Database,
    prompter: P,
    out: W,
    config: ConsoleConfig,
    format: OutputFormat,
    seed: Option<u64>,
    progress: bool,
}

impl<'a, P: Prompter, W: Write> Console<'a, P, W> {
    pub fn new(db: &'a Database, prompter: P, out: W, config: ConsoleConfig) -> Self {
        Self {
            db,
            prompter,
            out,
            config,
            format: OutputFormat::Table,
            seed: None,
            progress: false,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Fix the generator seed (reproducible sessions)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Give back the prompter and writer after a session
    pub fn into_parts(self) -> (P, W) {
        (self.prompter, self.out)
    }

    /// Run the menu loop until option 0 or end of input
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "campus-console on {}", self.db.target())?;
        loop {
            write!(self.out, "{}", MENU)?;
            let choice = match self.prompter.read_line("Choose an option: ") {
                Input::Line(line) => line,
                Input::Interrupted => continue,
                Input::Eof => break,
            };

            let result = match choice.trim() {
                "1" => self.list_tables(),
                "2" => self.show_table(),
                "3" => self.show_by_key(),
                "4" => self.insert(),
                "5" => self.update(),
                "6" => self.delete(),
                "7" => self.generate(),
                "8" => self.analytics(),
                "9" => self.check_children(),
                "0" => break,
                other => {
                    writeln!(self.out, "Unknown option '{}'. Choose 0-9.", other)?;
                    continue;
                }
            };

            match result {
                Ok(()) => {}
                Err(Interrupt::Core(e)) => writeln!(self.out, "Error: {}", e)?,
                Err(Interrupt::Cancelled(reason)) => writeln!(self.out, "Cancelled: {}", reason)?,
                Err(Interrupt::Exit) => break,
                Err(Interrupt::Io(e)) => return Err(e),
            }
        }
        writeln!(self.out, "Goodbye!")?;
        self.out.flush()
    }

    fn ask(&mut self, prompt: &str) -> Step<String> {
        match self.prompter.read_line(prompt) {
            Input::Line(line) => Ok(line),
            Input::Interrupted => Err(Interrupt::Cancelled("interrupted".to_string())),
            Input::Eof => Err(Interrupt::Exit),
        }
    }

    /// Prompt until `parse` accepts the input, at most `max_retries` times
    fn ask_valid<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Result<T>) -> Step<T> {
        let attempts = self.config.max_retries.max(1);
        for attempt in 1..=attempts {
            let raw = self.ask(prompt)?;
            match parse(&raw) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    writeln!(self.out, "Error: {}", e)?;
                    if attempt < attempts {
                        writeln!(self.out, "Try again ({} left).", attempts - attempt)?;
                    }
                }
            }
        }
        Err(Interrupt::Cancelled(format!(
            "no valid input after {} attempts",
            attempts
        )))
    }

    fn ask_table(&mut self, prompt: &str) -> Step<Table> {
        self.ask_valid(prompt, |raw| raw.parse::<Table>())
    }

    /// Catalog columns of `table` and its primary-key column
    fn describe(&self, table: Table) -> Step<(Vec<ColumnInfo>, ColumnInfo)> {
        let columns = self.db.columns_info(table.name())?;
        let pk = self
            .db
            .primary_key(table.name())?
            .and_then(|pk| columns.iter().find(|c| c.name == pk).cloned())
            .ok_or_else(|| {
                Error::NotFound(format!("no single-column primary key on {}", table))
            })?;
        Ok((columns, pk))
    }

    fn ask_key(&mut self, pk: &ColumnInfo, purpose: &str) -> Step<SqlValue> {
        let column = ColumnInfo {
            nullable: false,
            ..pk.clone()
        };
        let prompt = format!("{} value {}: ", pk.name, purpose);
        self.ask_valid(&prompt, move |raw| coerce(&column, Some(raw)))
    }

    fn print_rows(&mut self, rows: &QueryRows) -> Step<()> {
        let shown = rows.rows.len().min(self.config.display_rows);
        if shown < rows.rows.len() {
            let head = QueryRows {
                columns: rows.columns.clone(),
                rows: rows.rows[..shown].to_vec(),
            };
            ResultFormatter::write(&head, self.format, &mut self.out)?;
            writeln!(self.out, "(showing {} of {} rows)", shown, rows.rows.len())?;
        } else {
            ResultFormatter::write(rows, self.format, &mut self.out)?;
        }
        Ok(())
    }

    fn list_tables(&mut self) -> Step<()> {
        let tables = self.db.list_tables()?;
        if tables.is_empty() {
            writeln!(self.out, "No tables. Run `campus-console init` first.")?;
        }
        for table in tables {
            let count = self.db.count(&table)?;
            writeln!(self.out, "  {} ({} rows)", table, count)?;
        }
        Ok(())
    }

    fn show_table(&mut self) -> Step<()> {
        let table = self.ask_table("Table name: ")?;
        let rows = self.db.select_all(table.name(), self.config.select_limit)?;
        self.print_rows(&rows)
    }

    fn show_by_key(&mut self) -> Step<()> {
        let table = self.ask_table("Table name: ")?;
        let (columns, pk) = self.describe(table)?;
        let key = self.ask_key(&pk, "to show")?;
        match self.db.select_by_key(table.name(), &pk.name, &key)? {
            Some(record) => {
                let rows = QueryRows {
                    columns: columns.iter().map(|c| c.name.clone()).collect(),
                    rows: vec![record],
                };
                self.print_rows(&rows)
            }
            None => {
                writeln!(self.out, "No row in {} with {} = {}.", table, pk.name, key)?;
                Ok(())
            }
        }
    }

    fn insert(&mut self) -> Step<()> {
        let table = self.ask_table("Table to insert into: ")?;
        let (columns, pk) = self.describe(table)?;

        let mut record = Record::new();
        for column in columns {
            let is_key = column.name == pk.name;
            let hint = if is_key {
                ", blank for next id"
            } else if column.nullable {
                ", optional"
            } else {
                ""
            };
            let prompt = format!("{} ({}{}): ", column.name, column.data_type, hint);
            let name = column.name.clone();
            // a blank key is assigned below
            let column = ColumnInfo {
                nullable: column.nullable || is_key,
                ..column
            };
            let mut value = self.ask_valid(&prompt, move |raw| coerce(&column, Some(raw)))?;
            if is_key && value.is_null() {
                value = SqlValue::Int(self.db.next_id(table.name(), &pk.name)?);
            }
            record.set(name, value);
        }

        self.db.insert_checked(table.name(), &record)?;
        let key = record.get(&pk.name).cloned().unwrap_or(SqlValue::Null);
        writeln!(self.out, "Inserted into {} ({} = {}).", table, pk.name, key)?;
        Ok(())
    }

    fn update(&mut self) -> Step<()> {
        let table = self.ask_table("Table to update: ")?;
        let (columns, pk) = self.describe(table)?;
        let key = self.ask_key(&pk, "of the row to edit")?;
        let current = self
            .db
            .select_by_key(table.name(), &pk.name, &key)?
            .ok_or_else(|| {
                Error::NotFound(format!("no row in {} with {} = {}", table, pk.name, key))
            })?;

        writeln!(self.out, "Enter new values. Leave blank to keep the current one.")?;
        let mut changes = Record::new();
        for column in columns.into_iter().filter(|c| c.name != pk.name) {
            let shown = current.get(&column.name).cloned().unwrap_or(SqlValue::Null);
            let prompt = format!("{} [{}]: ", column.name, shown);
            let name = column.name.clone();
            let change = self.ask_valid(&prompt, move |raw| {
                if raw.trim().is_empty() {
                    Ok(None)
                } else {
                    coerce(&column, Some(raw)).map(Some)
                }
            })?;
            if let Some(value) = change {
                changes.set(name, value);
            }
        }

        if changes.is_empty() {
            writeln!(self.out, "Nothing changed.")?;
            return Ok(());
        }
        let changed = self.db.update_checked(table.name(), &pk.name, &key, &changes)?;
        writeln!(self.out, "Updated {} row(s) in {}.", changed, table)?;
        Ok(())
    }

    fn delete(&mut self) -> Step<()> {
        let table = self.ask_table("Table to delete from: ")?;
        let (_, pk) = self.describe(table)?;
        let key = self.ask_key(&pk, "to delete")?;

        if self.db.select_by_key(table.name(), &pk.name, &key)?.is_none() {
            return Err(Error::NotFound(format!(
                "no row in {} with {} = {}",
                table, pk.name, key
            ))
            .into());
        }
        if self.db.has_child_rows(table.name(), &pk.name, &key)? {
            return Err(Error::Integrity(format!(
                "cannot delete {} {} = {}: rows in dependent tables reference it",
                table, pk.name, key
            ))
            .into());
        }

        let answer = self.ask("Confirm deletion (y/n): ")?;
        if !is_affirmative(&answer) {
            writeln!(self.out, "Deletion cancelled.")?;
            return Ok(());
        }
        let removed = self.db.delete_checked(table.name(), &pk.name, &key)?;
        writeln!(self.out, "Deleted {} row(s) from {}.", removed, table)?;
        Ok(())
    }

    fn generate(&mut self) -> Step<()> {
        let count = self.ask_valid("Rows to generate per table: ", |raw| {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(Error::validation("count", "enter a positive integer")),
            }
        })?;
        writeln!(self.out, "Generating {} rows per table...", count)?;

        let faker = CampusFaker::seeded(self.seed.unwrap_or_else(rand::random));
        let outcomes = BulkGenerator::new(self.db, faker)
            .with_progress(self.progress)
            .generate_all(&Table::ALL, count)?;
        for outcome in outcomes {
            writeln!(self.out, "  {}", outcome)?;
        }
        Ok(())
    }

    fn analytics(&mut self) -> Step<()> {
        writeln!(self.out, " 1) Tasks per student and course, by student name")?;
        writeln!(self.out, " 2) Courses per professor, by minimum experience")?;
        writeln!(self.out, " 3) Registrations per course in a date range")?;
        let runner = AnalyticsRunner::new(self.db);
        let choice = self.ask("Query to run (1/2/3): ")?;
        let result = match choice.trim() {
            "1" => {
                let pattern = self.ask("Part of the student name: ")?;
                runner.student_tasks(&pattern)?
            }
            "2" => {
                let min = self.ask_valid("Minimum experience (years): ", parse_min_experience)?;
                runner.professor_courses(min)?
            }
            "3" => {
                let start = self.ask_valid("Start date (YYYY-MM-DD): ", |raw| {
                    parse_date_bound("start", raw)
                })?;
                let end =
                    self.ask_valid("End date (YYYY-MM-DD): ", |raw| parse_date_bound("end", raw))?;
                runner.course_registrations(start, end)?
            }
            other => {
                return Err(Interrupt::Cancelled(format!("unknown query '{}'", other.trim())));
            }
        };
        self.print_timed(&result)
    }

    fn print_timed(&mut self, result: &TimedQuery) -> Step<()> {
        self.print_rows(&result.rows)?;
        match result.execution_ms {
            Some(ms) => writeln!(self.out, "Execution time: {:.3} ms", ms)?,
            None => writeln!(self.out, "Execution time: unavailable")?,
        }
        if !result.plan.is_empty() {
            writeln!(self.out, "Plan (last {} lines):", PLAN_TAIL_LINES)?;
            writeln!(self.out, "{}", plan_tail(&result.plan, PLAN_TAIL_LINES))?;
        }
        Ok(())
    }

    fn check_children(&mut self) -> Step<()> {
        let table = self.ask_table("Parent table: ")?;
        let (_, pk) = self.describe(table)?;
        let key = self.ask_key(&pk, "to check")?;
        if self.db.has_child_rows(table.name(), &pk.name, &key)? {
            writeln!(
                self.out,
                "Rows in dependent tables reference {} {} = {}; it cannot be deleted.",
                table, pk.name, key
            )?;
        } else {
            writeln!(
                self.out,
                "No dependent rows reference {} {} = {}.",
                table, pk.name, key
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        for yes in ["y", "YES", " t ", "так", "ТАК"] {
            assert!(is_affirmative(yes), "{}", yes);
        }
        for no in ["", "n", "no", "ні", "yess"] {
            assert!(!is_affirmative(no), "{}", no);
        }
    }

    fn session(lines: &[&str]) -> String {
        let db = Database::open_in_memory().unwrap();
        db.init_schema(false).unwrap();
        let mut console = Console::new(
            &db,
            ScriptedPrompter::new(lines.iter().copied()),
            Vec::new(),
            ConsoleConfig::default(),
        );
        console.run().unwrap();
        let (_, out) = console.into_parts();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_exit_and_eof() {
        assert!(session(&["0"]).ends_with("Goodbye!\n"));
        assert!(session(&[]).ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_unknown_option() {
        let out = session(&["42", "0"]);
        assert!(out.contains("Unknown option '42'"));
    }

    #[test]
    fn test_retries_are_bounded() {
        let out = session(&["2", "Nope", "Nope", "Nope", "0"]);
        assert_eq!(out.matches("Error: unknown table: Nope").count(), 3);
        assert!(out.contains("Cancelled: no valid input after 3 attempts"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_interrupt_cancels_prompt() {
        let out = session(&["2", "^C", "0"]);
        assert!(out.contains("Cancelled: interrupted"));
    }
}
