//! Bulk generation of synthetic campus rows.
//!
//! Tables are filled parents-first. Each table is generated inside its own
//! transaction, so a failure partway leaves that table as it was while the
//! tables generated before it keep their rows. Keys continue from the current
//! maximum; foreign keys are drawn uniformly from existing parent keys.

use crate::db::{Database, Record, SqlValue};
use crate::error::{Error, Result};
use crate::schema::Table;
use campus_gen::CampusFaker;
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::Rng;
use std::fmt;

/// What happened to one table
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateStatus {
    Inserted,
    /// Nothing attempted; carries the reason
    Skipped(String),
    /// Rolled back; carries the engine message
    Failed(String),
}

/// Per-table result of a generation run
#[derive(Debug, Clone, PartialEq)]
pub struct TableOutcome {
    pub table: Table,
    pub requested: usize,
    pub inserted: usize,
    pub status: GenerateStatus,
}

impl TableOutcome {
    pub fn is_success(&self) -> bool {
        self.status == GenerateStatus::Inserted
    }
}

impl fmt::Display for TableOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            GenerateStatus::Inserted => {
                write!(f, "{}: inserted {}", self.table, rows(self.inserted))
            }
            GenerateStatus::Skipped(reason) => write!(
                f,
                "{}: inserted 0 of {}, {}",
                self.table,
                rows(self.requested),
                reason
            ),
            GenerateStatus::Failed(msg) => write!(
                f,
                "{}: generation failed and was rolled back: {}",
                self.table, msg
            ),
        }
    }
}

fn rows(n: usize) -> String {
    format!("{} row{}", n, if n == 1 { "" } else { "s" })
}

/// Parent keys available to one foreign-key column
struct ParentKeys {
    column: &'static str,
    ids: Vec<i64>,
}

/// Fills campus tables with synthetic rows
pub struct BulkGenerator<'a, R: Rng> {
    db: &'a Database,
    faker: CampusFaker<R>,
    today: NaiveDate,
    progress: bool,
}

impl<'a, R: Rng> BulkGenerator<'a, R> {
    pub fn new(db: &'a Database, faker: CampusFaker<R>) -> Self {
        Self {
            db,
            faker,
            today: chrono::Local::now().date_naive(),
            progress: false,
        }
    }

    /// Show a progress bar per table
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Registration dates end at `today`
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Generate `count` rows for each of `tables`, always in dependency order.
    /// One table's failure does not stop the others.
    pub fn generate_all(&mut self, tables: &[Table], count: usize) -> Result<Vec<TableOutcome>> {
        validate_count(count)?;
        let mut outcomes = Vec::new();
        for table in Table::ALL.into_iter().filter(|t| tables.contains(t)) {
            outcomes.push(self.generate_table(table, count)?);
        }
        Ok(outcomes)
    }

    /// Generate `count` rows for one table
    pub fn generate_table(&mut self, table: Table, count: usize) -> Result<TableOutcome> {
        validate_count(count)?;

        let parents = match self.parent_keys(table) {
            Ok(Ok(parents)) => parents,
            Ok(Err(reason)) => {
                info!("{}: skipped, {}", table, reason);
                return Ok(outcome(table, count, 0, GenerateStatus::Skipped(reason)));
            }
            Err(e) => {
                warn!("{}: reading parent keys failed: {}", table, e);
                return Ok(outcome(table, count, 0, GenerateStatus::Failed(e.to_string())));
            }
        };

        let pb = self.progress_bar(table, count);
        let today = self.today;
        let faker = &mut self.faker;

        let result = self.db.in_transaction(|db| {
            let start = db.next_id(table.name(), table.primary_key())?;
            for offset in 0..count {
                let record = build_row(table, start + offset as i64, faker, &parents, today);
                db.insert(table.name(), &record)?;
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
            }
            Ok(count)
        });

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        Ok(match result {
            Ok(inserted) => {
                info!("{}: inserted {}", table, rows(inserted));
                outcome(table, count, inserted, GenerateStatus::Inserted)
            }
            Err(e) => {
                warn!("{}: generation rolled back: {}", table, e);
                outcome(table, count, 0, GenerateStatus::Failed(e.to_string()))
            }
        })
    }

    /// Existing keys for every foreign key of `table`, or the reason generation
    /// cannot proceed
    fn parent_keys(&self, table: Table) -> Result<std::result::Result<Vec<ParentKeys>, String>> {
        let mut keys = Vec::new();
        for fk in table.foreign_keys() {
            let ids = self.db.column_ids(fk.parent.name(), fk.parent_column())?;
            if ids.is_empty() {
                return Ok(Err(format!(
                    "no rows in {} to reference for {}",
                    fk.parent, fk.column
                )));
            }
            keys.push(ParentKeys {
                column: fk.column,
                ids,
            });
        }
        Ok(Ok(keys))
    }

    fn progress_bar(&self, table: Table, count: usize) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let pb = ProgressBar::new(count as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg:<12} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░  "),
        );
        pb.set_message(table.name());
        Some(pb)
    }
}

fn validate_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(Error::validation("count", "must be a positive integer"));
    }
    Ok(())
}

fn outcome(table: Table, requested: usize, inserted: usize, status: GenerateStatus) -> TableOutcome {
    TableOutcome {
        table,
        requested,
        inserted,
        status,
    }
}

fn pick_parent<R: Rng>(faker: &mut CampusFaker<R>, parents: &[ParentKeys], column: &str) -> SqlValue {
    let id = parents
        .iter()
        .find(|p| p.column == column)
        .and_then(|p| faker.pick_id(&p.ids));
    SqlValue::from(id)
}

fn build_row<R: Rng>(
    table: Table,
    id: i64,
    faker: &mut CampusFaker<R>,
    parents: &[ParentKeys],
    today: NaiveDate,
) -> Record {
    let record = Record::new().with(table.primary_key(), id);
    match table {
        Table::Student => record
            .with("Student_Name", faker.student_name())
            .with("Group", faker.group()),
        Table::Professor => record
            .with("Professor_Name", faker.professor_name())
            .with("Experience", faker.experience()),
        Table::Course => {
            let course = faker.course();
            record
                .with("Name", course.name)
                .with("describe", course.description)
        }
        Table::Task => record
            .with("Task_Name", faker.task_name())
            .with("Complexity", faker.complexity())
            .with("Course_ID", pick_parent(faker, parents, "Course_ID")),
        Table::Registration => record
            .with("Course_ID", pick_parent(faker, parents, "Course_ID"))
            .with("Professor_ID", pick_parent(faker, parents, "Professor_ID"))
            .with("Student_ID", pick_parent(faker, parents, "Student_ID"))
            .with("Date", faker.registration_date(today)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init_schema(false).unwrap();
        db
    }

    #[test]
    fn test_zero_count_rejected() {
        let db = campus_db();
        let mut gen = BulkGenerator::new(&db, CampusFaker::seeded(1));
        let err = gen.generate_table(Table::Student, 0).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_rows_match_descriptor_columns() {
        let mut faker = CampusFaker::seeded(3);
        let parents = vec![ParentKeys {
            column: "Course_ID",
            ids: vec![7],
        }];
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        for table in [Table::Student, Table::Professor, Table::Course, Table::Task] {
            let row = build_row(table, 1, &mut faker, &parents, today);
            let expected: Vec<&str> = table.columns().iter().map(|c| c.name).collect();
            assert_eq!(row.columns().collect::<Vec<_>>(), expected, "{}", table);
        }
        let task = build_row(Table::Task, 1, &mut faker, &parents, today);
        assert_eq!(task.get("Course_ID"), Some(&SqlValue::Int(7)));
    }

    #[test]
    fn test_keys_continue_after_existing_rows() {
        let db = campus_db();
        db.insert(
            "Course",
            &Record::new().with("Course_ID", 10).with("Name", "Algebra 1"),
        )
        .unwrap();
        let mut gen = BulkGenerator::new(&db, CampusFaker::seeded(9));
        let outcome = gen.generate_table(Table::Course, 3).unwrap();
        assert!(outcome.is_success());
        assert_eq!(db.column_ids("Course", "Course_ID").unwrap(), vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_skipped_outcome_message() {
        let db = campus_db();
        let mut gen = BulkGenerator::new(&db, CampusFaker::seeded(2));
        let outcome = gen.generate_table(Table::Task, 5).unwrap();
        assert_eq!(
            outcome.to_string(),
            "Task: inserted 0 of 5 rows, no rows in Course to reference for Course_ID"
        );
    }

    #[test]
    fn test_outcome_pluralization() {
        let db = campus_db();
        let mut gen = BulkGenerator::new(&db, CampusFaker::seeded(4));
        let outcome = gen.generate_table(Table::Professor, 1).unwrap();
        assert_eq!(outcome.to_string(), "Professor: inserted 1 row");
        let outcome = gen.generate_table(Table::Task, 1).unwrap();
        assert!(outcome.to_string().starts_with("Task: inserted 0 of 1 row, "));
    }

    #[test]
    fn test_failed_table_is_rolled_back() {
        let db = Database::open_in_memory().unwrap();
        db.execute(
            r#"CREATE TABLE "Student" (
                "Student_ID" INTEGER PRIMARY KEY CHECK ("Student_ID" <= 5),
                "Student_Name" VARCHAR NOT NULL,
                "Group" INTEGER
            )"#,
            &[],
        )
        .unwrap();
        db.insert(
            "Student",
            &Record::new()
                .with("Student_ID", 1)
                .with("Student_Name", "Olena Koval")
                .with("Group", 31),
        )
        .unwrap();

        let mut gen = BulkGenerator::new(&db, CampusFaker::seeded(5));
        let outcome = gen.generate_table(Table::Student, 30).unwrap();
        assert!(matches!(outcome.status, GenerateStatus::Failed(_)), "{}", outcome);
        assert_eq!(outcome.inserted, 0);
        assert!(outcome
            .to_string()
            .starts_with("Student: generation failed and was rolled back: "));
        assert_eq!(db.count("Student").unwrap(), 1);

        // keys 2..=5 still fit after the rollback
        let outcome = gen.generate_table(Table::Student, 4).unwrap();
        assert!(outcome.is_success(), "{}", outcome);
        assert_eq!(db.column_ids("Student", "Student_ID").unwrap(), vec![1, 2, 3, 4, 5]);
    }
}
