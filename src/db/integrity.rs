//! Referential integrity checks driven by catalog foreign keys.
//!
//! Inserts and updates are rejected when a referenced parent row is missing;
//! deletes are rejected while any child row still references the key. The
//! checks run before the statement so the operator gets an actionable message
//! and the tables are left untouched.

use super::{quote_ident, Database, Record, SqlValue};
use crate::error::{Error, Result};
use log::debug;
use std::fmt;

/// A foreign-key value with no matching parent row
#[derive(Debug, Clone, PartialEq)]
pub struct MissingParent {
    pub column: String,
    pub value: SqlValue,
    pub parent_table: String,
}

impl fmt::Display for MissingParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) not found in table {}",
            self.column, self.value, self.parent_table
        )
    }
}

impl Database {
    /// True iff some row of `parent_table` has `parent_column = value`
    pub fn parent_exists(
        &self,
        parent_table: &str,
        parent_column: &str,
        value: &SqlValue,
    ) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = ? LIMIT 1)",
            quote_ident(parent_table),
            quote_ident(parent_column)
        );
        Ok(matches!(
            self.query_scalar(&sql, std::slice::from_ref(value))?,
            SqlValue::Bool(true)
        ))
    }

    /// True iff any table whose foreign key targets `parent_table.parent_column`
    /// has a row referencing `value`. Stops at the first hit.
    pub fn has_child_rows(
        &self,
        parent_table: &str,
        parent_column: &str,
        value: &SqlValue,
    ) -> Result<bool> {
        for fk in self.foreign_keys_referencing(parent_table, parent_column)? {
            if self.parent_exists(&fk.child_table, &fk.child_column, value)? {
                debug!(
                    "{}.{} = {} is referenced by {}.{}",
                    parent_table, parent_column, value, fk.child_table, fk.child_column
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Foreign-key values of `record` that have no parent row. Columns absent
    /// from the record or set to NULL are not checked.
    pub fn missing_parents(&self, table: &str, record: &Record) -> Result<Vec<MissingParent>> {
        let mut missing = Vec::new();
        for fk in self.foreign_keys_of(table)? {
            let Some(value) = record.get(&fk.child_column) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            if !self.parent_exists(&fk.parent_table, &fk.parent_column, value)? {
                missing.push(MissingParent {
                    column: fk.child_column.clone(),
                    value: value.clone(),
                    parent_table: fk.parent_table.clone(),
                });
            }
        }
        Ok(missing)
    }

    /// Insert after verifying every referenced parent exists
    pub fn insert_checked(&self, table: &str, record: &Record) -> Result<()> {
        self.ensure_parents(table, record)?;
        self.insert(table, record)
    }

    /// Update after verifying the row exists and any changed foreign keys resolve.
    /// Returns the number of rows changed; an empty change set changes nothing.
    pub fn update_checked(
        &self,
        table: &str,
        pk: &str,
        value: &SqlValue,
        changes: &Record,
    ) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        self.ensure_row(table, pk, value)?;
        self.ensure_parents(table, changes)?;
        self.update(table, pk, value, changes)
    }

    /// Delete after verifying the row exists and nothing references it
    pub fn delete_checked(&self, table: &str, pk: &str, value: &SqlValue) -> Result<usize> {
        self.ensure_row(table, pk, value)?;
        if self.has_child_rows(table, pk, value)? {
            return Err(Error::Integrity(format!(
                "cannot delete {} {} = {}: rows in dependent tables reference it",
                table, pk, value
            )));
        }
        self.delete(table, pk, value)
    }

    fn ensure_row(&self, table: &str, pk: &str, value: &SqlValue) -> Result<()> {
        if self.parent_exists(table, pk, value)? {
            Ok(())
        } else {
            Err(Error::NotFound(format!(
                "no row in {} with {} = {}",
                table, pk, value
            )))
        }
    }

    fn ensure_parents(&self, table: &str, record: &Record) -> Result<()> {
        let missing = self.missing_parents(table, record)?;
        if missing.is_empty() {
            return Ok(());
        }
        let detail = missing
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::Integrity(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init_schema(false).unwrap();
        db.insert(
            "Course",
            &Record::new().with("Course_ID", 1).with("Name", "Physics 2"),
        )
        .unwrap();
        db.insert(
            "Task",
            &Record::new()
                .with("Task_ID", 1)
                .with("Task_Name", "Lab #1")
                .with("Course_ID", 1),
        )
        .unwrap();
        db
    }

    #[test]
    fn test_parent_exists() {
        let db = seeded_db();
        assert!(db.parent_exists("Course", "Course_ID", &SqlValue::Int(1)).unwrap());
        assert!(!db.parent_exists("Course", "Course_ID", &SqlValue::Int(2)).unwrap());
    }

    #[test]
    fn test_has_child_rows() {
        let db = seeded_db();
        assert!(db.has_child_rows("Course", "Course_ID", &SqlValue::Int(1)).unwrap());
        assert!(!db.has_child_rows("Course", "Course_ID", &SqlValue::Int(2)).unwrap());
        // nothing references tasks
        assert!(!db.has_child_rows("Task", "Task_ID", &SqlValue::Int(1)).unwrap());
    }

    #[test]
    fn test_missing_parents_skips_null_and_absent() {
        let db = seeded_db();
        let record = Record::new()
            .with("Registration_ID", 1)
            .with("Course_ID", 1)
            .with("Professor_ID", SqlValue::Null);
        assert!(db.missing_parents("Registration", &record).unwrap().is_empty());

        let record = record.with("Student_ID", 77);
        let missing = db.missing_parents("Registration", &record).unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].to_string(), "Student_ID (77) not found in table Student");
    }

    #[test]
    fn test_delete_checked_missing_row() {
        let db = seeded_db();
        let err = db
            .delete_checked("Course", "Course_ID", &SqlValue::Int(9))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_update_checked_rejects_unknown_parent() {
        let db = seeded_db();
        let changes = Record::new().with("Course_ID", 5);
        let err = db
            .update_checked("Task", "Task_ID", &SqlValue::Int(1), &changes)
            .unwrap_err();
        assert!(err.is_integrity());
        assert_eq!(
            db.update_checked("Task", "Task_ID", &SqlValue::Int(1), &Record::new())
                .unwrap(),
            0
        );
    }
}
