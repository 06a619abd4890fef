//! Generic record access against any table named at runtime.

use super::{quote_ident, Database, QueryRows, Record, SqlValue};
use crate::error::{Error, Result};

impl Database {
    /// Up to `limit` rows ordered by the first column
    pub fn select_all(&self, table: &str, limit: usize) -> Result<QueryRows> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY 1 LIMIT {}",
            quote_ident(table),
            limit
        );
        self.query(&sql, &[])
    }

    /// The row whose key column equals `value`
    pub fn select_by_key(&self, table: &str, pk: &str, value: &SqlValue) -> Result<Option<Record>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            quote_ident(table),
            quote_ident(pk)
        );
        let result = self.query(&sql, std::slice::from_ref(value))?;
        Ok(result.rows.into_iter().next())
    }

    pub fn insert(&self, table: &str, record: &Record) -> Result<()> {
        if record.is_empty() {
            return Err(Error::validation(table, "nothing to insert"));
        }
        let columns: Vec<String> = record.columns().map(quote_ident).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns.join(", "),
            placeholders
        );
        let params: Vec<SqlValue> = record.values().cloned().collect();
        self.execute(&sql, &params)?;
        Ok(())
    }

    /// Set the columns of `changes` on the row keyed by `value`; returns rows changed
    pub fn update(&self, table: &str, pk: &str, value: &SqlValue, changes: &Record) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        let assignments: Vec<String> = changes
            .columns()
            .map(|c| format!("{} = ?", quote_ident(c)))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_ident(table),
            assignments.join(", "),
            quote_ident(pk)
        );
        let mut params: Vec<SqlValue> = changes.values().cloned().collect();
        params.push(value.clone());
        self.execute(&sql, &params)
    }

    /// Delete the row keyed by `value`; returns rows removed
    pub fn delete(&self, table: &str, pk: &str, value: &SqlValue) -> Result<usize> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(table),
            quote_ident(pk)
        );
        self.execute(&sql, std::slice::from_ref(value))
    }

    pub fn count(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT CAST(COUNT(*) AS BIGINT) FROM {}", quote_ident(table));
        Ok(self.query_scalar(&sql, &[])?.as_i64().unwrap_or(0))
    }

    /// One greater than the largest key currently in `table`
    pub fn next_id(&self, table: &str, pk: &str) -> Result<i64> {
        let sql = format!(
            "SELECT CAST(COALESCE(MAX({}), 0) + 1 AS BIGINT) FROM {}",
            quote_ident(pk),
            quote_ident(table)
        );
        Ok(self.query_scalar(&sql, &[])?.as_i64().unwrap_or(1))
    }

    /// All values of `column`, used to draw foreign keys
    pub fn column_ids(&self, table: &str, column: &str) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT CAST({} AS BIGINT) FROM {} ORDER BY 1",
            quote_ident(column),
            quote_ident(table)
        );
        let result = self.query(&sql, &[])?;
        Ok(result
            .rows
            .iter()
            .filter_map(|r| r.values().next().and_then(SqlValue::as_i64))
            .collect())
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

    fn student(id: i64, name: &str, group: i64) -> Record {
        Record::new()
            .with("Student_ID", id)
            .with("Student_Name", name)
            .with("Group", group)
    }

    #[test]
    fn test_insert_and_select_by_key() {
        let db = campus_db();
        let record = student(1, "Iryna Boiko", 32);
        db.insert("Student", &record).unwrap();

        let found = db
            .select_by_key("Student", "Student_ID", &SqlValue::Int(1))
            .unwrap()
            .unwrap();
        assert!(found.contains_all(&record));
        assert!(db
            .select_by_key("Student", "Student_ID", &SqlValue::Int(2))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_select_all_orders_and_limits() {
        let db = campus_db();
        for id in [3, 1, 2] {
            db.insert("Student", &student(id, "S", 31)).unwrap();
        }
        let result = db.select_all("Student", 2).unwrap();
        assert_eq!(result.columns, vec!["Student_ID", "Student_Name", "Group"]);
        let ids: Vec<i64> = result
            .rows
            .iter()
            .map(|r| r.get("Student_ID").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_duplicate_key_is_integrity_error() {
        let db = campus_db();
        db.insert("Student", &student(1, "A", 31)).unwrap();
        let err = db.insert("Student", &student(1, "B", 31)).unwrap_err();
        assert!(err.is_integrity(), "got {:?}", err);
        assert_eq!(db.count("Student").unwrap(), 1);
    }

    #[test]
    fn test_update_and_delete() {
        let db = campus_db();
        db.insert("Student", &student(1, "A", 31)).unwrap();

        let changes = Record::new().with("Group", 35);
        let changed = db
            .update("Student", "Student_ID", &SqlValue::Int(1), &changes)
            .unwrap();
        assert_eq!(changed, 1);
        let row = db
            .select_by_key("Student", "Student_ID", &SqlValue::Int(1))
            .unwrap()
            .unwrap();
        assert_eq!(row.get("Group"), Some(&SqlValue::Int(35)));

        assert_eq!(db.delete("Student", "Student_ID", &SqlValue::Int(1)).unwrap(), 1);
        assert_eq!(db.count("Student").unwrap(), 0);
    }

    #[test]
    fn test_next_id() {
        let db = campus_db();
        assert_eq!(db.next_id("Course", "Course_ID").unwrap(), 1);
        db.insert(
            "Course",
            &Record::new().with("Course_ID", 41).with("Name", "Databases 1"),
        )
        .unwrap();
        assert_eq!(db.next_id("Course", "Course_ID").unwrap(), 42);
    }

    #[test]
    fn test_unknown_table_is_not_found() {
        let db = campus_db();
        let err = db.select_all("Nope", 10).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "got {:?}", err);
    }

    #[test]
    fn test_hostile_identifier_is_quoted() {
        let db = campus_db();
        let err = db
            .select_all("Student\"; DROP TABLE \"Student", 10)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(db.missing_tables().unwrap().is_empty());
    }
}
