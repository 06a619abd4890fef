//! Catalog inspection: tables, columns, primary and foreign keys.

use super::{Database, SqlValue};
use crate::error::Result;
use crate::schema::TypeClass;

/// Column metadata as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared data type, e.g. "INTEGER"
    pub data_type: String,
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn class(&self) -> TypeClass {
        TypeClass::from_sql_type(&self.data_type)
    }
}

/// A single-column foreign key discovered in the catalog
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ForeignKey {
    pub child_table: String,
    pub child_column: String,
    pub parent_table: String,
    pub parent_column: String,
}

const LIST_TABLES_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = 'main' AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

const COLUMNS_SQL: &str = "SELECT column_name, data_type, is_nullable \
     FROM information_schema.columns \
     WHERE table_schema = 'main' AND table_name = ? \
     ORDER BY ordinal_position";

const PRIMARY_KEY_SQL: &str = "SELECT CAST(len(constraint_column_names) AS BIGINT), \
     constraint_column_names[1] \
     FROM duckdb_constraints() \
     WHERE schema_name = 'main' AND table_name = ? AND constraint_type = 'PRIMARY KEY'";

const FOREIGN_KEYS_SQL: &str = "SELECT DISTINCT table_name, constraint_column_names[1], \
     referenced_table, referenced_column_names[1] \
     FROM duckdb_constraints() \
     WHERE schema_name = 'main' AND constraint_type = 'FOREIGN KEY' \
     AND len(constraint_column_names) = 1";

impl Database {
    /// Base tables in the main schema, alphabetical
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let result = self.query(LIST_TABLES_SQL, &[])?;
        Ok(result
            .rows
            .iter()
            .filter_map(|r| r.values().next().and_then(|v| v.as_str()).map(String::from))
            .collect())
    }

    /// Columns of `table` in declaration order; empty for an unknown table
    pub fn columns_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let result = self.query(COLUMNS_SQL, &[table.into()])?;
        Ok(result
            .rows
            .iter()
            .map(|r| ColumnInfo {
                name: text(r.get("column_name")),
                data_type: text(r.get("data_type")),
                nullable: text(r.get("is_nullable")) == "YES",
            })
            .collect())
    }

    /// The single primary-key column, or `None` for no key or a composite key
    pub fn primary_key(&self, table: &str) -> Result<Option<String>> {
        let result = self.query(PRIMARY_KEY_SQL, &[table.into()])?;
        let Some(row) = result.rows.first() else {
            return Ok(None);
        };
        let mut values = row.values();
        let width = values.next().and_then(SqlValue::as_i64);
        let column = values.next().and_then(|v| v.as_str()).map(String::from);
        Ok(match width {
            Some(1) => column,
            _ => None,
        })
    }

    /// Every single-column foreign key in the main schema
    pub fn foreign_keys(&self) -> Result<Vec<ForeignKey>> {
        let sql = format!("{} ORDER BY 1, 2", FOREIGN_KEYS_SQL);
        self.fetch_foreign_keys(&sql, &[])
    }

    /// Foreign keys whose target is `parent_table.parent_column`
    pub fn foreign_keys_referencing(
        &self,
        parent_table: &str,
        parent_column: &str,
    ) -> Result<Vec<ForeignKey>> {
        let sql = format!(
            "{} AND referenced_table = ? AND referenced_column_names[1] = ? ORDER BY 1, 2",
            FOREIGN_KEYS_SQL
        );
        self.fetch_foreign_keys(&sql, &[parent_table.into(), parent_column.into()])
    }

    /// Foreign keys declared on `child_table`
    pub fn foreign_keys_of(&self, child_table: &str) -> Result<Vec<ForeignKey>> {
        let sql = format!("{} AND table_name = ? ORDER BY 1, 2", FOREIGN_KEYS_SQL);
        self.fetch_foreign_keys(&sql, &[child_table.into()])
    }

    fn fetch_foreign_keys(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<ForeignKey>> {
        let result = self.query(sql, params)?;
        Ok(result
            .rows
            .iter()
            .map(|r| {
                let mut values = r.values().map(|v| v.to_string());
                ForeignKey {
                    child_table: values.next().unwrap_or_default(),
                    child_column: values.next().unwrap_or_default(),
                    parent_table: values.next().unwrap_or_default(),
                    parent_column: values.next().unwrap_or_default(),
                }
            })
            .collect())
    }
}

fn text(value: Option<&SqlValue>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
