//! Database handle and generic data access.
//!
//! The `Database` owns the single DuckDB connection of the process and is
//! passed explicitly to every operation. Submodules add:
//!
//! - `inspect`: catalog queries (tables, columns, primary and foreign keys)
//! - `records`: identifier-safe select/insert/update/delete on any table
//! - `integrity`: parent/child existence checks and checked mutations
//!
//! Identifiers always go through [`quote_ident`]; values are always bound.

mod inspect;
mod integrity;
mod records;
mod value;

pub use inspect::{ColumnInfo, ForeignKey};
pub use integrity::MissingParent;
pub use value::{Record, SqlValue};

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::schema::{create_schema_sql, drop_schema_sql, Table};
use duckdb::types::ToSql;
use duckdb::Connection;
use log::debug;
use std::path::Path;

/// Connection target meaning "no file"
pub const IN_MEMORY: &str = ":memory:";

/// Quote an identifier with double quotes, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Rows returned by a query, with the column names of the result set
#[derive(Debug, Clone, Default)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

/// The process-wide database handle
pub struct Database {
    conn: Connection,
    target: String,
}

impl Database {
    /// Open the database named by the configuration
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let target = config
            .path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Connection("no database path configured".to_string()))?;

        let conn = if target == IN_MEMORY {
            Connection::open_in_memory()
                .map_err(|e| Error::Connection(format!("in-memory database: {}", e)))?
        } else {
            let path = Path::new(target);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.is_dir() {
                    return Err(Error::Connection(format!(
                        "{}: directory {} does not exist",
                        target,
                        parent.display()
                    )));
                }
            }
            Connection::open(path).map_err(|e| Error::Connection(format!("{}: {}", target, e)))?
        };

        if let Some(ref limit) = config.memory_limit {
            // SET does not accept a bound parameter
            conn.execute_batch(&format!(
                "SET memory_limit = '{}'",
                limit.replace('\'', "''")
            ))
            .map_err(|e| Error::Connection(format!("invalid memory_limit {}: {}", limit, e)))?;
        }

        debug!("opened database {}", target);
        Ok(Self {
            conn,
            target: target.to_string(),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&DatabaseConfig {
            path: Some(IN_MEMORY.to_string()),
            memory_limit: None,
        })
    }

    /// Path or `:memory:`
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Close the connection, reporting a failed shutdown
    pub fn close(self) -> Result<()> {
        let target = self.target;
        self.conn
            .close()
            .map_err(|(_, e)| Error::Engine(format!("closing {}: {}", target, e)))?;
        debug!("closed database {}", target);
        Ok(())
    }

    /// Execute a statement with bound parameters, returning the changed row count
    pub(crate) fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize> {
        debug!("execute: {} {:?}", sql, params);
        let refs: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        Ok(self.conn.execute(sql, &refs[..])?)
    }

    /// Run a query and collect every row as a record
    pub(crate) fn query(&self, sql: &str, params: &[SqlValue]) -> Result<QueryRows> {
        debug!("query: {} {:?}", sql, params);
        let refs: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows_result = stmt.query(&refs[..])?;

        let mut raw_rows: Vec<Vec<SqlValue>> = Vec::new();
        while let Some(row) = rows_result.next()? {
            let column_count = row.as_ref().column_count();
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(SqlValue::from(row.get_ref(i)?));
            }
            raw_rows.push(values);
        }

        // Drop the rows iterator to release the mutable borrow
        drop(rows_result);

        let columns: Vec<String> = (0..stmt.column_count())
            .map(|i| {
                stmt.column_name(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| format!("col{}", i))
            })
            .collect();

        let rows = raw_rows
            .into_iter()
            .map(|values| columns.iter().cloned().zip(values).collect())
            .collect();

        Ok(QueryRows { columns, rows })
    }

    /// First column of the first row
    pub(crate) fn query_scalar(&self, sql: &str, params: &[SqlValue]) -> Result<SqlValue> {
        let result = self.query(sql, params)?;
        Ok(result
            .rows
            .into_iter()
            .next()
            .and_then(|r| r.values().next().cloned())
            .unwrap_or(SqlValue::Null))
    }

    /// Run `f` inside one transaction: commit on success, roll back on error
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK") {
                    debug!("rollback failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Create the campus tables; with `reset`, drop existing ones first
    pub fn init_schema(&self, reset: bool) -> Result<()> {
        self.in_transaction(|db| {
            if reset {
                for sql in drop_schema_sql() {
                    db.execute(&sql, &[])?;
                }
            }
            for sql in create_schema_sql() {
                db.execute(&sql, &[])?;
            }
            Ok(())
        })
    }

    /// Campus tables that are not present in the catalog
    pub fn missing_tables(&self) -> Result<Vec<Table>> {
        let present = self.list_tables()?;
        Ok(Table::ALL
            .into_iter()
            .filter(|t| !present.iter().any(|p| p == t.name()))
            .collect())
    }
}
