//! DDL generation from the table descriptors.

use super::Table;
use crate::db::quote_ident;

/// CREATE TABLE statement for one table
pub fn create_table_sql(table: Table) -> String {
    let mut lines: Vec<String> = Vec::new();

    for col in table.columns() {
        let mut line = format!("    {} {}", quote_ident(col.name), col.sql_type);
        if col.name == table.primary_key() {
            line.push_str(" PRIMARY KEY");
        } else if !col.nullable {
            line.push_str(" NOT NULL");
        }
        lines.push(line);
    }

    for fk in table.foreign_keys() {
        lines.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_ident(fk.column),
            quote_ident(fk.parent.name()),
            quote_ident(fk.parent_column())
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        quote_ident(table.name()),
        lines.join(",\n")
    )
}

pub fn drop_table_sql(table: Table) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table.name()))
}

/// Statements creating the full schema, parents first
pub fn create_schema_sql() -> Vec<String> {
    Table::ALL.iter().map(|t| create_table_sql(*t)).collect()
}

/// Statements dropping the full schema, children first
pub fn drop_schema_sql() -> Vec<String> {
    Table::ALL.iter().rev().map(|t| drop_table_sql(*t)).collect()
}
