//! Table descriptors for the campus schema.
//!
//! This module provides:
//! - A closed `Table` enum with one variant per table, in dependency order
//! - Typed column descriptors and declared foreign keys per table
//! - Classification of declared SQL types into coercion classes
//! - DDL generation for bootstrapping an empty database

mod ddl;

pub use ddl::*;

use crate::error::Error;
use std::fmt;

/// Coercion class of a declared column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    /// INTEGER, BIGINT, SMALLINT, ...
    Integer,
    /// DOUBLE, REAL, DECIMAL, NUMERIC, ...
    Float,
    /// DATE
    Date,
    /// Everything else is passed through as text
    Text,
}

impl TypeClass {
    /// Classify a type name as reported by the catalog.
    /// Supports DuckDB names plus the PostgreSQL spellings.
    pub fn from_sql_type(type_str: &str) -> Self {
        let lower = type_str.to_lowercase();
        let base = lower.split('(').next().unwrap_or(&lower).trim();

        match base {
            "tinyint" | "smallint" | "integer" | "int" | "bigint" | "hugeint" | "utinyint"
            | "usmallint" | "uinteger" | "ubigint" | "uhugeint" | "int2" | "int4" | "int8"
            | "serial" | "bigserial" | "smallserial" => TypeClass::Integer,
            "real" | "float" | "float4" | "float8" | "double" | "double precision" | "decimal"
            | "numeric" => TypeClass::Float,
            "date" => TypeClass::Date,
            _ => TypeClass::Text,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeClass::Integer => write!(f, "integer"),
            TypeClass::Float => write!(f, "number"),
            TypeClass::Date => write!(f, "date"),
            TypeClass::Text => write!(f, "text"),
        }
    }
}

/// Static description of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    /// Declared SQL type used in DDL
    pub sql_type: &'static str,
    pub nullable: bool,
}

impl ColumnDef {
    const fn new(name: &'static str, sql_type: &'static str, nullable: bool) -> Self {
        Self {
            name,
            sql_type,
            nullable,
        }
    }

    pub fn class(&self) -> TypeClass {
        TypeClass::from_sql_type(self.sql_type)
    }
}

/// A declared single-column foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub column: &'static str,
    pub parent: Table,
}

impl ForeignKeyDef {
    /// Referenced column: parents are keyed by a column of the same name
    pub fn parent_column(&self) -> &'static str {
        self.parent.primary_key()
    }
}

/// The campus tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Student,
    Professor,
    Course,
    Task,
    Registration,
}

const STUDENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("Student_ID", "INTEGER", false),
    ColumnDef::new("Student_Name", "VARCHAR", false),
    ColumnDef::new("Group", "INTEGER", true),
];

const PROFESSOR_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("Professor_ID", "INTEGER", false),
    ColumnDef::new("Professor_Name", "VARCHAR", false),
    ColumnDef::new("Experience", "INTEGER", true),
];

const COURSE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("Course_ID", "INTEGER", false),
    ColumnDef::new("Name", "VARCHAR", false),
    ColumnDef::new("describe", "VARCHAR", true),
];

const TASK_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("Task_ID", "INTEGER", false),
    ColumnDef::new("Task_Name", "VARCHAR", false),
    ColumnDef::new("Complexity", "VARCHAR", true),
    ColumnDef::new("Course_ID", "INTEGER", false),
];

const REGISTRATION_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("Registration_ID", "INTEGER", false),
    ColumnDef::new("Course_ID", "INTEGER", false),
    ColumnDef::new("Professor_ID", "INTEGER", false),
    ColumnDef::new("Student_ID", "INTEGER", false),
    ColumnDef::new("Date", "DATE", false),
];

const TASK_KEYS: &[ForeignKeyDef] = &[ForeignKeyDef {
    column: "Course_ID",
    parent: Table::Course,
}];

const REGISTRATION_KEYS: &[ForeignKeyDef] = &[
    ForeignKeyDef {
        column: "Course_ID",
        parent: Table::Course,
    },
    ForeignKeyDef {
        column: "Professor_ID",
        parent: Table::Professor,
    },
    ForeignKeyDef {
        column: "Student_ID",
        parent: Table::Student,
    },
];

impl Table {
    /// All tables, parents before children
    pub const ALL: [Table; 5] = [
        Table::Student,
        Table::Professor,
        Table::Course,
        Table::Task,
        Table::Registration,
    ];

    /// Name as declared in the database (case-sensitive)
    pub fn name(&self) -> &'static str {
        match self {
            Table::Student => "Student",
            Table::Professor => "Professor",
            Table::Course => "Course",
            Table::Task => "Task",
            Table::Registration => "Registration",
        }
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        match self {
            Table::Student => STUDENT_COLUMNS,
            Table::Professor => PROFESSOR_COLUMNS,
            Table::Course => COURSE_COLUMNS,
            Table::Task => TASK_COLUMNS,
            Table::Registration => REGISTRATION_COLUMNS,
        }
    }

    /// The first column of every campus table is its primary key
    pub fn primary_key(&self) -> &'static str {
        self.columns()[0].name
    }

    pub fn foreign_keys(&self) -> &'static [ForeignKeyDef] {
        match self {
            Table::Task => TASK_KEYS,
            Table::Registration => REGISTRATION_KEYS,
            _ => &[],
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Tables this table references, in declaration order
    pub fn parents(&self) -> Vec<Table> {
        let mut parents = Vec::new();
        for fk in self.foreign_keys() {
            if !parents.contains(&fk.parent) {
                parents.push(fk.parent);
            }
        }
        parents
    }

    /// Comma-separated list of table names for messages
    pub fn names() -> String {
        Table::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Table::ALL
            .iter()
            .find(|t| t.name() == trimmed)
            .or_else(|| {
                // Operators rarely type the exact case
                Table::ALL
                    .iter()
                    .find(|t| t.name().eq_ignore_ascii_case(trimmed))
            })
            .copied()
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "unknown table: {}. Valid tables: {}",
                    trimmed,
                    Table::names()
                ))
            })
    }
}
