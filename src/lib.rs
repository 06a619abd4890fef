//! Console front-end for a student/professor/course/task/registration schema
//! on embedded DuckDB: generic CRUD with referential-integrity checks, bulk
//! synthetic data, and three analytical queries with execution timing.

pub mod analytics;
pub mod coerce;
pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod generate;
pub mod logging;
pub mod output;
pub mod schema;

pub use db::Database;
pub use error::{Error, Result};
