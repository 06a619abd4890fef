//! Error taxonomy for the data-access layer.
//!
//! Every engine failure is caught at the access boundary and turned into one
//! of these variants; callers display them, they never see a raw driver error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed operator input for a typed field
    #[error("invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    /// Referenced table, row or key does not exist
    #[error("{0}")]
    NotFound(String),

    /// Foreign-key or primary-key violation, engine text kept verbatim
    #[error("{0}")]
    Integrity(String),

    /// The database could not be opened
    #[error("could not connect to database: {0}")]
    Connection(String),

    /// Any other failure reported by the engine
    #[error("database error: {0}")]
    Engine(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, Error::Integrity(_))
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        let message = err.to_string();
        if is_constraint_message(&message) {
            Error::Integrity(message)
        } else if is_missing_object_message(&message) {
            Error::NotFound(message)
        } else {
            Error::Engine(message)
        }
    }
}

/// DuckDB reports PK/FK/NOT NULL failures as "Constraint Error: ..."
fn is_constraint_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("constraint error")
        || (lower.contains("violates") && lower.contains("constraint"))
}

/// Unknown table or column
fn is_missing_object_message(message: &str) -> bool {
    message.contains("Catalog Error") && message.contains("does not exist")
}
