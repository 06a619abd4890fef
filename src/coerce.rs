//! Type-aware coercion of operator text into column values.

use crate::db::{ColumnInfo, SqlValue};
use crate::error::{Error, Result};
use crate::schema::TypeClass;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date layouts tried in order. Slash dates are month-first, dotted dates day-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a calendar date from any of the accepted layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.date_naive())
}

/// Convert `raw` for a column of the given class.
///
/// Empty or missing input becomes NULL for nullable columns and a validation
/// error otherwise. Text passes through unchanged.
pub fn coerce_value(
    field: &str,
    class: TypeClass,
    nullable: bool,
    raw: Option<&str>,
) -> Result<SqlValue> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => {
            return if nullable {
                Ok(SqlValue::Null)
            } else {
                Err(Error::validation(field, "a value is required"))
            };
        }
    };

    match class {
        TypeClass::Integer => raw
            .trim()
            .parse::<i64>()
            .map(SqlValue::Int)
            .map_err(|_| Error::validation(field, format!("expected an integer, got '{}'", raw))),
        TypeClass::Float => match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(SqlValue::Float(n)),
            _ => Err(Error::validation(
                field,
                format!("expected a number, got '{}'", raw),
            )),
        },
        TypeClass::Date => parse_date(raw).map(SqlValue::Date).ok_or_else(|| {
            Error::validation(field, format!("expected a date (YYYY-MM-DD), got '{}'", raw))
        }),
        TypeClass::Text => Ok(SqlValue::Text(raw.to_string())),
    }
}

/// Convert `raw` for a catalog column
pub fn coerce(column: &ColumnInfo, raw: Option<&str>) -> Result<SqlValue> {
    coerce_value(&column.name, column.class(), column.nullable, raw)
}
