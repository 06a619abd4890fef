//! Values and records crossing the database boundary.

use chrono::NaiveDate;
use duckdb::types::{ToSql, ToSqlOutput, Value, ValueRef};
use std::fmt;

/// 0001-01-01 to 1970-01-01 in days
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON representation used by the output formatter
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SqlValue::Null => serde_json::Value::Null,
            SqlValue::Bool(b) => serde_json::Value::Bool(*b),
            SqlValue::Int(n) => serde_json::Value::Number((*n).into()),
            SqlValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SqlValue::Text(s) => serde_json::Value::String(s.clone()),
            SqlValue::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Float(n) => write!(f, "{}", n),
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self {
        SqlValue::Int(n as i64)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl From<f64> for SqlValue {
    fn from(n: f64) -> Self {
        SqlValue::Float(n)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(d: NaiveDate) -> Self {
        SqlValue::Date(d)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Bool(b) => ToSqlOutput::Owned(Value::Boolean(*b)),
            SqlValue::Int(n) => ToSqlOutput::Owned(Value::BigInt(*n)),
            SqlValue::Float(n) => ToSqlOutput::Owned(Value::Double(*n)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            // ISO text; the engine casts it to the DATE type of the target
            SqlValue::Date(d) => {
                ToSqlOutput::Owned(Value::Text(d.format("%Y-%m-%d").to_string()))
            }
        })
    }
}

impl<'a> From<ValueRef<'a>> for SqlValue {
    fn from(value: ValueRef<'a>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Boolean(b) => SqlValue::Bool(b),
            ValueRef::TinyInt(n) => SqlValue::Int(n as i64),
            ValueRef::SmallInt(n) => SqlValue::Int(n as i64),
            ValueRef::Int(n) => SqlValue::Int(n as i64),
            ValueRef::BigInt(n) => SqlValue::Int(n),
            ValueRef::HugeInt(n) => i64::try_from(n)
                .map(SqlValue::Int)
                .unwrap_or_else(|_| SqlValue::Text(n.to_string())),
            ValueRef::UTinyInt(n) => SqlValue::Int(n as i64),
            ValueRef::USmallInt(n) => SqlValue::Int(n as i64),
            ValueRef::UInt(n) => SqlValue::Int(n as i64),
            ValueRef::UBigInt(n) => i64::try_from(n)
                .map(SqlValue::Int)
                .unwrap_or_else(|_| SqlValue::Text(n.to_string())),
            ValueRef::Float(f) => SqlValue::Float(f as f64),
            ValueRef::Double(f) => SqlValue::Float(f),
            ValueRef::Decimal(d) => d
                .to_string()
                .parse::<f64>()
                .map(SqlValue::Float)
                .unwrap_or_else(|_| SqlValue::Text(d.to_string())),
            ValueRef::Text(s) => SqlValue::Text(String::from_utf8_lossy(s).to_string()),
            ValueRef::Blob(b) => SqlValue::Text(format!("<blob {} bytes>", b.len())),
            ValueRef::Date32(days) => {
                match NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_DAYS_FROM_CE + days) {
                    Some(date) => SqlValue::Date(date),
                    None => SqlValue::Int(days as i64),
                }
            }
            ValueRef::Timestamp(unit, ts) => {
                let micros = unit.to_micros(ts);
                let secs = micros.div_euclid(1_000_000);
                let nanos = (micros.rem_euclid(1_000_000) * 1000) as u32;
                match chrono::DateTime::from_timestamp(secs, nanos) {
                    Some(dt) => SqlValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
                    None => SqlValue::Int(ts),
                }
            }
            other => SqlValue::Text(format!("{:?}", other)),
        }
    }
}

/// An ordered mapping from column name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column, replacing an existing value in place
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if every field of `other` is present here with an equal value
    pub fn contains_all(&self, other: &Record) -> bool {
        other.iter().all(|(c, v)| self.get(c) == Some(v))
    }
}

impl FromIterator<(String, SqlValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (c, v) in iter {
            record.set(c, v);
        }
        record
    }
}
