//! The three canned analytical queries with server-side timing.
//!
//! Each query runs twice: once under `EXPLAIN ANALYZE` to obtain the plan and
//! its reported execution time, once plainly for the result rows. A failure in
//! the first step only drops the timing.

mod plan;

pub use plan::parse_execution_ms;

use crate::coerce::coerce_value;
use crate::db::{Database, QueryRows, SqlValue};
use crate::error::{Error, Result};
use crate::schema::TypeClass;
use chrono::NaiveDate;
use log::warn;

/// Row cap of every analytical query
pub const RESULT_LIMIT: usize = 100;

const STUDENT_TASKS_SQL: &str = r#"SELECT s."Student_Name" AS student_name,
       c."Name" AS course_name,
       CAST(COUNT(t."Task_ID") AS BIGINT) AS tasks_count
FROM "Student" s
JOIN "Registration" r ON r."Student_ID" = s."Student_ID"
JOIN "Course" c ON c."Course_ID" = r."Course_ID"
LEFT JOIN "Task" t ON t."Course_ID" = c."Course_ID"
WHERE s."Student_Name" ILIKE ?
GROUP BY s."Student_Name", c."Name"
ORDER BY tasks_count DESC, student_name, course_name
LIMIT 100"#;

const PROFESSOR_COURSES_SQL: &str = r#"SELECT p."Professor_Name" AS professor_name,
       p."Experience" AS experience,
       CAST(COUNT(DISTINCT r."Course_ID") AS BIGINT) AS courses_count
FROM "Professor" p
LEFT JOIN "Registration" r ON r."Professor_ID" = p."Professor_ID"
WHERE p."Experience" >= ?
GROUP BY p."Professor_Name", p."Experience"
ORDER BY courses_count DESC, professor_name
LIMIT 100"#;

const COURSE_REGISTRATIONS_SQL: &str = r#"SELECT c."Name" AS course_name,
       CAST(COUNT(r."Registration_ID") AS BIGINT) AS regs_count
FROM "Course" c
JOIN "Registration" r ON r."Course_ID" = c."Course_ID"
WHERE r."Date" BETWEEN CAST(? AS DATE) AND CAST(? AS DATE)
GROUP BY c."Name"
ORDER BY regs_count DESC, course_name
LIMIT 100"#;

/// Result rows with the analyzed plan
#[derive(Debug, Clone)]
pub struct TimedQuery {
    pub rows: QueryRows,
    /// Absent when the plan could not be obtained or carried no timing
    pub execution_ms: Option<f64>,
    pub plan: String,
}

pub struct AnalyticsRunner<'a> {
    db: &'a Database,
}

impl<'a> AnalyticsRunner<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Task counts per (student, course) for students whose name contains `pattern`
    pub fn student_tasks(&self, pattern: &str) -> Result<TimedQuery> {
        let param = SqlValue::Text(format!("%{}%", pattern.trim()));
        self.run_timed(STUDENT_TASKS_SQL, &[param])
    }

    /// Distinct course counts for professors with at least `min_experience` years
    pub fn professor_courses(&self, min_experience: i64) -> Result<TimedQuery> {
        self.run_timed(PROFESSOR_COURSES_SQL, &[SqlValue::Int(min_experience)])
    }

    /// Registration counts per course with dates in `[start, end]`
    pub fn course_registrations(&self, start: NaiveDate, end: NaiveDate) -> Result<TimedQuery> {
        if start > end {
            return Err(Error::validation(
                "start",
                format!("{} is after the end date {}", start, end),
            ));
        }
        self.run_timed(
            COURSE_REGISTRATIONS_SQL,
            &[SqlValue::Date(start), SqlValue::Date(end)],
        )
    }

    fn run_timed(&self, sql: &str, params: &[SqlValue]) -> Result<TimedQuery> {
        self.with_plan(self.explain(sql, params), sql, params)
    }

    /// Run the query itself; a failed plan step only leaves the timing empty
    fn with_plan(
        &self,
        analyzed: Result<String>,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<TimedQuery> {
        let (plan, execution_ms) = match analyzed {
            Ok(plan) => {
                let ms = parse_execution_ms(&plan);
                if ms.is_none() {
                    warn!("analyzed plan reported no execution time");
                }
                (plan, ms)
            }
            Err(e) => {
                warn!("could not obtain analyzed plan: {}", e);
                (String::new(), None)
            }
        };
        let rows = self.db.query(sql, params)?;
        Ok(TimedQuery {
            rows,
            execution_ms,
            plan,
        })
    }

    fn explain(&self, sql: &str, params: &[SqlValue]) -> Result<String> {
        let result = self.db.query(&format!("EXPLAIN ANALYZE {}", sql), params)?;
        let lines: Vec<String> = result
            .rows
            .iter()
            .flat_map(|row| row.values().filter_map(|v| v.as_str().map(String::from)))
            .collect();
        Ok(lines.join("\n"))
    }
}

/// Validate a minimum-experience filter
pub fn parse_min_experience(raw: &str) -> Result<i64> {
    let value = coerce_value("min_experience", TypeClass::Integer, false, Some(raw))?;
    value
        .as_i64()
        .ok_or_else(|| Error::validation("min_experience", "expected an integer"))
}

/// Validate one bound of a date range
pub fn parse_date_bound(field: &str, raw: &str) -> Result<NaiveDate> {
    match coerce_value(field, TypeClass::Date, false, Some(raw))? {
        SqlValue::Date(date) => Ok(date),
        other => Err(Error::validation(field, format!("expected a date, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_min_experience() {
        assert_eq!(parse_min_experience(" 10 ").unwrap(), 10);
        assert!(parse_min_experience("ten").is_err());
        assert!(parse_min_experience("").is_err());
    }

    #[test]
    fn test_parse_date_bound() {
        assert_eq!(
            parse_date_bound("start", "2024/01/31").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        let err = parse_date_bound("end", "soon").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "end"));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema(false).unwrap();
        let runner = AnalyticsRunner::new(&db);
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = runner.course_registrations(start, end).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_queries_are_capped() {
        for sql in [STUDENT_TASKS_SQL, PROFESSOR_COURSES_SQL, COURSE_REGISTRATIONS_SQL] {
            assert!(sql.ends_with(&format!("LIMIT {}", RESULT_LIMIT)));
        }
    }

    #[test]
    fn test_failed_plan_still_returns_rows() {
        let db = Database::open_in_memory().unwrap();
        db.init_schema(false).unwrap();
        db.insert(
            "Professor",
            &crate::db::Record::new()
                .with("Professor_ID", 1)
                .with("Professor_Name", "Ivan Shevchenko")
                .with("Experience", 12),
        )
        .unwrap();
        let runner = AnalyticsRunner::new(&db);

        let analyzed = Err(Error::Engine("EXPLAIN ANALYZE is not available".to_string()));
        let result = runner
            .with_plan(analyzed, PROFESSOR_COURSES_SQL, &[SqlValue::Int(5)])
            .unwrap();
        assert_eq!(result.execution_ms, None);
        assert!(result.plan.is_empty());
        assert_eq!(result.rows.rows.len(), 1);

        let result = runner
            .with_plan(Ok("no timing here".to_string()), PROFESSOR_COURSES_SQL, &[SqlValue::Int(5)])
            .unwrap();
        assert_eq!(result.execution_ms, None);
        assert_eq!(result.plan, "no timing here");
        assert_eq!(result.rows.rows.len(), 1);
    }
}
