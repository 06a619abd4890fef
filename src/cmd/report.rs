use super::ReportQuery;
use anyhow::Result;
use campus_console::analytics::{parse_date_bound, parse_min_experience, AnalyticsRunner};
use campus_console::db::Database;
use campus_console::output::{OutputFormat, ResultFormatter};

pub fn run(db: &Database, query: ReportQuery, plan: bool, format: OutputFormat) -> Result<()> {
    let runner = AnalyticsRunner::new(db);
    let result = match query {
        ReportQuery::StudentTasks { pattern } => runner.student_tasks(&pattern)?,
        ReportQuery::ProfessorCourses { min_experience } => {
            runner.professor_courses(parse_min_experience(&min_experience)?)?
        }
        ReportQuery::CourseRegistrations { start, end } => runner.course_registrations(
            parse_date_bound("start", &start)?,
            parse_date_bound("end", &end)?,
        )?,
    };

    print!("{}", ResultFormatter::format(&result.rows, format));
    match result.execution_ms {
        Some(ms) => eprintln!("Execution time: {:.3} ms", ms),
        None => eprintln!("Execution time: unavailable"),
    }
    if plan && !result.plan.is_empty() {
        eprintln!("{}", result.plan);
    }
    Ok(())
}
