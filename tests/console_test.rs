//! Scripted console sessions.

use campus_console::config::ConsoleConfig;
use campus_console::console::{Console, ScriptedPrompter};
use campus_console::db::{Database, SqlValue};

fn campus_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.init_schema(false).unwrap();
    db
}

fn run_session(db: &Database, lines: &[&str]) -> String {
    let prompter = ScriptedPrompter::new(lines.iter().copied());
    let mut console = Console::new(db, prompter, Vec::new(), ConsoleConfig::default()).with_seed(3);
    console.run().unwrap();
    let (prompter, out) = console.into_parts();
    assert_eq!(prompter.remaining(), 0, "script not fully consumed");
    String::from_utf8(out).unwrap()
}

#[test]
fn test_crud_session() {
    let db = campus_db();
    let out = run_session(
        &db,
        &[
            // course with an assigned key
            "4", "Course", "", "Databases 1", "",
            // task pointing at a missing course
            "4", "Task", "", "Lab #1", "High", "9",
            // valid task
            "4", "Task", "", "Lab #1", "High", "1",
            // course is referenced now
            "6", "Course", "1",
            "9", "Course", "1",
            // keep name and course, change complexity
            "5", "Task", "1", "", "Medium", "",
            "3", "Task", "1",
            "6", "Task", "1", "так",
            "0",
        ],
    );

    assert!(out.contains("Inserted into Course (Course_ID = 1)."), "{}", out);
    assert!(out.contains("Error: Course_ID (9) not found in table Course"));
    assert!(out.contains("Inserted into Task (Task_ID = 1)."));
    assert!(out.contains("Error: cannot delete Course Course_ID = 1"));
    assert!(out.contains("Rows in dependent tables reference Course Course_ID = 1"));
    assert!(out.contains("Updated 1 row(s) in Task."));
    assert!(out.contains("Medium"));
    assert!(out.contains("Deleted 1 row(s) from Task."));
    assert!(out.ends_with("Goodbye!\n"));

    assert_eq!(db.count("Course").unwrap(), 1);
    assert_eq!(db.count("Task").unwrap(), 0);
}

#[test]
fn test_invalid_field_is_reprompted() {
    let db = campus_db();
    let out = run_session(
        &db,
        &["4", "Student", "7", "Olena Koval", "abc", "32", "0"],
    );
    assert!(out.contains("Error: invalid value for Group: expected an integer, got 'abc'"));
    assert!(out.contains("Try again (2 left)."));
    let row = db
        .select_by_key("Student", "Student_ID", &SqlValue::Int(7))
        .unwrap()
        .unwrap();
    assert_eq!(row.get("Group"), Some(&SqlValue::Int(32)));
}

#[test]
fn test_required_field_cannot_be_blank() {
    let db = campus_db();
    let out = run_session(&db, &["4", "Course", "", "", "", "", "0"]);
    assert_eq!(out.matches("a value is required").count(), 3);
    assert!(out.contains("Cancelled: no valid input after 3 attempts"));
    assert_eq!(db.count("Course").unwrap(), 0);
}

#[test]
fn test_delete_can_be_declined() {
    let db = campus_db();
    run_session(&db, &["4", "Student", "", "Petro Bondar", "", "0"]);
    let out = run_session(&db, &["6", "student", "1", "n", "0"]);
    assert!(out.contains("Deletion cancelled."));
    assert_eq!(db.count("Student").unwrap(), 1);
}

#[test]
fn test_generate_and_list() {
    let db = campus_db();
    let out = run_session(&db, &["7", "0", "10", "1", "2", "Registration", "0"]);
    assert!(out.contains("invalid value for count"));
    assert!(out.contains("Student: inserted 10 rows"));
    assert!(out.contains("Registration: inserted 10 rows"));
    assert!(out.contains("  Task (10 rows)"));
    assert!(out.contains("10 rows\n"));
}

#[test]
fn test_analytics_session() {
    let db = campus_db();
    let out = run_session(
        &db,
        &[
            "7", "5",
            "8", "2", "ten", "0",
            "8", "3", "2024-06-01", "2024-01-01",
            "8", "4",
            "0",
        ],
    );
    assert!(out.contains("invalid value for min_experience"));
    assert!(out.contains("courses_count"));
    assert!(out.contains(" ms\nPlan (last 8 lines):"), "{}", out);
    assert!(!out.contains("Execution time: unavailable"));
    assert!(out.contains("is after the end date"));
    assert!(out.contains("Cancelled: unknown query '4'"));
}

#[test]
fn test_show_missing_row() {
    let db = campus_db();
    let out = run_session(&db, &["3", "Professor", "5", "0"]);
    assert!(out.contains("No row in Professor with Professor_ID = 5."));
}
