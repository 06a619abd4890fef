//! Fake value helpers.
//!
//! Every value is drawn uniformly from a fixed pool or a closed numeric range.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Student first names
const STUDENT_FIRST_NAMES: &[&str] = &[
    "Oleksandr", "Mariia", "Dmytro", "Iryna", "Maksym", "Kateryna", "Andrii", "Olha", "Serhii",
    "Nataliia",
];

/// Student last names
const STUDENT_LAST_NAMES: &[&str] = &[
    "Popov",
    "Shevchenko",
    "Kovalenko",
    "Boiko",
    "Melnyk",
    "Tkachenko",
    "Kravchenko",
    "Polishchuk",
    "Lysenko",
    "Savchenko",
];

/// Professor first names
const PROFESSOR_FIRST_NAMES: &[&str] = &[
    "Ivan",
    "Liudmyla",
    "Volodymyr",
    "Oksana",
    "Yurii",
    "Svitlana",
    "Petro",
    "Halyna",
];

/// Professor last names
const PROFESSOR_LAST_NAMES: &[&str] = &[
    "Sydorenko",
    "Petrenko",
    "Honcharenko",
    "Klymenko",
    "Romanenko",
    "Fedorenko",
];

/// Course subjects
const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Programming",
    "Physics",
    "Modelling",
    "Databases",
    "Computer Networks",
    "Operating Systems",
    "Artificial Intelligence",
];

/// Task kinds
const TASK_TITLES: &[&str] = &["Lab", "Test", "Homework", "Project", "Quiz"];

/// Task complexity levels
pub const COMPLEXITIES: &[&str] = &["Low", "Medium", "High"];

/// Student groups are numbered 31 through 35
const GROUP_RANGE: std::ops::RangeInclusive<i64> = 31..=35;

/// Professor experience in years
const EXPERIENCE_RANGE: std::ops::RangeInclusive<i64> = 1..=40;

/// Registrations are dated up to this many days in the past
const REGISTRATION_WINDOW_DAYS: u64 = 1000;

/// Name and description of a generated course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseValues {
    pub name: String,
    pub description: String,
}

/// Campus value generator
pub struct CampusFaker<R: Rng> {
    rng: R,
}

impl CampusFaker<ChaCha8Rng> {
    /// Create a generator with a reproducible ChaCha stream
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> CampusFaker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Pick a random element from a non-empty pool
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.random_range(0..items.len())]
    }

    /// Full student name
    pub fn student_name(&mut self) -> String {
        let first = self.pick(STUDENT_FIRST_NAMES);
        let last = self.pick(STUDENT_LAST_NAMES);
        format!("{} {}", first, last)
    }

    /// Numeric study group
    pub fn group(&mut self) -> i64 {
        self.rng.random_range(GROUP_RANGE)
    }

    /// Full professor name
    pub fn professor_name(&mut self) -> String {
        let first = self.pick(PROFESSOR_FIRST_NAMES);
        let last = self.pick(PROFESSOR_LAST_NAMES);
        format!("{} {}", first, last)
    }

    /// Years of teaching experience
    pub fn experience(&mut self) -> i64 {
        self.rng.random_range(EXPERIENCE_RANGE)
    }

    /// Course name ("Databases 3") with a matching description
    pub fn course(&mut self) -> CourseValues {
        let subject = *self.pick(SUBJECTS);
        let level: u32 = self.rng.random_range(1..=5);
        CourseValues {
            name: format!("{} {}", subject, level),
            description: format!("Course in {}", subject),
        }
    }

    /// Task title ("Lab #4")
    pub fn task_name(&mut self) -> String {
        let title = self.pick(TASK_TITLES);
        let number: u32 = self.rng.random_range(1..=10);
        format!("{} #{}", title, number)
    }

    pub fn complexity(&mut self) -> &'static str {
        *self.pick(COMPLEXITIES)
    }

    /// A date within the registration window ending at `today`
    pub fn registration_date(&mut self, today: NaiveDate) -> NaiveDate {
        let back = self.rng.random_range(0..REGISTRATION_WINDOW_DAYS);
        today.checked_sub_days(Days::new(back)).unwrap_or(today)
    }

    /// Pick a parent identifier uniformly, or `None` when there are no parents
    pub fn pick_id(&mut self, ids: &[i64]) -> Option<i64> {
        if ids.is_empty() {
            None
        } else {
            Some(ids[self.rng.random_range(0..ids.len())])
        }
    }
}
