//! Synthetic value generator for campus-console.
//!
//! Produces names, numbers and dates for the five campus tables from fixed
//! vocabularies. Generation is deterministic for a given seed so the bulk
//! generator and its tests can reproduce a run.
//!
//! # Example
//!
//! ```rust
//! use campus_gen::CampusFaker;
//!
//! let mut faker = CampusFaker::seeded(42);
//! let name = faker.student_name();
//! let group = faker.group();
//! assert!(name.contains(' '));
//! assert!((31..=35).contains(&group));
//! ```

pub mod fake;

pub use fake::{CampusFaker, CourseValues, COMPLEXITIES};
