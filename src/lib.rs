//! Weekly timetable engine.
//!
//! Lays trainer/group assignments out on a grid of fixed time slots and
//! decides, for any chosen day and range, whether the operator is editing
//! an existing assignment or creating a new one.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeAxis`, `TimeSlot`, `HourBlock`,
//!   `Formateur`, `Groupe`, `Assignment`, `AssignmentDraft`
//! - **`grid`**: Day/week render plans (origin, covered and empty cells)
//! - **`index`**: Distinct groups/trainers and their many-to-many linkage
//! - **`selection`**: Resource focus and the create-vs-edit state machine
//! - **`store`**: In-memory assignment list
//! - **`backend`**: The external assignment collection
//! - **`session`**: Store, resolver and backend wired together
//! - **`validation`**: Required fields, alignment and double-booking checks
//! - **`config`**: Axis, week and room configuration
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime};
//! use weekly_timetable::grid::{compose_day, CellKind};
//! use weekly_timetable::models::{Assignment, TimeAxis};
//!
//! let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let axis = TimeAxis::hourly(at(8, 30), 1, 30).unwrap();
//! let lesson = Assignment::new("1", day, at(8, 30), at(9, 30));
//!
//! let plan = compose_day(&axis, day, &[&lesson]);
//! assert!(matches!(plan.cells[0].kind, CellKind::Origin { span: 2, .. }));
//! assert_eq!(plan.cells[1].kind, CellKind::Covered);
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod grid;
pub mod index;
pub mod models;
pub mod selection;
pub mod session;
pub mod store;
pub mod validation;

pub use error::{PersistenceError, TimetableError};
