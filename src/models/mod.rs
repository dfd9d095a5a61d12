//! Timetable domain models.
//!
//! Provides the data types shared by every component: the time axis the
//! grid is drawn on, the two resources an assignment binds, and the
//! assignment itself (stored record and editable draft).
//!
//! # Vocabulary
//!
//! | Type | Meaning |
//! |------|---------|
//! | `TimeSlot` | One grid column, half-open `[start, end)` |
//! | `HourBlock` | A header block of two sub-slots |
//! | `TimeAxis` | The ordered, contiguous partition of the day |
//! | `Formateur` | Trainer |
//! | `Groupe` | Class cohort |
//! | `Assignment` | Trainer x group x room x title on a day/time range |

mod assignment;
mod resource;
pub mod time_axis;

pub use assignment::{Assignment, AssignmentDraft};
pub use resource::{Formateur, Groupe};
pub use time_axis::{parse_time, HourBlock, TimeAxis, TimeSlot};
