//! Validation for timetable edits.
//!
//! Checks a draft before it is saved and checks a whole assignment list for
//! structural problems. Detects:
//! - Missing required fields
//! - Reversed or empty time ranges
//! - Boundaries that are not on the time axis
//! - Rooms outside the configured list
//! - Double-booked groups or trainers (overlapping ranges on the same day)
//! - Duplicate assignment ids
//!
//! The backend does not enforce the no-overlap rule, so the save path is
//! the only guard against double-booking.

use std::collections::HashSet;

use chrono::NaiveTime;

use crate::models::{Assignment, AssignmentDraft, TimeAxis};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required form field is empty.
    MissingField,
    /// End is not after start.
    InvalidTimeRange,
    /// A boundary does not coincide with a slot boundary.
    UnalignedBoundary,
    /// The room is not in the configured list.
    UnknownRoom,
    /// Overlaps another assignment of the same group or trainer.
    ScheduleConflict,
    /// Two assignments share the same id.
    DuplicateId,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(
            ValidationErrorKind::MissingField,
            format!("Missing required field: {field}"),
        )
    }
}

/// Validates a draft about to be saved.
///
/// Checks:
/// 1. `title`, `day`, `startTime`, `endTime`, `formateur` and `salle` are set
/// 2. End is after start
/// 3. Both boundaries are on the axis
/// 4. The room is known (skipped when `rooms` is empty)
/// 5. No overlap with another assignment of the same group or trainer
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_draft(
    draft: &AssignmentDraft,
    axis: &TimeAxis,
    rooms: &[String],
    existing: &[Assignment],
) -> ValidationResult {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push(ValidationError::missing("title"));
    }
    if draft.day.is_none() {
        errors.push(ValidationError::missing("day"));
    }
    if draft.start_time.is_none() {
        errors.push(ValidationError::missing("startTime"));
    }
    if draft.end_time.is_none() {
        errors.push(ValidationError::missing("endTime"));
    }
    if draft.formateur.is_blank() {
        errors.push(ValidationError::missing("formateur"));
    }
    if draft.salle.trim().is_empty() {
        errors.push(ValidationError::missing("salle"));
    } else if !rooms.is_empty() && !rooms.iter().any(|r| *r == draft.salle) {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownRoom,
            format!("Unknown room: {}", draft.salle),
        ));
    }

    if let (Some(start), Some(end)) = (draft.start_time, draft.end_time) {
        errors.extend(check_range(axis, start, end));
    }

    // Overlap only makes sense for a complete, well-formed range.
    if errors.is_empty() {
        let id = draft.id.clone().unwrap_or_default();
        if let Some(candidate) = draft.to_assignment(id) {
            errors.extend(find_conflicts(&candidate, existing));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_range(axis: &TimeAxis, start: NaiveTime, end: NaiveTime) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if end <= start {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTimeRange,
            format!("End time {} must be after start time {}", end.format("%H:%M"), start.format("%H:%M")),
        ));
    }
    if axis.index_of_start(start).is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnalignedBoundary,
            format!("Start time {} is not a slot boundary", start.format("%H:%M")),
        ));
    }
    if axis.index_of_end(end).is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnalignedBoundary,
            format!("End time {} is not a slot boundary", end.format("%H:%M")),
        ));
    }
    errors
}

/// Assignments that double-book `candidate`'s group or trainer.
///
/// An entry with the candidate's own id is the record being edited and is
/// skipped. Blank resources never conflict.
pub fn find_conflicts(candidate: &Assignment, existing: &[Assignment]) -> Vec<ValidationError> {
    existing
        .iter()
        .filter(|other| other.id != candidate.id && other.overlaps(candidate))
        .filter_map(|other| {
            let same_group = !candidate.groupe.is_blank() && other.groupe.same_as(&candidate.groupe);
            let same_trainer =
                !candidate.formateur.is_blank() && other.formateur.same_as(&candidate.formateur);
            let who = match (same_group, same_trainer) {
                (true, true) => format!(
                    "group {} and trainer {}",
                    candidate.groupe.code_groupe, candidate.formateur.matricule
                ),
                (true, false) => format!("group {}", candidate.groupe.code_groupe),
                (false, true) => format!("trainer {}", candidate.formateur.matricule),
                (false, false) => return None,
            };
            Some(ValidationError::new(
                ValidationErrorKind::ScheduleConflict,
                format!(
                    "{who} already booked on {} {}-{} ('{}')",
                    other.day,
                    other.start_time.format("%H:%M"),
                    other.end_time.format("%H:%M"),
                    other.title
                ),
            ))
        })
        .collect()
}

/// Checks a whole assignment list, e.g. right after fetching it.
///
/// Checks:
/// 1. No duplicate ids
/// 2. No group or trainer is double-booked
pub fn validate_schedule(assignments: &[Assignment]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for a in assignments {
        if !ids.insert(a.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate assignment ID: {}", a.id),
            ));
        }
    }

    // Each pair is reported once, from the later entry.
    for (i, a) in assignments.iter().enumerate() {
        errors.extend(find_conflicts(a, &assignments[..i]));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
