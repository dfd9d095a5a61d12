//! In-memory assignment collection.
//!
//! Holds the assignments of the current session in list order. The store
//! reflects the last successful backend operation; it never talks to the
//! backend itself (see [`crate::session`]).

use tracing::debug;

use crate::error::TimetableError;
use crate::models::Assignment;

/// The session's assignment list.
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    assignments: Vec<Assignment>,
}

impl AssignmentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `assignments`.
    pub fn with_assignments(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    /// All assignments, in insertion order.
    pub fn list(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Replaces the whole collection (after a fetch).
    pub fn replace_all(&mut self, assignments: Vec<Assignment>) {
        debug!(count = assignments.len(), "replacing assignment list");
        self.assignments = assignments;
    }

    /// Appends an assignment and returns the stored copy.
    pub fn add(&mut self, assignment: Assignment) -> &Assignment {
        debug!(id = %assignment.id, "adding assignment");
        self.assignments.push(assignment);
        let last = self.assignments.len() - 1;
        &self.assignments[last]
    }

    /// Replaces the entry with the same id.
    ///
    /// # Errors
    /// `NotFound` if no entry carries that id; the store is left untouched.
    pub fn update(&mut self, assignment: Assignment) -> Result<&Assignment, TimetableError> {
        let index = self
            .position(&assignment.id)
            .ok_or_else(|| TimetableError::NotFound {
                id: assignment.id.clone(),
            })?;
        debug!(id = %assignment.id, "updating assignment");
        self.assignments[index] = assignment;
        Ok(&self.assignments[index])
    }

    /// Removes every entry with `id`. Idempotent.
    pub fn remove(&mut self, id: &str) {
        let before = self.assignments.len();
        self.assignments.retain(|a| a.id != id);
        debug!(id, removed = before - self.assignments.len(), "removing assignment");
    }

    /// Finds an assignment by id.
    pub fn get(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// Whether an assignment with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Returns a fresh timestamp-based id.
    ///
    /// Uses `now_ms` unless that value is already taken, in which case the
    /// next free millisecond is used.
    pub fn next_id(&self, now_ms: i64) -> String {
        let mut candidate = now_ms;
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.assignments.iter().position(|a| a.id == id)
    }
}
