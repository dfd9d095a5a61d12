//! External assignment collection.
//!
//! The timetable persists through a REST-style JSON collection:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `list` | `GET /assignments` |
//! | `create` | `POST /assignments` |
//! | `update` | `PUT /assignments/{id}` |
//! | `delete` | `DELETE /assignments/{id}` |
//!
//! [`AssignmentBackend`] abstracts that collaborator. [`InMemoryBackend`]
//! behaves like a json-server collection and can be told to fail, which is
//! what the session tests run against.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::models::Assignment;

/// CRUD access to the persisted assignment collection.
#[async_trait]
pub trait AssignmentBackend: Send + Sync {
    /// Fetches the whole collection.
    async fn list(&self) -> Result<Vec<Assignment>, PersistenceError>;

    /// Creates a record and returns it as stored.
    async fn create(&self, assignment: &Assignment) -> Result<Assignment, PersistenceError>;

    /// Replaces the record with `assignment.id` and returns it as stored.
    async fn update(&self, assignment: &Assignment) -> Result<Assignment, PersistenceError>;

    /// Removes the record with `id`.
    async fn delete(&self, id: &str) -> Result<(), PersistenceError>;
}

/// An in-process collection with json-server semantics.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    records: Mutex<Vec<Assignment>>,
    failure: Mutex<Option<PersistenceError>>,
}

impl InMemoryBackend {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding `records`.
    pub fn with_records(records: Vec<Assignment>) -> Self {
        Self {
            records: Mutex::new(records),
            failure: Mutex::new(None),
        }
    }

    /// Makes the next call fail with `error`.
    pub fn fail_next(&self, error: PersistenceError) {
        *lock(&self.failure) = Some(error);
    }

    /// Snapshot of the persisted records.
    pub fn records(&self) -> Vec<Assignment> {
        lock(&self.records).clone()
    }

    fn take_failure(&self) -> Result<(), PersistenceError> {
        match lock(&self.failure).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// A poisoned lock still holds consistent data: every mutation below is a
// single push/assign/retain.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl AssignmentBackend for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Assignment>, PersistenceError> {
        self.take_failure()?;
        Ok(self.records())
    }

    async fn create(&self, assignment: &Assignment) -> Result<Assignment, PersistenceError> {
        self.take_failure()?;
        let mut records = lock(&self.records);
        if records.iter().any(|r| r.id == assignment.id) {
            return Err(PersistenceError::Rejected(format!(
                "duplicate id {}",
                assignment.id
            )));
        }
        records.push(assignment.clone());
        Ok(assignment.clone())
    }

    async fn update(&self, assignment: &Assignment) -> Result<Assignment, PersistenceError> {
        self.take_failure()?;
        let mut records = lock(&self.records);
        let record = records
            .iter_mut()
            .find(|r| r.id == assignment.id)
            .ok_or_else(|| PersistenceError::NotFound(assignment.id.clone()))?;
        *record = assignment.clone();
        Ok(assignment.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        self.take_failure()?;
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
