//! Timetable session: store, resolver and backend wired together.
//!
//! Every mutation goes to the backend first and reaches the in-memory store
//! only once the backend has accepted it. A failed call leaves the store as
//! it was, records the failure in [`SyncStatus`], and keeps the form open
//! so the same action can be issued again.
//!
//! The [`SyncStatus`] is published on a `watch` channel, so the UI can read
//! it while a call holds the session. A call dropped before it settles
//! (e.g. the caller's task is cancelled) puts the status back to idle.

use std::fmt;

use chrono::{Local, NaiveDate, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::AssignmentBackend;
use crate::config::TimetableConfig;
use crate::error::{PersistenceError, TimetableError};
use crate::grid::{
    compose_day, compose_week, shift_week, start_of_week, week_days, week_range_label, DayPlan,
};
use crate::index::ResourceIndex;
use crate::models::{Assignment, TimeAxis};
use crate::selection::{Command, Phase, SelectionResolver};
use crate::store::AssignmentStore;
use crate::validation::{validate_schedule, ValidationError};

/// Which backend call is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Listing the collection.
    Fetch,
    /// Creating a record.
    Create,
    /// Replacing a record.
    Update,
    /// Removing a record.
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Persistence status shown to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// Nothing in flight; last call (if any) succeeded.
    #[default]
    Idle,
    /// A call is awaiting the backend; the store is read-only.
    InFlight(Operation),
    /// The last call failed.
    Failed {
        /// The call that failed.
        operation: Operation,
        /// Backend error text.
        message: String,
    },
}

/// What a completed user action did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The record as stored after create or update.
    Saved(Assignment),
    /// Id of the removed record.
    Deleted(String),
    /// Nothing to do (e.g. delete on an unsaved draft).
    Unchanged,
}

/// A timetable editing session.
pub struct Timetable<B> {
    backend: B,
    store: AssignmentStore,
    axis: TimeAxis,
    rooms: Vec<String>,
    week_length: usize,
    resolver: SelectionResolver,
    week_start: NaiveDate,
    status: watch::Sender<SyncStatus>,
    clock: fn() -> i64,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Marks a backend call in flight until it is settled or dropped.
struct InFlight<'a> {
    status: &'a watch::Sender<SyncStatus>,
    operation: Operation,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn start(status: &'a watch::Sender<SyncStatus>, operation: Operation) -> Self {
        status.send_replace(SyncStatus::InFlight(operation));
        Self {
            status,
            operation,
            settled: false,
        }
    }

    fn settle<T>(mut self, result: Result<T, PersistenceError>) -> Result<T, TimetableError> {
        self.settled = true;
        match result {
            Ok(value) => {
                self.status.send_replace(SyncStatus::Idle);
                Ok(value)
            }
            Err(error) => {
                warn!(operation = %self.operation, %error, "backend call failed");
                self.status.send_replace(SyncStatus::Failed {
                    operation: self.operation,
                    message: error.to_string(),
                });
                Err(error.into())
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!(operation = %self.operation, "backend call abandoned");
            self.status.send_replace(SyncStatus::Idle);
        }
    }
}

impl<B: AssignmentBackend> Timetable<B> {
    /// Creates a session over `backend` with an empty store, showing the
    /// current week.
    pub fn new(backend: B, axis: TimeAxis) -> Self {
        Self {
            backend,
            store: AssignmentStore::new(),
            axis,
            rooms: Vec::new(),
            week_length: 6,
            resolver: SelectionResolver::new(),
            week_start: start_of_week(Local::now().date_naive()),
            status: watch::Sender::new(SyncStatus::Idle),
            clock: now_ms,
        }
    }

    /// Creates a session from configuration.
    pub fn from_config(backend: B, config: &TimetableConfig) -> Result<Self, TimetableError> {
        Ok(Self::new(backend, config.time_axis()?)
            .with_rooms(config.rooms.clone())
            .with_week_length(config.week.days))
    }

    /// Sets the room list offered by the form.
    pub fn with_rooms(mut self, rooms: Vec<String>) -> Self {
        self.rooms = rooms;
        self
    }

    /// Sets the number of displayed days.
    pub fn with_week_length(mut self, days: usize) -> Self {
        self.week_length = days;
        self
    }

    /// Sets the millisecond clock used for new ids.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Shows the week containing `date` instead of the current one.
    pub fn with_week_of(mut self, date: NaiveDate) -> Self {
        self.week_start = start_of_week(date);
        self
    }

    /// The slot axis.
    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    /// Rooms offered by the form.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    /// The loaded assignments.
    pub fn assignments(&self) -> &[Assignment] {
        self.store.list()
    }

    /// Current persistence status.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// A receiver that observes status changes, including while a call
    /// is awaiting the backend.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// The persistence collaborator.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The selection state machine.
    pub fn resolver(&self) -> &SelectionResolver {
        &self.resolver
    }

    /// Mutable resolver, for focus changes and form edits.
    pub fn resolver_mut(&mut self) -> &mut SelectionResolver {
        &mut self.resolver
    }

    /// Resource index over the current store.
    pub fn index(&self) -> ResourceIndex<'_> {
        ResourceIndex::new(self.store.list())
    }

    /// Header label for the focused resource.
    pub fn focus_label(&self) -> Option<&str> {
        self.index().focus_label(self.resolver.focus())
    }

    /// Monday of the displayed week.
    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// Displays the following week.
    pub fn next_week(&mut self) {
        self.week_start = shift_week(self.week_start, 1);
    }

    /// Displays the previous week.
    pub fn prev_week(&mut self) {
        self.week_start = shift_week(self.week_start, -1);
    }

    /// Range label of the displayed week, e.g. `1 - 6 Jan, 2024`.
    pub fn week_label(&self) -> String {
        week_range_label(self.week_start, self.week_length)
    }

    /// Render plans for the displayed week, under the current focus.
    pub fn displayed_week(&self) -> Vec<DayPlan<'_>> {
        self.week_plan(self.week_start)
    }

    /// Render plan for one day, under the current focus.
    pub fn day_plan(&self, day: NaiveDate) -> DayPlan<'_> {
        let visible = self.resolver.focus().filter(self.store.list());
        compose_day(&self.axis, day, &visible)
    }

    /// Render plans for the week containing `date`.
    pub fn week_plan(&self, date: NaiveDate) -> Vec<DayPlan<'_>> {
        let days = week_days(start_of_week(date), self.week_length);
        let visible = self.resolver.focus().filter(self.store.list());
        compose_week(&self.axis, &days, &visible)
    }

    /// Chooses a grid cell of `day`, resolving create vs. edit.
    pub fn click(&mut self, day: NaiveDate, index: usize) {
        let visible = self.resolver.focus().filter(self.store.list());
        let plan = compose_day(&self.axis, day, &visible);
        self.resolver.click(&plan, index, self.store.list());
    }

    /// Opens an empty create form, as the header's add button does.
    pub fn add_assignment(&mut self) -> &Phase {
        self.resolver.open_blank(self.store.list())
    }

    /// Reloads the store from the backend.
    ///
    /// Structural problems in the fetched list (duplicate ids,
    /// double-booking) are returned but do not block the load.
    pub async fn refresh(&mut self) -> Result<Vec<ValidationError>, TimetableError> {
        let call = InFlight::start(&self.status, Operation::Fetch);
        let result = self.backend.list().await;
        let fetched = call.settle(result)?;

        let problems = validate_schedule(&fetched).err().unwrap_or_default();
        for problem in &problems {
            warn!(message = %problem.message, "fetched schedule is inconsistent");
        }
        info!(count = fetched.len(), "assignments loaded");
        self.store.replace_all(fetched);
        Ok(problems)
    }

    /// Saves the open form.
    ///
    /// # Errors
    /// - `Validation`: nothing is sent, the form stays open.
    /// - `NotFound`: the edited record is no longer in the store; nothing is
    ///   sent.
    /// - `Persistence`: the store is unchanged, the form stays open.
    pub async fn save(&mut self) -> Result<Outcome, TimetableError> {
        let command =
            self.resolver
                .submit(&self.axis, &self.rooms, &self.store, (self.clock)())?;
        self.execute(command).await
    }

    /// Deletes the record the open form edits. A no-op for unsaved drafts.
    pub async fn delete(&mut self) -> Result<Outcome, TimetableError> {
        match self.resolver.delete() {
            Some(command) => self.execute(command).await,
            None => Ok(Outcome::Unchanged),
        }
    }

    /// Closes the form without saving.
    pub fn cancel(&mut self) {
        self.resolver.cancel();
    }

    async fn execute(&mut self, command: Command) -> Result<Outcome, TimetableError> {
        let outcome = match command {
            Command::Add(assignment) => {
                let call = InFlight::start(&self.status, Operation::Create);
                let result = self.backend.create(&assignment).await;
                let created = call.settle(result)?;
                info!(id = %created.id, "assignment created");
                Outcome::Saved(self.store.add(created).clone())
            }
            Command::Update(assignment) => {
                self.ensure_present(&assignment.id)?;
                let call = InFlight::start(&self.status, Operation::Update);
                let result = self.backend.update(&assignment).await;
                let updated = call.settle(result)?;
                info!(id = %updated.id, "assignment updated");
                Outcome::Saved(self.store.update(updated)?.clone())
            }
            Command::Delete(id) => {
                self.ensure_present(&id)?;
                let call = InFlight::start(&self.status, Operation::Delete);
                let result = self.backend.delete(&id).await;
                call.settle(result)?;
                info!(%id, "assignment deleted");
                self.store.remove(&id);
                Outcome::Deleted(id)
            }
        };
        self.resolver.finish();
        Ok(outcome)
    }

    fn ensure_present(&self, id: &str) -> Result<(), TimetableError> {
        if self.store.contains(id) {
            Ok(())
        } else {
            warn!(id, "assignment is no longer in the store, ignoring");
            Err(TimetableError::NotFound { id: id.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::grid::CellKind;
    use crate::models::{Formateur, Groupe};
    use crate::selection::ModalMode;
    use async_trait::async_trait;
    use chrono::NaiveTime;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn fixed_clock() -> i64 {
        1_704_099_600_000
    }

    fn seeded() -> Vec<Assignment> {
        vec![Assignment::new("1", monday(), t(8, 30), t(9, 30))
            .with_title("Rust")
            .with_groupe(Groupe::new("DEV101").with_intitule("Dev 1"))
            .with_formateur(Formateur::new("F1").with_nom("Amina"))
            .with_salle("S1")]
    }

    async fn session() -> Timetable<InMemoryBackend> {
        let config = TimetableConfig {
            rooms: vec!["S1".into(), "S2".into()],
            ..TimetableConfig::default()
        };
        let mut tt = Timetable::from_config(InMemoryBackend::with_records(seeded()), &config)
            .unwrap()
            .with_clock(fixed_clock)
            .with_week_of(monday());
        assert!(tt.refresh().await.unwrap().is_empty());
        tt
    }

    /// Holds every `create` until the gate is opened.
    struct GatedBackend {
        inner: InMemoryBackend,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl AssignmentBackend for GatedBackend {
        async fn list(&self) -> Result<Vec<Assignment>, PersistenceError> {
            self.inner.list().await
        }

        async fn create(&self, assignment: &Assignment) -> Result<Assignment, PersistenceError> {
            self.gate.notified().await;
            self.inner.create(assignment).await
        }

        async fn update(&self, assignment: &Assignment) -> Result<Assignment, PersistenceError> {
            self.inner.update(assignment).await
        }

        async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
            self.inner.delete(id).await
        }
    }

    async fn gated_session(gate: Arc<Notify>) -> Timetable<GatedBackend> {
        let backend = GatedBackend {
            inner: InMemoryBackend::with_records(seeded()),
            gate,
        };
        let mut tt = Timetable::new(backend, TimeAxis::hourly(t(8, 30), 10, 30).unwrap())
            .with_rooms(vec!["S1".into()])
            .with_clock(fixed_clock);
        tt.refresh().await.unwrap();
        tt
    }

    fn open_create_form<B: AssignmentBackend>(tt: &mut Timetable<B>) {
        tt.resolver_mut().select_groupe("DEV101");
        tt.click(monday(), 2);
        let list = tt.assignments().to_vec();
        let r = tt.resolver_mut();
        r.set_title("Algo");
        assert!(r.pick_formateur("F1", &list));
        r.set_salle("S1");
    }

    #[tokio::test]
    async fn test_refresh_loads_store() {
        let tt = session().await;
        assert_eq!(tt.assignments(), seeded().as_slice());
        assert_eq!(tt.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_week_plan_under_focus() {
        let mut tt = session().await;
        tt.resolver_mut().select_groupe("DEV999");
        let plans = tt.week_plan(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(plans.len(), 6);
        assert!(plans[0].origins().is_empty());

        tt.resolver_mut().select_groupe("DEV101");
        let plans = tt.week_plan(monday());
        assert!(matches!(
            plans[0].cells[0].kind,
            CellKind::Origin { span: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_create_flow() {
        let mut tt = session().await;
        tt.resolver_mut().select_groupe("DEV101");
        tt.click(monday(), 2);
        assert_eq!(tt.resolver().mode(), Some(ModalMode::Create));

        let list = tt.assignments().to_vec();
        let r = tt.resolver_mut();
        r.set_title("Algo");
        r.set_end_time(t(10, 30));
        assert!(r.pick_formateur("F1", &list));
        r.set_salle("S2");

        let outcome = tt.save().await.unwrap();
        let Outcome::Saved(created) = outcome else {
            panic!("expected Saved");
        };
        assert_eq!(created.id, "1704099600000");
        assert_eq!(created.start_time, t(9, 30));
        assert_eq!(tt.assignments().len(), 2);
        assert_eq!(tt.backend().records().len(), 2);
        assert_eq!(tt.resolver().phase(), &Phase::Idle);
    }

    #[tokio::test]
    async fn test_edit_flow() {
        let mut tt = session().await;
        tt.resolver_mut().select_formateur("F1");
        tt.click(monday(), 0);
        assert_eq!(tt.resolver().mode(), Some(ModalMode::Edit));

        tt.resolver_mut().set_salle("S2");
        tt.save().await.unwrap();
        assert_eq!(tt.assignments()[0].salle, "S2");
        assert_eq!(tt.backend().records()[0].salle, "S2");
    }

    #[tokio::test]
    async fn test_validation_failure_sends_nothing() {
        let mut tt = session().await;
        tt.resolver_mut().select_groupe("DEV101");
        tt.click(monday(), 4);
        tt.resolver_mut().set_title("No room");

        let err = tt.save().await.unwrap_err();
        assert!(matches!(err, TimetableError::Validation(_)));
        assert_eq!(tt.assignments(), seeded().as_slice());
        assert_eq!(tt.backend().records(), seeded());
        assert!(tt.resolver().draft().is_some());
    }

    #[tokio::test]
    async fn test_persistence_failure_rolls_back_and_allows_retry() {
        let mut tt = session().await;
        tt.resolver_mut().select_groupe("DEV101");
        tt.click(monday(), 0);
        tt.resolver_mut().set_title("Changed");

        tt.backend()
            .fail_next(PersistenceError::Unavailable("timeout".into()));
        let err = tt.save().await.unwrap_err();
        assert!(matches!(err, TimetableError::Persistence(_)));
        assert_eq!(tt.assignments()[0].title, "Rust");
        assert!(matches!(
            tt.status(),
            SyncStatus::Failed {
                operation: Operation::Update,
                ..
            }
        ));
        assert_eq!(tt.resolver().mode(), Some(ModalMode::Edit));

        // Same action again succeeds.
        tt.save().await.unwrap();
        assert_eq!(tt.assignments()[0].title, "Changed");
        assert_eq!(tt.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let mut tt = session().await;
        tt.resolver_mut().select_groupe("DEV101");
        tt.click(monday(), 0);

        assert_eq!(tt.delete().await.unwrap(), Outcome::Deleted("1".into()));
        assert!(tt.assignments().is_empty());
        assert!(tt.backend().records().is_empty());
        assert_eq!(tt.resolver().phase(), &Phase::Idle);
    }

    #[tokio::test]
    async fn test_delete_unsaved_draft_is_noop() {
        let mut tt = session().await;
        tt.resolver_mut().select_groupe("DEV101");
        tt.click(monday(), 6);

        assert_eq!(tt.delete().await.unwrap(), Outcome::Unchanged);
        assert_eq!(tt.assignments(), seeded().as_slice());
    }

    #[tokio::test]
    async fn test_update_of_vanished_record_is_not_found() {
        let mut tt = session().await;
        tt.resolver_mut().select_groupe("DEV101");
        tt.click(monday(), 0);

        // Another refresh drops the record while the form is open.
        tt.backend().delete("1").await.unwrap();
        tt.refresh().await.unwrap();

        let err = tt.save().await.unwrap_err();
        assert!(matches!(err, TimetableError::NotFound { ref id } if id == "1"));
        assert!(tt.assignments().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_store() {
        let mut tt = session().await;
        tt.backend()
            .fail_next(PersistenceError::Unavailable("down".into()));
        assert!(tt.refresh().await.is_err());
        assert_eq!(tt.assignments().len(), 1);
    }

    #[tokio::test]
    async fn test_status_is_in_flight_while_backend_pending() {
        let gate = Arc::new(Notify::new());
        let mut tt = gated_session(gate.clone()).await;
        open_create_form(&mut tt);
        let mut status = tt.subscribe_status();

        // The backend only answers once the in-flight status has been seen.
        let observer = async {
            let seen = status
                .wait_for(|s| *s != SyncStatus::Idle)
                .await
                .map(|s| (*s).clone());
            gate.notify_one();
            seen
        };
        let (saved, seen) = tokio::join!(tt.save(), observer);

        assert_eq!(seen.unwrap(), SyncStatus::InFlight(Operation::Create));
        assert!(matches!(saved.unwrap(), Outcome::Saved(_)));
        assert_eq!(tt.status(), SyncStatus::Idle);
        assert_eq!(tt.assignments().len(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_call_resets_status() {
        let gate = Arc::new(Notify::new());
        let mut tt = gated_session(gate).await;
        open_create_form(&mut tt);
        let mut status = tt.subscribe_status();

        tokio::select! {
            _ = tt.save() => panic!("gate is never opened"),
            seen = async {
                status
                    .wait_for(|s| matches!(s, SyncStatus::InFlight(_)))
                    .await
                    .is_ok()
            } => assert!(seen),
        }

        assert_eq!(tt.status(), SyncStatus::Idle);
        assert_eq!(tt.assignments(), seeded().as_slice());
        assert_eq!(tt.resolver().mode(), Some(ModalMode::Create));
    }

    #[tokio::test]
    async fn test_week_navigation() {
        let mut tt = session().await;
        assert_eq!(tt.week_start(), monday());
        assert_eq!(tt.week_label(), "1 - 6 Jan, 2024");
        assert_eq!(tt.displayed_week().len(), 6);
        assert_eq!(tt.displayed_week()[0].origins().len(), 1);

        tt.next_week();
        assert_eq!(tt.week_start(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(tt.week_label(), "8 - 13 Jan, 2024");
        assert!(tt.displayed_week().iter().all(|p| p.origins().is_empty()));

        tt.prev_week();
        tt.prev_week();
        assert_eq!(tt.week_label(), "25 - 30 Dec, 2023");
    }

    #[tokio::test]
    async fn test_header_label_and_add_button() {
        let mut tt = session().await;
        assert_eq!(tt.focus_label(), None);

        tt.resolver_mut().select_formateur("F1");
        assert_eq!(tt.focus_label(), Some("Amina"));
        tt.resolver_mut().select_groupe("DEV101");
        assert_eq!(tt.focus_label(), Some("Dev 1"));

        tt.click(monday(), 4);
        tt.cancel();
        assert!(matches!(
            tt.add_assignment(),
            Phase::ModalOpen {
                mode: ModalMode::Create,
                slot: None,
                ..
            }
        ));
        let draft = tt.resolver().draft().unwrap();
        assert_eq!(draft.day, Some(monday()));
        assert_eq!(draft.start_time, None);
        assert_eq!(draft.groupe.code_groupe, "DEV101");
    }
}
