//! Selection resolution: create vs. edit, and form options.
//!
//! Tracks a single pending selection through
//! `Idle -> DayTimeChosen -> ModalOpen -> Idle`.
//!
//! # Resolution
//!
//! When a day and time range are chosen while a resource is focused, an
//! assignment with exactly that day/start/end involving the focused group or
//! trainer is looked up. A hit opens the form in edit mode, pre-filled; a
//! miss opens it in create mode with the focused resource's details.
//! [`open_blank`](SelectionResolver::open_blank) opens an empty create
//! form without a grid selection, on the last chosen day.
//!
//! The resolver never mutates the store. Saving or deleting yields a
//! [`Command`] for the session to execute against the backend.

mod focus;

pub use focus::ResourceFocus;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TimetableError;
use crate::grid::{CellKind, DayPlan};
use crate::index::ResourceIndex;
use crate::models::{Assignment, AssignmentDraft, Formateur, Groupe, TimeAxis};
use crate::store::AssignmentStore;
use crate::validation::validate_draft;

/// A chosen day and time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSlot {
    /// Chosen day.
    pub day: NaiveDate,
    /// Chosen start.
    pub start_time: NaiveTime,
    /// Chosen end.
    pub end_time: NaiveTime,
}

/// Whether the form edits a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalMode {
    /// New assignment.
    Create,
    /// Existing assignment, `id` set.
    Edit,
}

/// Resolver state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    /// Nothing pending.
    #[default]
    Idle,
    /// A day and range are chosen but no form is open (no resource focus).
    DayTimeChosen(PendingSlot),
    /// The form is open.
    ModalOpen {
        /// Create or edit.
        mode: ModalMode,
        /// The selection that opened the form; `None` for a blank form.
        slot: Option<PendingSlot>,
        /// Form contents.
        draft: AssignmentDraft,
    },
}

/// A store mutation to execute against the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create `Assignment` (id already generated).
    Add(Assignment),
    /// Replace the stored record with the same id.
    Update(Assignment),
    /// Remove the record with this id.
    Delete(String),
}

/// Pending-selection state machine.
#[derive(Debug, Clone, Default)]
pub struct SelectionResolver {
    focus: ResourceFocus,
    phase: Phase,
    last_day: Option<NaiveDate>,
}

impl SelectionResolver {
    /// Creates an idle resolver with no focus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current resource focus.
    pub fn focus(&self) -> &ResourceFocus {
        &self.focus
    }

    /// Current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The open form's draft.
    pub fn draft(&self) -> Option<&AssignmentDraft> {
        match &self.phase {
            Phase::ModalOpen { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// The open form's mode.
    pub fn mode(&self) -> Option<ModalMode> {
        match &self.phase {
            Phase::ModalOpen { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    /// Day of the most recent selection, kept after the form closes.
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.last_day
    }

    /// Focuses a group; clears any trainer focus. An empty code clears both.
    pub fn select_groupe(&mut self, code_groupe: impl Into<String>) {
        let code_groupe = code_groupe.into();
        self.focus = if code_groupe.is_empty() {
            ResourceFocus::None
        } else {
            ResourceFocus::Groupe(code_groupe)
        };
    }

    /// Focuses a trainer; clears any group focus. An empty id clears both.
    pub fn select_formateur(&mut self, matricule: impl Into<String>) {
        let matricule = matricule.into();
        self.focus = if matricule.is_empty() {
            ResourceFocus::None
        } else {
            ResourceFocus::Formateur(matricule)
        };
    }

    /// Drops the resource focus.
    pub fn clear_focus(&mut self) {
        self.focus = ResourceFocus::None;
    }

    /// Chooses a day and range. Opens the form when a resource is focused.
    pub fn choose(
        &mut self,
        day: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        assignments: &[Assignment],
    ) -> &Phase {
        let slot = PendingSlot {
            day,
            start_time,
            end_time,
        };
        self.phase = Phase::DayTimeChosen(slot);
        self.last_day = Some(day);
        if self.focus.is_set() {
            self.open(slot, assignments);
        }
        &self.phase
    }

    /// Handles a click on a grid cell.
    ///
    /// Origin cells choose their assignment's own range, empty cells choose
    /// their slot; covered cells are not clickable.
    pub fn click(
        &mut self,
        plan: &DayPlan<'_>,
        index: usize,
        assignments: &[Assignment],
    ) -> &Phase {
        let Some(cell) = plan.cell(index) else {
            return &self.phase;
        };
        let (start, end) = match cell.kind {
            CellKind::Origin { assignment, .. } => (assignment.start_time, assignment.end_time),
            CellKind::Empty => (cell.slot.start_time, cell.slot.end_time),
            CellKind::Covered => return &self.phase,
        };
        self.choose(plan.day, start, end, assignments)
    }

    /// The assignment a selection would edit, if any.
    pub fn resolve_existing<'a>(
        &self,
        slot: &PendingSlot,
        assignments: &'a [Assignment],
    ) -> Option<&'a Assignment> {
        assignments.iter().find(|a| {
            a.occupies(slot.day, slot.start_time, slot.end_time)
                && a.involves(self.focus.groupe(), self.focus.formateur())
        })
    }

    fn open(&mut self, slot: PendingSlot, assignments: &[Assignment]) {
        let (mode, draft) = match self.resolve_existing(&slot, assignments) {
            Some(existing) => {
                debug!(id = %existing.id, "selection matches existing assignment");
                (ModalMode::Edit, AssignmentDraft::from(existing))
            }
            None => {
                debug!(day = %slot.day, "selection is free, preparing new assignment");
                let draft = AssignmentDraft {
                    day: Some(slot.day),
                    start_time: Some(slot.start_time),
                    end_time: Some(slot.end_time),
                    ..self.seed_draft(assignments)
                };
                (ModalMode::Create, draft)
            }
        };
        self.phase = Phase::ModalOpen {
            mode,
            slot: Some(slot),
            draft,
        };
    }

    /// Opens an empty create form without a grid selection.
    ///
    /// The draft gets the last chosen day (if any) and the focused
    /// resource's details; start and end are left for the operator.
    pub fn open_blank(&mut self, assignments: &[Assignment]) -> &Phase {
        debug!(day = ?self.last_day, "opening blank assignment form");
        let draft = AssignmentDraft {
            day: self.last_day,
            ..self.seed_draft(assignments)
        };
        self.phase = Phase::ModalOpen {
            mode: ModalMode::Create,
            slot: None,
            draft,
        };
        &self.phase
    }

    fn seed_draft(&self, assignments: &[Assignment]) -> AssignmentDraft {
        let index = ResourceIndex::new(assignments);
        let groupe = self
            .focus
            .groupe()
            .map(|code| {
                index
                    .group_details(code)
                    .cloned()
                    .unwrap_or_else(|| Groupe::new(code))
            })
            .unwrap_or_default();
        let formateur = self
            .focus
            .formateur()
            .map(|matricule| {
                index
                    .formateur_details(matricule)
                    .cloned()
                    .unwrap_or_else(|| Formateur::new(matricule))
            })
            .unwrap_or_default();

        AssignmentDraft {
            formateur,
            groupe,
            ..AssignmentDraft::blank()
        }
    }

    fn draft_mut(&mut self) -> Option<&mut AssignmentDraft> {
        match &mut self.phase {
            Phase::ModalOpen { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Sets the draft title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        if let Some(draft) = self.draft_mut() {
            draft.title = title.into();
        }
    }

    /// Sets the draft day. A form opened from a grid selection keeps the
    /// selected day on submit.
    pub fn set_day(&mut self, day: NaiveDate) {
        if let Some(draft) = self.draft_mut() {
            draft.day = Some(day);
        }
    }

    /// Sets the draft start time.
    pub fn set_start_time(&mut self, start_time: NaiveTime) {
        if let Some(draft) = self.draft_mut() {
            draft.start_time = Some(start_time);
        }
    }

    /// Sets the draft end time.
    pub fn set_end_time(&mut self, end_time: NaiveTime) {
        if let Some(draft) = self.draft_mut() {
            draft.end_time = Some(end_time);
        }
    }

    /// Sets the draft room.
    pub fn set_salle(&mut self, salle: impl Into<String>) {
        if let Some(draft) = self.draft_mut() {
            draft.salle = salle.into();
        }
    }

    /// Trainers compatible with the draft's group.
    pub fn formateur_options(&self, assignments: &[Assignment]) -> Vec<Formateur> {
        let code = self
            .draft()
            .map(|d| d.groupe.code_groupe.as_str())
            .filter(|c| !c.is_empty());
        ResourceIndex::new(assignments)
            .formateurs_for_group(code)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Groups compatible with the draft's trainer.
    pub fn groupe_options(&self, assignments: &[Assignment]) -> Vec<Groupe> {
        let matricule = self
            .draft()
            .map(|d| d.formateur.matricule.as_str())
            .filter(|m| !m.is_empty());
        ResourceIndex::new(assignments)
            .groups_for_formateur(matricule)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Picks a trainer from [`formateur_options`](Self::formateur_options).
    ///
    /// Returns `false` (draft unchanged) if the trainer is not compatible.
    pub fn pick_formateur(&mut self, matricule: &str, assignments: &[Assignment]) -> bool {
        let Some(formateur) = self
            .formateur_options(assignments)
            .into_iter()
            .find(|f| f.matricule == matricule)
        else {
            return false;
        };
        match self.draft_mut() {
            Some(draft) => {
                draft.formateur = formateur;
                true
            }
            None => false,
        }
    }

    /// Picks a group from [`groupe_options`](Self::groupe_options).
    ///
    /// Returns `false` (draft unchanged) if the group is not compatible.
    pub fn pick_groupe(&mut self, code_groupe: &str, assignments: &[Assignment]) -> bool {
        let Some(groupe) = self
            .groupe_options(assignments)
            .into_iter()
            .find(|g| g.code_groupe == code_groupe)
        else {
            return false;
        };
        match self.draft_mut() {
            Some(draft) => {
                draft.groupe = groupe;
                true
            }
            None => false,
        }
    }

    /// Validates the open draft and produces the command to persist it.
    ///
    /// The phase is left unchanged; call [`finish`](Self::finish) once the
    /// command has succeeded so a failed call can be retried.
    ///
    /// # Errors
    /// - `NoDraft` if no form is open.
    /// - `Validation` if required fields are missing or the range conflicts.
    pub fn submit(
        &self,
        axis: &TimeAxis,
        rooms: &[String],
        store: &AssignmentStore,
        now_ms: i64,
    ) -> Result<Command, TimetableError> {
        let Phase::ModalOpen { slot, draft, .. } = &self.phase else {
            return Err(TimetableError::NoDraft);
        };

        let draft = AssignmentDraft {
            day: slot.map(|s| s.day).or(draft.day),
            ..draft.clone()
        };
        validate_draft(&draft, axis, rooms, store.list()).map_err(TimetableError::Validation)?;

        let command = match draft.id.clone() {
            Some(id) => draft.to_assignment(id).map(Command::Update),
            None => draft.to_assignment(store.next_id(now_ms)).map(Command::Add),
        };
        command.ok_or(TimetableError::NoDraft)
    }

    /// The delete command for the open draft.
    ///
    /// `None` unless the draft edits a stored record.
    pub fn delete(&self) -> Option<Command> {
        self.draft()
            .and_then(|d| d.id.clone())
            .map(Command::Delete)
    }

    /// Discards the draft without touching the store.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Returns to idle after a command succeeded.
    pub fn finish(&mut self) {
        self.phase = Phase::Idle;
    }
}
