//! Assignment model.
//!
//! An assignment binds a trainer, a group, a room and a title to a
//! contiguous time range on one day. Resource records are embedded copies
//! (denormalized), exactly as they travel on the wire.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::time_axis::{hhmm, TimeSlot};
use super::{Formateur, Groupe};

/// A scheduled assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Client-generated identifier.
    pub id: String,
    /// Session title.
    pub title: String,
    /// Calendar day.
    pub day: NaiveDate,
    /// Start boundary (inclusive).
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// End boundary (exclusive).
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Embedded trainer copy.
    pub formateur: Formateur,
    /// Embedded group copy.
    pub groupe: Groupe,
    /// Room identifier.
    pub salle: String,
}

impl Assignment {
    /// Creates an assignment with blank resources and room.
    pub fn new(
        id: impl Into<String>,
        day: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            day,
            start_time,
            end_time,
            formateur: Formateur::blank(),
            groupe: Groupe::blank(),
            salle: String::new(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the trainer.
    pub fn with_formateur(mut self, formateur: Formateur) -> Self {
        self.formateur = formateur;
        self
    }

    /// Sets the group.
    pub fn with_groupe(mut self, groupe: Groupe) -> Self {
        self.groupe = groupe;
        self
    }

    /// Sets the room.
    pub fn with_salle(mut self, salle: impl Into<String>) -> Self {
        self.salle = salle.into();
        self
    }

    /// Whether `slot` on `day` lies inside this assignment (closed containment).
    #[inline]
    pub fn covers(&self, day: NaiveDate, slot: &TimeSlot) -> bool {
        self.day == day && slot.is_within(self.start_time, self.end_time)
    }

    /// Whether two half-open ranges on the same day intersect.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    /// Exact day/start/end match.
    pub fn occupies(&self, day: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.day == day && self.start_time == start && self.end_time == end
    }

    /// Whether either embedded resource matches the given ids.
    pub fn involves(&self, code_groupe: Option<&str>, matricule: Option<&str>) -> bool {
        code_groupe.is_some_and(|g| self.groupe.code_groupe == g)
            || matricule.is_some_and(|m| self.formateur.matricule == m)
    }
}

/// Form state for creating or editing an assignment.
///
/// Every field may be incomplete; completeness is checked on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    /// `Some` when editing a stored assignment.
    pub id: Option<String>,
    /// Session title.
    pub title: String,
    /// Calendar day.
    pub day: Option<NaiveDate>,
    /// Start boundary.
    #[serde(with = "hhmm::option", default)]
    pub start_time: Option<NaiveTime>,
    /// End boundary.
    #[serde(with = "hhmm::option", default)]
    pub end_time: Option<NaiveTime>,
    /// Trainer, possibly blank.
    pub formateur: Formateur,
    /// Group, possibly blank.
    pub groupe: Groupe,
    /// Room, possibly empty.
    pub salle: String,
}

impl AssignmentDraft {
    /// An empty form.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Whether this draft edits an existing record.
    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Builds the record to persist.
    ///
    /// Returns `None` while day, start or end is missing; other completeness
    /// rules belong to validation.
    pub fn to_assignment(&self, id: impl Into<String>) -> Option<Assignment> {
        Some(Assignment {
            id: id.into(),
            title: self.title.clone(),
            day: self.day?,
            start_time: self.start_time?,
            end_time: self.end_time?,
            formateur: self.formateur.clone(),
            groupe: self.groupe.clone(),
            salle: self.salle.clone(),
        })
    }
}

impl From<&Assignment> for AssignmentDraft {
    fn from(a: &Assignment) -> Self {
        Self {
            id: Some(a.id.clone()),
            title: a.title.clone(),
            day: Some(a.day),
            start_time: Some(a.start_time),
            end_time: Some(a.end_time),
            formateur: a.formateur.clone(),
            groupe: a.groupe.clone(),
            salle: a.salle.clone(),
        }
    }
}
