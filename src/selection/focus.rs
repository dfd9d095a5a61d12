//! Single-resource focus and the grid filter it implies.

use serde::{Deserialize, Serialize};

use crate::models::Assignment;

/// Which resource the timetable is focused on.
///
/// Holding at most one variant makes group and trainer selection mutually
/// exclusive: selecting one replaces the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceFocus {
    /// Nothing selected; every assignment is shown.
    #[default]
    None,
    /// A group, by `code_groupe`.
    Groupe(String),
    /// A trainer, by `matricule`.
    Formateur(String),
}

impl ResourceFocus {
    /// Selected group code, if any.
    pub fn groupe(&self) -> Option<&str> {
        match self {
            Self::Groupe(code) => Some(code.as_str()),
            _ => None,
        }
    }

    /// Selected trainer id, if any.
    pub fn formateur(&self) -> Option<&str> {
        match self {
            Self::Formateur(matricule) => Some(matricule.as_str()),
            _ => None,
        }
    }

    /// Whether a resource is selected.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether `assignment` is shown under this focus.
    pub fn admits(&self, assignment: &Assignment) -> bool {
        match self {
            Self::None => true,
            Self::Groupe(code) => assignment.groupe.code_groupe == *code,
            Self::Formateur(matricule) => assignment.formateur.matricule == *matricule,
        }
    }

    /// Assignments to feed the grid composer.
    pub fn filter<'a>(&self, assignments: &'a [Assignment]) -> Vec<&'a Assignment> {
        assignments.iter().filter(|a| self.admits(a)).collect()
    }
}
