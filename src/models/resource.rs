//! Resource models.
//!
//! Trainers (`Formateur`) and cohorts (`Groupe`) are the two resources an
//! assignment binds together. Assignments embed a full copy of each record,
//! so identity is always the id field (`matricule`, `code_groupe`), never
//! the value as a whole.

use serde::{Deserialize, Serialize};

/// A trainer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formateur {
    /// Unique trainer identifier.
    pub matricule: String,
    /// Display name.
    #[serde(default)]
    pub nom: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Sector the trainer belongs to.
    #[serde(default)]
    pub secteur: String,
}

/// A class cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Groupe {
    /// Unique group code.
    pub code_groupe: String,
    /// Display title.
    #[serde(default)]
    pub intitule_groupe: String,
    /// Programme the group follows.
    #[serde(default)]
    pub filiere: String,
    /// Sector the programme belongs to.
    #[serde(default)]
    pub secteur: String,
}

impl Formateur {
    /// Creates a trainer with the given id.
    pub fn new(matricule: impl Into<String>) -> Self {
        Self {
            matricule: matricule.into(),
            ..Default::default()
        }
    }

    /// An unset trainer, as shown by an empty form.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Sets the display name.
    pub fn with_nom(mut self, nom: impl Into<String>) -> Self {
        self.nom = nom.into();
        self
    }

    /// Sets the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the sector.
    pub fn with_secteur(mut self, secteur: impl Into<String>) -> Self {
        self.secteur = secteur.into();
        self
    }

    /// Whether no trainer has been picked.
    pub fn is_blank(&self) -> bool {
        self.matricule.is_empty()
    }

    /// Same trainer, regardless of the embedded copy's other fields.
    pub fn same_as(&self, other: &Self) -> bool {
        self.matricule == other.matricule
    }
}

impl Groupe {
    /// Creates a group with the given code.
    pub fn new(code_groupe: impl Into<String>) -> Self {
        Self {
            code_groupe: code_groupe.into(),
            ..Default::default()
        }
    }

    /// An unset group, as shown by an empty form.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Sets the display title.
    pub fn with_intitule(mut self, intitule: impl Into<String>) -> Self {
        self.intitule_groupe = intitule.into();
        self
    }

    /// Sets the programme.
    pub fn with_filiere(mut self, filiere: impl Into<String>) -> Self {
        self.filiere = filiere.into();
        self
    }

    /// Sets the sector.
    pub fn with_secteur(mut self, secteur: impl Into<String>) -> Self {
        self.secteur = secteur.into();
        self
    }

    /// Whether no group has been picked.
    pub fn is_blank(&self) -> bool {
        self.code_groupe.is_empty()
    }

    /// Same group, regardless of the embedded copy's other fields.
    pub fn same_as(&self, other: &Self) -> bool {
        self.code_groupe == other.code_groupe
    }
}
