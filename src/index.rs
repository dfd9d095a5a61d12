//! Resource index derived from the assignment list.
//!
//! Assignments carry embedded copies of their trainer and group, so the
//! distinct resources and their many-to-many linkage have to be joined out
//! of the list on every read. De-duplication is keyed by id field and keeps
//! the first occurrence in list order.
//!
//! The index borrows the list; build a new one whenever the store changes.

use std::collections::HashSet;

use crate::models::{Assignment, Formateur, Groupe};
use crate::selection::ResourceFocus;

/// Read-only view answering resource questions over an assignment list.
#[derive(Debug, Clone, Copy)]
pub struct ResourceIndex<'a> {
    assignments: &'a [Assignment],
}

impl<'a> ResourceIndex<'a> {
    /// Creates an index over `assignments`.
    pub fn new(assignments: &'a [Assignment]) -> Self {
        Self { assignments }
    }

    /// One group per distinct `code_groupe`, first occurrence wins.
    pub fn unique_groups(&self) -> Vec<&'a Groupe> {
        distinct_by(self.assignments.iter().map(|a| &a.groupe), |g| {
            g.code_groupe.as_str()
        })
    }

    /// One trainer per distinct `matricule`, first occurrence wins.
    pub fn unique_formateurs(&self) -> Vec<&'a Formateur> {
        distinct_by(self.assignments.iter().map(|a| &a.formateur), |f| {
            f.matricule.as_str()
        })
    }

    /// Trainers who teach `code_groupe` in any assignment.
    ///
    /// Empty when no group is given.
    pub fn formateurs_for_group(&self, code_groupe: Option<&str>) -> Vec<&'a Formateur> {
        let Some(code) = code_groupe else {
            return Vec::new();
        };
        distinct_by(
            self.assignments
                .iter()
                .filter(|a| a.groupe.code_groupe == code)
                .map(|a| &a.formateur),
            |f| f.matricule.as_str(),
        )
    }

    /// Groups taught by `matricule` in any assignment.
    ///
    /// Empty when no trainer is given.
    pub fn groups_for_formateur(&self, matricule: Option<&str>) -> Vec<&'a Groupe> {
        let Some(matricule) = matricule else {
            return Vec::new();
        };
        distinct_by(
            self.assignments
                .iter()
                .filter(|a| a.formateur.matricule == matricule)
                .map(|a| &a.groupe),
            |g| g.code_groupe.as_str(),
        )
    }

    /// First embedded copy of a group.
    pub fn group_details(&self, code_groupe: &str) -> Option<&'a Groupe> {
        self.assignments
            .iter()
            .map(|a| &a.groupe)
            .find(|g| g.code_groupe == code_groupe)
    }

    /// First embedded copy of a trainer.
    pub fn formateur_details(&self, matricule: &str) -> Option<&'a Formateur> {
        self.assignments
            .iter()
            .map(|a| &a.formateur)
            .find(|f| f.matricule == matricule)
    }

    /// Header label for the focused resource: the group's title or the
    /// trainer's name, from its first embedded copy.
    ///
    /// `None` without a focus or when no assignment involves the resource.
    pub fn focus_label(&self, focus: &ResourceFocus) -> Option<&'a str> {
        match focus {
            ResourceFocus::None => None,
            ResourceFocus::Groupe(code) => self
                .group_details(code)
                .map(|g| g.intitule_groupe.as_str()),
            ResourceFocus::Formateur(matricule) => self
                .formateur_details(matricule)
                .map(|f| f.nom.as_str()),
        }
    }

    /// Distinct group sectors, first-seen order.
    pub fn secteurs(&self) -> Vec<&'a str> {
        distinct_by(
            self.unique_groups().into_iter().map(|g| g.secteur.as_str()),
            |s| s,
        )
    }

    /// Distinct programmes, optionally restricted to one sector.
    pub fn filieres(&self, secteur: Option<&str>) -> Vec<&'a str> {
        distinct_by(
            self.unique_groups()
                .into_iter()
                .filter(|g| secteur.map_or(true, |s| g.secteur == s))
                .map(|g| g.filiere.as_str()),
            |f| f,
        )
    }

    /// Sector owning a programme.
    pub fn secteur_of_filiere(&self, filiere: &str) -> Option<&'a str> {
        self.unique_groups()
            .into_iter()
            .find(|g| g.filiere == filiere)
            .map(|g| g.secteur.as_str())
    }

    /// Groups matching the sidebar's sector and programme filters.
    pub fn filter_groups(&self, secteur: Option<&str>, filiere: Option<&str>) -> Vec<&'a Groupe> {
        self.unique_groups()
            .into_iter()
            .filter(|g| secteur.map_or(true, |s| g.secteur == s))
            .filter(|g| filiere.map_or(true, |f| g.filiere == f))
            .collect()
    }

    /// Trainers matching the sidebar's sector filter.
    pub fn filter_formateurs(&self, secteur: Option<&str>) -> Vec<&'a Formateur> {
        self.unique_formateurs()
            .into_iter()
            .filter(|f| secteur.map_or(true, |s| f.secteur == s))
            .collect()
    }
}

fn distinct_by<'a, T: ?Sized, K, I, F>(items: I, key: F) -> Vec<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&'a T) -> K,
    K: Eq + std::hash::Hash,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(*item))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn assignment(id: &str, groupe: &Groupe, formateur: &Formateur) -> Assignment {
        Assignment::new(
            id,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        )
        .with_groupe(groupe.clone())
        .with_formateur(formateur.clone())
    }

    fn sample() -> Vec<Assignment> {
        let dev1 = Groupe::new("DEV101")
            .with_intitule("Dev 1")
            .with_filiere("Developpement")
            .with_secteur("Digital");
        let dev2 = Groupe::new("DEV102")
            .with_intitule("Dev 2")
            .with_filiere("Developpement")
            .with_secteur("Digital");
        let gc = Groupe::new("GC101")
            .with_intitule("Genie civil 1")
            .with_filiere("Genie civil")
            .with_secteur("BTP");
        let amina = Formateur::new("F1").with_nom("Amina").with_secteur("Digital");
        let karim = Formateur::new("F2").with_nom("Karim").with_secteur("Digital");
        let sara = Formateur::new("F3").with_nom("Sara").with_secteur("BTP");

        vec![
            assignment("1", &dev1, &amina),
            assignment("2", &dev1, &karim),
            assignment("3", &dev2, &amina),
            assignment("4", &gc, &sara),
            // Stale embedded copy of DEV101: first occurrence must win.
            assignment("5", &dev1.clone().with_intitule("Dev 1 (old)"), &amina),
        ]
    }

    #[test]
    fn test_unique_groups_first_occurrence_wins() {
        let list = sample();
        let index = ResourceIndex::new(&list);
        let groups = index.unique_groups();
        let codes: Vec<_> = groups.iter().map(|g| g.code_groupe.as_str()).collect();
        assert_eq!(codes, vec!["DEV101", "DEV102", "GC101"]);
        assert_eq!(groups[0].intitule_groupe, "Dev 1");
        assert!(groups.len() <= list.len());
    }

    #[test]
    fn test_unique_formateurs() {
        let list = sample();
        let index = ResourceIndex::new(&list);
        let ids: Vec<_> = index
            .unique_formateurs()
            .iter()
            .map(|f| f.matricule.as_str())
            .collect();
        assert_eq!(ids, vec!["F1", "F2", "F3"]);
    }

    #[test]
    fn test_many_to_many_linkage() {
        let list = sample();
        let index = ResourceIndex::new(&list);

        let for_dev1: Vec<_> = index
            .formateurs_for_group(Some("DEV101"))
            .iter()
            .map(|f| f.matricule.as_str())
            .collect();
        assert_eq!(for_dev1, vec!["F1", "F2"]);

        let for_amina: Vec<_> = index
            .groups_for_formateur(Some("F1"))
            .iter()
            .map(|g| g.code_groupe.as_str())
            .collect();
        assert_eq!(for_amina, vec!["DEV101", "DEV102"]);

        assert!(index.formateurs_for_group(None).is_empty());
        assert!(index.groups_for_formateur(None).is_empty());
        assert!(index.formateurs_for_group(Some("NOPE")).is_empty());
    }

    #[test]
    fn test_details_lookup() {
        let list = sample();
        let index = ResourceIndex::new(&list);
        assert_eq!(index.group_details("GC101").unwrap().secteur, "BTP");
        assert_eq!(index.formateur_details("F2").unwrap().nom, "Karim");
        assert!(index.group_details("X").is_none());
    }

    #[test]
    fn test_focus_label() {
        let list = sample();
        let index = ResourceIndex::new(&list);
        assert_eq!(
            index.focus_label(&ResourceFocus::Groupe("DEV101".into())),
            Some("Dev 1")
        );
        assert_eq!(
            index.focus_label(&ResourceFocus::Formateur("F3".into())),
            Some("Sara")
        );
        assert_eq!(index.focus_label(&ResourceFocus::Groupe("X".into())), None);
        assert_eq!(index.focus_label(&ResourceFocus::None), None);
    }

    #[test]
    fn test_sidebar_filters() {
        let list = sample();
        let index = ResourceIndex::new(&list);

        assert_eq!(index.secteurs(), vec!["Digital", "BTP"]);
        assert_eq!(index.filieres(None), vec!["Developpement", "Genie civil"]);
        assert_eq!(index.filieres(Some("BTP")), vec!["Genie civil"]);
        assert_eq!(index.secteur_of_filiere("Developpement"), Some("Digital"));
        assert_eq!(index.secteur_of_filiere("Cuisine"), None);

        assert_eq!(index.filter_groups(Some("Digital"), None).len(), 2);
        assert_eq!(index.filter_groups(None, Some("Genie civil")).len(), 1);
        assert_eq!(index.filter_groups(None, None).len(), 3);
        assert_eq!(index.filter_formateurs(Some("BTP")).len(), 1);
    }

    #[test]
    fn test_empty_list() {
        let index = ResourceIndex::new(&[]);
        assert!(index.unique_groups().is_empty());
        assert!(index.secteurs().is_empty());
    }
}
