//! FIO search — resolves a free-text name to schedule group names.
//!
//! The user directory takes priority: supervisor names from the schedule are
//! only consulted when the directory yields nothing, as a fallback rather
//! than a union.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::ScheduleCatalog;
use crate::matcher;

/// One directory row: a full name and the group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub full_name: String,
    pub group: String,
}

/// Cardinality of a name search; drives the dialog's next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    /// Exactly one group matched — its schedule is rendered directly.
    Unique(String),
    /// Several groups matched — the user picks from a sorted list.
    Ambiguous(Vec<String>),
}

/// Resolve a query against the directory, falling back to the schedule's
/// supervisor column. Matched group names are deduplicated and sorted.
pub fn resolve(
    query: &str,
    directory: &[DirectoryEntry],
    catalog: &ScheduleCatalog,
) -> Resolution {
    let mut groups: BTreeSet<String> = directory
        .iter()
        .filter(|e| matcher::matches(query, &e.full_name))
        .map(|e| e.group.clone())
        .collect();

    if groups.is_empty() {
        groups = catalog
            .all_rows()
            .iter()
            .filter(|r| matcher::matches(query, &r.supervisor))
            .map(|r| r.group.clone())
            .collect();
    }

    let mut groups: Vec<String> = groups.into_iter().collect();
    match groups.len() {
        0 => Resolution::NotFound,
        1 => match groups.pop() {
            Some(only) => Resolution::Unique(only),
            None => Resolution::NotFound,
        },
        _ => Resolution::Ambiguous(groups),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry;

    fn dir(pairs: &[(&str, &str)]) -> Vec<DirectoryEntry> {
        pairs
            .iter()
            .map(|(name, group)| DirectoryEntry {
                full_name: name.to_string(),
                group: group.to_string(),
            })
            .collect()
    }

    fn catalog() -> ScheduleCatalog {
        ScheduleCatalog::new(vec![
            entry("Robotics", "12", "R-1", "Иванов Пётр", "Mon", "16:00"),
            entry("Robotics", "12", "R-2", "Иванова Мария", "Tue", "16:00"),
            entry("Python", "7", "P-1", "Сидоров Олег", "Wed", "15:00"),
        ])
    }

    #[test]
    fn directory_match_is_unique() {
        let directory = dir(&[("Петров Иван Ильич", "G1")]);
        assert_eq!(
            resolve("Петров", &directory, &catalog()),
            Resolution::Unique("G1".into())
        );
    }

    #[test]
    fn directory_shadows_supervisor_fallback() {
        // "Иван" matches two supervisors, but a single directory hit wins.
        let directory = dir(&[("Иванченко Олег", "G9")]);
        assert_eq!(
            resolve("Иван", &directory, &catalog()),
            Resolution::Unique("G9".into())
        );
    }

    #[test]
    fn supervisor_fallback_when_directory_misses() {
        let directory = dir(&[("Кузнецов Артём", "G1")]);
        assert_eq!(
            resolve("Сидоров", &directory, &catalog()),
            Resolution::Unique("P-1".into())
        );
    }

    #[test]
    fn ambiguous_results_are_sorted() {
        assert_eq!(
            resolve("Иван", &[], &catalog()),
            Resolution::Ambiguous(vec!["R-1".into(), "R-2".into()])
        );
    }

    #[test]
    fn duplicate_groups_collapse_to_unique() {
        let directory = dir(&[("Петров Иван", "G1"), ("Петрова Анна", "G1")]);
        assert_eq!(
            resolve("Петров", &directory, &catalog()),
            Resolution::Unique("G1".into())
        );
    }

    #[test]
    fn no_match_anywhere() {
        assert_eq!(resolve("Нечаев", &[], &catalog()), Resolution::NotFound);
        assert_eq!(resolve("", &[], &catalog()), Resolution::NotFound);
    }
}
