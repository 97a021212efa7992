//! Schedule catalog — read-only queries over a schedule snapshot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One schedule row: a (group, weekday, time) offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub direction: String,
    pub cabinet: String,
    pub group: String,
    pub supervisor: String,
    pub weekday: String,
    pub time: String,
}

impl ScheduleEntry {
    /// Rows with every field empty carry no information and are dropped at load.
    pub fn is_blank(&self) -> bool {
        [
            &self.direction,
            &self.cabinet,
            &self.group,
            &self.supervisor,
            &self.weekday,
            &self.time,
        ]
        .iter()
        .all(|f| f.trim().is_empty())
    }
}

/// Read-only query surface over schedule rows.
///
/// Built from a snapshot loaded per query; the catalog never mutates
/// schedule data. Row order is preserved from the source.
#[derive(Debug, Clone)]
pub struct ScheduleCatalog {
    rows: Vec<ScheduleEntry>,
}

impl ScheduleCatalog {
    pub fn new(rows: Vec<ScheduleEntry>) -> Self {
        let rows = rows.into_iter().filter(|r| !r.is_blank()).collect();
        Self { rows }
    }

    /// Distinct non-empty direction names, lexicographically sorted.
    pub fn directions(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.direction.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct non-empty group names, lexicographically sorted, optionally
    /// restricted to one direction (exact match).
    pub fn groups(&self, direction: Option<&str>) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| direction.is_none_or(|d| r.direction == d))
            .map(|r| r.group.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All rows for an exact group name, in source order. Empty is valid.
    pub fn rows_for_group(&self, group: &str) -> Vec<&ScheduleEntry> {
        self.rows.iter().filter(|r| r.group == group).collect()
    }

    /// All rows for an exact direction name, in source order. Empty is valid.
    pub fn rows_for_direction(&self, direction: &str) -> Vec<&ScheduleEntry> {
        self.rows.iter().filter(|r| r.direction == direction).collect()
    }

    /// Every row in source order.
    pub fn all_rows(&self) -> &[ScheduleEntry] {
        &self.rows
    }
}

#[cfg(test)]
pub(crate) fn entry(
    direction: &str,
    cabinet: &str,
    group: &str,
    supervisor: &str,
    weekday: &str,
    time: &str,
) -> ScheduleEntry {
    ScheduleEntry {
        direction: direction.into(),
        cabinet: cabinet.into(),
        group: group.into(),
        supervisor: supervisor.into(),
        weekday: weekday.into(),
        time: time.into(),
    }
}
