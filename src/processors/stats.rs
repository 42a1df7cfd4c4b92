use serde::Serialize;
use std::collections::BTreeMap;

use crate::utils::{format_count, percent, RunLog};

/// Why a row was dropped during cleaning; declaration order is step order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCause {
    UnknownCountry,
    InvalidCoordinates,
    InvalidValue,
    Duplicate,
    RegionalAggregate,
    AllNullIndicators,
}

impl RemovalCause {
    pub const MEASUREMENT: [RemovalCause; 4] = [
        RemovalCause::UnknownCountry,
        RemovalCause::InvalidCoordinates,
        RemovalCause::InvalidValue,
        RemovalCause::Duplicate,
    ];

    pub const INDICATOR: [RemovalCause; 2] = [
        RemovalCause::RegionalAggregate,
        RemovalCause::AllNullIndicators,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RemovalCause::UnknownCountry => "removed_unknown_countries",
            RemovalCause::InvalidCoordinates => "removed_invalid_coordinates",
            RemovalCause::InvalidValue => "removed_invalid_values",
            RemovalCause::Duplicate => "removed_duplicates",
            RemovalCause::RegionalAggregate => "removed_regional_aggregates",
            RemovalCause::AllNullIndicators => "removed_all_null",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RemovalCause::UnknownCountry => "Unknown countries",
            RemovalCause::InvalidCoordinates => "Invalid coordinates",
            RemovalCause::InvalidValue => "Invalid values",
            RemovalCause::Duplicate => "Duplicates",
            RemovalCause::RegionalAggregate => "Regional aggregates",
            RemovalCause::AllNullIndicators => "All null indicators",
        }
    }
}

/// Row counters for one cleaning pass.
///
/// Written once per step while the cleaner runs and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningStats {
    pub dataset: String,
    pub initial: usize,
    pub removed: BTreeMap<RemovalCause, usize>,
    #[serde(rename = "final")]
    pub final_count: usize,
}

impl CleaningStats {
    pub fn new(dataset: &str, initial: usize, causes: &[RemovalCause]) -> Self {
        Self {
            dataset: dataset.to_string(),
            initial,
            removed: causes.iter().map(|c| (*c, 0)).collect(),
            final_count: initial,
        }
    }

    pub fn record(&mut self, cause: RemovalCause, count: usize) {
        *self.removed.entry(cause).or_insert(0) += count;
        self.final_count = self.final_count.saturating_sub(count);
    }

    pub fn removed(&self, cause: RemovalCause) -> usize {
        self.removed.get(&cause).copied().unwrap_or(0)
    }

    pub fn total_removed(&self) -> usize {
        self.removed.values().sum()
    }

    /// final + every removal == initial
    pub fn reconciles(&self) -> bool {
        self.final_count + self.total_removed() == self.initial
    }

    pub fn retention_pct(&self) -> f64 {
        percent(self.final_count, self.initial)
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("CLEANING SUMMARY:\n");
        summary.push_str(&format!("  Initial records: {}\n", format_count(self.initial)));
        for (cause, count) in &self.removed {
            summary.push_str(&format!("  - {}: -{}\n", cause.label(), format_count(*count)));
        }
        summary.push_str(&format!("  = Final records: {}\n", format_count(self.final_count)));
        summary.push_str(&format!("  Data retention: {:.2}%", self.retention_pct()));
        summary
    }

    pub fn log_summary(&self, log: &mut RunLog) {
        for line in self.summary().lines() {
            log.log(line);
        }
        log.blank();
    }
}
