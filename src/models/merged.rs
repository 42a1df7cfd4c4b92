use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::models::{pollution_columns, Indicator, IndicatorRecord, Metric, Parameter, PollutionValues};

/// Which source tables contributed a merged row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Both,
    MeasurementOnly,
    IndicatorOnly,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Both => "both",
            Provenance::MeasurementOnly => "measurement_only",
            Provenance::IndicatorOnly => "indicator_only",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row of the full outer join, kept for completeness auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    /// Join key: alpha-3 when the alpha-2 code was mapped, otherwise the original code
    pub country_code: String,
    /// Original alpha-2 code from the measurement side
    pub country_code_2: Option<String>,
    pub country: Option<String>,
    pub provenance: Provenance,
    pub pollution: PollutionValues,
    pub indicator: Option<IndicatorRecord>,
}

impl MergedRecord {
    pub fn pollution_value(&self, metric: Metric, parameter: Parameter) -> Option<f64> {
        self.pollution.get(&(metric, parameter)).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    pub parameters: BTreeSet<Parameter>,
    pub indicator_columns: BTreeSet<Indicator>,
    pub rows: Vec<MergedRecord>,
}

impl MergedTable {
    pub fn pollution_columns(&self) -> Vec<(Metric, Parameter)> {
        pollution_columns(&self.parameters)
    }

    pub fn count(&self, provenance: Provenance) -> usize {
        self.rows.iter().filter(|r| r.provenance == provenance).count()
    }

    pub fn codes_with(&self, provenance: Provenance) -> BTreeSet<&str> {
        self.rows
            .iter()
            .filter(|r| r.provenance == provenance)
            .map(|r| r.country_code.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_labels() {
        assert_eq!(Provenance::Both.to_string(), "both");
        assert_eq!(Provenance::MeasurementOnly.as_str(), "measurement_only");
        assert_eq!(Provenance::IndicatorOnly.as_str(), "indicator_only");
    }

    #[test]
    fn test_counts_by_provenance() {
        let row = |code: &str, provenance| MergedRecord {
            country_code: code.to_string(),
            country_code_2: None,
            country: None,
            provenance,
            pollution: PollutionValues::new(),
            indicator: None,
        };
        let table = MergedTable {
            rows: vec![
                row("FRA", Provenance::Both),
                row("XK", Provenance::MeasurementOnly),
                row("USA", Provenance::IndicatorOnly),
                row("USA", Provenance::IndicatorOnly),
            ],
            ..Default::default()
        };

        assert_eq!(table.count(Provenance::Both), 1);
        assert_eq!(table.count(Provenance::IndicatorOnly), 2);
        assert_eq!(table.codes_with(Provenance::IndicatorOnly).len(), 1);
    }
}
