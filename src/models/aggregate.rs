use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::Parameter;

/// Summary metric computed per (country, parameter) group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    Mean,
    Median,
    Std,
    Min,
    Max,
    Count,
    CoordinateCompleteness,
    NumLocations,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Mean,
        Metric::Median,
        Metric::Std,
        Metric::Min,
        Metric::Max,
        Metric::Count,
        Metric::CoordinateCompleteness,
        Metric::NumLocations,
    ];

    pub fn column_prefix(&self) -> &'static str {
        match self {
            Metric::Mean => "mean_value",
            Metric::Median => "median_value",
            Metric::Std => "std_value",
            Metric::Min => "min_value",
            Metric::Max => "max_value",
            Metric::Count => "measurement_count",
            Metric::CoordinateCompleteness => "coordinate_completeness",
            Metric::NumLocations => "num_locations",
        }
    }

    /// Wide-form column name, e.g. `mean_value_PM25`
    pub fn column_name(&self, parameter: Parameter) -> String {
        format!("{}_{}", self.column_prefix(), parameter.as_str())
    }

    /// Count-like metrics are whole numbers
    pub fn is_integral(&self) -> bool {
        matches!(self, Metric::Count | Metric::NumLocations)
    }
}

/// One cell of the long-form aggregate: (country, parameter, metric) -> value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongFormValue {
    pub country: String,
    pub country_code: String,
    pub parameter: Parameter,
    pub metric: Metric,
    pub value: Option<f64>,
}

pub type PollutionValues = BTreeMap<(Metric, Parameter), f64>;

/// One row per country after the pivot; absent keys mean "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAggregate {
    pub country: String,
    pub country_code: String,
    pub values: PollutionValues,
}

impl CountryAggregate {
    pub fn value(&self, metric: Metric, parameter: Parameter) -> Option<f64> {
        self.values.get(&(metric, parameter)).copied()
    }

    pub fn parameters(&self) -> BTreeSet<Parameter> {
        self.values.keys().map(|(_, p)| *p).collect()
    }
}

/// Wide-form aggregate table. `parameters` fixes the column set: every
/// metric for every parameter seen in the cleaned measurements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTable {
    pub parameters: BTreeSet<Parameter>,
    pub rows: Vec<CountryAggregate>,
}

impl AggregateTable {
    pub fn pollution_columns(&self) -> Vec<(Metric, Parameter)> {
        pollution_columns(&self.parameters)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Metric-major column order shared by every table carrying pollution values
pub fn pollution_columns(parameters: &BTreeSet<Parameter>) -> Vec<(Metric, Parameter)> {
    Metric::ALL
        .iter()
        .flat_map(|m| parameters.iter().map(move |p| (*m, *p)))
        .collect()
}
