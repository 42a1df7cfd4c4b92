use std::collections::{BTreeMap, BTreeSet};

use crate::models::{AggregateTable, CleanMeasurement, CountryAggregate, LongFormValue, Metric, Parameter};
use crate::utils::statistics;
use crate::utils::{format_count, RunLog};

type GroupKey = (String, String, Parameter);

/// Values collected for one (country, country_code, parameter) group
#[derive(Default)]
struct Group {
    values: Vec<f64>,
    rows: usize,
    rows_with_coordinates: usize,
    locations: BTreeSet<i64>,
}

/// Collapses cleaned measurements to one row per country in two phases:
/// a long-form table keyed by (country, parameter, metric), then a pivot.
pub struct CountryAggregator;

impl CountryAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, measurements: &[CleanMeasurement], log: &mut RunLog) -> AggregateTable {
        log.section("AGGREGATING OPENAQ DATA BY COUNTRY");

        let long = self.long_form(measurements);
        let table = self.pivot(&long);

        log.log(format!("Aggregated to {} countries", format_count(table.len())));
        log.log(format!(
            "  Columns created: {}",
            2 + table.pollution_columns().len()
        ));
        log.blank();
        table
    }

    /// Phase one: every metric for every group, sorted by group key then metric
    pub fn long_form(&self, measurements: &[CleanMeasurement]) -> Vec<LongFormValue> {
        let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();

        for m in measurements {
            let key = (
                m.record.country.clone(),
                m.record.country_code.clone(),
                m.record.parameter,
            );
            let group = groups.entry(key).or_default();
            group.rows += 1;
            if m.has_coordinates {
                group.rows_with_coordinates += 1;
            }
            if !m.record.value.is_nan() {
                group.values.push(m.record.value);
            }
            if let Some(id) = m.record.location_id {
                group.locations.insert(id);
            }
        }

        let mut long = Vec::with_capacity(groups.len() * Metric::ALL.len());
        for ((country, country_code, parameter), group) in groups {
            for metric in Metric::ALL {
                long.push(LongFormValue {
                    country: country.clone(),
                    country_code: country_code.clone(),
                    parameter,
                    metric,
                    value: Self::metric_value(metric, &group),
                });
            }
        }
        long
    }

    fn metric_value(metric: Metric, group: &Group) -> Option<f64> {
        let values = &group.values;
        match metric {
            Metric::Mean => statistics::mean(values),
            Metric::Median => statistics::median(values),
            Metric::Std => statistics::sample_std(values),
            Metric::Min => statistics::min(values),
            Metric::Max => statistics::max(values),
            Metric::Count => Some(values.len() as f64),
            Metric::CoordinateCompleteness => {
                Some(group.rows_with_coordinates as f64 / group.rows as f64)
            }
            Metric::NumLocations => Some(group.locations.len() as f64),
        }
    }

    /// Phase two: one row per (country, country_code), absent cells omitted
    pub fn pivot(&self, long: &[LongFormValue]) -> AggregateTable {
        let mut rows: BTreeMap<(String, String), CountryAggregate> = BTreeMap::new();
        let mut parameters = BTreeSet::new();

        for cell in long {
            parameters.insert(cell.parameter);
            let row = rows
                .entry((cell.country.clone(), cell.country_code.clone()))
                .or_insert_with(|| CountryAggregate {
                    country: cell.country.clone(),
                    country_code: cell.country_code.clone(),
                    values: BTreeMap::new(),
                });
            if let Some(value) = cell.value {
                row.values.insert((cell.metric, cell.parameter), value);
            }
        }

        AggregateTable {
            parameters,
            rows: rows.into_values().collect(),
        }
    }
}

impl Default for CountryAggregator {
    fn default() -> Self {
        Self::new()
    }
}
