use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{
    pollution_columns, AqiCategory, Indicator, IndicatorRecord, Metric, Parameter, PollutionValues,
};

/// Derived column computed by the feature engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    Pm25PerGdp,
    UrbanPollutionIndex,
    AqiCategoryPm25,
    DataCompletenessPct,
    CompositePollutionIndex,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Pm25PerGdp,
        Feature::UrbanPollutionIndex,
        Feature::AqiCategoryPm25,
        Feature::DataCompletenessPct,
        Feature::CompositePollutionIndex,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Feature::Pm25PerGdp => "pm25_per_gdp",
            Feature::UrbanPollutionIndex => "urban_pollution_index",
            Feature::AqiCategoryPm25 => "aqi_category_pm25",
            Feature::DataCompletenessPct => "data_completeness_pct",
            Feature::CompositePollutionIndex => "composite_pollution_index",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Feature::Pm25PerGdp => "PM2.5 normalized by GDP",
            Feature::UrbanPollutionIndex => "PM2.5 x urbanization %",
            Feature::AqiCategoryPm25 => "EPA AQI categories",
            Feature::DataCompletenessPct => "% of non-null values",
            Feature::CompositePollutionIndex => "average of all pollutants, normalized",
        }
    }

    /// Features whose values never feed the completeness score
    pub fn excluded_from_completeness(column: &str) -> bool {
        column == Feature::DataCompletenessPct.column_name()
            || column == Feature::CompositePollutionIndex.column_name()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub pm25_per_gdp: Option<f64>,
    pub urban_pollution_index: Option<f64>,
    pub aqi_category_pm25: Option<AqiCategory>,
    pub data_completeness_pct: Option<f64>,
    pub composite_pollution_index: Option<f64>,
}

impl DerivedFeatures {
    pub fn numeric(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Pm25PerGdp => self.pm25_per_gdp,
            Feature::UrbanPollutionIndex => self.urban_pollution_index,
            Feature::AqiCategoryPm25 => None,
            Feature::DataCompletenessPct => self.data_completeness_pct,
            Feature::CompositePollutionIndex => self.composite_pollution_index,
        }
    }
}

/// A country-year row present in both sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub country_code: String,
    pub country: String,
    pub pollution: PollutionValues,
    pub indicator: IndicatorRecord,
    pub features: DerivedFeatures,
}

impl AnalysisRecord {
    pub fn pollution_value(&self, metric: Metric, parameter: Parameter) -> Option<f64> {
        self.pollution.get(&(metric, parameter)).copied()
    }

    pub fn mean_pm25(&self) -> Option<f64> {
        self.pollution_value(Metric::Mean, Parameter::Pm25)
    }
}

/// The analysis-ready table: inner join of aggregates and indicators plus
/// whichever features have been added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisTable {
    pub parameters: BTreeSet<Parameter>,
    pub indicator_columns: BTreeSet<Indicator>,
    pub features: BTreeSet<Feature>,
    pub rows: Vec<AnalysisRecord>,
}

impl AnalysisTable {
    pub fn pollution_columns(&self) -> Vec<(Metric, Parameter)> {
        pollution_columns(&self.parameters)
    }

    /// Every metric column exists for each parameter in the column set
    pub fn has_parameter(&self, parameter: Parameter) -> bool {
        self.parameters.contains(&parameter)
    }

    pub fn has_indicator(&self, indicator: Indicator) -> bool {
        self.indicator_columns.contains(&indicator)
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn country_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.country.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        let years = self.rows.iter().filter_map(|r| r.indicator.year);
        years.fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
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

    fn record(country: &str, year: i32) -> AnalysisRecord {
        AnalysisRecord {
            country_code: country.to_string(),
            country: country.to_string(),
            pollution: PollutionValues::new(),
            indicator: IndicatorRecord::new(country, country, year),
            features: DerivedFeatures::default(),
        }
    }

    #[test]
    fn test_year_range_and_countries() {
        let table = AnalysisTable {
            rows: vec![record("FRA", 2015), record("FRA", 2019), record("DEU", 2012)],
            ..Default::default()
        };

        assert_eq!(table.year_range(), Some((2012, 2019)));
        assert_eq!(table.country_count(), 2);
        assert_eq!(AnalysisTable::default().year_range(), None);
    }

    #[test]
    fn test_completeness_exclusions() {
        assert!(Feature::excluded_from_completeness("data_completeness_pct"));
        assert!(Feature::excluded_from_completeness("composite_pollution_index"));
        assert!(!Feature::excluded_from_completeness("pm25_per_gdp"));
    }
}
