use serde::Serialize;

use crate::config::FeatureRules;
use crate::models::{
    categorize, AnalysisTable, Feature, Indicator, Metric, Parameter, Tabular,
};
use crate::utils::constants::DATASET_ANALYSIS;
use crate::utils::{format_count, percent, RunLog};

/// A feature left out because an input column does not exist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFeature {
    pub feature: Feature,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureReport {
    pub created: Vec<Feature>,
    pub skipped: Vec<SkippedFeature>,
}

impl FeatureReport {
    pub fn is_created(&self, feature: Feature) -> bool {
        self.created.contains(&feature)
    }

    fn skip(&mut self, feature: Feature, missing: Vec<String>) {
        self.skipped.push(SkippedFeature { feature, missing });
    }
}

/// Adds derived columns to the analysis table. Rows are never removed, and
/// running the engine again over its own output reproduces the same values.
pub struct FeatureEngine {
    rules: FeatureRules,
}

impl FeatureEngine {
    pub fn new(rules: FeatureRules) -> Self {
        Self { rules }
    }

    pub fn apply(&self, table: &mut AnalysisTable, log: &mut RunLog) -> FeatureReport {
        log.section("CREATING DERIVED FEATURES");
        let initial_columns = table.to_table(DATASET_ANALYSIS).num_columns();
        let mut report = FeatureReport::default();

        let pm25 = Metric::Mean.column_name(Parameter::Pm25);
        let has_pm25 = table.has_parameter(Parameter::Pm25);

        let gdp_missing = Self::missing(
            table,
            &pm25,
            has_pm25,
            Indicator::GdpPerCapita,
        );
        if gdp_missing.is_empty() {
            for row in &mut table.rows {
                row.features.pm25_per_gdp = row
                    .mean_pm25()
                    .zip(row.indicator.gdp_per_capita)
                    .map(|(pm, gdp)| pm / (gdp / 1000.0));
            }
            self.created(table, &mut report, Feature::Pm25PerGdp, log);
        } else {
            self.skipped(table, &mut report, Feature::Pm25PerGdp, gdp_missing, log);
        }

        let urban_missing = Self::missing(
            table,
            &pm25,
            has_pm25,
            Indicator::UrbanPopulationPct,
        );
        if urban_missing.is_empty() {
            for row in &mut table.rows {
                row.features.urban_pollution_index = row
                    .mean_pm25()
                    .zip(row.indicator.urban_population_pct)
                    .map(|(pm, urban)| pm * (urban / 100.0));
            }
            self.created(table, &mut report, Feature::UrbanPollutionIndex, log);
        } else {
            self.skipped(table, &mut report, Feature::UrbanPollutionIndex, urban_missing, log);
        }

        if has_pm25 {
            for row in &mut table.rows {
                row.features.aqi_category_pm25 =
                    categorize(&self.rules.aqi_pm25_edges, row.mean_pm25());
            }
            self.created(table, &mut report, Feature::AqiCategoryPm25, log);
        } else {
            self.skipped(table, &mut report, Feature::AqiCategoryPm25, vec![pm25.clone()], log);
        }

        let completeness = Self::completeness(table);
        for (row, pct) in table.rows.iter_mut().zip(completeness) {
            row.features.data_completeness_pct = pct;
        }
        self.created(table, &mut report, Feature::DataCompletenessPct, log);

        match Self::composite_index(table) {
            Some(index) => {
                for (row, value) in table.rows.iter_mut().zip(index) {
                    row.features.composite_pollution_index = value;
                }
                self.created(table, &mut report, Feature::CompositePollutionIndex, log);
            }
            None => self.skipped(
                table,
                &mut report,
                Feature::CompositePollutionIndex,
                vec![format!("{}_* with positive values", Metric::Mean.column_prefix())],
                log,
            ),
        }

        let total_columns = table.to_table(DATASET_ANALYSIS).num_columns();
        log.blank();
        log.log(format!(
            "Added {} new features",
            total_columns.saturating_sub(initial_columns)
        ));
        log.log(format!("Total features in dataset: {}", total_columns));
        log.blank();

        report
    }

    fn missing(table: &AnalysisTable, pm25: &str, has_pm25: bool, indicator: Indicator) -> Vec<String> {
        let mut missing = Vec::new();
        if !has_pm25 {
            missing.push(pm25.to_string());
        }
        if !table.has_indicator(indicator) {
            missing.push(indicator.column_name().to_string());
        }
        missing
    }

    fn created(&self, table: &mut AnalysisTable, report: &mut FeatureReport, feature: Feature, log: &mut RunLog) {
        table.features.insert(feature);
        report.created.push(feature);
        log.log(format!(" Created: {} ({})", feature.column_name(), feature.description()));
    }

    fn skipped(
        &self,
        table: &mut AnalysisTable,
        report: &mut FeatureReport,
        feature: Feature,
        missing: Vec<String>,
        log: &mut RunLog,
    ) {
        // a stale column from an earlier pass must not survive
        if table.features.remove(&feature) {
            for row in &mut table.rows {
                match feature {
                    Feature::Pm25PerGdp => row.features.pm25_per_gdp = None,
                    Feature::UrbanPollutionIndex => row.features.urban_pollution_index = None,
                    Feature::AqiCategoryPm25 => row.features.aqi_category_pm25 = None,
                    Feature::DataCompletenessPct => row.features.data_completeness_pct = None,
                    Feature::CompositePollutionIndex => row.features.composite_pollution_index = None,
                }
            }
        }
        log.log(format!(
            " Skipped: {} (missing {})",
            feature.column_name(),
            missing.join(", ")
        ));
        report.skip(feature, missing);
    }

    /// Percentage of non-absent numeric cells per row, excluding the
    /// completeness and composite columns themselves
    fn completeness(table: &AnalysisTable) -> Vec<Option<f64>> {
        let view = table.to_table(DATASET_ANALYSIS);
        let numeric: Vec<usize> = view
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind.is_numeric() && !Feature::excluded_from_completeness(&c.name))
            .map(|(i, _)| i)
            .collect();

        view.rows
            .iter()
            .map(|row| {
                if numeric.is_empty() {
                    return None;
                }
                let present = numeric.iter().filter(|i| !row[**i].is_null()).count();
                Some(percent(present, numeric.len()))
            })
            .collect()
    }

    /// Each mean column is scaled against its own maximum, computed once up
    /// front. `None` when no column qualifies.
    fn composite_index(table: &AnalysisTable) -> Option<Vec<Option<f64>>> {
        let scales: Vec<(Parameter, f64)> = table
            .parameters
            .iter()
            .filter_map(|p| {
                table
                    .rows
                    .iter()
                    .filter_map(|r| r.pollution_value(Metric::Mean, *p))
                    .filter(|v| !v.is_nan())
                    .reduce(f64::max)
                    .filter(|max| *max > 0.0)
                    .map(|max| (*p, max))
            })
            .collect();

        if scales.is_empty() {
            return None;
        }

        let index = table
            .rows
            .iter()
            .map(|row| {
                let normalized: Vec<f64> = scales
                    .iter()
                    .filter_map(|(p, max)| {
                        row.pollution_value(Metric::Mean, *p)
                            .filter(|v| !v.is_nan())
                            .map(|v| v / max * 100.0)
                    })
                    .collect();
                if normalized.is_empty() {
                    None
                } else {
                    Some(normalized.iter().sum::<f64>() / normalized.len() as f64)
                }
            })
            .collect();
        Some(index)
    }
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self::new(FeatureRules::default())
    }
}

/// Keep rows whose completeness score is at least `threshold`. Tables
/// without the score pass through untouched.
pub fn filter_by_completeness(mut table: AnalysisTable, threshold: f64, log: &mut RunLog) -> AnalysisTable {
    if !table.has_feature(Feature::DataCompletenessPct) {
        return table;
    }

    let before = table.len();
    table
        .rows
        .retain(|r| r.features.data_completeness_pct.is_some_and(|pct| pct >= threshold));
    let after = table.len();

    log.log(format!("Filtered by completeness >= {}%:", threshold));
    log.log(format!("  Before: {} records", format_count(before)));
    log.log(format!("  After: {} records", format_count(after)));
    log.log(format!(
        "  Removed: {} records ({:.1}%)",
        format_count(before - after),
        percent(before - after, before)
    ));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisRecord, AqiCategory, DerivedFeatures, IndicatorRecord, PollutionValues};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn row(code: &str, means: &[(Parameter, f64)], gdp: Option<f64>, urban: Option<f64>) -> AnalysisRecord {
        let mut pollution = PollutionValues::new();
        for (p, v) in means {
            pollution.insert((Metric::Mean, *p), *v);
        }
        let mut indicator = IndicatorRecord::new(code, code, 2020);
        indicator.gdp_per_capita = gdp;
        indicator.urban_population_pct = urban;
        AnalysisRecord {
            country_code: code.to_string(),
            country: code.to_string(),
            pollution,
            indicator,
            features: DerivedFeatures::default(),
        }
    }

    fn table(parameters: &[Parameter], rows: Vec<AnalysisRecord>) -> AnalysisTable {
        AnalysisTable {
            parameters: parameters.iter().copied().collect(),
            indicator_columns: Indicator::ALL.into_iter().collect(),
            features: BTreeSet::new(),
            rows,
        }
    }

    #[test]
    fn test_ratio_features() {
        let engine = FeatureEngine::default();
        let mut log = RunLog::new();
        let mut t = table(
            &[Parameter::Pm25],
            vec![row("USA", &[(Parameter::Pm25, 10.0)], Some(50000.0), Some(80.0))],
        );

        let report = engine.apply(&mut t, &mut log);
        let features = &t.rows[0].features;

        assert_eq!(features.pm25_per_gdp, Some(0.2));
        assert_eq!(features.urban_pollution_index, Some(8.0));
        assert_eq!(features.aqi_category_pm25, Some(AqiCategory::Good));
        assert!(report.skipped.is_empty());
        assert_eq!(report.created.len(), 5);
    }

    #[test]
    fn test_composite_index_uses_own_column_max() {
        let engine = FeatureEngine::default();
        let mut log = RunLog::new();
        let mut t = table(
            &[Parameter::No2, Parameter::Pm25],
            vec![
                row("AAA", &[(Parameter::Pm25, 50.0)], None, None),
                row("BBB", &[(Parameter::Pm25, 100.0), (Parameter::No2, 40.0)], None, None),
            ],
        );

        engine.apply(&mut t, &mut log);

        assert_eq!(t.rows[0].features.composite_pollution_index, Some(50.0));
        assert_eq!(t.rows[1].features.composite_pollution_index, Some(100.0));
    }

    #[test]
    fn test_composite_skipped_without_positive_means() {
        let engine = FeatureEngine::default();
        let mut log = RunLog::new();
        let mut t = table(&[Parameter::Co], vec![row("AAA", &[(Parameter::Co, 0.0)], None, None)]);

        let report = engine.apply(&mut t, &mut log);

        assert!(!report.is_created(Feature::CompositePollutionIndex));
        assert!(!t.has_feature(Feature::CompositePollutionIndex));
        assert_eq!(t.rows[0].features.composite_pollution_index, None);
    }

    #[test]
    fn test_missing_prerequisites_skip_silently() {
        let engine = FeatureEngine::default();
        let mut log = RunLog::new();
        let mut t = table(&[Parameter::No2], vec![row("AAA", &[(Parameter::No2, 20.0)], Some(1000.0), None)]);
        t.indicator_columns.remove(&Indicator::UrbanPopulationPct);

        let report = engine.apply(&mut t, &mut log);

        assert!(!t.has_feature(Feature::Pm25PerGdp));
        assert!(!t.has_feature(Feature::AqiCategoryPm25));
        assert!(t.has_feature(Feature::DataCompletenessPct));
        assert_eq!(t.len(), 1);

        let urban = report
            .skipped
            .iter()
            .find(|s| s.feature == Feature::UrbanPollutionIndex)
            .unwrap();
        assert_eq!(urban.missing, vec!["mean_value_PM25", "urban_population_pct"]);
    }

    #[test]
    fn test_completeness_counts_numeric_columns() {
        let engine = FeatureEngine::default();
        let mut log = RunLog::new();
        let mut t = table(&[Parameter::Pm25], vec![row("AAA", &[(Parameter::Pm25, 10.0)], Some(2000.0), None)]);
        t.indicator_columns = [Indicator::GdpPerCapita].into_iter().collect();

        engine.apply(&mut t, &mut log);

        // 8 PM25 metrics + year + gdp + pm25_per_gdp; present: mean, year, gdp, ratio
        let expected = 4.0 / 11.0 * 100.0;
        let pct = t.rows[0].features.data_completeness_pct.unwrap();
        assert!((pct - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let engine = FeatureEngine::default();
        let mut t = table(
            &[Parameter::No2, Parameter::Pm25],
            vec![
                row("AAA", &[(Parameter::Pm25, 30.0)], Some(5000.0), Some(45.0)),
                row("BBB", &[(Parameter::Pm25, 60.0), (Parameter::No2, 10.0)], None, Some(90.0)),
            ],
        );

        engine.apply(&mut t, &mut RunLog::new());
        let first = t.clone();
        engine.apply(&mut t, &mut RunLog::new());

        assert_eq!(t, first);
    }

    #[test]
    fn test_filter_by_completeness() {
        let engine = FeatureEngine::default();
        let mut log = RunLog::new();
        let mut t = table(
            &[Parameter::Pm25],
            vec![
                row("AAA", &[(Parameter::Pm25, 30.0)], Some(5000.0), Some(45.0)),
                row("BBB", &[], None, None),
            ],
        );
        engine.apply(&mut t, &mut log);

        let low = t.rows[1].features.data_completeness_pct.unwrap();
        let filtered = filter_by_completeness(t.clone(), low + 1.0, &mut log);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows[0].country_code, "AAA");

        let untouched = filter_by_completeness(table(&[], vec![row("CCC", &[], None, None)]), 99.0, &mut log);
        assert_eq!(untouched.len(), 1);
    }
}
