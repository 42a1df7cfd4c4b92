use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::models::{
    AggregateTable, AnalysisRecord, AnalysisTable, CountryAggregate, DerivedFeatures,
    IndicatorRecord, IndicatorTable, MergedRecord, MergedTable, Provenance,
};
use crate::processors::country_codes::{unmapped_codes, CodeMapping, CountryCodeNormalizer};
use crate::utils::{format_count, RunLog};

/// Bookkeeping from one merge, logged and returned alongside the tables
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeStats {
    pub both: usize,
    pub measurement_only: usize,
    pub indicator_only: usize,
    pub converted_codes: usize,
    pub total_codes: usize,
    pub unmapped_codes: Vec<String>,
    pub analysis_rows: usize,
    pub analysis_countries: usize,
    pub year_range: Option<(i32, i32)>,
}

impl MergeStats {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Merge statistics:\n");
        summary.push_str(&format!("  Both datasets: {}\n", format_count(self.both)));
        summary.push_str(&format!("  Only OpenAQ: {}\n", format_count(self.measurement_only)));
        summary.push_str(&format!("  Only World Bank: {}", format_count(self.indicator_only)));
        summary
    }
}

pub struct MergeOutput {
    pub analysis: AnalysisTable,
    pub merged: MergedTable,
    pub stats: MergeStats,
}

/// Candidate rows for one join key
#[derive(Default)]
struct JoinBucket<'a> {
    measurements: Vec<(&'a CountryAggregate, &'a CodeMapping)>,
    indicators: Vec<&'a IndicatorRecord>,
}

/// Outer-joins country aggregates with indicator rows on the normalised
/// country code.
pub struct DatasetMerger {
    normalizer: CountryCodeNormalizer,
}

impl DatasetMerger {
    pub fn new() -> Self {
        Self {
            normalizer: CountryCodeNormalizer::new(),
        }
    }

    pub fn with_normalizer(normalizer: CountryCodeNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn merge(
        &self,
        aggregates: &AggregateTable,
        indicators: &IndicatorTable,
        log: &mut RunLog,
    ) -> MergeOutput {
        log.section("MERGING DATASETS");

        log.log("Converting OpenAQ country codes (2-letter -> 3-letter)...");
        let mappings: Vec<CodeMapping> = aggregates
            .rows
            .iter()
            .map(|row| self.normalizer.normalize(&row.country_code))
            .collect();
        let converted = mappings.iter().filter(|m| m.is_mapped()).count();
        let unmapped = unmapped_codes(&mappings);
        log.log(format!("  Converted {}/{} country codes", converted, mappings.len()));
        if !unmapped.is_empty() {
            warn!("Country codes without an ISO alpha-3 mapping: {:?}", unmapped);
            log.log(format!("    Unmapped codes: {:?}", unmapped));
        }
        log.blank();

        log.log("Merging datasets on country_code...");
        let merged = self.outer_join(aggregates, &mappings, indicators);

        let mut stats = MergeStats {
            both: merged.count(Provenance::Both),
            measurement_only: merged.count(Provenance::MeasurementOnly),
            indicator_only: merged.count(Provenance::IndicatorOnly),
            converted_codes: converted,
            total_codes: mappings.len(),
            unmapped_codes: unmapped,
            ..MergeStats::default()
        };
        for line in stats.summary().lines() {
            log.log(line);
        }
        log.blank();

        let analysis = Self::analysis_table(&merged);
        stats.analysis_rows = analysis.len();
        stats.analysis_countries = analysis.country_count();
        stats.year_range = analysis.year_range();

        log.log(format!("Analysis dataset: {} records", format_count(analysis.len())));
        log.log(format!("  Countries: {}", stats.analysis_countries));
        if let Some((first, last)) = stats.year_range {
            log.log(format!("  Years: {}-{}", first, last));
        }
        log.blank();

        MergeOutput {
            analysis,
            merged,
            stats,
        }
    }

    /// Rows come out sorted by join key; within a key, every measurement row
    /// pairs with every indicator row in input order.
    pub fn outer_join(
        &self,
        aggregates: &AggregateTable,
        mappings: &[CodeMapping],
        indicators: &IndicatorTable,
    ) -> MergedTable {
        let mut buckets: BTreeMap<&str, JoinBucket> = BTreeMap::new();
        for (row, mapping) in aggregates.rows.iter().zip(mappings) {
            buckets
                .entry(mapping.join_key())
                .or_default()
                .measurements
                .push((row, mapping));
        }
        for record in &indicators.records {
            buckets
                .entry(record.country_code.as_str())
                .or_default()
                .indicators
                .push(record);
        }

        let mut rows = Vec::new();
        for (key, bucket) in buckets {
            match (bucket.measurements.is_empty(), bucket.indicators.is_empty()) {
                (false, false) => {
                    for &(aggregate, mapping) in &bucket.measurements {
                        for &indicator in &bucket.indicators {
                            rows.push(Self::merged_row(
                                key,
                                Some((aggregate, mapping)),
                                Some(indicator),
                                Provenance::Both,
                            ));
                        }
                    }
                }
                (false, true) => {
                    for &(aggregate, mapping) in &bucket.measurements {
                        rows.push(Self::merged_row(
                            key,
                            Some((aggregate, mapping)),
                            None,
                            Provenance::MeasurementOnly,
                        ));
                    }
                }
                (true, false) => {
                    for &indicator in &bucket.indicators {
                        rows.push(Self::merged_row(
                            key,
                            None,
                            Some(indicator),
                            Provenance::IndicatorOnly,
                        ));
                    }
                }
                (true, true) => {}
            }
        }

        MergedTable {
            parameters: aggregates.parameters.clone(),
            indicator_columns: indicators.columns.clone(),
            rows,
        }
    }

    fn merged_row(
        key: &str,
        measurement: Option<(&CountryAggregate, &CodeMapping)>,
        indicator: Option<&IndicatorRecord>,
        provenance: Provenance,
    ) -> MergedRecord {
        // measurement-side name wins, indicator-side name fills the gap
        let country = measurement
            .map(|(a, _)| a.country.as_str())
            .filter(|name| !name.is_empty())
            .or_else(|| indicator.and_then(|i| i.country.as_deref()))
            .map(str::to_string);

        MergedRecord {
            country_code: key.to_string(),
            country_code_2: measurement.map(|(_, m)| m.original().to_string()),
            country,
            provenance,
            pollution: measurement.map(|(a, _)| a.values.clone()).unwrap_or_default(),
            indicator: indicator.cloned(),
        }
    }

    /// Rows present in both sources, without the join bookkeeping
    pub fn analysis_table(merged: &MergedTable) -> AnalysisTable {
        let rows = merged
            .rows
            .iter()
            .filter(|r| r.provenance == Provenance::Both)
            .filter_map(|r| {
                r.indicator.as_ref().map(|indicator| AnalysisRecord {
                    country_code: r.country_code.clone(),
                    country: r.country.clone().unwrap_or_default(),
                    pollution: r.pollution.clone(),
                    indicator: indicator.clone(),
                    features: DerivedFeatures::default(),
                })
            })
            .collect();

        AnalysisTable {
            parameters: merged.parameters.clone(),
            indicator_columns: merged.indicator_columns.clone(),
            features: Default::default(),
            rows,
        }
    }
}

impl Default for DatasetMerger {
    fn default() -> Self {
        Self::new()
    }
}
