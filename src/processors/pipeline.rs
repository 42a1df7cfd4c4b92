use chrono::Local;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::models::{
    AggregateTable, AnalysisTable, CleanMeasurement, Feature, IndicatorTable, MeasurementRecord,
    MergedTable, Tabular,
};
use crate::processors::country_aggregator::CountryAggregator;
use crate::processors::dataset_merger::{DatasetMerger, MergeStats};
use crate::processors::feature_engine::{filter_by_completeness, FeatureEngine, FeatureReport};
use crate::processors::indicator_cleaner::IndicatorCleaner;
use crate::processors::measurement_cleaner::MeasurementCleaner;
use crate::processors::stats::CleaningStats;
use crate::utils::constants::{DATASET_ANALYSIS, LOG_DATE_FORMAT};
use crate::utils::{format_count, RunLog};

/// Both inputs after cleaning
pub struct CleanedInputs {
    pub measurements: Vec<CleanMeasurement>,
    pub indicators: IndicatorTable,
    pub measurement_stats: CleaningStats,
    pub indicator_stats: CleaningStats,
}

/// Every table and statistic one run produces
pub struct PipelineOutput {
    pub measurements: Vec<CleanMeasurement>,
    pub indicators: IndicatorTable,
    pub aggregates: AggregateTable,
    pub analysis: AnalysisTable,
    pub merged: MergedTable,
    pub measurement_stats: CleaningStats,
    pub indicator_stats: CleaningStats,
    pub merge_stats: MergeStats,
    pub features: FeatureReport,
}

/// Clean -> aggregate -> merge -> features, strictly in sequence
pub struct Pipeline {
    config: PipelineConfig,
    min_completeness: Option<f64>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            min_completeness: None,
        }
    }

    /// Drop analysis rows below the configured completeness score
    pub fn with_completeness_filter(mut self, enabled: bool) -> Self {
        self.min_completeness = enabled.then_some(self.config.features.min_completeness);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn clean(
        &self,
        measurements: Vec<MeasurementRecord>,
        indicators: IndicatorTable,
        log: &mut RunLog,
    ) -> CleanedInputs {
        let (measurements, measurement_stats) =
            MeasurementCleaner::new(self.config.measurement.clone()).clean(measurements, log);
        let (indicators, indicator_stats) =
            IndicatorCleaner::new(self.config.indicator.clone()).clean(indicators, log);

        CleanedInputs {
            measurements,
            indicators,
            measurement_stats,
            indicator_stats,
        }
    }

    pub fn run(
        &self,
        measurements: Vec<MeasurementRecord>,
        indicators: IndicatorTable,
        log: &mut RunLog,
    ) -> PipelineOutput {
        let started = Instant::now();
        log.section("DATA CLEANING & PREPROCESSING PIPELINE");
        log.log(format!("Started: {}", Local::now().format(LOG_DATE_FORMAT)));
        log.blank();

        let cleaned = self.clean(measurements, indicators, log);
        let aggregates = CountryAggregator::new().aggregate(&cleaned.measurements, log);
        let merge = DatasetMerger::new().merge(&aggregates, &cleaned.indicators, log);

        let mut analysis = merge.analysis;
        let features = FeatureEngine::new(self.config.features.clone()).apply(&mut analysis, log);
        if let Some(threshold) = self.min_completeness {
            analysis = filter_by_completeness(analysis, threshold, log);
            log.blank();
        }

        let output = PipelineOutput {
            measurements: cleaned.measurements,
            indicators: cleaned.indicators,
            aggregates,
            analysis,
            merged: merge.merged,
            measurement_stats: cleaned.measurement_stats,
            indicator_stats: cleaned.indicator_stats,
            merge_stats: merge.stats,
            features,
        };

        log_run_summary(&output, log);
        log.log(format!("Duration: {:.2} seconds", started.elapsed().as_secs_f64()));
        log.blank();
        output
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

fn log_run_summary(output: &PipelineOutput, log: &mut RunLog) {
    log.section("DATA CLEANING SUMMARY");

    for (title, stats) in [
        ("### OpenAQ Cleaning", &output.measurement_stats),
        ("### World Bank Cleaning", &output.indicator_stats),
    ] {
        log.log(title);
        log.log(format!("  Initial records: {}", format_count(stats.initial)));
        log.log(format!("  Final records: {}", format_count(stats.final_count)));
        log.log(format!("  Retention rate: {:.1}%", stats.retention_pct()));
        log.blank();
    }

    let analysis = &output.analysis;
    log.log("### Final Analysis Dataset");
    log.log(format!("  Total records: {}", format_count(analysis.len())));
    log.log(format!("  Countries: {}", analysis.country_count()));
    if let Some((first, last)) = analysis.year_range() {
        log.log(format!("  Years: {}-{}", first, last));
    }
    log.log(format!(
        "  Total columns: {}",
        analysis.to_table(DATASET_ANALYSIS).num_columns()
    ));

    if analysis.has_feature(Feature::DataCompletenessPct) {
        let scores: Vec<f64> = analysis
            .rows
            .iter()
            .filter_map(|r| r.features.data_completeness_pct)
            .collect();
        if let Some(mean) = crate::utils::statistics::mean(&scores) {
            log.blank();
            log.log("### Data Completeness");
            log.log(format!("  Average completeness: {:.2}%", mean));
        }
    }
    log.blank();
}
