pub mod country_aggregator;
pub mod country_codes;
pub mod dataset_merger;
pub mod deduplicator;
pub mod feature_engine;
pub mod indicator_cleaner;
pub mod measurement_cleaner;
pub mod pipeline;
pub mod record_validator;
pub mod stats;

pub use country_aggregator::CountryAggregator;
pub use country_codes::{CodeMapping, CountryCodeNormalizer};
pub use dataset_merger::{DatasetMerger, MergeOutput, MergeStats};
pub use deduplicator::{deduplicate_measurements, MeasurementKey};
pub use feature_engine::{filter_by_completeness, FeatureEngine, FeatureReport, SkippedFeature};
pub use indicator_cleaner::IndicatorCleaner;
pub use measurement_cleaner::MeasurementCleaner;
pub use pipeline::{CleanedInputs, Pipeline, PipelineOutput};
pub use record_validator::RecordValidator;
pub use stats::{CleaningStats, RemovalCause};
