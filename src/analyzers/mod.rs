pub mod feature_analyzer;

pub use feature_analyzer::{ColumnGroups, FeatureAnalyzer, FeatureSummary, SUMMARY_FEATURES};
