use arrow::array::{Array, Float64Array};
use std::path::Path;

use crate::error::Result;
use crate::models::Table;
use crate::utils::statistics;
use crate::writers::ParquetWriter;

/// Derived features worth summarising, in report order
pub const SUMMARY_FEATURES: [&str; 4] = [
    "pm25_per_gdp",
    "urban_pollution_index",
    "data_completeness_pct",
    "composite_pollution_index",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub feature: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl FeatureSummary {
    /// `None` when the feature has no values
    pub fn from_values(feature: &str, values: &[f64]) -> Option<Self> {
        Some(Self {
            feature: feature.to_string(),
            count: values.len(),
            mean: statistics::mean(values)?,
            median: statistics::median(values)?,
            std: statistics::sample_std(values),
            min: statistics::min(values)?,
            max: statistics::max(values)?,
        })
    }
}

/// Column groups of an analysis table, as `(group, columns)` in display order
pub type ColumnGroups = Vec<(&'static str, Vec<String>)>;

pub struct FeatureAnalyzer;

impl FeatureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize_table(&self, table: &Table) -> Vec<FeatureSummary> {
        SUMMARY_FEATURES
            .iter()
            .filter_map(|feature| {
                let index = table.column_index(feature)?;
                let values: Vec<f64> = table
                    .column_cells(index)
                    .filter_map(|c| c.as_f64())
                    .collect();
                FeatureSummary::from_values(feature, &values)
            })
            .collect()
    }

    /// Same summary, read back from a written analysis Parquet file
    pub fn summarize_parquet(&self, path: &Path) -> Result<Vec<FeatureSummary>> {
        let batches = ParquetWriter::new().read_batches(path)?;

        let mut summaries = Vec::new();
        for feature in SUMMARY_FEATURES {
            let mut values = Vec::new();
            for batch in &batches {
                let Some(column) = batch.column_by_name(feature) else {
                    continue;
                };
                if let Some(array) = column.as_any().downcast_ref::<Float64Array>() {
                    values.extend((0..array.len()).filter(|&i| array.is_valid(i)).map(|i| array.value(i)));
                }
            }
            summaries.extend(FeatureSummary::from_values(feature, &values));
        }
        Ok(summaries)
    }

    pub fn key_analysis_columns(&self, names: &[&str]) -> ColumnGroups {
        let present = |wanted: &[&str]| -> Vec<String> {
            wanted
                .iter()
                .filter(|w| names.contains(*w))
                .map(|w| w.to_string())
                .collect()
        };

        let air_quality = names
            .iter()
            .filter(|n| n.starts_with("mean_value_") || n.starts_with("median_value_"))
            .map(|n| n.to_string())
            .collect();

        vec![
            ("Identifiers", present(&["country", "country_code", "year"])),
            ("Air Quality Metrics", air_quality),
            ("Economic Indicators", present(&["gdp_per_capita", "income_category"])),
            ("Urbanization", present(&["urban_population_pct", "urbanization_level"])),
            (
                "Derived Features",
                present(&[
                    "pm25_per_gdp",
                    "urban_pollution_index",
                    "aqi_category_pm25",
                    "composite_pollution_index",
                ]),
            ),
            (
                "Quality Flags",
                present(&["data_completeness_pct", "has_coordinates", "has_city"]),
            ),
        ]
    }

    pub fn summary(summaries: &[FeatureSummary]) -> String {
        if summaries.is_empty() {
            return "Feature Summary: no derived feature values".to_string();
        }

        let mut summary = String::from("Feature Summary:\n");
        summary.push_str(&format!(
            "  {:<28} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            "Feature", "Count", "Mean", "Median", "Std", "Min", "Max"
        ));
        for s in summaries {
            let std = s.std.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
            summary.push_str(&format!(
                "  {:<28} {:>6} {:>12.4} {:>12.4} {:>12} {:>12.4} {:>12.4}\n",
                s.feature, s.count, s.mean, s.median, std, s.min, s.max
            ));
        }
        summary
    }
}

impl Default for FeatureAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Column, ColumnKind};
    use pretty_assertions::assert_eq;

    fn analysis_table() -> Table {
        let mut table = Table::new(
            "analysis_ready",
            vec![
                Column::new("country_code", ColumnKind::Text),
                Column::new("country", ColumnKind::Text),
                Column::new("year", ColumnKind::Integer),
                Column::new("mean_value_PM25", ColumnKind::Float),
                Column::new("std_value_PM25", ColumnKind::Float),
                Column::new("gdp_per_capita", ColumnKind::Float),
                Column::new("pm25_per_gdp", ColumnKind::Float),
                Column::new("data_completeness_pct", ColumnKind::Float),
            ],
        );
        for (gdp_ratio, completeness) in [(Some(0.2), 100.0), (Some(8.0), 50.0), (None, 75.0)] {
            table.push_row(vec![
                Cell::Text("USA".to_string()),
                Cell::Text("United States".to_string()),
                Cell::Int(2020),
                Cell::Float(10.0),
                Cell::Null,
                Cell::Float(50000.0),
                Cell::float(gdp_ratio),
                Cell::Float(completeness),
            ]);
        }
        table
    }

    #[test]
    fn test_summary_skips_missing_features() {
        let summaries = FeatureAnalyzer::new().summarize_table(&analysis_table());

        let names: Vec<&str> = summaries.iter().map(|s| s.feature.as_str()).collect();
        assert_eq!(names, vec!["pm25_per_gdp", "data_completeness_pct"]);

        let ratio = &summaries[0];
        assert_eq!(ratio.count, 2);
        assert!((ratio.mean - 4.1).abs() < 1e-9);
        assert_eq!(ratio.min, 0.2);
        assert_eq!(ratio.max, 8.0);

        let completeness = &summaries[1];
        assert_eq!(completeness.median, 75.0);
        assert_eq!(completeness.std, Some(25.0));
    }

    #[test]
    fn test_key_analysis_columns() {
        let table = analysis_table();
        let groups = FeatureAnalyzer::new().key_analysis_columns(&table.column_names());

        assert_eq!(groups.len(), 6);
        assert_eq!(groups[0], ("Identifiers", vec!["country".to_string(), "country_code".to_string(), "year".to_string()]));
        assert_eq!(groups[1].1, vec!["mean_value_PM25".to_string()]);
        assert_eq!(groups[2].1, vec!["gdp_per_capita".to_string()]);
        assert!(groups[3].1.is_empty());
        assert_eq!(groups[4].1, vec!["pm25_per_gdp".to_string()]);
        assert_eq!(groups[5].1, vec!["data_completeness_pct".to_string()]);
    }

    #[test]
    fn test_parquet_summary_matches_table_summary() -> Result<()> {
        let table = analysis_table();
        let file = tempfile::NamedTempFile::new()?;
        ParquetWriter::new().write_table(&table, file.path())?;

        let analyzer = FeatureAnalyzer::new();
        assert_eq!(analyzer.summarize_parquet(file.path())?, analyzer.summarize_table(&table));
        Ok(())
    }

    #[test]
    fn test_summary_text() {
        let summaries = FeatureAnalyzer::new().summarize_table(&analysis_table());
        let text = FeatureAnalyzer::summary(&summaries);
        assert!(text.starts_with("Feature Summary:"));
        assert!(text.contains("pm25_per_gdp"));
    }
}
