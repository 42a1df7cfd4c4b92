use chrono::Local;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::models::Table;
use crate::utils::constants::{DICTIONARY_SAMPLE_VALUES, LOG_DATE_FORMAT};
use crate::utils::dictionary_path;
use crate::utils::statistics;

/// Per-column description of one output table
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub data_type: String,
    pub non_null_count: usize,
    pub null_count: usize,
    pub unique_values: usize,
    pub sample_values: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataDictionary {
    pub dataset_name: String,
    pub generated_date: String,
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<ColumnProfile>,
}

impl DataDictionary {
    pub fn from_table(dataset: &str, table: &Table) -> Self {
        let columns = table
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let mut non_null_count = 0;
                let mut distinct = HashSet::new();
                let mut sample_values = Vec::new();
                let mut numbers = Vec::new();

                for cell in table.column_cells(index).filter(|c| !c.is_null()) {
                    non_null_count += 1;
                    distinct.insert(cell.render());
                    if sample_values.len() < DICTIONARY_SAMPLE_VALUES {
                        sample_values.push(cell.to_json());
                    }
                    if column.kind.is_numeric() {
                        numbers.extend(cell.as_f64());
                    }
                }

                ColumnProfile {
                    name: column.name.clone(),
                    data_type: column.kind.type_name().to_string(),
                    non_null_count,
                    null_count: table.num_rows() - non_null_count,
                    unique_values: distinct.len(),
                    sample_values,
                    min: statistics::min(&numbers),
                    max: statistics::max(&numbers),
                    mean: statistics::mean(&numbers),
                    median: statistics::median(&numbers),
                }
            })
            .collect();

        Self {
            dataset_name: dataset.to_string(),
            generated_date: Local::now().format(LOG_DATE_FORMAT).to_string(),
            total_rows: table.num_rows(),
            total_columns: table.num_columns(),
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Write `{dir}/{dataset}_data_dictionary.json`; an empty table writes nothing
pub fn write_dictionary(dir: &Path, dataset: &str, table: &Table) -> Result<Option<PathBuf>> {
    if table.num_rows() == 0 {
        debug!("Skipping data dictionary for empty dataset {}", dataset);
        return Ok(None);
    }

    let path = dictionary_path(dir, dataset);
    DataDictionary::from_table(dataset, table).save(&path)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Column, ColumnKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn table() -> Table {
        let mut table = Table::new(
            "analysis_ready",
            vec![
                Column::new("country_code", ColumnKind::Text),
                Column::new("mean_value_PM25", ColumnKind::Float),
            ],
        );
        for (code, value) in [("USA", Some(10.0)), ("IND", Some(80.0)), ("BRA", None), ("USA", Some(30.0))] {
            table.push_row(vec![Cell::Text(code.to_string()), Cell::float(value)]);
        }
        table
    }

    #[test]
    fn test_column_profiles() {
        let dictionary = DataDictionary::from_table("analysis_ready", &table());
        assert_eq!(dictionary.total_rows, 4);
        assert_eq!(dictionary.total_columns, 2);

        let code = dictionary.column("country_code").unwrap();
        assert_eq!(code.data_type, "string");
        assert_eq!(code.unique_values, 3);
        assert_eq!(code.min, None);

        let pm25 = dictionary.column("mean_value_PM25").unwrap();
        assert_eq!(pm25.non_null_count, 3);
        assert_eq!(pm25.null_count, 1);
        assert_eq!(pm25.min, Some(10.0));
        assert_eq!(pm25.max, Some(80.0));
        assert_eq!(pm25.mean, Some(40.0));
        assert_eq!(pm25.median, Some(30.0));
        assert_eq!(pm25.sample_values.len(), 3);
    }

    #[test]
    fn test_written_json_shape() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_dictionary(dir.path(), "analysis_ready", &table())?.unwrap();

        assert!(path.ends_with("analysis_ready_data_dictionary.json"));
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(json["dataset_name"], "analysis_ready");
        assert_eq!(json["columns"][0]["name"], "country_code");
        assert!(json["columns"][0].get("mean").is_none());
        assert_eq!(json["columns"][1]["max"], 80.0);
        Ok(())
    }

    #[test]
    fn test_empty_table_writes_no_file() -> Result<()> {
        let dir = TempDir::new()?;
        let empty = Table::new("openaq", vec![Column::new("value", ColumnKind::Float)]);

        assert_eq!(write_dictionary(dir.path(), "openaq", &empty)?, None);
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }
}
