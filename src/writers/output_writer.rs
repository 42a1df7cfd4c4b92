use std::fs;
use std::path::{Path, PathBuf};

use crate::config::OutputSettings;
use crate::error::Result;
use crate::models::{Table, Tabular};
use crate::processors::PipelineOutput;
use crate::utils::constants::*;
use crate::utils::RunLog;
use crate::writers::csv_writer::CsvWriter;
use crate::writers::dictionary::write_dictionary;
use crate::writers::parquet_writer::ParquetWriter;

/// Writes every table of a run into one output directory
pub struct OutputWriter {
    output_dir: PathBuf,
    csv: CsvWriter,
    parquet: ParquetWriter,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            csv: CsvWriter::new(),
            parquet: ParquetWriter::new(),
        }
    }

    pub fn with_settings(mut self, settings: &OutputSettings) -> Result<Self> {
        self.parquet = ParquetWriter::new()
            .with_compression(&settings.compression)?
            .with_row_group_size(settings.row_group_size)
            .with_batch_size(settings.batch_size);
        Ok(self)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns every file written, in write order
    pub fn write_all(&self, output: &PipelineOutput, log: &mut RunLog) -> Result<Vec<PathBuf>> {
        log.section("SAVING CLEANED DATA");
        fs::create_dir_all(&self.output_dir)?;

        let openaq = output.measurements.to_table(DATASET_OPENAQ);
        let worldbank = output.indicators.to_table(DATASET_WORLDBANK);
        let analysis = output.analysis.to_table(DATASET_ANALYSIS);
        let merged = output.merged.to_table(DATASET_MERGED);

        let mut written = Vec::new();

        for (table, file_name) in [
            (&openaq, OPENAQ_CLEANED_CSV),
            (&worldbank, WORLDBANK_CLEANED_CSV),
            (&analysis, ANALYSIS_READY_CSV),
            (&merged, MERGED_COMPLETE_CSV),
        ] {
            let path = self.output_dir.join(file_name);
            self.csv.write_table(table, &path)?;
            written.push(self.saved(path, table, log));
        }

        for (table, file_name) in [
            (&openaq, OPENAQ_DB_PARQUET),
            (&worldbank, WORLDBANK_DB_PARQUET),
            (&analysis, ANALYSIS_READY_PARQUET),
        ] {
            let path = self.output_dir.join(file_name);
            self.parquet.write_table(table, &path)?;
            written.push(self.saved(path, table, log));
        }

        for (table, dataset) in [
            (&openaq, DATASET_OPENAQ),
            (&worldbank, DATASET_WORLDBANK),
            (&analysis, DATASET_ANALYSIS),
        ] {
            match write_dictionary(&self.output_dir, dataset, table)? {
                Some(path) => {
                    log.log(format!("✓ Saved: {}", path.display()));
                    written.push(path);
                }
                None => log.log(format!("  Skipped data dictionary for empty dataset '{}'", dataset)),
            }
        }

        log.blank();
        Ok(written)
    }

    fn saved(&self, path: PathBuf, table: &Table, log: &mut RunLog) -> PathBuf {
        log.log(format!(
            "✓ Saved: {} ({} rows, {} columns)",
            path.display(),
            table.num_rows(),
            table.num_columns()
        ));
        path
    }
}
