use crate::error::{ProcessingError, Result};
use crate::models::{Cell, ColumnKind, Table};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_BATCH_SIZE, DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Int32Type, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Write a table in record batches of `batch_size` rows. An empty table
    /// still produces a file carrying the schema.
    pub fn write_table(&self, table: &Table, path: &Path) -> Result<()> {
        let schema = Self::create_schema(table);
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in table.rows.chunks(self.batch_size) {
            let batch = Self::rows_to_batch(table, chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    /// Every column is nullable; absence is data here, not an error
    fn create_schema(table: &Table) -> SchemaRef {
        let fields: Vec<Field> = table
            .columns
            .iter()
            .map(|c| Field::new(&c.name, Self::data_type(c.kind), true))
            .collect();
        Arc::new(Schema::new(fields))
    }

    fn data_type(kind: ColumnKind) -> DataType {
        match kind {
            ColumnKind::Integer => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Boolean => DataType::Boolean,
            ColumnKind::Text => DataType::Utf8,
            ColumnKind::Category => {
                DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
            }
            ColumnKind::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        }
    }

    fn rows_to_batch(table: &Table, rows: &[Vec<Cell>], schema: SchemaRef) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let cells = rows.iter().map(move |row| &row[i]);
                Self::column_array(column.kind, cells)
            })
            .collect();

        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    fn column_array<'a>(kind: ColumnKind, cells: impl Iterator<Item = &'a Cell>) -> ArrayRef {
        match kind {
            ColumnKind::Integer => {
                let values: Vec<Option<i64>> = cells
                    .map(|c| match c {
                        Cell::Int(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Arc::new(Int64Array::from(values))
            }
            ColumnKind::Float => {
                let values: Vec<Option<f64>> = cells.map(Cell::as_f64).collect();
                Arc::new(Float64Array::from(values))
            }
            ColumnKind::Boolean => {
                let values: Vec<Option<bool>> = cells
                    .map(|c| match c {
                        Cell::Bool(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Arc::new(BooleanArray::from(values))
            }
            ColumnKind::Text => {
                let values: Vec<Option<String>> = cells.map(Self::text).collect();
                Arc::new(StringArray::from(values))
            }
            ColumnKind::Category => {
                let values: Vec<Option<String>> = cells.map(Self::text).collect();
                let array: DictionaryArray<Int32Type> =
                    values.iter().map(|v| v.as_deref()).collect();
                Arc::new(array)
            }
            ColumnKind::Timestamp => {
                let values: Vec<Option<i64>> = cells
                    .map(|c| match c {
                        Cell::Timestamp(t) => Some(t.and_utc().timestamp_micros()),
                        _ => None,
                    })
                    .collect();
                Arc::new(TimestampMicrosecondArray::from(values))
            }
        }
    }

    fn text(cell: &Cell) -> Option<String> {
        if cell.is_null() {
            None
        } else {
            Some(cell.render())
        }
    }

    /// Read every record batch back, mainly for inspection and tests
    pub fn read_batches(&self, path: &Path) -> Result<Vec<RecordBatch>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(self.batch_size)
            .build()?;

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }
        Ok(batches)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let mut row_group_sizes = Vec::new();
        for i in 0..row_groups {
            let rg_metadata = metadata.row_group(i);
            row_group_sizes.push(rg_metadata.num_rows());
        }

        let compression = (row_groups > 0 && metadata.row_group(0).num_columns() > 0)
            .then(|| metadata.row_group(0).column(0).compression());

        let schema = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?
            .schema()
            .clone();
        let columns = schema
            .fields()
            .iter()
            .map(|f| (f.name().clone(), f.data_type().to_string()))
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
            columns,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Option<Compression>,
    /// (name, arrow type) per column
    pub columns: Vec<(String, String)>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        let compression = self
            .compression
            .map_or_else(|| "n/a".to_string(), |c| format!("{:?}", c));

        let mut summary = format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {}\n\
            - Avg rows per group: {:.0}\n\
            - Columns: {}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            compression,
            avg_rows,
            self.columns.len()
        );
        for (name, data_type) in &self.columns {
            summary.push_str(&format!("\n    {:<32} {}", name, data_type));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn sample_table() -> Table {
        let mut table = Table::new(
            "sample",
            vec![
                Column::new("country_code", ColumnKind::Text),
                Column::new("measurement_count_PM25", ColumnKind::Integer),
                Column::new("mean_value_PM25", ColumnKind::Float),
                Column::new("has_city", ColumnKind::Boolean),
                Column::new("income_category", ColumnKind::Category),
                Column::new("datetime", ColumnKind::Timestamp),
            ],
        );
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        table.push_row(vec![
            Cell::Text("USA".to_string()),
            Cell::Int(12),
            Cell::Float(9.5),
            Cell::Bool(true),
            Cell::Text("High Income".to_string()),
            Cell::Timestamp(ts),
        ]);
        table.push_row(vec![
            Cell::Text("IND".to_string()),
            Cell::Null,
            Cell::Null,
            Cell::Bool(false),
            Cell::Null,
            Cell::Null,
        ]);
        table
    }

    #[test]
    fn test_write_empty_table_keeps_schema() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;
        let table = Table::new("empty", vec![Column::new("country", ColumnKind::Text)]);

        writer.write_table(&table, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 0);
        assert_eq!(info.columns.len(), 1);
        Ok(())
    }

    #[test]
    fn test_nulls_survive_round_trip() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        writer.write_table(&sample_table(), temp_file.path())?;
        let batches = writer.read_batches(temp_file.path())?;

        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 6);

        let counts = batch
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(counts.value(0), 12);
        assert!(counts.is_null(1));

        let means = batch
            .column(2)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(means.value(0), 9.5);
        assert!(means.is_null(1));
        Ok(())
    }

    #[test]
    fn test_batches_split_into_row_groups() -> Result<()> {
        let writer = ParquetWriter::new().with_batch_size(1).with_row_group_size(1);
        let temp_file = NamedTempFile::new()?;

        writer.write_table(&sample_table(), temp_file.path())?;
        let info = writer.get_file_info(temp_file.path())?;

        assert_eq!(info.total_rows, 2);
        assert_eq!(info.row_groups, 2);
        assert_eq!(info.row_group_sizes, vec![1, 1]);
        assert!(info.summary().contains("income_category"));
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_table(&sample_table(), temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-9000").is_err());
        Ok(())
    }
}
