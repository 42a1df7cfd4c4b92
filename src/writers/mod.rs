pub mod csv_writer;
pub mod dictionary;
pub mod output_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use dictionary::{write_dictionary, ColumnProfile, DataDictionary};
pub use output_writer::OutputWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
