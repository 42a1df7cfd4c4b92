use crate::error::Result;
use crate::models::Table;
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::utils::constants::DEFAULT_BUFFER_SIZE;

/// Header row plus one record per table row; absent cells are empty fields
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn write_table(&self, table: &Table, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.write_to(table, writer)
    }

    pub fn write_to<W: Write>(&self, table: &Table, writer: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer.write_record(table.column_names())?;
        for row in &table.rows {
            csv_writer.write_record(row.iter().map(|cell| cell.render()))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
