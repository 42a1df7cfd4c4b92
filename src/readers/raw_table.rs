use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use memmap2::Mmap;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Cell spellings that mean "no value"
const ABSENT_MARKERS: [&str; 4] = ["nan", "NaN", "null", "None"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") => Ok(InputFormat::Json),
            _ => Err(ProcessingError::UnsupportedFormat(format!(
                "{} (expected .csv or .json)",
                path.display()
            ))),
        }
    }
}

/// Untyped rows of text cells with named headers.
///
/// Typing happens in the dataset readers so that a missing column and a
/// malformed cell can both be reported against the table name.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(name: &str, headers: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Fail on the first required column that is missing
    pub fn require(&self, columns: &[&str]) -> Result<()> {
        for column in columns {
            if self.column(column).is_none() {
                return Err(ProcessingError::MissingColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn text(&self, row: usize, column: Option<usize>) -> Option<&str> {
        let cell = self.rows.get(row)?.get(column?)?.as_deref()?.trim();
        if cell.is_empty() || ABSENT_MARKERS.contains(&cell) {
            None
        } else {
            Some(cell)
        }
    }

    pub fn float(&self, row: usize, column: Option<usize>) -> Result<Option<f64>> {
        match self.text(row, column) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(|v| if v.is_nan() { None } else { Some(v) })
                .map_err(|_| self.malformed(row, column, raw, "a number")),
        }
    }

    /// Integers written by float-typed producers ("2019.0") are accepted
    pub fn integer(&self, row: usize, column: Option<usize>) -> Result<Option<i64>> {
        match self.text(row, column) {
            None => Ok(None),
            Some(raw) => {
                if let Ok(v) = raw.parse::<i64>() {
                    return Ok(Some(v));
                }
                match raw.parse::<f64>() {
                    Ok(v) if v.is_nan() => Ok(None),
                    Ok(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(v as i64)),
                    _ => Err(self.malformed(row, column, raw, "an integer")),
                }
            }
        }
    }

    pub fn malformed(&self, row: usize, column: Option<usize>, raw: &str, expected: &str) -> ProcessingError {
        let column = column
            .and_then(|c| self.headers.get(c))
            .map(String::as_str)
            .unwrap_or("?");
        ProcessingError::InvalidFormat(format!(
            "{} record {}: column '{}' expected {}, found '{}'",
            self.name,
            row + 1,
            column,
            expected,
            raw
        ))
    }
}

pub struct RawTableReader {
    use_mmap: bool,
}

impl RawTableReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Read a CSV or JSON table, chosen by file extension
    pub fn read(&self, path: &Path, name: &str) -> Result<RawTable> {
        let format = InputFormat::from_path(path)?;
        let file = File::open(path)?;

        let table = if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            Self::parse(format, &mmap[..], name)?
        } else {
            let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
            Self::parse(format, reader, name)?
        };

        debug!(
            "Read {} rows x {} columns from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    fn parse<R: Read>(format: InputFormat, reader: R, name: &str) -> Result<RawTable> {
        match format {
            InputFormat::Csv => parse_csv(reader, name),
            InputFormat::Json => parse_json(reader, name),
        }
    }
}

impl Default for RawTableReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_csv<R: Read>(reader: R, name: &str) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut table = RawTable::new(name, headers);

    for record in csv_reader.records() {
        let record = record?;
        table.push_row(record.iter().map(|cell| Some(cell.to_string())).collect());
    }

    Ok(table)
}

/// JSON input is an array of flat objects; headers are the union of keys in
/// first-seen order.
pub fn parse_json<R: Read>(reader: R, name: &str) -> Result<RawTable> {
    let objects: Vec<Map<String, Value>> = serde_json::from_reader(reader)?;

    let mut headers: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(name, headers);
    for object in &objects {
        let row = table
            .headers
            .iter()
            .map(|h| match object.get(h) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}
