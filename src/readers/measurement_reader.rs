use crate::error::{ProcessingError, Result};
use crate::models::{MeasurementRecord, Parameter};
use crate::readers::raw_table::{RawTable, RawTableReader};
use crate::utils::constants::DATASET_OPENAQ;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub const REQUIRED_MEASUREMENT_COLUMNS: [&str; 6] = [
    "parameter",
    "value",
    "location_id",
    "country_code",
    "country",
    "datetime",
];

/// Reads raw OpenAQ measurement tables
pub struct MeasurementReader {
    raw: RawTableReader,
}

impl MeasurementReader {
    pub fn new() -> Self {
        Self {
            raw: RawTableReader::new(),
        }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self {
            raw: RawTableReader::with_mmap(use_mmap),
        }
    }

    pub fn read(&self, path: &Path) -> Result<Vec<MeasurementRecord>> {
        let table = self.raw.read(path, DATASET_OPENAQ)?;
        let records = Self::from_raw(&table)?;
        info!("Loaded {} measurement rows from {}", records.len(), path.display());
        Ok(records)
    }

    /// Type a raw table; a missing value reads as NaN so validation can reject it
    pub fn from_raw(table: &RawTable) -> Result<Vec<MeasurementRecord>> {
        table.require(&REQUIRED_MEASUREMENT_COLUMNS)?;

        let parameter = table.column("parameter");
        let value = table.column("value");
        let location_id = table.column("location_id");
        let location_name = table.column("location_name");
        let country_code = table.column("country_code");
        let country = table.column("country");
        let city = table.column("city");
        let latitude = table.column("latitude");
        let longitude = table.column("longitude");
        let datetime = table.column("datetime");
        let sensor_id = table.column("sensors_id");

        let mut records = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let raw_parameter = table.text(row, parameter).unwrap_or_default();
            let parsed = Parameter::from_str(raw_parameter).map_err(|_| {
                ProcessingError::InvalidFormat(format!(
                    "{} record {}: unknown parameter '{}'",
                    table.name,
                    row + 1,
                    raw_parameter
                ))
            })?;

            records.push(MeasurementRecord {
                parameter: parsed,
                value: table.float(row, value)?.unwrap_or(f64::NAN),
                location_id: table.integer(row, location_id)?,
                location_name: table.text(row, location_name).map(str::to_string),
                country_code: table.text(row, country_code).unwrap_or_default().to_string(),
                country: table.text(row, country).unwrap_or_default().to_string(),
                city: table.text(row, city).map(str::to_string),
                latitude: table.float(row, latitude)?,
                longitude: table.float(row, longitude)?,
                datetime: table.text(row, datetime).map(str::to_string),
                sensor_id: table.integer(row, sensor_id)?,
            });
        }

        Ok(records)
    }
}

impl Default for MeasurementReader {
    fn default() -> Self {
        Self::new()
    }
}
