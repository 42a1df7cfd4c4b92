use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::Parameter;

/// A single sensor reading as delivered by the fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub parameter: Parameter,
    pub value: f64,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    /// ISO 3166-1 alpha-2 code as reported by OpenAQ
    pub country_code: String,
    pub country: String,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Raw timestamp text, parsed tolerantly during cleaning
    pub datetime: Option<String>,
    pub sensor_id: Option<i64>,
}

impl MeasurementRecord {
    pub fn new(parameter: Parameter, value: f64, country_code: &str, country: &str) -> Self {
        Self {
            parameter,
            value,
            location_id: None,
            location_name: None,
            country_code: country_code.to_string(),
            country: country.to_string(),
            city: None,
            latitude: None,
            longitude: None,
            datetime: None,
            sensor_id: None,
        }
    }

    pub fn with_location(mut self, location_id: i64, latitude: f64, longitude: f64) -> Self {
        self.location_id = Some(location_id);
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_datetime(mut self, datetime: &str) -> Self {
        self.datetime = Some(datetime.to_string());
        self
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// A measurement that survived cleaning, with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanMeasurement {
    pub record: MeasurementRecord,
    pub observed_at: Option<NaiveDateTime>,
    pub has_coordinates: bool,
    pub has_city: bool,
}

impl CleanMeasurement {
    pub fn measurement_year(&self) -> Option<i32> {
        self.observed_at.map(|t| t.year())
    }

    pub fn measurement_month(&self) -> Option<u32> {
        self.observed_at.map(|t| t.month())
    }

    pub fn measurement_hour(&self) -> Option<u32> {
        self.observed_at.map(|t| t.hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_builder_helpers() {
        let record = MeasurementRecord::new(Parameter::Pm25, 12.5, "GB", "United Kingdom")
            .with_location(42, 51.5, -0.12)
            .with_datetime("2024-01-01T10:00:00Z")
            .with_city("London");

        assert!(record.has_coordinates());
        assert_eq!(record.location_id, Some(42));
        assert_eq!(record.city.as_deref(), Some("London"));
    }

    #[test]
    fn test_time_components() {
        let observed_at = NaiveDate::from_ymd_opt(2023, 7, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let clean = CleanMeasurement {
            record: MeasurementRecord::new(Parameter::No2, 20.0, "FR", "France"),
            observed_at: Some(observed_at),
            has_coordinates: false,
            has_city: false,
        };

        assert_eq!(clean.measurement_year(), Some(2023));
        assert_eq!(clean.measurement_month(), Some(7));
        assert_eq!(clean.measurement_hour(), Some(14));
    }
}
