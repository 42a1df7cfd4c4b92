use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// Air-quality pollutant measured by a sensor.
///
/// Variants are declared in lexicographic order of their column labels so
/// that derived ordering matches a sort on the label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "CO", alias = "co")]
    Co,
    #[serde(rename = "NO2", alias = "no2")]
    No2,
    #[serde(rename = "O3", alias = "o3")]
    O3,
    #[serde(rename = "PM10", alias = "pm10")]
    Pm10,
    #[serde(rename = "PM25", alias = "pm25", alias = "PM2.5", alias = "pm2.5")]
    Pm25,
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::Co,
        Parameter::No2,
        Parameter::O3,
        Parameter::Pm10,
        Parameter::Pm25,
    ];

    /// Label used in column names, e.g. `mean_value_PM25`
    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Co => "CO",
            Parameter::No2 => "NO2",
            Parameter::O3 => "O3",
            Parameter::Pm10 => "PM10",
            Parameter::Pm25 => "PM25",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::Co => "Carbon Monoxide",
            Parameter::No2 => "Nitrogen Dioxide",
            Parameter::O3 => "Ozone",
            Parameter::Pm10 => "PM10",
            Parameter::Pm25 => "PM2.5",
        }
    }
}

impl FromStr for Parameter {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "CO" => Ok(Parameter::Co),
            "NO2" => Ok(Parameter::No2),
            "O3" => Ok(Parameter::O3),
            "PM10" => Ok(Parameter::Pm10),
            "PM25" | "PM2.5" => Ok(Parameter::Pm25),
            other => Err(ProcessingError::InvalidFormat(format!(
                "Unknown parameter: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
