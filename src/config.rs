//! Pipeline configuration.
//!
//! Every threshold, bin edge and excluded-code list lives here and is handed
//! to the component that needs it. Values come from the built-in defaults,
//! then an optional config file, then `AQ__`-prefixed environment variables.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::Result;
use crate::models::{AqiCategory, IncomeCategory, Ordinal, Parameter, UrbanizationLevel};
use crate::utils::constants::{
    AQI_PM25_EDGES, COMPRESSION_SNAPPY, DEFAULT_BATCH_SIZE, DEFAULT_MIN_COMPLETENESS,
    DEFAULT_ROW_GROUP_SIZE, EXCLUDED_WB_CODES, INCOME_EDGES, LAT_MAX, LAT_MIN, LON_MAX, LON_MIN,
    UNKNOWN_SENTINEL, URBANIZATION_EDGES,
};

/// Closed physical range for one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterThreshold {
    pub parameter: Parameter,
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

impl ParameterThreshold {
    pub fn new(parameter: Parameter, min: f64, max: f64, unit: &str) -> Self {
        Self {
            parameter,
            min,
            max,
            unit: unit.to_string(),
        }
    }

    /// NaN is never contained
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MeasurementRules {
    pub thresholds: Vec<ParameterThreshold>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat_min: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat_max: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon_min: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon_max: f64,

    #[validate(length(min = 1))]
    pub unknown_sentinel: String,
}

impl MeasurementRules {
    pub fn threshold(&self, parameter: Parameter) -> Option<&ParameterThreshold> {
        self.thresholds.iter().find(|t| t.parameter == parameter)
    }
}

impl Default for MeasurementRules {
    fn default() -> Self {
        Self {
            thresholds: vec![
                ParameterThreshold::new(Parameter::Pm10, 0.0, 1000.0, "µg/m³"),
                ParameterThreshold::new(Parameter::Pm25, 0.0, 500.0, "µg/m³"),
                ParameterThreshold::new(Parameter::No2, 0.0, 1000.0, "ppb"),
                ParameterThreshold::new(Parameter::Co, 0.0, 50.0, "ppm"),
                ParameterThreshold::new(Parameter::O3, 0.0, 0.5, "ppm"),
            ],
            lat_min: LAT_MIN,
            lat_max: LAT_MAX,
            lon_min: LON_MIN,
            lon_max: LON_MAX,
            unknown_sentinel: UNKNOWN_SENTINEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct IndicatorRules {
    pub excluded_codes: Vec<String>,
    pub income_edges: Vec<f64>,
    pub urbanization_edges: Vec<f64>,
}

impl IndicatorRules {
    pub fn is_excluded(&self, country_code: &str) -> bool {
        self.excluded_codes.iter().any(|c| c == country_code)
    }
}

impl Default for IndicatorRules {
    fn default() -> Self {
        Self {
            excluded_codes: EXCLUDED_WB_CODES.iter().map(|c| c.to_string()).collect(),
            income_edges: INCOME_EDGES.to_vec(),
            urbanization_edges: URBANIZATION_EDGES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FeatureRules {
    pub aqi_pm25_edges: Vec<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub min_completeness: f64,
}

impl Default for FeatureRules {
    fn default() -> Self {
        Self {
            aqi_pm25_edges: AQI_PM25_EDGES.to_vec(),
            min_completeness: DEFAULT_MIN_COMPLETENESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OutputSettings {
    #[validate(length(min = 1))]
    pub compression: String,

    #[validate(range(min = 1))]
    pub row_group_size: usize,

    #[validate(range(min = 1))]
    pub batch_size: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub measurement: MeasurementRules,
    pub indicator: IndicatorRules,
    pub features: FeatureRules,
    pub output: OutputSettings,
}

impl PipelineConfig {
    /// Layer defaults, an optional file and the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let cfg = builder
            .add_source(Environment::with_prefix("AQ").prefix_separator("__").separator("__"))
            .build()?;

        let config: PipelineConfig = cfg.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Field-level and cross-field validation
    pub fn check(&self) -> Result<()> {
        self.measurement.validate()?;
        self.indicator.validate()?;
        self.features.validate()?;
        self.output.validate()?;

        let mut errors = ValidationErrors::new();

        if self.measurement.lat_min > self.measurement.lat_max {
            errors.add("lat_min", invalid("bounds", "lat_min must not exceed lat_max"));
        }
        if self.measurement.lon_min > self.measurement.lon_max {
            errors.add("lon_min", invalid("bounds", "lon_min must not exceed lon_max"));
        }
        for threshold in &self.measurement.thresholds {
            if !(threshold.min <= threshold.max) {
                errors.add(
                    "thresholds",
                    invalid(
                        "threshold_range",
                        &format!("{} threshold has min > max", threshold.parameter),
                    ),
                );
            }
        }

        let edge_checks = [
            ("income_edges", &self.indicator.income_edges, IncomeCategory::ORDERED.len()),
            (
                "urbanization_edges",
                &self.indicator.urbanization_edges,
                UrbanizationLevel::ORDERED.len(),
            ),
            ("aqi_pm25_edges", &self.features.aqi_pm25_edges, AqiCategory::ORDERED.len()),
        ];
        for (field, edges, categories) in edge_checks {
            if let Err(e) = check_edges(edges, categories) {
                errors.add(field, e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

fn invalid(code: &'static str, message: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message.to_string()));
    error
}

/// Edges must be strictly increasing with one more edge than categories
fn check_edges(edges: &[f64], categories: usize) -> std::result::Result<(), ValidationError> {
    if edges.len() != categories + 1 {
        return Err(invalid(
            "edge_count",
            &format!("expected {} edges, got {}", categories + 1, edges.len()),
        ));
    }
    if edges.windows(2).any(|w| !(w[0] < w[1])) {
        return Err(invalid("edge_order", "edges must be strictly increasing"));
    }
    Ok(())
}
