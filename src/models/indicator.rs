use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{IncomeCategory, UrbanizationLevel};

/// World Bank socio-economic indicator series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Pm25Exposure,
    GdpPerCapita,
    UrbanPopulationPct,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [
        Indicator::Pm25Exposure,
        Indicator::GdpPerCapita,
        Indicator::UrbanPopulationPct,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Indicator::Pm25Exposure => "pm25_exposure",
            Indicator::GdpPerCapita => "gdp_per_capita",
            Indicator::UrbanPopulationPct => "urban_population_pct",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    /// ISO 3166-1 alpha-3 code
    pub country_code: String,
    pub country: Option<String>,
    pub year: Option<i32>,
    pub pm25_exposure: Option<f64>,
    pub gdp_per_capita: Option<f64>,
    pub urban_population_pct: Option<f64>,
    pub income_category: Option<IncomeCategory>,
    pub urbanization_level: Option<UrbanizationLevel>,
}

impl IndicatorRecord {
    pub fn new(country_code: &str, country: &str, year: i32) -> Self {
        Self {
            country_code: country_code.to_string(),
            country: Some(country.to_string()),
            year: Some(year),
            pm25_exposure: None,
            gdp_per_capita: None,
            urban_population_pct: None,
            income_category: None,
            urbanization_level: None,
        }
    }

    pub fn with_value(mut self, indicator: Indicator, value: f64) -> Self {
        *self.value_mut(indicator) = Some(value);
        self
    }

    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Pm25Exposure => self.pm25_exposure,
            Indicator::GdpPerCapita => self.gdp_per_capita,
            Indicator::UrbanPopulationPct => self.urban_population_pct,
        }
    }

    pub fn value_mut(&mut self, indicator: Indicator) -> &mut Option<f64> {
        match indicator {
            Indicator::Pm25Exposure => &mut self.pm25_exposure,
            Indicator::GdpPerCapita => &mut self.gdp_per_capita,
            Indicator::UrbanPopulationPct => &mut self.urban_population_pct,
        }
    }

    pub fn has_any_indicator(&self) -> bool {
        Indicator::ALL.iter().any(|i| self.value(*i).is_some())
    }
}

/// Indicator rows plus the indicator columns the source actually carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorTable {
    pub columns: BTreeSet<Indicator>,
    pub records: Vec<IndicatorRecord>,
}

impl IndicatorTable {
    /// Table with every indicator column present
    pub fn new(records: Vec<IndicatorRecord>) -> Self {
        Self {
            columns: Indicator::ALL.into_iter().collect(),
            records,
        }
    }

    pub fn has_column(&self, indicator: Indicator) -> bool {
        self.columns.contains(&indicator)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
