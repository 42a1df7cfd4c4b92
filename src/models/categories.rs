use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered categorical label produced by binning a numeric value.
pub trait Ordinal: Sized + Copy + 'static {
    /// All categories from lowest to highest bin
    const ORDERED: &'static [Self];

    fn label(&self) -> &'static str;
}

/// Find the bin a value falls into.
///
/// Bins are `(edges[i], edges[i + 1]]`, except that the lowest edge itself
/// belongs to the first bin. Values outside `[edges[0], edges[last]]` and NaN
/// have no bin.
pub fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    if edges.len() < 2 || value.is_nan() {
        return None;
    }

    let first = edges[0];
    let last = edges[edges.len() - 1];
    if value < first || value > last {
        return None;
    }
    if value == first {
        return Some(0);
    }

    edges[1..].iter().position(|&upper| value <= upper)
}

/// Bin an optional value into an ordered category
pub fn categorize<C: Ordinal>(edges: &[f64], value: Option<f64>) -> Option<C> {
    value
        .and_then(|v| bin_index(edges, v))
        .and_then(|i| C::ORDERED.get(i).copied())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IncomeCategory {
    #[serde(rename = "Low Income")]
    LowIncome,
    #[serde(rename = "Lower Middle Income")]
    LowerMiddleIncome,
    #[serde(rename = "Upper Middle Income")]
    UpperMiddleIncome,
    #[serde(rename = "High Income")]
    HighIncome,
}

impl Ordinal for IncomeCategory {
    const ORDERED: &'static [Self] = &[
        IncomeCategory::LowIncome,
        IncomeCategory::LowerMiddleIncome,
        IncomeCategory::UpperMiddleIncome,
        IncomeCategory::HighIncome,
    ];

    fn label(&self) -> &'static str {
        match self {
            IncomeCategory::LowIncome => "Low Income",
            IncomeCategory::LowerMiddleIncome => "Lower Middle Income",
            IncomeCategory::UpperMiddleIncome => "Upper Middle Income",
            IncomeCategory::HighIncome => "High Income",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UrbanizationLevel {
    #[serde(rename = "Rural")]
    Rural,
    #[serde(rename = "Moderately Urbanized")]
    ModeratelyUrbanized,
    #[serde(rename = "Highly Urbanized")]
    HighlyUrbanized,
    #[serde(rename = "Extremely Urbanized")]
    ExtremelyUrbanized,
}

impl Ordinal for UrbanizationLevel {
    const ORDERED: &'static [Self] = &[
        UrbanizationLevel::Rural,
        UrbanizationLevel::ModeratelyUrbanized,
        UrbanizationLevel::HighlyUrbanized,
        UrbanizationLevel::ExtremelyUrbanized,
    ];

    fn label(&self) -> &'static str {
        match self {
            UrbanizationLevel::Rural => "Rural",
            UrbanizationLevel::ModeratelyUrbanized => "Moderately Urbanized",
            UrbanizationLevel::HighlyUrbanized => "Highly Urbanized",
            UrbanizationLevel::ExtremelyUrbanized => "Extremely Urbanized",
        }
    }
}

/// US EPA air quality index category for a PM2.5 concentration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive")]
    UnhealthyForSensitive,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
}

impl Ordinal for AqiCategory {
    const ORDERED: &'static [Self] = &[
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitive,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitive => "Unhealthy for Sensitive",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.label())
                }
            }
        )*
    };
}

display_label!(IncomeCategory, UrbanizationLevel, AqiCategory);
