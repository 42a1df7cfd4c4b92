use crate::error::{ProcessingError, Result};
use crate::models::{Indicator, IndicatorRecord, IndicatorTable};
use crate::readers::raw_table::{RawTable, RawTableReader};
use crate::utils::constants::DATASET_WORLDBANK;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

pub const REQUIRED_INDICATOR_COLUMNS: [&str; 2] = ["country_code", "year"];

/// Reads raw World Bank indicator tables
pub struct IndicatorReader {
    raw: RawTableReader,
}

impl IndicatorReader {
    pub fn new() -> Self {
        Self {
            raw: RawTableReader::new(),
        }
    }

    pub fn read(&self, path: &Path) -> Result<IndicatorTable> {
        let table = self.raw.read(path, DATASET_WORLDBANK)?;
        let indicators = Self::from_raw(&table)?;
        info!(
            "Loaded {} indicator rows ({} indicator columns) from {}",
            indicators.len(),
            indicators.columns.len(),
            path.display()
        );
        Ok(indicators)
    }

    /// Indicator columns missing from the source are left out of the table's
    /// column set rather than treated as all-null.
    pub fn from_raw(table: &RawTable) -> Result<IndicatorTable> {
        table.require(&REQUIRED_INDICATOR_COLUMNS)?;

        let country_code = table.column("country_code");
        let country = table.column("country");
        let year = table.column("year");

        let mut columns = BTreeSet::new();
        let mut indicator_columns = Vec::new();
        for indicator in Indicator::ALL {
            match table.column(indicator.column_name()) {
                Some(index) => {
                    columns.insert(indicator);
                    indicator_columns.push((indicator, Some(index)));
                }
                None => warn!(
                    "{} has no '{}' column; dependent features will be skipped",
                    table.name,
                    indicator.column_name()
                ),
            }
        }

        let mut records = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let year = match table.integer(row, year)? {
                Some(y) => Some(i32::try_from(y).map_err(|_| {
                    ProcessingError::InvalidFormat(format!(
                        "{} record {}: year {} out of range",
                        table.name,
                        row + 1,
                        y
                    ))
                })?),
                None => None,
            };

            let mut record = IndicatorRecord {
                country_code: table.text(row, country_code).unwrap_or_default().to_string(),
                country: table.text(row, country).map(str::to_string),
                year,
                pm25_exposure: None,
                gdp_per_capita: None,
                urban_population_pct: None,
                income_category: None,
                urbanization_level: None,
            };
            for (indicator, index) in &indicator_columns {
                *record.value_mut(*indicator) = table.float(row, *index)?;
            }
            records.push(record);
        }

        Ok(IndicatorTable { columns, records })
    }
}

impl Default for IndicatorReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::raw_table::{parse_csv, parse_json};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_raw_reads_all_columns() -> Result<()> {
        let data = "country_code,year,pm25_exposure,gdp_per_capita,urban_population_pct,country\n\
                    USA,2020.0,,50000,83,United States\n\
                    WLD,2020,45.1,11000,56,World\n";
        let table = parse_csv(data.as_bytes(), "worldbank")?;
        let indicators = IndicatorReader::from_raw(&table)?;

        assert_eq!(indicators.len(), 2);
        assert_eq!(indicators.columns.len(), 3);

        let usa = &indicators.records[0];
        assert_eq!(usa.year, Some(2020));
        assert_eq!(usa.pm25_exposure, None);
        assert_eq!(usa.gdp_per_capita, Some(50000.0));
        assert_eq!(usa.country.as_deref(), Some("United States"));
        Ok(())
    }

    #[test]
    fn test_absent_indicator_column_recorded() -> Result<()> {
        let data = r#"[{"country_code": "FRA", "year": 2021, "gdp_per_capita": 43000.5}]"#;
        let table = parse_json(data.as_bytes(), "worldbank")?;
        let indicators = IndicatorReader::from_raw(&table)?;

        assert!(indicators.has_column(Indicator::GdpPerCapita));
        assert!(!indicators.has_column(Indicator::UrbanPopulationPct));
        assert!(!indicators.has_column(Indicator::Pm25Exposure));
        assert_eq!(indicators.records[0].country, None);
        Ok(())
    }

    #[test]
    fn test_missing_year_column_is_fatal() -> Result<()> {
        let table = parse_csv("country_code,gdp_per_capita\nUSA,1\n".as_bytes(), "worldbank")?;
        assert!(matches!(
            IndicatorReader::from_raw(&table),
            Err(ProcessingError::MissingColumn { .. })
        ));
        Ok(())
    }
}
