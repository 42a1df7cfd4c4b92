use crate::config::MeasurementRules;
use crate::models::{CleanMeasurement, MeasurementRecord, Parameter};
use crate::processors::deduplicator::deduplicate_measurements;
use crate::processors::record_validator::RecordValidator;
use crate::processors::stats::{CleaningStats, RemovalCause};
use crate::utils::constants::DATASET_OPENAQ;
use crate::utils::{format_count, parse_timestamp, percent, RunLog};
use tracing::debug;

/// Six-step cleaning of raw measurements. Step order is fixed: the Unknown
/// country filter runs first, and the duplicate count is taken after the
/// three validity filters.
pub struct MeasurementCleaner {
    rules: MeasurementRules,
}

impl MeasurementCleaner {
    pub fn new(rules: MeasurementRules) -> Self {
        Self { rules }
    }

    pub fn clean(
        &self,
        records: Vec<MeasurementRecord>,
        log: &mut RunLog,
    ) -> (Vec<CleanMeasurement>, CleaningStats) {
        let validator = RecordValidator::new(&self.rules);
        let mut records = records;

        log.section("CLEANING OPENAQ DATA");
        let initial = records.len();
        log.log(format!("Initial records: {}", format_count(initial)));
        log.blank();

        let mut stats = CleaningStats::new(DATASET_OPENAQ, initial, &RemovalCause::MEASUREMENT);

        log.log("STEP 1: Removing Unknown countries...");
        let before = records.len();
        records.retain(|r| !validator.is_unknown_country(r));
        let removed = before - records.len();
        stats.record(RemovalCause::UnknownCountry, removed);
        log.log(format!(
            "   Removed {} records with {} country ({:.2}%)",
            format_count(removed),
            self.rules.unknown_sentinel,
            percent(removed, initial)
        ));
        Self::log_remaining(log, records.len());

        log.log("STEP 2: Removing invalid coordinates...");
        let before = records.len();
        records.retain(|r| validator.coordinates_valid(r));
        let removed = before - records.len();
        stats.record(RemovalCause::InvalidCoordinates, removed);
        log.log(format!("   Removed {} records with invalid coordinates", format_count(removed)));
        Self::log_remaining(log, records.len());

        log.log("STEP 3: Removing invalid measurement values...");
        let before = records.len();
        for parameter in Parameter::ALL {
            let Some(threshold) = validator.threshold(parameter) else {
                continue;
            };
            let param_before = records.len();
            records.retain(|r| r.parameter != parameter || threshold.contains(r.value));
            let invalid = param_before - records.len();
            if invalid > 0 {
                log.log(format!(
                    "   Removing {} invalid {} values (outside {}-{} {})",
                    format_count(invalid),
                    parameter,
                    threshold.min,
                    threshold.max,
                    threshold.unit
                ));
            }
        }
        let removed = before - records.len();
        stats.record(RemovalCause::InvalidValue, removed);
        log.log(format!("   Total invalid values removed: {}", format_count(removed)));
        Self::log_remaining(log, records.len());

        log.log("STEP 4: Removing duplicates...");
        let removed = deduplicate_measurements(&mut records);
        stats.record(RemovalCause::Duplicate, removed);
        log.log(format!("   Removed {} duplicate records", format_count(removed)));
        Self::log_remaining(log, records.len());

        log.log("STEP 5: Extracting datetime components...");
        log.log("STEP 6: Creating data quality flags...");
        let sentinel = self.rules.unknown_sentinel.as_str();
        let cleaned: Vec<CleanMeasurement> = records
            .into_iter()
            .map(|record| {
                let observed_at = record.datetime.as_deref().and_then(parse_timestamp);
                let has_coordinates = record.has_coordinates();
                let has_city = record.city.as_deref().is_some_and(|c| c != sentinel);
                CleanMeasurement {
                    record,
                    observed_at,
                    has_coordinates,
                    has_city,
                }
            })
            .collect();

        let unparsed = cleaned
            .iter()
            .filter(|m| m.observed_at.is_none())
            .count();
        if unparsed > 0 {
            debug!("{} timestamps could not be parsed and were left empty", unparsed);
        }
        log.log("   Added year, month, hour columns and quality flags");
        log.blank();

        debug_assert_eq!(stats.final_count, cleaned.len());
        debug_assert!(stats.reconciles());
        stats.log_summary(log);

        (cleaned, stats)
    }

    fn log_remaining(log: &mut RunLog, remaining: usize) {
        log.log(format!("   Remaining: {} records", format_count(remaining)));
        log.blank();
    }
}

impl Default for MeasurementCleaner {
    fn default() -> Self {
        Self::new(MeasurementRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn pm25(country_code: &str, country: &str, value: f64) -> MeasurementRecord {
        MeasurementRecord::new(Parameter::Pm25, value, country_code, country)
    }

    #[test]
    fn test_invalid_value_and_unknown_country_removed() {
        let cleaner = MeasurementCleaner::default();
        let mut log = RunLog::new();

        let records = vec![pm25("IN", "India", 999.0), pm25("XX", "Unknown", 10.0)];
        let (cleaned, stats) = cleaner.clean(records, &mut log);

        assert!(cleaned.is_empty());
        assert_eq!(stats.removed(RemovalCause::InvalidValue), 1);
        assert_eq!(stats.removed(RemovalCause::UnknownCountry), 1);
        assert_eq!(stats.final_count, 0);
        assert!(log.lines().iter().any(|l| l.contains("invalid PM25 values")));
    }

    #[test]
    fn test_counts_reconcile_in_step_order() {
        let cleaner = MeasurementCleaner::default();
        let mut log = RunLog::new();

        let ts = "2024-03-01T12:00:00Z";
        let records = vec![
            pm25("US", "United States", 10.0).with_location(1, 40.0, -74.0).with_datetime(ts),
            pm25("US", "United States", 10.0).with_location(1, 40.0, -74.0).with_datetime(ts),
            pm25("US", "Unknown", 10.0).with_location(1, 40.0, -74.0).with_datetime(ts),
            pm25("US", "United States", 10.0).with_location(2, 95.0, -74.0).with_datetime(ts),
            pm25("US", "United States", -5.0).with_location(3, 40.0, -74.0).with_datetime(ts),
            pm25("US", "United States", 12.0).with_location(4, 40.0, -74.0),
        ];
        let (cleaned, stats) = cleaner.clean(records, &mut log);

        assert_eq!(stats.initial, 6);
        assert_eq!(stats.removed(RemovalCause::UnknownCountry), 1);
        assert_eq!(stats.removed(RemovalCause::InvalidCoordinates), 1);
        assert_eq!(stats.removed(RemovalCause::InvalidValue), 1);
        assert_eq!(stats.removed(RemovalCause::Duplicate), 1);
        assert_eq!(stats.final_count, 2);
        assert_eq!(cleaned.len(), 2);
        assert!(stats.reconciles());
    }

    #[test]
    fn test_derived_columns() {
        let cleaner = MeasurementCleaner::default();
        let mut log = RunLog::new();

        let records = vec![
            pm25("FR", "France", 8.0)
                .with_location(1, 48.8, 2.3)
                .with_datetime("2023-07-15T14:30:00+00:00")
                .with_city("Paris"),
            pm25("FR", "France", 9.0)
                .with_datetime("garbage")
                .with_city("Unknown"),
        ];
        let (cleaned, _) = cleaner.clean(records, &mut log);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].measurement_year(), Some(2023));
        assert_eq!(cleaned[0].measurement_month(), Some(7));
        assert_eq!(cleaned[0].measurement_hour(), Some(14));
        assert!(cleaned[0].has_coordinates);
        assert!(cleaned[0].has_city);

        assert_eq!(cleaned[1].observed_at, None);
        assert!(!cleaned[1].has_coordinates);
        assert!(!cleaned[1].has_city);
    }

    #[test]
    fn test_cleaned_rows_satisfy_invariants() {
        let cleaner = MeasurementCleaner::default();
        let mut log = RunLog::new();

        let mut records = Vec::new();
        for i in 0..50 {
            let value = (i as f64) * 25.0 - 100.0;
            let lat = (i as f64) * 5.0 - 120.0;
            let country = if i % 7 == 0 { "Unknown" } else { "Chile" };
            let record = pm25("CL", country, value)
                .with_location(i % 5, lat, -70.0)
                .with_datetime("2024-01-01");
            if i % 3 == 0 {
                records.push(record.clone());
            }
            records.push(record);
        }
        let (cleaned, stats) = cleaner.clean(records, &mut log);

        assert!(stats.reconciles());
        assert!(stats.removed(RemovalCause::Duplicate) > 0);

        let keys: HashSet<(Parameter, Option<i64>, Option<String>, u64)> = cleaned
            .iter()
            .map(|m| {
                let r = &m.record;
                (r.parameter, r.location_id, r.datetime.clone(), r.value.to_bits())
            })
            .collect();
        assert_eq!(keys.len(), cleaned.len());
        let rules = MeasurementRules::default();
        let validator = RecordValidator::new(&rules);
        for m in &cleaned {
            assert!(!validator.is_unknown_country(&m.record));
            assert!(validator.coordinates_valid(&m.record));
            assert!(validator.value_valid(&m.record));
        }
    }
}
