use std::collections::HashSet;
use std::hash::Hash;

use crate::models::{MeasurementRecord, Parameter};

/// Identity of a measurement for duplicate detection.
///
/// The timestamp is compared as delivered, before tolerant parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeasurementKey {
    parameter: Parameter,
    location_id: Option<i64>,
    datetime: Option<String>,
    value_bits: u64,
}

impl MeasurementKey {
    pub fn of(record: &MeasurementRecord) -> Self {
        Self {
            parameter: record.parameter,
            location_id: record.location_id,
            datetime: record.datetime.clone(),
            value_bits: canonical_bits(record.value),
        }
    }
}

/// -0.0 equals 0.0 and every NaN equals every other NaN
fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Keep the first row for each key, in input order; returns the removed count
pub fn retain_first_by_key<T, K, F>(items: &mut Vec<T>, key: F) -> usize
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    items.retain(|item| seen.insert(key(item)));
    before - items.len()
}

pub fn deduplicate_measurements(records: &mut Vec<MeasurementRecord>) -> usize {
    retain_first_by_key(records, MeasurementKey::of)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(location: i64, datetime: &str, value: f64) -> MeasurementRecord {
        MeasurementRecord::new(Parameter::Pm25, value, "US", "United States")
            .with_location(location, 40.0, -74.0)
            .with_datetime(datetime)
    }

    #[test]
    fn test_first_occurrence_kept() {
        let mut first = reading(1, "2024-01-01T00:00:00Z", 10.0);
        first.city = Some("First".to_string());
        let mut second = reading(1, "2024-01-01T00:00:00Z", 10.0);
        second.city = Some("Second".to_string());

        let mut records = vec![first, reading(2, "2024-01-01T00:00:00Z", 10.0), second];
        let removed = deduplicate_measurements(&mut records);

        assert_eq!(removed, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].city.as_deref(), Some("First"));
    }

    #[test]
    fn test_key_fields_distinguish_rows() {
        let mut records = vec![
            reading(1, "2024-01-01T00:00:00Z", 10.0),
            reading(1, "2024-01-01T01:00:00Z", 10.0),
            reading(1, "2024-01-01T00:00:00Z", 11.0),
        ];
        let mut no2 = reading(1, "2024-01-01T00:00:00Z", 10.0);
        no2.parameter = Parameter::No2;
        records.push(no2);

        assert_eq!(deduplicate_measurements(&mut records), 0);
    }

    #[test]
    fn test_signed_zero_is_one_value() {
        let mut records = vec![reading(1, "t", 0.0), reading(1, "t", -0.0)];
        assert_eq!(deduplicate_measurements(&mut records), 1);
    }

    #[test]
    fn test_generic_retain_first() {
        let mut words = vec!["a", "b", "a", "c", "b"];
        assert_eq!(retain_first_by_key(&mut words, |w| *w), 2);
        assert_eq!(words, vec!["a", "b", "c"]);
    }
}
