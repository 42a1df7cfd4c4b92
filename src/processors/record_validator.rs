use crate::config::{MeasurementRules, ParameterThreshold};
use crate::models::{MeasurementRecord, Parameter};

/// Validity predicates for raw measurement rows.
///
/// Each predicate is independent; callers decide what to do with a failure.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator<'a> {
    rules: &'a MeasurementRules,
}

impl<'a> RecordValidator<'a> {
    pub fn new(rules: &'a MeasurementRules) -> Self {
        Self { rules }
    }

    /// Absent coordinates are valid; present ones must be within bounds
    pub fn coordinates_valid(&self, record: &MeasurementRecord) -> bool {
        let within = |value: Option<f64>, min: f64, max: f64| match value {
            Some(v) if !v.is_nan() => (min..=max).contains(&v),
            _ => true,
        };

        within(record.latitude, self.rules.lat_min, self.rules.lat_max)
            && within(record.longitude, self.rules.lon_min, self.rules.lon_max)
    }

    /// Parameters without a configured range are never rejected here
    pub fn value_valid(&self, record: &MeasurementRecord) -> bool {
        self.threshold(record.parameter)
            .map_or(true, |t| t.contains(record.value))
    }

    pub fn threshold(&self, parameter: Parameter) -> Option<&'a ParameterThreshold> {
        self.rules.threshold(parameter)
    }

    pub fn is_unknown_country(&self, record: &MeasurementRecord) -> bool {
        record.country == self.rules.unknown_sentinel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(parameter: Parameter, value: f64) -> MeasurementRecord {
        MeasurementRecord::new(parameter, value, "IN", "India")
    }

    #[test]
    fn test_coordinate_bounds() {
        let rules = MeasurementRules::default();
        let validator = RecordValidator::new(&rules);

        assert!(validator.coordinates_valid(&record(Parameter::Pm25, 1.0)));
        assert!(validator.coordinates_valid(&record(Parameter::Pm25, 1.0).with_location(1, 90.0, -180.0)));
        assert!(!validator.coordinates_valid(&record(Parameter::Pm25, 1.0).with_location(1, 91.0, 0.0)));
        assert!(!validator.coordinates_valid(&record(Parameter::Pm25, 1.0).with_location(1, 0.0, 180.5)));

        let mut lat_only = record(Parameter::Pm25, 1.0);
        lat_only.latitude = Some(45.0);
        assert!(validator.coordinates_valid(&lat_only));
    }

    #[test]
    fn test_value_ranges_per_parameter() {
        let rules = MeasurementRules::default();
        let validator = RecordValidator::new(&rules);

        assert!(validator.value_valid(&record(Parameter::Pm25, 500.0)));
        assert!(!validator.value_valid(&record(Parameter::Pm25, 999.0)));
        assert!(!validator.value_valid(&record(Parameter::O3, 0.6)));
        assert!(validator.value_valid(&record(Parameter::Pm10, 999.0)));
        assert!(!validator.value_valid(&record(Parameter::Co, -1.0)));
        assert!(!validator.value_valid(&record(Parameter::No2, f64::NAN)));
    }

    #[test]
    fn test_unconfigured_parameter_never_rejected() {
        let mut rules = MeasurementRules::default();
        rules.thresholds.retain(|t| t.parameter != Parameter::Co);
        let validator = RecordValidator::new(&rules);

        assert!(validator.value_valid(&record(Parameter::Co, 10_000.0)));
        assert!(validator.threshold(Parameter::Co).is_none());
    }

    #[test]
    fn test_unknown_country() {
        let rules = MeasurementRules::default();
        let validator = RecordValidator::new(&rules);

        assert!(validator.is_unknown_country(&MeasurementRecord::new(Parameter::Pm25, 1.0, "XX", "Unknown")));
        assert!(!validator.is_unknown_country(&record(Parameter::Pm25, 1.0)));
    }
}
