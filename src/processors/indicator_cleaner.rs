use crate::config::IndicatorRules;
use crate::models::{categorize, Indicator, IndicatorTable};
use crate::processors::stats::{CleaningStats, RemovalCause};
use crate::utils::constants::DATASET_WORLDBANK;
use crate::utils::{format_count, RunLog};

/// Drops aggregate codes and empty rows from the indicator table, then bins
/// GDP and urbanisation into ordered categories.
pub struct IndicatorCleaner {
    rules: IndicatorRules,
}

impl IndicatorCleaner {
    pub fn new(rules: IndicatorRules) -> Self {
        Self { rules }
    }

    pub fn clean(&self, table: IndicatorTable, log: &mut RunLog) -> (IndicatorTable, CleaningStats) {
        let IndicatorTable {
            columns,
            mut records,
        } = table;

        log.section("CLEANING WORLD BANK DATA");
        let initial = records.len();
        log.log(format!("Initial records: {}", format_count(initial)));
        log.blank();

        let mut stats = CleaningStats::new(DATASET_WORLDBANK, initial, &RemovalCause::INDICATOR);

        log.log("STEP 1: Removing regional aggregates...");
        let before = records.len();
        records.retain(|r| !self.rules.is_excluded(&r.country_code));
        let removed = before - records.len();
        stats.record(RemovalCause::RegionalAggregate, removed);
        log.log(format!("   Removed {} regional aggregate records", format_count(removed)));
        Self::log_remaining(log, records.len());

        log.log("STEP 2: Removing records with all null indicators...");
        let before = records.len();
        records.retain(|r| r.has_any_indicator());
        let removed = before - records.len();
        stats.record(RemovalCause::AllNullIndicators, removed);
        log.log(format!("   Removed {} records with all null indicators", format_count(removed)));
        Self::log_remaining(log, records.len());

        log.log("STEP 3: Creating derived columns...");
        let bin_income = columns.contains(&Indicator::GdpPerCapita);
        let bin_urban = columns.contains(&Indicator::UrbanPopulationPct);
        for record in &mut records {
            if bin_income {
                record.income_category = categorize(&self.rules.income_edges, record.gdp_per_capita);
            }
            if bin_urban {
                record.urbanization_level =
                    categorize(&self.rules.urbanization_edges, record.urban_population_pct);
            }
        }
        if bin_income {
            log.log("   Added income_category column");
        }
        if bin_urban {
            log.log("   Added urbanization_level column");
        }
        log.blank();

        debug_assert!(stats.reconciles());
        stats.log_summary(log);

        (IndicatorTable { columns, records }, stats)
    }

    fn log_remaining(log: &mut RunLog, remaining: usize) {
        log.log(format!("   Remaining: {} records", format_count(remaining)));
        log.blank();
    }
}

impl Default for IndicatorCleaner {
    fn default() -> Self {
        Self::new(IndicatorRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncomeCategory, IndicatorRecord, UrbanizationLevel};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aggregates_removed_and_bins_assigned() {
        let cleaner = IndicatorCleaner::default();
        let mut log = RunLog::new();

        let table = IndicatorTable::new(vec![
            IndicatorRecord::new("WLD", "World", 2020)
                .with_value(Indicator::GdpPerCapita, 11000.0)
                .with_value(Indicator::UrbanPopulationPct, 56.0),
            IndicatorRecord::new("USA", "United States", 2020)
                .with_value(Indicator::GdpPerCapita, 50000.0)
                .with_value(Indicator::UrbanPopulationPct, 83.0),
        ]);
        let (cleaned, stats) = cleaner.clean(table, &mut log);

        assert_eq!(cleaned.len(), 1);
        let usa = &cleaned.records[0];
        assert_eq!(usa.country_code, "USA");
        assert_eq!(usa.pm25_exposure, None);
        assert_eq!(usa.income_category, Some(IncomeCategory::HighIncome));
        assert_eq!(usa.income_category.map(|c| c.to_string()).as_deref(), Some("High Income"));
        assert_eq!(usa.urbanization_level, Some(UrbanizationLevel::ExtremelyUrbanized));
        assert_eq!(stats.removed(RemovalCause::RegionalAggregate), 1);
        assert!(stats.reconciles());
    }

    #[test]
    fn test_all_null_rows_removed() {
        let cleaner = IndicatorCleaner::default();
        let mut log = RunLog::new();

        let table = IndicatorTable::new(vec![
            IndicatorRecord::new("FRA", "France", 2019),
            IndicatorRecord::new("FRA", "France", 2020).with_value(Indicator::Pm25Exposure, 11.0),
        ]);
        let (cleaned, stats) = cleaner.clean(table, &mut log);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.records[0].year, Some(2020));
        assert_eq!(cleaned.records[0].income_category, None);
        assert_eq!(stats.removed(RemovalCause::AllNullIndicators), 1);
    }

    #[test]
    fn test_boundary_values_fall_in_lower_bin() {
        let cleaner = IndicatorCleaner::default();
        let mut log = RunLog::new();

        let table = IndicatorTable::new(vec![
            IndicatorRecord::new("AAA", "A", 2020)
                .with_value(Indicator::GdpPerCapita, 1085.0)
                .with_value(Indicator::UrbanPopulationPct, 40.0),
            IndicatorRecord::new("BBB", "B", 2020)
                .with_value(Indicator::GdpPerCapita, -1.0)
                .with_value(Indicator::UrbanPopulationPct, 100.5),
        ]);
        let (cleaned, _) = cleaner.clean(table, &mut log);

        assert_eq!(cleaned.records[0].income_category, Some(IncomeCategory::LowIncome));
        assert_eq!(cleaned.records[0].urbanization_level, Some(UrbanizationLevel::Rural));
        assert_eq!(cleaned.records[1].income_category, None);
        assert_eq!(cleaned.records[1].urbanization_level, None);
    }

    #[test]
    fn test_missing_column_not_binned() {
        let cleaner = IndicatorCleaner::default();
        let mut log = RunLog::new();

        let mut table = IndicatorTable::new(vec![IndicatorRecord::new("JPN", "Japan", 2020)
            .with_value(Indicator::UrbanPopulationPct, 92.0)]);
        table.columns.remove(&Indicator::GdpPerCapita);

        let (cleaned, _) = cleaner.clean(table, &mut log);
        assert!(!cleaned.has_column(Indicator::GdpPerCapita));
        assert_eq!(cleaned.records[0].income_category, None);
        assert_eq!(cleaned.records[0].urbanization_level, Some(UrbanizationLevel::ExtremelyUrbanized));
    }
}
