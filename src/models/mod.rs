pub mod aggregate;
pub mod analysis;
pub mod categories;
pub mod indicator;
pub mod measurement;
pub mod merged;
pub mod parameter;
pub mod table;

pub use aggregate::{
    pollution_columns, AggregateTable, CountryAggregate, LongFormValue, Metric, PollutionValues,
};
pub use analysis::{AnalysisRecord, AnalysisTable, DerivedFeatures, Feature};
pub use categories::{
    bin_index, categorize, AqiCategory, IncomeCategory, Ordinal, UrbanizationLevel,
};
pub use indicator::{Indicator, IndicatorRecord, IndicatorTable};
pub use measurement::{CleanMeasurement, MeasurementRecord};
pub use merged::{MergedRecord, MergedTable, Provenance};
pub use parameter::Parameter;
pub use table::{Cell, Column, ColumnKind, Table, Tabular};
