pub mod indicator_reader;
pub mod measurement_reader;
pub mod raw_table;

pub use indicator_reader::{IndicatorReader, REQUIRED_INDICATOR_COLUMNS};
pub use measurement_reader::{MeasurementReader, REQUIRED_MEASUREMENT_COLUMNS};
pub use raw_table::{InputFormat, RawTable, RawTableReader};
