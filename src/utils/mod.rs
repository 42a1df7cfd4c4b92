pub mod constants;
pub mod filename;
pub mod progress;
pub mod run_log;
pub mod statistics;
pub mod timestamps;

pub use constants::*;
pub use filename::{dictionary_path, generate_default_output_dir, log_file_name};
pub use progress::ProgressReporter;
pub use run_log::{format_count, percent, RunLog};
pub use timestamps::parse_timestamp;
