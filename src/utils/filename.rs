use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

/// Default output directory: cleaned_data-{YYMMDD}
pub fn generate_default_output_dir() -> PathBuf {
    let now = Local::now();
    PathBuf::from(format!("cleaned_data-{}", now.format("%y%m%d")))
}

/// Log file name with format: {prefix}_{YYYYmmdd_HHMMSS}.log
pub fn log_file_name<Tz: TimeZone>(prefix: &str, at: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.log", prefix, at.format("%Y%m%d_%H%M%S"))
}

/// Data dictionary path for a dataset: {dir}/{dataset}_data_dictionary.json
pub fn dictionary_path(dir: &Path, dataset: &str) -> PathBuf {
    dir.join(format!("{}_data_dictionary.json", dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_generate_default_output_dir() {
        let dir = generate_default_output_dir();
        let name = dir.to_string_lossy();

        assert!(name.starts_with("cleaned_data-"));
        assert_eq!(name.len(), "cleaned_data-".len() + 6);
    }

    #[test]
    fn test_log_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            log_file_name("preprocessing_log", at),
            "preprocessing_log_20240309_070501.log"
        );
    }

    #[test]
    fn test_dictionary_path() {
        let path = dictionary_path(Path::new("out"), "openaq");
        assert_eq!(path, Path::new("out").join("openaq_data_dictionary.json"));
    }
}
