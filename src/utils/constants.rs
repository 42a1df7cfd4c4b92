/// Sentinel the fetch layer writes when a country or city is not known
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// Geographic coordinate bounds
pub const LAT_MIN: f64 = -90.0;
pub const LAT_MAX: f64 = 90.0;
pub const LON_MIN: f64 = -180.0;
pub const LON_MAX: f64 = 180.0;

/// World Bank regional/aggregate codes (not actual countries)
pub const EXCLUDED_WB_CODES: [&str; 46] = [
    "ARB", "CSS", "CEB", "EAR", "EAS", "EAP", "TEA", "EMU", "ECS", "ECA", "TEC", "EUU", "FCS",
    "HPC", "HIC", "IBD", "IBT", "IDB", "IDX", "IDA", "LTE", "LCN", "LAC", "TLA", "LDC", "LMY",
    "LIC", "LMC", "MEA", "MNA", "TMN", "MIC", "NAC", "OED", "OSS", "PSS", "PST", "PRE", "SST",
    "SAS", "TSA", "SSF", "SSA", "TSS", "UMC", "WLD",
];

/// Income categories (World Bank classification, USD)
pub const INCOME_EDGES: [f64; 5] = [0.0, 1085.0, 4255.0, 13205.0, f64::INFINITY];

/// Urbanization levels (percentage of population)
pub const URBANIZATION_EDGES: [f64; 5] = [0.0, 40.0, 60.0, 80.0, 100.0];

/// EPA AQI breakpoints for PM2.5 (µg/m³)
pub const AQI_PM25_EDGES: [f64; 7] = [0.0, 12.0, 35.4, 55.4, 150.4, 250.4, f64::INFINITY];

/// Completeness filter default (percent)
pub const DEFAULT_MIN_COMPLETENESS: f64 = 80.0;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DICTIONARY_SAMPLE_VALUES: usize = 5;

/// Log line timestamp format
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LOG_FILE_PREFIX: &str = "preprocessing_log";

/// Output file names
pub const OPENAQ_CLEANED_CSV: &str = "openaq_cleaned.csv";
pub const WORLDBANK_CLEANED_CSV: &str = "worldbank_cleaned.csv";
pub const ANALYSIS_READY_CSV: &str = "analysis_ready.csv";
pub const MERGED_COMPLETE_CSV: &str = "merged_complete.csv";
pub const OPENAQ_DB_PARQUET: &str = "openaq_db_ready.parquet";
pub const WORLDBANK_DB_PARQUET: &str = "worldbank_db_ready.parquet";
pub const ANALYSIS_READY_PARQUET: &str = "analysis_ready.parquet";

/// Dataset names used for dictionaries and logs
pub const DATASET_OPENAQ: &str = "openaq";
pub const DATASET_WORLDBANK: &str = "worldbank";
pub const DATASET_ANALYSIS: &str = "analysis_ready";
pub const DATASET_MERGED: &str = "merged_complete";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
