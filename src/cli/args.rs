use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "airquality-processor")]
#[command(about = "Clean, merge and enrich OpenAQ air-quality and World Bank indicator data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Pipeline configuration file (TOML, JSON or YAML)")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Directory for the run log [default: the output directory]"
    )]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full cleaning, merge and feature pipeline
    Process {
        #[arg(short, long, help = "Raw OpenAQ measurements (CSV or JSON)")]
        measurements: PathBuf,

        #[arg(short, long, help = "Raw World Bank indicators (CSV or JSON)")]
        indicators: PathBuf,

        #[arg(
            short,
            long,
            help = "Output directory [default: cleaned_data-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[arg(short, long, help = "Parquet compression: snappy, gzip, lz4, zstd or none")]
        compression: Option<String>,

        #[arg(
            long,
            help = "Drop analysis rows below this completeness percentage"
        )]
        min_completeness: Option<f64>,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long, default_value = "false", help = "Memory-map the input files")]
        mmap: bool,
    },

    /// Clean both inputs and report, without writing any tables
    Validate {
        #[arg(short, long)]
        measurements: PathBuf,

        #[arg(short, long)]
        indicators: PathBuf,
    },

    /// Display information about a Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process() {
        let cli = Cli::try_parse_from([
            "airquality-processor",
            "--quiet",
            "process",
            "--measurements",
            "raw/openaq.csv",
            "--indicators",
            "raw/worldbank.json",
            "--min-completeness",
            "60",
        ])
        .unwrap();

        assert!(cli.quiet);
        match cli.command {
            Commands::Process {
                measurements,
                min_completeness,
                compression,
                ..
            } => {
                assert_eq!(measurements, PathBuf::from("raw/openaq.csv"));
                assert_eq!(min_completeness, Some(60.0));
                assert_eq!(compression, None);
            }
            _ => panic!("expected process"),
        }
    }

    #[test]
    fn test_missing_inputs_rejected() {
        assert!(Cli::try_parse_from(["airquality-processor", "validate"]).is_err());
    }
}
