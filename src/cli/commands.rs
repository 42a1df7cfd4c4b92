use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::analyzers::FeatureAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{IndicatorTable, MeasurementRecord, Tabular};
use crate::processors::Pipeline;
use crate::readers::{IndicatorReader, MeasurementReader};
use crate::utils::constants::{DATASET_ANALYSIS, LOG_FILE_PREFIX};
use crate::utils::progress::ProgressReporter;
use crate::utils::{generate_default_output_dir, RunLog};
use crate::writers::{OutputWriter, ParquetWriter};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Process {
            measurements,
            indicators,
            output_dir,
            compression,
            min_completeness,
            validate_only,
            mmap,
        } => {
            let mut config = PipelineConfig::load(cli.config.as_deref())?;
            if let Some(compression) = compression {
                config.output.compression = compression;
            }
            if let Some(threshold) = min_completeness {
                config.features.min_completeness = threshold;
            }
            config.check()?;

            let output_dir = output_dir.unwrap_or_else(generate_default_output_dir);
            let log_dir = cli.log_dir.unwrap_or_else(|| output_dir.clone());

            let mut log = RunLog::new();
            let request = ProcessRequest {
                measurements,
                indicators,
                output_dir,
                filter_completeness: min_completeness.is_some(),
                validate_only,
                mmap,
            };
            let result = process(config, request, cli.quiet, &mut log).await;
            save_log(&log, &log_dir);
            result?;
        }

        Commands::Validate {
            measurements,
            indicators,
        } => {
            let config = PipelineConfig::load(cli.config.as_deref())?;
            let log_dir = cli.log_dir.unwrap_or_else(|| PathBuf::from("."));

            let mut log = RunLog::new();
            let result = validate(config, measurements, indicators, cli.quiet, &mut log).await;
            save_log(&log, &log_dir);
            result?;
        }

        Commands::Info { file } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            println!("\n{}", file_info.summary());

            let analyzer = FeatureAnalyzer::new();
            let names: Vec<&str> = file_info.columns.iter().map(|(n, _)| n.as_str()).collect();
            println!("\nKey Analysis Columns:");
            for (group, columns) in analyzer.key_analysis_columns(&names) {
                if !columns.is_empty() {
                    println!("  {}: {}", group, columns.join(", "));
                }
            }

            let summaries = analyzer.summarize_parquet(&file)?;
            if !summaries.is_empty() {
                println!("\n{}", FeatureAnalyzer::summary(&summaries));
            }
        }
    }

    Ok(())
}

struct ProcessRequest {
    measurements: PathBuf,
    indicators: PathBuf,
    output_dir: PathBuf,
    filter_completeness: bool,
    validate_only: bool,
    mmap: bool,
}

async fn process(
    config: PipelineConfig,
    request: ProcessRequest,
    quiet: bool,
    log: &mut RunLog,
) -> Result<()> {
    println!("Processing air-quality data...");
    println!("Measurements: {}", request.measurements.display());
    println!("Indicators: {}", request.indicators.display());
    println!("Output directory: {}", request.output_dir.display());

    let writer = OutputWriter::new(&request.output_dir).with_settings(&config.output)?;
    let progress = ProgressReporter::new(3, "Loading inputs...", quiet);
    let (measurements, indicators) =
        match load_inputs(request.measurements, request.indicators, request.mmap).await {
            Ok(inputs) => inputs,
            Err(e) => {
                progress.abandon("Failed to load inputs");
                log.log(format!("ERROR: {}", e));
                return Err(e);
            }
        };

    progress.stage("Running pipeline...");
    let pipeline = Pipeline::new(config).with_completeness_filter(request.filter_completeness);
    let output = pipeline.run(measurements, indicators, log);
    progress.stage("Writing outputs...");

    println!("\n{}", output.measurement_stats.summary());
    println!("{}", output.indicator_stats.summary());
    println!("{}", output.merge_stats.summary());

    let analyzer = FeatureAnalyzer::new();
    let summaries = analyzer.summarize_table(&output.analysis.to_table(DATASET_ANALYSIS));
    println!("{}", FeatureAnalyzer::summary(&summaries));

    if request.validate_only {
        progress.finish_with_message("Validation complete");
        println!("Validation complete - no output files written");
        return Ok(());
    }

    match writer.write_all(&output, log) {
        Ok(files) => {
            progress.finish_with_message(&format!(
                "Processed {} measurements into {} analysis rows",
                output.measurements.len(),
                output.analysis.len()
            ));
            println!("Wrote {} files to {}", files.len(), writer.output_dir().display());
            println!("Processing complete!");
            Ok(())
        }
        Err(e) => {
            progress.abandon("Failed to write outputs");
            log.log(format!("ERROR: {}", e));
            Err(e)
        }
    }
}

async fn validate(
    config: PipelineConfig,
    measurements: PathBuf,
    indicators: PathBuf,
    quiet: bool,
    log: &mut RunLog,
) -> Result<()> {
    println!("Validating air-quality data...");

    let progress = ProgressReporter::new_spinner("Loading inputs...", quiet);
    let (measurements, indicators) = match load_inputs(measurements, indicators, false).await {
        Ok(inputs) => inputs,
        Err(e) => {
            progress.abandon("Failed to load inputs");
            log.log(format!("ERROR: {}", e));
            return Err(e);
        }
    };

    progress.set_message("Cleaning...");
    let cleaned = Pipeline::new(config).clean(measurements, indicators, log);
    progress.finish_with_message("Validation complete");

    println!("\n{}", cleaned.measurement_stats.summary());
    println!("{}", cleaned.indicator_stats.summary());

    let removed = cleaned.measurement_stats.total_removed() + cleaned.indicator_stats.total_removed();
    if removed == 0 {
        println!("✅ All records passed validation checks");
    } else {
        println!("⚠️  Removed {} records during cleaning", removed);
    }
    Ok(())
}

/// Read both raw inputs concurrently on blocking tasks
async fn load_inputs(
    measurements: PathBuf,
    indicators: PathBuf,
    mmap: bool,
) -> Result<(Vec<MeasurementRecord>, IndicatorTable)> {
    let measurement_task =
        tokio::task::spawn_blocking(move || MeasurementReader::with_mmap(mmap).read(&measurements));
    let indicator_task =
        tokio::task::spawn_blocking(move || IndicatorReader::new().read(&indicators));

    let (measurements, indicators) = tokio::try_join!(measurement_task, indicator_task)?;
    Ok((measurements?, indicators?))
}

fn save_log(log: &RunLog, dir: &Path) {
    match log.save(dir, LOG_FILE_PREFIX) {
        Ok(path) => println!("Log saved to: {}", path.display()),
        Err(e) => warn!("Could not save run log to {}: {}", dir.display(), e),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let initialised = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();
    if !initialised {
        debug!("Tracing subscriber already installed");
    }
}
