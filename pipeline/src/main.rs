//! entsoe-pipeline CLI - Validate and batch ENTSO-E load data
//!
//! # Commands
//!
//! ```bash
//! entsoe-pipeline process data/entsoe_load.csv      # Validate, batch and process
//! entsoe-pipeline process a.csv b.csv               # Several files concurrently
//! entsoe-pipeline explore data/entsoe_load.csv      # Overview + JSON export
//! entsoe-pipeline validate data/entsoe_load.csv     # Report rejected rows only
//! entsoe-pipeline stats data/validated_load_data.json
//! ```

use clap::{Parser, Subcommand};
use entsoe_pipeline::config::{self, DEFAULT_EXPORT_FILE};
use entsoe_pipeline::logging;
use entsoe_pipeline::pipeline::format_delimiter;
use entsoe_pipeline::{
    read_batch_json, write_batch_json, write_records_csv, Batch, LoadOptions, Logger, Pipeline,
    PipelineConfig, Rejection, RunOptions, RunReport,
};
use std::error::Error;
use std::path::{Path, PathBuf};

type CmdResult = Result<(), Box<dyn Error>>;

/// Records shown in the explore preview.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "entsoe-pipeline")]
#[command(about = "Validate, batch and summarize ENTSO-E electricity load data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory for pipeline.log
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log to stderr only
    #[arg(long, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate CSV files into batches and process them
    Process {
        /// Input CSV files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Batch id (single file only; generated if not specified)
        #[arg(long)]
        batch_id: Option<String>,

        /// Write the processed batch as JSON (single file only)
        #[arg(long)]
        export: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Show an overview of a load file and export the validated batch
    Explore {
        /// Input CSV file
        input: PathBuf,

        /// Export path (default: <export dir>/validated_load_data.json)
        #[arg(long)]
        export: Option<PathBuf>,

        /// Also write the validated records as CSV
        #[arg(long)]
        export_csv: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Validate every row of a CSV file without batching
    Validate {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Show statistics of an exported batch
    Stats {
        /// Batch JSON file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CmdResult {
    let mut config = PipelineConfig::from_env()?;
    if let Some(level) = &cli.log_level {
        config.log.level = config::parse_level(level)?;
    }
    if let Some(dir) = cli.log_dir {
        config.log.dir = dir;
    }
    if cli.no_log_file {
        config.log.to_file = false;
    }

    logging::init(&config.log)?;
    let pipeline = Pipeline::system(Logger::new());

    match cli.command {
        Commands::Process {
            files,
            batch_id,
            export,
            delimiter,
        } => cmd_process(&pipeline, &config, files, batch_id, export, delimiter).await,

        Commands::Explore {
            input,
            export,
            export_csv,
            delimiter,
        } => cmd_explore(&pipeline, &config, &input, export, export_csv, delimiter),

        Commands::Validate { input, delimiter } => cmd_validate(&pipeline, &config, &input, delimiter),

        Commands::Stats { input } => cmd_stats(&pipeline, &input),
    }
}

async fn cmd_process(
    pipeline: &Pipeline,
    config: &PipelineConfig,
    files: Vec<PathBuf>,
    batch_id: Option<String>,
    export: Option<PathBuf>,
    delimiter: Option<char>,
) -> CmdResult {
    if files.len() == 1 {
        let options = RunOptions {
            load: LoadOptions { batch_id, delimiter },
            export,
        };
        let report = pipeline.run(&files[0], &options)?;
        print_run_report(&files[0], &report, config.max_reported_errors);
        return Ok(());
    }

    if batch_id.is_some() || export.is_some() {
        return Err("--batch-id and --export require a single input file".into());
    }

    eprintln!("📄 Processing {} files", files.len());
    let results = pipeline.run_many(files, delimiter).await;

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(report) => print_run_report(path, report, config.max_reported_errors),
            Err(e) => {
                failed += 1;
                eprintln!("❌ {}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, results.len()).into());
    }
    eprintln!("✅ All {} files processed", results.len());
    Ok(())
}

fn cmd_explore(
    pipeline: &Pipeline,
    config: &PipelineConfig,
    input: &Path,
    export: Option<PathBuf>,
    export_csv: Option<PathBuf>,
    delimiter: Option<char>,
) -> CmdResult {
    eprintln!("📄 Exploring: {}", input.display());

    let options = LoadOptions {
        batch_id: None,
        delimiter,
    };
    let outcome = pipeline.load_file(input, &options)?;
    let batch = &outcome.batch;

    println!("=== Dataset Overview ===");
    println!("Rows read: {}", outcome.csv_info.row_count);
    println!("Valid records: {}", batch.len());
    println!("Columns: {}", outcome.csv_info.headers.join(", "));
    println!(
        "Regions: {}",
        batch.regions().into_iter().collect::<Vec<_>>().join(", ")
    );

    println!();
    println!("Empty cells per column:");
    for (column, count) in &outcome.csv_info.empty_cells {
        println!("  {:<16} {}", column, count);
    }

    println!();
    println!("First records:");
    for record in batch.records().iter().take(PREVIEW_ROWS) {
        println!(
            "  {}  {:>12.2} MW  {}",
            record.timestamp().format("%Y-%m-%d %H:%M:%S"),
            record.load_mw(),
            record.region()
        );
    }

    if let Some((start, end)) = batch.time_range() {
        println!();
        println!("Time range: {} to {}", start, end);
    }

    print_statistics(batch);
    print_rejections(&outcome.rejections, config.max_reported_errors);

    let path = export.unwrap_or_else(|| config.export_dir.join(DEFAULT_EXPORT_FILE));
    write_batch_json(batch, &path)?;
    eprintln!("✅ Validated data saved to {}", path.display());

    if let Some(csv_path) = export_csv {
        write_records_csv(batch, &csv_path)?;
        eprintln!("✅ Records written to {}", csv_path.display());
    }

    Ok(())
}

fn cmd_validate(
    pipeline: &Pipeline,
    config: &PipelineConfig,
    input: &Path,
    delimiter: Option<char>,
) -> CmdResult {
    eprintln!("🔍 Validating: {}", input.display());

    let summary = pipeline.validate_file(input, delimiter)?;
    eprintln!("   Encoding: {}", summary.csv_info.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(summary.csv_info.delimiter));

    print_rejections(&summary.rejections, config.max_reported_errors);

    if summary.rejections.is_empty() {
        eprintln!("✅ All {} records are valid", summary.valid);
        Ok(())
    } else {
        Err(format!(
            "{} invalid, {} valid out of {} records",
            summary.rejections.len(),
            summary.valid,
            summary.csv_info.row_count
        )
        .into())
    }
}

fn cmd_stats(pipeline: &Pipeline, input: &Path) -> CmdResult {
    let batch = read_batch_json(input, pipeline.validator())?;

    println!("Batch: {}", batch.batch_id());
    println!("State: {:?}", batch.state());
    if let Some(at) = batch.processed_at() {
        println!("Processed at: {}", at);
    }
    if let Some((start, end)) = batch.time_range() {
        println!("Time range: {} to {}", start, end);
    }
    print_statistics(&batch);

    Ok(())
}

// =============================================================================
// Output helpers
// =============================================================================

fn print_run_report(path: &Path, report: &RunReport, max_errors: usize) {
    eprintln!("📄 {}", path.display());
    eprintln!("   Encoding: {}", report.csv_info.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.csv_info.delimiter));
    print_rejections(&report.rejections, max_errors);

    println!("Batch {}: {}", report.processing.batch_id, report.processing.statistics);
    if let Some(path) = &report.export_path {
        eprintln!("   Exported to {}", path.display());
    }
}

fn print_statistics(batch: &Batch) {
    let stats = batch.statistics();
    println!();
    println!("=== Batch Statistics ===");
    println!("Count: {}", stats.count);
    println!("Average load: {:.2} MW", stats.avg_load);
    println!("Minimum load: {:.2} MW", stats.min_load);
    println!("Maximum load: {:.2} MW", stats.max_load);
}

fn print_rejections(rejections: &[Rejection], max: usize) {
    if rejections.is_empty() {
        return;
    }

    eprintln!("⚠️  {} rows rejected:", rejections.len());
    for rejection in rejections.iter().take(max) {
        eprintln!("   {}", rejection);
    }
    if rejections.len() > max {
        eprintln!("   ... and {} more", rejections.len() - max);
    }
}
