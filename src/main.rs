//! Korrektor - grading annotation tally
//!
//! A CLI tool that computes student points from `~(...)` annotations in
//! review files, writes the totals back and renders cohort statistics.
//!
//! Exit codes:
//!   0 - Success (individual students may still have been skipped)
//!   1 - Fatal error (arguments, blacklist, config, report output)

mod analysis;
mod batch;
mod cli;
mod config;
mod grading;
mod models;
mod report;
mod review;
mod scanner;

use analysis::ExerciseScores;
use anyhow::{Context, Result};
use batch::BatchOptions;
use cli::Args;
use config::{Config, CONFIG_FILE};
use models::{format_points, BatchReport};
use review::FsReviewStore;
use scanner::{Blacklist, StudentScanner};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config file may turn on verbose logging, so load it first
    let config = load_config(&args);
    let verbose = config.as_ref().map(|c| c.general.verbose).unwrap_or(false);
    init_logging(&args, verbose);

    info!("Korrektor v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = config.and_then(|mut config| {
        config.merge_with_args(&args);
        run(&args, &config)
    });

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .korrektor.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the blacklist, review file name and report.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = if config_verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    Ok(Config::load_default()?.unwrap_or_default())
}

/// Grade one assignment directory. Returns the exit code.
fn run(args: &Args, config: &Config) -> Result<i32> {
    let assignments_dir = args
        .assignments
        .as_deref()
        .context("Missing assignments directory")?;

    // Step 1: Setup
    println!("\n⚙️  Setup...");
    let blacklist = Blacklist::load(&config.general.blacklist)?;
    info!("Assignments directory: {}", assignments_dir.display());

    // Step 2: Find the student directories
    println!("\n🔍 Looking for assignments...");
    let scanner = StudentScanner::new(assignments_dir.to_path_buf());
    let students = scanner.eligible_directories(&blacklist)?;
    println!(
        "   Found {} student directories ({} blacklist entries)",
        students.len(),
        blacklist.len()
    );

    // Step 3: Parse, calculate and write back per student
    if args.dry_run {
        println!("\n📝 Parsing assignments and calculating total points (dry run)...");
    } else {
        println!("\n📝 Parsing assignments, calculating total points and writing them to file...");
    }

    let store = FsReviewStore::new(
        assignments_dir.to_path_buf(),
        config.general.review_file.clone(),
    );
    let options = BatchOptions {
        dry_run: args.dry_run,
        show_progress: !args.quiet && !args.dry_run && !config.general.verbose,
    };
    let report = batch::grade_students(&store, &students, options);

    if args.dry_run {
        print_totals(&report);
    }

    // Step 4: Statistics
    if config.report.enabled && !args.dry_run {
        generate_statistics(args, config, assignments_dir, &report)?;
    }

    // Summary
    let skipped = report.skipped();
    if !skipped.is_empty() {
        println!("\n⚠️  Skipped {} students:", skipped.len());
        for (student, reason) in skipped {
            println!("   - {}: {}", student, reason);
        }
    }

    println!("\n{}/{} files parsed.", report.parsed(), report.eligible());
    Ok(0)
}

/// Print the computed totals of a dry run.
fn print_totals(report: &BatchReport) {
    println!();
    for result in &report.results {
        if let (Some(scores), Some(total)) = (result.scores(), result.total()) {
            let scores: Vec<String> = scores.iter().map(|s| format_points(*s)).collect();
            println!(
                "   {}: {} points [{}]",
                result.student,
                format_points(total),
                scores.join(", ")
            );
        }
    }
}

/// Render the cohort statistics report.
fn generate_statistics(
    args: &Args,
    config: &Config,
    assignments_dir: &Path,
    report: &BatchReport,
) -> Result<()> {
    println!("\n📊 Generating statistics...");

    let scores = ExerciseScores::from_students(report.score_vectors());
    if scores.is_empty() {
        warn!("No graded students, skipping statistics");
        return Ok(());
    }

    let path = config.report_path(assignments_dir, args.output.as_deref());
    let renderer = report::renderer_for(config.report.format, config.report.histogram_bins);
    renderer.render(&scores, &path)?;

    println!(
        "   {} exercises, {} students. Report saved to: {}",
        scores.len(),
        scores.students(),
        path.display()
    );
    Ok(())
}
