//! fixity - detect silent file corruption.
//!
//! Usage:
//!   fixity [MODE] [DIRECTORY]     Verify a directory (prompts for missing arguments)
//!   fixity --history DIRECTORY    Show recorded runs
//!   fixity --help                 Show help

mod logging;
mod progress;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, ensure};
use itertools::Itertools;
use strum::IntoEnumIterator;

use fixity_core::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS, OpStatus, RunSummary, ScanMode, VerifyConfig,
};
use fixity_verify::{NoProgress, RunJournal, Verifier};

use crate::progress::IndicatifProgress;

#[derive(Parser)]
#[command(
    name = "fixity",
    version,
    about = "Detect silent file corruption",
    long_about = "fixity records a content fingerprint and modification time for every \
                  file under a directory. A later run that finds different content \
                  under an unchanged modification time reports the file as corrupted.\n\n\
                  Modes:\n  \
                  1  full scan and verify\n  \
                  2  incremental: only fingerprint files not tracked yet\n  \
                  3  verify a random 1/20 sample\n  \
                  4  verify a random 1/10 sample\n  \
                  5  verify a random 1/2 sample"
)]
struct Cli {
    /// Scan mode code (1-5); prompted for when omitted
    mode: Option<String>,

    /// Directory to verify; prompted for when omitted
    directory: Option<PathBuf>,

    /// Number of hashing threads (0 = one per CPU)
    #[arg(short = 'j', long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Capacity of the task and result queues
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Follow symbolic links while walking
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Skip files matching a glob (repeatable)
    #[arg(short, long = "ignore", value_name = "GLOB")]
    ignore: Vec<String>,

    /// Seed for sampled modes, for reproducible samples
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Show recorded runs for a directory instead of verifying
    #[arg(long, value_name = "DIRECTORY", conflicts_with_all = ["mode", "directory"])]
    history: Option<PathBuf>,

    /// Number of runs shown with --history
    #[arg(short = 'n', long, default_value = "10", requires = "history")]
    last: usize,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Some(directory) = &cli.history {
        return show_history(directory, cli.last, cli.format);
    }

    let mode = match &cli.mode {
        Some(code) => code.parse::<ScanMode>().wrap_err("Invalid scan mode")?,
        None => prompt_mode()?,
    };
    let directory = match &cli.directory {
        Some(directory) => directory.clone(),
        None => prompt_directory()?,
    };
    ensure!(
        directory.is_dir(),
        "{} is not an existing directory",
        directory.display()
    );

    let config = VerifyConfig::builder()
        .root(directory)
        .mode(mode)
        .workers(cli.workers)
        .task_queue_capacity(cli.queue_capacity)
        .result_queue_capacity(cli.queue_capacity)
        .follow_symlinks(cli.follow_symlinks)
        .ignore_patterns(cli.ignore.clone())
        .sample_seed(cli.seed)
        .build()
        .wrap_err("Invalid configuration")?;

    let verifier = Verifier::new(config).wrap_err("Failed to prepare verification")?;
    eprintln!(
        "Verifying {} ({} mode)...",
        verifier.config().root.display(),
        mode
    );

    let summary = if cli.no_progress {
        verifier.run(&NoProgress)
    } else {
        let progress = IndicatifProgress::new();
        let watcher = progress.watch_scan(verifier.subscribe_scan());
        let summary = verifier.run(&progress);
        // The scanner is gone once the run returns, which ends the watcher.
        if watcher.join().is_err() {
            tracing::debug!("progress thread panicked");
        }
        summary
    }
    .wrap_err("Verification failed")?;

    match cli.format {
        OutputFormat::Text => print_summary(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

/// Ask for a mode code on stdin.
fn prompt_mode() -> Result<ScanMode> {
    eprintln!("Select scan mode:");
    for (code, label) in ScanMode::menu() {
        eprintln!("  {code}) {label}");
    }
    let answer = prompt("Mode [1-5]: ")?;
    answer.parse::<ScanMode>().wrap_err("Invalid scan mode")
}

/// Ask for the directory to verify on stdin.
fn prompt_directory() -> Result<PathBuf> {
    let answer = prompt("Directory to verify: ")?;
    ensure!(!answer.is_empty(), "No directory given");
    Ok(PathBuf::from(answer))
}

fn prompt(question: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{question}")?;
    stderr.flush()?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .wrap_err("Failed to read from stdin")?;
    ensure!(read > 0, "No input on stdin");
    Ok(line.trim().to_string())
}

/// Print a run summary for humans.
fn print_summary(summary: &RunSummary) {
    let counts = &summary.counts;

    println!();
    println!("{}", "─".repeat(60));
    println!(" {} ({})", summary.root.display(), summary.mode);
    println!("{}", "─".repeat(60));
    for status in OpStatus::iter() {
        println!(" {:<11} {:>8}", format!("{status}:"), counts.get(status));
    }
    println!();
    println!(
        " Processed {} of {} files, {} hashed in {:.2}s",
        summary.total_processed,
        summary.eligible,
        format_size(summary.bytes_hashed),
        summary.elapsed_secs
    );

    if summary.has_corruption() {
        println!();
        println!(" Corrupted files:");
        println!(
            "{}",
            summary
                .corrupted_paths
                .iter()
                .map(|p| format!("   {p}"))
                .join("\n")
        );
    }

    if !summary.failed_paths.is_empty() {
        println!();
        println!(" Failed files:");
        println!(
            "{}",
            summary
                .failed_paths
                .iter()
                .map(|p| format!("   {p}"))
                .join("\n")
        );
    }

    if !summary.scan_warnings.is_empty() {
        println!();
        println!("{} warning(s) during scan", summary.scan_warnings.len());
    }
}

/// Print the most recent recorded runs for a directory.
fn show_history(directory: &Path, last: usize, format: OutputFormat) -> Result<()> {
    let config = VerifyConfig::new(directory);
    let journal = RunJournal::for_config(&config);
    let runs = journal
        .recent(last)
        .wrap_err_with(|| format!("Failed to read {}", journal.path().display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&runs)?),
        OutputFormat::Text if runs.is_empty() => {
            println!(" No recorded runs for {}", directory.display());
        }
        OutputFormat::Text => {
            for run in &runs {
                let counts = &run.counts;
                println!(
                    " {}  {:<16} {:>7} files  +{} ~{} !{} ={} x{}  {:.2}s",
                    run.finished_at.format("%Y-%m-%d %H:%M:%S"),
                    run.mode.to_string(),
                    run.total_processed,
                    counts.added,
                    counts.modified,
                    counts.corrupted,
                    counts.unchanged,
                    counts.errors,
                    run.elapsed_secs
                );
            }
        }
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
