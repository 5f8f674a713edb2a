//! Batch processing command for multiple OCR text files.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use hoadon_core::{ExtractionResult, InvoiceEngine, InvoiceRow};

use super::process::{format_result, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input text files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files extracted concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: anyhow::Result<ExtractionResult>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::config::load(config_path)?;
    let review_threshold = config.extraction.review_threshold;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;
    let output_names = output_names(&files, args.format.extension());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let engine = Arc::new(InvoiceEngine::new(
        config.extraction.clone(),
        Local::now().naive_local(),
    ));

    let mut pending = stream::iter(files.into_iter().map(|path| {
        let engine = Arc::clone(&engine);
        async move {
            let task_path = path.clone();
            let outcome = tokio::task::spawn_blocking(move || extract_file(&engine, &task_path))
                .await
                .map_err(anyhow::Error::from)
                .and_then(|r| r);
            ProcessResult { path, outcome }
        }
    }))
    .buffer_unordered(args.jobs.max(1));

    let mut rows: Vec<InvoiceRow> = Vec::new();
    let mut failed: Vec<(PathBuf, String)> = Vec::new();
    let mut flagged = 0usize;

    while let Some(ProcessResult { path, outcome }) = pending.next().await {
        pb.inc(1);
        match outcome {
            Ok(result) => {
                let filename = display_name(&path);
                let output_path = match output_names.get(&path) {
                    Some(name) => output_dir.join(name),
                    None => anyhow::bail!("No output name for {}", path.display()),
                };
                fs::write(&output_path, format_result(&result, &filename, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());

                if result.needs_review(review_threshold) {
                    flagged += 1;
                }
                rows.push(result.to_row(&filename));
            }
            Err(e) if args.continue_on_error => {
                warn!("Failed to process {}: {}", path.display(), e);
                failed.push((path, e.to_string()));
            }
            Err(e) => {
                pb.abandon();
                error!("Failed to process {}: {}", path.display(), e);
                anyhow::bail!("Processing failed for {}: {}", path.display(), e);
            }
        }
    }

    pb.finish_and_clear();

    if args.summary {
        rows.sort_by(|a, b| a.filename.cmp(&b.filename));
        let summary_path = output_dir.join("summary.csv");
        write_summary(&summary_path, &rows)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        rows.len() + failed.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} flagged for review, {} failed",
        style(rows.len()).green(),
        style(flagged).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, error) in &failed {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}

fn extract_file(engine: &InvoiceEngine, path: &Path) -> anyhow::Result<ExtractionResult> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
    Ok(engine.extract(&text, &display_name(path)))
}

/// One output file name per input, in glob order.
///
/// Inputs from different directories can share a stem; later ones get a
/// `_2`, `_3`, ... suffix.
fn output_names(files: &[PathBuf], extension: &str) -> HashMap<PathBuf, String> {
    let mut taken = HashSet::new();
    let mut names = HashMap::with_capacity(files.len());

    for path in files {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("invoice");
        let mut name = format!("{}.{}", stem, extension);
        let mut n = 1;
        while taken.contains(&name) {
            n += 1;
            name = format!("{}_{}.{}", stem, n, extension);
        }
        if n > 1 {
            warn!(
                "Output name for {} collides, writing {} instead",
                path.display(),
                name
            );
        }
        taken.insert(name.clone());
        names.insert(path.clone(), name);
    }

    names
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

fn write_summary(path: &Path, rows: &[InvoiceRow]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
