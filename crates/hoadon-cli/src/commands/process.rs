//! Process command - extract an invoice from a single OCR text file.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use tracing::{debug, info};

use hoadon_core::{ExtractionResult, InvoiceEngine};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input OCR text file, or "-" for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Name passed to the engine for fallback codes (default: input file name)
    #[arg(long)]
    filename: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence score
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::config::load(config_path)?;

    let from_stdin = args.input.as_os_str() == "-";
    let text = if from_stdin {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        if !args.input.exists() {
            anyhow::bail!("Input file not found: {}", args.input.display());
        }
        fs::read_to_string(&args.input).map_err(|e| {
            anyhow::anyhow!("Cannot read {}: {}", args.input.display(), e)
        })?
    };

    let filename = match &args.filename {
        Some(name) => name.clone(),
        None if from_stdin => "stdin".to_string(),
        None => args
            .input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("input")
            .to_string(),
    };

    info!("Processing {}", filename);

    let engine = InvoiceEngine::new(config.extraction.clone(), Local::now().naive_local());
    let result = engine.extract(&text, &filename);

    let output = format_result(&result, &filename, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if result.needs_review(config.extraction.review_threshold) {
        eprintln!(
            "{} Low confidence ({:.1}%), review recommended",
            style("⚠").yellow(),
            result.confidence * 100.0
        );
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            result.confidence * 100.0
        );
        for warning in &result.warnings {
            println!("{} {}", style("ℹ").blue(), warning);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_result(
    result: &ExtractionResult,
    filename: &str,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result, filename),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult, filename: &str) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(result.to_row(filename))?;
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let record = &result.record;
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", record.invoice_code));
    output.push_str(&format!("Type: {}\n", record.invoice_type));
    output.push_str(&format!("Date: {}\n", record.date.format("%d/%m/%Y")));
    if let Some(time) = record.invoice_time {
        output.push_str(&format!("Time: {}\n", time.format("%H:%M")));
    }
    output.push('\n');

    output.push_str(&format!("Buyer:  {}\n", record.buyer_name));
    if record.buyer_address != hoadon_core::models::invoice::NOT_AVAILABLE {
        output.push_str(&format!("        {}\n", record.buyer_address));
    }
    output.push_str(&format!("Seller: {}\n", record.seller_name));
    output.push('\n');

    if !record.transaction_id.is_empty() {
        output.push_str(&format!("Transaction: {}\n", record.transaction_id));
    }
    if !record.payment_account.is_empty() {
        output.push_str(&format!("Account: {}\n", record.payment_account));
    }

    if !record.items.is_empty() {
        output.push_str("Items:\n");
        for item in &record.items {
            output.push_str(&format!("  - {} x{}\n", item.description, item.quantity));
        }
    }

    let sign = if record.total_amount_value.is_sign_negative() { "-" } else { "" };
    output.push_str(&format!("Total: {}{}\n", sign, record.total_amount));

    output
}
