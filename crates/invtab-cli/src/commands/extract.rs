//! Extract command - consolidate line items from a batch of invoices.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_xlsxwriter::Workbook;
use tracing::{debug, info};

use invtab_core::{BatchOrchestrator, BatchStatus, InvtabConfig, ResultTable};

use crate::intake::Intake;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDFs, folders, zip archives or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of documents processed in parallel (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV with a header row
    Csv,
    /// JSON array of records
    Json,
    /// Excel workbook with one sheet (requires --output)
    Xlsx,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(jobs) = args.jobs {
        config.batch.jobs = jobs;
    }

    if matches!(args.format, OutputFormat::Xlsx) && args.output.is_none() {
        anyhow::bail!("xlsx output needs a file, pass --output");
    }

    let intake = Intake::collect(&args.inputs)?;
    if intake.paths.is_empty() {
        anyhow::bail!("No PDF files found in {}", args.inputs.join(", "));
    }

    eprintln!(
        "{} Found {} PDF files",
        style("ℹ").blue(),
        intake.paths.len()
    );

    let report = run_batch(config, intake.paths.clone()).await?;
    drop(intake);

    for warning in &report.warnings {
        eprintln!(
            "{} {}: {}",
            style("⚠").yellow(),
            warning.file_name,
            warning.message
        );
    }
    for document in &report.documents {
        debug!(
            "{}: {} rows via {:?}",
            document.file_name, document.rows, document.strategy
        );
    }

    if report.status == BatchStatus::NoData {
        anyhow::bail!("{}", report.status.message());
    }

    let documents = report.documents.len();
    let table = report.into_table()?;
    let output = match args.format {
        OutputFormat::Csv => format_csv(&table)?.into_bytes(),
        OutputFormat::Json => format_json(&table)?.into_bytes(),
        OutputFormat::Xlsx => format_xlsx(&table)?,
    };

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &output)?;
            info!("Wrote {}", path.display());
            eprintln!(
                "{} Wrote {} rows to {}",
                style("✓").green(),
                table.len(),
                path.display()
            );
        }
        None => {
            io::stdout().write_all(&output)?;
        }
    }

    eprintln!(
        "{} {} rows from {} documents in {:.2}s",
        style("✓").green(),
        table.len(),
        documents,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Run the orchestrator off the async runtime, drawing a progress bar.
async fn run_batch(
    config: InvtabConfig,
    paths: Vec<PathBuf>,
) -> anyhow::Result<invtab_core::BatchReport> {
    let orchestrator = BatchOrchestrator::from_config(&config)?;

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let bar = pb.clone();
    let report = tokio::task::spawn_blocking(move || {
        let progress = move |processed: usize, _total: usize| bar.set_position(processed as u64);
        orchestrator.run(&paths, &progress)
    })
    .await?;

    pb.finish_and_clear();
    Ok(report)
}

fn format_csv(table: &ResultTable) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(table.column_names())?;
    for record in table.records() {
        wtr.write_record(record)?;
    }
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_json(table: &ResultTable) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(&table.to_json_records())?;
    json.push('\n');
    Ok(json)
}

/// One worksheet: the header row, then one row per record.
fn format_xlsx(table: &ResultTable) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Line items")?;

    for (col, name) in table.column_names().iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }
    for (row, record) in table.records().iter().enumerate() {
        for (col, value) in record.iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}
