use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use driverlog_core::{receipt_filename, Config, ReceiptRecord, ReceiptType};
use driverlog_ocr::{InputKind, ReceiptPipeline, ReceiptUpload};
use driverlog_store::{save_receipt, ReceiptLog};

/// Process one receipt: recognize its text, extract the amount and sender,
/// store the renamed file under the upload folder, and append a log row.
#[derive(Parser)]
#[command(name = "driverlog", version, about)]
struct Args {
    /// Receipt file to process (image or PDF)
    file: PathBuf,

    /// Driver ID (e.g. A12)
    #[arg(long)]
    driver_id: String,

    /// Receipt type: dr-receipt or aa-conf
    #[arg(long)]
    receipt_type: ReceiptType,

    /// Date of the transaction (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// TOML config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the upload folder from the config
    #[arg(long)]
    uploads: Option<PathBuf>,

    /// Override the CSV log path from the config
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut cfg = Config::load_or_default(args.config.as_deref())?;
    if let Some(dir) = args.uploads {
        cfg.upload_dir = dir;
    }
    if let Some(path) = args.log {
        cfg.log_file = path;
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let original_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "receipt".to_string());

    let upload = ReceiptUpload {
        kind: InputKind::from_path(&args.file),
        bytes,
        driver_id: args.driver_id,
        receipt_type: args.receipt_type,
        transaction_date: args.date,
        original_name,
    };

    let log = ReceiptLog::new(&cfg.log_file, Duration::from_millis(cfg.lock_wait_ms));
    log.ensure_exists()?;

    let pipeline = ReceiptPipeline::new(ocr_engine(&cfg)?, pdf_renderer()?);
    let outcome = pipeline.process(&upload)?;

    let filename = receipt_filename(
        &upload.driver_id,
        &outcome.fields.amount.shorthand,
        upload.transaction_date,
        upload.receipt_type,
        &upload.original_name,
    );
    let stored = save_receipt(&cfg.upload_dir, upload.receipt_type, &filename, &upload.bytes)?;
    tracing::info!(path = %stored.display(), "receipt stored");

    let record = ReceiptRecord::new(
        &upload.driver_id,
        &outcome.fields.sender_name,
        &outcome.fields.amount.full,
        upload.transaction_date,
        upload.receipt_type,
        chrono::Local::now(),
    );
    log.append(&record)?;

    println!("OCR text:\n{}", outcome.ocr_text);
    println!("Saved as: {filename}");
    println!("Extracted record:\n{}", serde_json::to_string_pretty(&record)?);

    println!("\nUpload history (last 10):");
    for row in log.tail(10)? {
        println!(
            "{} | {} | {} | {} | {} | {}",
            row.driver_id, row.driver_name, row.amount, row.date, row.receipt_type, row.timestamp
        );
    }

    Ok(())
}

#[cfg(feature = "tesseract")]
fn ocr_engine(cfg: &Config) -> anyhow::Result<impl driverlog_ocr::OcrEngine> {
    use driverlog_ocr::recognizer::tesseract_backend::TesseractOcr;
    Ok(TesseractOcr::new(cfg.ocr.data_path.clone(), &cfg.ocr.lang))
}

#[cfg(not(feature = "tesseract"))]
fn ocr_engine(_cfg: &Config) -> anyhow::Result<driverlog_ocr::DisabledOcr> {
    Ok(driverlog_ocr::DisabledOcr)
}

#[cfg(feature = "pdfium")]
fn pdf_renderer() -> anyhow::Result<impl driverlog_ocr::PdfRenderer> {
    use driverlog_ocr::pdf::pdfium_backend::PdfiumRenderer;
    Ok(PdfiumRenderer::new()?)
}

#[cfg(not(feature = "pdfium"))]
fn pdf_renderer() -> anyhow::Result<driverlog_ocr::DisabledPdfRenderer> {
    Ok(driverlog_ocr::DisabledPdfRenderer)
}
