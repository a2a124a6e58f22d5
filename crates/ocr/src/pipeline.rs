use std::path::Path;

use chrono::NaiveDate;
use image::DynamicImage;
use thiserror::Error;

use driverlog_core::ReceiptType;

use crate::extract::Extractor;
use crate::pdf::{PdfError, PdfRenderer};
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrEngine, OcrError};
use crate::types::ExtractedFields;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Unreadable image or PDF — fatal, nothing is logged for the run.
    #[error("Could not decode receipt input: {0}")]
    InputDecode(String),
    #[error("Text recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

impl From<PreprocessError> for PipelineError {
    fn from(e: PreprocessError) -> Self {
        PipelineError::InputDecode(e.to_string())
    }
}

impl From<PdfError> for PipelineError {
    fn from(e: PdfError) -> Self {
        PipelineError::InputDecode(e.to_string())
    }
}

/// How the uploaded bytes should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Image,
    Pdf,
}

impl InputKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime == "application/pdf" {
            InputKind::Pdf
        } else {
            InputKind::Image
        }
    }

    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => InputKind::Pdf,
            _ => InputKind::Image,
        }
    }
}

/// One receipt submission, exactly as supplied by the caller.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub bytes: Vec<u8>,
    pub kind: InputKind,
    pub driver_id: String,
    pub receipt_type: ReceiptType,
    pub transaction_date: NaiveDate,
    /// Name the file arrived under; its extension survives into storage.
    pub original_name: String,
}

/// Everything a run produces for the caller: the raw recognized text (for
/// display) and the extracted fields.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub ocr_text: String,
    pub fields: ExtractedFields,
}

/// Orchestrates one synchronous run: decode → binarize → recognize →
/// extract. PDF inputs go through the renderer collaborator first; only
/// the first page is considered.
pub struct ReceiptPipeline<O: OcrEngine, P: PdfRenderer> {
    ocr: O,
    pdf: P,
}

impl<O: OcrEngine, P: PdfRenderer> ReceiptPipeline<O, P> {
    pub fn new(ocr: O, pdf: P) -> Self {
        Self { ocr, pdf }
    }

    pub fn process(&self, upload: &ReceiptUpload) -> Result<PipelineOutcome, PipelineError> {
        let page: DynamicImage = match upload.kind {
            InputKind::Pdf => self.pdf.first_page(&upload.bytes)?,
            InputKind::Image => image::load_from_memory(&upload.bytes)
                .map_err(|e| PipelineError::InputDecode(e.to_string()))?,
        };

        let image_bytes = preprocess::prepare_for_ocr_from_image(page)?;
        let text = self.ocr.recognize(&image_bytes)?;
        tracing::debug!(chars = text.len(), "recognized receipt text");

        let fields = Extractor::extract(&text, upload.receipt_type);
        tracing::info!(
            amount = %fields.amount.full,
            shorthand = %fields.amount.shorthand,
            sender = %fields.sender_name,
            "extracted receipt fields"
        );

        Ok(PipelineOutcome { ocr_text: text, fields })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
