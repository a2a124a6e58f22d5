pub mod extract;
pub mod pdf;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use extract::Extractor;
pub use pdf::{DisabledPdfRenderer, MockPdfRenderer, PdfError, PdfRenderer};
pub use pipeline::{InputKind, PipelineError, PipelineOutcome, ReceiptPipeline, ReceiptUpload};
pub use preprocess::{
    binarize, prepare_for_ocr_from_bytes, prepare_for_ocr_from_image, PreprocessError,
};
pub use recognizer::{DisabledOcr, MockOcr, OcrEngine, OcrError};
pub use types::{ExtractedAmount, ExtractedFields, UNKNOWN};
