use image::DynamicImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to load PDF: {0}")]
    Load(String),
    #[error("PDF has no pages")]
    NoPages,
    #[error("Failed to render PDF page: {0}")]
    Render(String),
    #[error("PDF rendering not available — build with the `pdfium` feature")]
    NotAvailable,
}

/// Capability interface over a PDF rasterizer. Only the first page is ever
/// requested; any further pages in the document are silently discarded.
pub trait PdfRenderer: Send + Sync {
    fn first_page(&self, data: &[u8]) -> Result<DynamicImage, PdfError>;
}

/// Returns a preset page image regardless of input — lets the pipeline's
/// PDF path be exercised without a pdfium library.
pub struct MockPdfRenderer {
    page: DynamicImage,
}

impl MockPdfRenderer {
    pub fn new(page: DynamicImage) -> Self {
        Self { page }
    }
}

impl PdfRenderer for MockPdfRenderer {
    fn first_page(&self, _data: &[u8]) -> Result<DynamicImage, PdfError> {
        Ok(self.page.clone())
    }
}

/// Placeholder wired in when no PDF backend was compiled.
pub struct DisabledPdfRenderer;

impl PdfRenderer for DisabledPdfRenderer {
    fn first_page(&self, _data: &[u8]) -> Result<DynamicImage, PdfError> {
        Err(PdfError::NotAvailable)
    }
}

// ── Pdfium backend (optional, gated behind `pdfium` feature) ───────────────────

#[cfg(feature = "pdfium")]
pub mod pdfium_backend {
    use super::{PdfError, PdfRenderer};
    use image::DynamicImage;
    use pdfium_render::prelude::*;

    /// Rendered page width in pixels (A4 at roughly 300 DPI).
    const TARGET_WIDTH: i32 = 2480;

    pub struct PdfiumRenderer {
        pdfium: Pdfium,
    }

    impl PdfiumRenderer {
        /// Bind to a pdfium library next to the executable, falling back to
        /// the system library path.
        pub fn new() -> Result<Self, PdfError> {
            let bindings = Pdfium::bind_to_library(
                Pdfium::pdfium_platform_library_name_at_path("./"),
            )
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfError::Load(format!("pdfium library not found: {e:?}")))?;
            Ok(Self { pdfium: Pdfium::new(bindings) })
        }
    }

    impl PdfRenderer for PdfiumRenderer {
        fn first_page(&self, data: &[u8]) -> Result<DynamicImage, PdfError> {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(data, None)
                .map_err(|e| PdfError::Load(e.to_string()))?;

            let page = document.pages().get(0).map_err(|_| PdfError::NoPages)?;

            let config = PdfRenderConfig::new().set_target_width(TARGET_WIDTH);
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| PdfError::Render(e.to_string()))?;

            Ok(bitmap.as_image())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};

    fn page(value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(8, 8, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn mock_returns_preset_page() {
        let r = MockPdfRenderer::new(page(200));
        let out = r.first_page(b"%PDF-1.4 irrelevant").unwrap();
        assert_eq!(out.to_luma8().get_pixel(0, 0)[0], 200);
    }

    #[test]
    fn disabled_renderer_reports_not_available() {
        assert!(matches!(
            DisabledPdfRenderer.first_page(b"%PDF"),
            Err(PdfError::NotAvailable)
        ));
    }
}
