use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Threshold used when the histogram has no Otsu optimum (single gray level).
const BASELINE_THRESHOLD: u8 = 150;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Decode raw image bytes (JPEG / PNG / WEBP / …), binarize, and return PNG
/// bytes ready for the OCR engine.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(binarize(img))
}

/// Binarize an already-decoded page and return PNG bytes for the OCR engine.
pub fn prepare_for_ocr_from_image(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    encode_as_png(binarize(img))
}

/// Grayscale + inverted binary threshold with automatic level selection.
///
/// The threshold is picked by Otsu's method over the luma histogram; the
/// polarity is inverted so dark print on a light background comes out as
/// white-on-black. Pixels at or below the threshold map to 255, the rest
/// to 0.
pub fn binarize(img: DynamicImage) -> GrayImage {
    let gray: GrayImage = img.to_luma8();
    let level = otsu_level(&gray).unwrap_or(BASELINE_THRESHOLD);

    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([if p <= level { 255 } else { 0 }])
    })
}

/// Otsu's threshold: maximize between-class variance over the histogram.
/// Returns `None` when every pixel shares one gray level (no optimum).
fn otsu_level(gray: &GrayImage) -> Option<u8> {
    let mut hist = [0u64; 256];
    for p in gray.pixels() {
        hist[p[0] as usize] += 1;
    }

    let total: u64 = gray.width() as u64 * gray.height() as u64;
    if total == 0 {
        return None;
    }
    let sum_all: f64 = hist.iter().enumerate().map(|(i, &n)| i as f64 * n as f64).sum();

    let mut weight_bg = 0u64;
    let mut sum_bg = 0.0f64;
    let mut best: Option<(f64, u8)> = None;

    for t in 0..256usize {
        weight_bg += hist[t];
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }
        sum_bg += t as f64 * hist[t] as f64;

        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let between =
            weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg) * (mean_bg - mean_fg);

        if best.map_or(true, |(v, _)| between > v) {
            best = Some((between, t as u8));
        }
    }

    best.map(|(_, t)| t)
}

fn encode_as_png(img: GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
