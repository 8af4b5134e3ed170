//! Raster preview rendering.
//!
//! A quick PNG look at the symbol before committing to a DXF export.
//! The preview path is independent of the geometry emitter: it scales
//! the matrix directly, in raster orientation (row 0 at the top).

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use qrcad_core::Matrix;

const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Logo edge relative to the smaller preview dimension.
const LOGO_FRACTION: f64 = 0.22;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Pixels per module.
    pub scale: u32,
    /// Quiet-zone width in modules.
    pub border: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { scale: 10, border: 4 }
    }
}

/// Render the matrix as a black-on-white raster image, quiet zone
/// included.
pub fn render_preview(matrix: &Matrix, config: &PreviewConfig) -> RgbaImage {
    let scale = config.scale.max(1);
    let total = (matrix.size() as u32 + 2 * config.border) * scale;
    let mut image = RgbaImage::from_pixel(total, total, LIGHT);

    for row in 0..matrix.size() {
        for col in 0..matrix.size() {
            if !matrix.get(row, col) {
                continue;
            }
            let px0 = (config.border + col as u32) * scale;
            let py0 = (config.border + row as u32) * scale;
            for py in py0..py0 + scale {
                for px in px0..px0 + scale {
                    image.put_pixel(px, py, DARK);
                }
            }
        }
    }

    image
}

/// Decode a logo image and composite it centred over the preview,
/// scaled to roughly [`LOGO_FRACTION`] of the smaller dimension.
pub fn overlay_logo(image: &mut RgbaImage, logo_bytes: &[u8]) -> Result<(), PreviewError> {
    let logo = image::load_from_memory(logo_bytes)?.to_rgba8();

    let target = ((image.width().min(image.height()) as f64) * LOGO_FRACTION).max(1.0) as u32;
    let ratio = (target as f64 / logo.width() as f64)
        .min(target as f64 / logo.height() as f64)
        .min(1.0);
    let width = ((logo.width() as f64 * ratio).round() as u32).max(1);
    let height = ((logo.height() as f64 * ratio).round() as u32).max(1);
    let resized = imageops::resize(&logo, width, height, imageops::FilterType::Lanczos3);

    let x = (image.width().saturating_sub(width)) / 2;
    let y = (image.height().saturating_sub(height)) / 2;
    imageops::overlay(image, &resized, x as i64, y as i64);
    Ok(())
}

/// Render the preview, optionally composite a logo, and save it as PNG.
pub fn save_preview(
    matrix: &Matrix,
    config: &PreviewConfig,
    path: &Path,
    logo_bytes: Option<&[u8]>,
) -> Result<(), PreviewError> {
    let mut image = render_preview(matrix, config);
    if let Some(bytes) = logo_bytes {
        overlay_logo(&mut image, bytes)?;
    }
    image.save(path)?;
    log::info!("saved preview to {}", path.display());
    Ok(())
}
