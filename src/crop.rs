//! Subtitle region cropping.
//!
//! Burned-in subtitles live in the bottom band of the frame. Cropping to
//! that band before recognition cuts OCR time and keeps scene text out of
//! the transcript.

use std::path::Path;

use image::{DynamicImage, GenericImageView};

use crate::error::{ExtractorError, Result};

/// Crop a frame to its bottom `region_ratio` fraction.
///
/// For an image of height `H`, keeps rows `[floor(H * (1 - r)), H)` at
/// full width. `region_ratio` is validated at the configuration boundary
/// to lie in (0.1, 1.0]. Pure; the source image is untouched.
pub fn crop_subtitle_region(image: &DynamicImage, region_ratio: f64) -> DynamicImage {
    let (width, height) = image.dimensions();
    let top = (height as f64 * (1.0 - region_ratio)).floor() as u32;
    image.crop_imm(0, top, width, height - top)
}

/// Load a frame image from disk and crop it to the subtitle region.
pub fn crop_frame_file(path: &Path, region_ratio: f64) -> Result<DynamicImage> {
    let image = image::open(path)
        .map_err(|e| ExtractorError::InvalidImage(format!("{}: {}", path.display(), e)))?;
    Ok(crop_subtitle_region(&image, region_ratio))
}
