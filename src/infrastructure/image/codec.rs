//! Raw RGBA pixel codec and compositing.
//!
//! Textures travel through the cache as row-major RGBA buffers (4 bytes per
//! pixel, R G B A). This module converts between those buffers, encoded
//! images and `image::RgbaImage` surfaces.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage, imageops};

use crate::domain::entities::{CAPE_HEIGHT, CAPE_WIDTH, SKIN_WIDTH};
use crate::domain::errors::{FetchError, FetchResult};

/// Position of the ears texture within the skin grid.
pub const EARS_OFFSET: (u32, u32) = (24, 0);

/// Decodes any supported image format into an RGBA surface.
///
/// # Errors
/// Returns `FetchError::Decode` if the bytes are not a valid image.
pub fn decode(bytes: &[u8]) -> FetchResult<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.into_rgba8())
}

/// Encodes a surface as PNG.
///
/// # Errors
/// Returns `FetchError::Decode` if the encoder rejects the surface.
pub fn encode(raster: &RgbaImage) -> FetchResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    raster.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Wraps an RGBA buffer as a `width` x `height` surface.
///
/// # Errors
/// Returns `FetchError::Decode` if the buffer length is not exactly
/// `width * height * 4`.
pub fn to_raster(rgba: &[u8], width: u32, height: u32) -> FetchResult<RgbaImage> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(FetchError::decode(format!(
            "buffer of {} bytes does not match {width}x{height}",
            rgba.len()
        )));
    }
    RgbaImage::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| FetchError::decode(format!("invalid {width}x{height} buffer")))
}

/// Flattens a surface back into an RGBA buffer.
#[must_use]
pub fn to_rgba_buffer(raster: RgbaImage) -> Vec<u8> {
    raster.into_raw()
}

/// Bilinear downscale to exactly half width and height (rounded down).
#[must_use]
pub fn halve(raster: &RgbaImage) -> RgbaImage {
    let (width, height) = (raster.width() / 2, raster.height() / 2);
    if width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }
    imageops::resize(raster, width, height, imageops::FilterType::Triangle)
}

/// Places `raster` at the origin of a transparent 64x32 canvas, clipping
/// anything outside it.
#[must_use]
pub fn normalize_cape_canvas(raster: &RgbaImage) -> RgbaImage {
    let mut canvas = RgbaImage::new(CAPE_WIDTH, CAPE_HEIGHT);
    imageops::replace(&mut canvas, raster, 0, 0);
    canvas
}

/// Halves a cape image until it fits the canvas width, then normalizes it.
#[must_use]
pub fn prepare_cape(raster: RgbaImage) -> RgbaImage {
    let mut raster = raster;
    while raster.width() > CAPE_WIDTH {
        raster = halve(&raster);
    }
    normalize_cape_canvas(&raster)
}

/// Alpha-composites `overlay` onto a copy of `base` at `(x, y)`.
#[must_use]
pub fn composite_overlay(base: &RgbaImage, overlay: &RgbaImage, x: u32, y: u32) -> RgbaImage {
    let mut out = base.clone();
    imageops::overlay(&mut out, overlay, i64::from(x), i64::from(y));
    out
}

/// Draws an ears texture onto a skin buffer and returns the new buffer.
///
/// # Errors
/// Returns `FetchError::Decode` if the skin buffer is not a 64 pixel wide
/// RGBA image.
pub fn apply_ears(skin_rgba: &[u8], ears: &RgbaImage) -> FetchResult<Vec<u8>> {
    let row_bytes = SKIN_WIDTH as usize * 4;
    if skin_rgba.is_empty() || skin_rgba.len() % row_bytes != 0 {
        return Err(FetchError::decode("skin buffer is not 64 pixels wide"));
    }
    let height = u32::try_from(skin_rgba.len() / row_bytes)
        .map_err(|_| FetchError::decode("skin buffer too large"))?;
    let base = to_raster(skin_rgba, SKIN_WIDTH, height)?;
    let (x, y) = EARS_OFFSET;
    Ok(to_rgba_buffer(composite_overlay(&base, ears, x, y)))
}
