//! Single-pixel color decoding from raw frames
//!
//! - Map a normalized point to a pixel, clamped to the last row/column
//! - Decode bi-planar YCbCr 4:2:0 with the BT.601 full-range matrix
//! - Decode packed BGRA by byte order, ignoring alpha

use crate::color::{NormalizedPoint, RgbColor};
use crate::error::{Error, OutOfBounds};
use crate::frame::{Frame, Plane, Planes};

const LUMA_PLANE: usize = 0;
const CHROMA_PLANE: usize = 1;
const BGRA_PLANE: usize = 0;
const BGRA_BYTES_PER_PIXEL: usize = 4;

/// Decode the color of the pixel under `point`
///
/// YCbCr results are divided by 255 but not clamped, so strongly saturated
/// chroma can land slightly outside [0, 1].
pub fn sample(frame: &Frame<'_>, point: NormalizedPoint) -> Result<RgbColor, Error> {
    let (px, py) = pixel_at(frame, point)?;

    let color = match frame.planes {
        Planes::PlanarYCbCr420 { luma, chroma } => sample_ycbcr420(&luma, &chroma, px, py)?,
        Planes::PackedBgra8 { pixels } => sample_bgra8(&pixels, px, py)?,
    };

    Ok(color)
}

impl Frame<'_> {
    /// See [`sample`]
    pub fn sample(&self, point: NormalizedPoint) -> Result<RgbColor, Error> {
        sample(self, point)
    }
}

/// Pixel coordinates for a normalized point: floor, then clamp to the frame
fn pixel_at(frame: &Frame<'_>, point: NormalizedPoint) -> Result<(usize, usize), OutOfBounds> {
    let (width, height) = (frame.width, frame.height);
    if width == 0 || height == 0 {
        return Err(OutOfBounds::EmptyFrame { width, height });
    }

    let px = ((point.x() * width as f64).floor() as usize).min(width - 1);
    let py = ((point.y() * height as f64).floor() as usize).min(height - 1);
    Ok((px, py))
}

fn sample_ycbcr420(
    luma: &Plane<'_>,
    chroma: &Plane<'_>,
    px: usize,
    py: usize,
) -> Result<RgbColor, OutOfBounds> {
    let luma_index = byte_offset(LUMA_PLANE, luma, py, px)?;
    let chroma_index = byte_offset(CHROMA_PLANE, chroma, py / 2, (px / 2) * 2)?;

    let y = luma.byte(LUMA_PLANE, luma_index)?;
    let cb = chroma.byte(CHROMA_PLANE, chroma_index)?;
    let cr = chroma.byte(CHROMA_PLANE, chroma_index + 1)?;

    Ok(ycbcr_to_rgb(y, cb, cr))
}

fn sample_bgra8(pixels: &Plane<'_>, px: usize, py: usize) -> Result<RgbColor, OutOfBounds> {
    let column = px
        .checked_mul(BGRA_BYTES_PER_PIXEL)
        .ok_or(OutOfBounds::OffsetOverflow {
            plane: BGRA_PLANE,
            row: py,
            stride: pixels.stride,
        })?;
    let offset = byte_offset(BGRA_PLANE, pixels, py, column)?;
    let b = pixels.byte(BGRA_PLANE, offset)?;
    let g = pixels.byte(BGRA_PLANE, offset + 1)?;
    let r = pixels.byte(BGRA_PLANE, offset + 2)?;

    Ok(RgbColor::from_bytes(r, g, b))
}

/// Byte offset of `column` in `row`, checked against overflow
fn byte_offset(
    plane_index: usize,
    plane: &Plane<'_>,
    row: usize,
    column: usize,
) -> Result<usize, OutOfBounds> {
    row.checked_mul(plane.stride)
        .and_then(|start| start.checked_add(column))
        .ok_or(OutOfBounds::OffsetOverflow {
            plane: plane_index,
            row,
            stride: plane.stride,
        })
}

/// BT.601 full-range YCbCr to normalized RGB, unclamped
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> RgbColor {
    let y = y as f64;
    let cb = cb as f64 - 128.0;
    let cr = cr as f64 - 128.0;

    let r = y + 1.402 * cr;
    let g = y - 0.344136 * cb - 0.714136 * cr;
    let b = y + 1.772 * cb;

    RgbColor::new(r / 255.0, g / 255.0, b / 255.0)
}
