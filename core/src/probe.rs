//! Sample and classify in one call, once per dropper per frame

use crate::classifier::Match;
use crate::color::{NormalizedPoint, RgbColor};
use crate::error::Error;
use crate::frame::Frame;
use crate::palette::Palette;

/// Decoded color at a point and its nearest named color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading<'p> {
    pub color: RgbColor,
    pub nearest: Match<'p>,
}

impl<'p> Reading<'p> {
    pub fn name(&self) -> &'p str {
        self.nearest.name()
    }
}

/// Decode the pixel under `point` and name it against `palette`
///
/// Only the palette is borrowed by the result; the frame can be released as
/// soon as this returns.
pub fn probe<'p>(
    frame: &Frame<'_>,
    point: NormalizedPoint,
    palette: &'p Palette,
) -> Result<Reading<'p>, Error> {
    let color = frame.sample(point)?;
    let nearest = palette.classify(color)?;
    Ok(Reading { color, nearest })
}
