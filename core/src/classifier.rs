//! Nearest-color classification by Euclidean distance in RGB space

use crate::color::RgbColor;
use crate::error::Error;
use crate::palette::{Palette, PaletteEntry};

/// Nearest palette entry for a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    /// Position of the entry in palette order
    pub index: usize,
    pub entry: &'a PaletteEntry,
    /// Euclidean RGB distance between sample and reference
    pub distance: f64,
}

impl<'a> Match<'a> {
    pub fn name(&self) -> &'a str {
        &self.entry.name
    }
}

/// Find the entry closest to `sample` with a linear scan
///
/// Ties go to the entry that comes first in palette order. No distance
/// threshold is applied; a very distant nearest entry is still returned.
pub fn classify(entries: &[PaletteEntry], sample: RgbColor) -> Result<Match<'_>, Error> {
    let mut best: Option<Match<'_>> = None;

    for (index, entry) in entries.iter().enumerate() {
        let distance = sample.distance(&entry.reference);
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Match {
                index,
                entry,
                distance,
            });
        }
    }

    best.ok_or(Error::EmptyPalette)
}

impl Palette {
    /// See [`classify`]
    #[inline]
    pub fn classify(&self, sample: RgbColor) -> Result<Match<'_>, Error> {
        classify(self.entries(), sample)
    }
}
