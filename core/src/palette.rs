//! Named reference colors
//!
//! A [`Palette`] is built once from `(name, "#RRGGBB")` records and shared
//! read-only afterwards. Construction is all-or-nothing: one malformed record
//! fails the whole palette.

use std::collections::HashMap;
use std::ops::Deref;

use serde::Deserialize;

use crate::color::RgbColor;
use crate::error::Error;

/// Palette document compiled into the binary
const EMBEDDED_COLORS: &str = include_str!("../palettes/colors.json");

/// One record of a palette document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaletteRecord {
    pub name: String,
    pub hex: String,
}

impl PaletteRecord {
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }
}

/// A named reference color
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub name: String,
    pub reference: RgbColor,
}

impl PaletteEntry {
    /// Parse a record, naming it in the error if its hex string is malformed
    pub fn from_record(record: &PaletteRecord) -> Result<Self, Error> {
        let reference =
            RgbColor::parse_hex(&record.hex).ok_or_else(|| Error::InvalidColorFormat {
                name: record.name.clone(),
                hex: record.hex.clone(),
            })?;

        Ok(Self {
            name: record.name.clone(),
            reference,
        })
    }
}

/// Immutable, ordered, non-empty list of palette entries
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn from_records(records: &[PaletteRecord]) -> Result<Self, Error> {
        let entries = records
            .iter()
            .map(PaletteEntry::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        if entries.is_empty() {
            return Err(Error::EmptyPalette);
        }

        warn_duplicates(&entries);
        tracing::info!("Loaded palette with {} colors", entries.len());

        Ok(Self { entries })
    }

    /// Build from `(name, hex)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self, Error> {
        let records: Vec<PaletteRecord> = pairs
            .iter()
            .map(|(name, hex)| PaletteRecord::new(*name, *hex))
            .collect();
        Self::from_records(&records)
    }

    /// Build from a JSON array of `{ "name": ..., "hex": ... }` objects
    pub fn from_json(document: &str) -> Result<Self, Error> {
        let records: Vec<PaletteRecord> = serde_json::from_str(document)?;
        Self::from_records(&records)
    }

    /// The palette shipped with the crate
    pub fn embedded() -> Result<Self, Error> {
        Self::from_json(EMBEDDED_COLORS)
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }
}

impl Deref for Palette {
    type Target = [PaletteEntry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

/// Duplicate reference colors are legal; the first one in order always wins
fn warn_duplicates(entries: &[PaletteEntry]) {
    let mut seen: HashMap<[u8; 3], &str> = HashMap::with_capacity(entries.len());
    for entry in entries {
        let key = entry.reference.to_bytes();
        if let Some(first) = seen.get(&key) {
            tracing::warn!(
                "Palette color {} for '{}' duplicates '{}'; '{}' will never match",
                entry.reference.to_hex(),
                entry.name,
                first,
                entry.name
            );
        } else {
            seen.insert(key, &entry.name);
        }
    }
}
