//! Runtime configuration read from environment variables

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use colorpixel_core::PixelFormat;

use crate::error::AppError;

/// Where frames come from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    /// Generated color bars
    Pattern,
    /// A still image file, re-emitted every frame
    Image(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Palette document; the embedded palette is used when unset
    pub palette_path: Option<PathBuf>,
    pub source: SourceKind,
    pub format: PixelFormat,
    pub width: usize,
    pub height: usize,
    pub frame_rate: u32,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let source = match lookup("FRAME_SOURCE").as_deref() {
            None | Some("pattern") => SourceKind::Pattern,
            Some(path) => SourceKind::Image(PathBuf::from(path)),
        };

        let format = match lookup("FRAME_FORMAT") {
            Some(tag) => tag
                .parse()
                .map_err(|e| AppError::Config(format!("FRAME_FORMAT: {}", e)))?,
            None => PixelFormat::PlanarYCbCr420,
        };

        let config = Self {
            port: parse_var(&lookup, "PORT", 3000)?,
            palette_path: lookup("PALETTE_PATH").map(PathBuf::from),
            source,
            format,
            width: parse_var(&lookup, "FRAME_WIDTH", 1280)?,
            height: parse_var(&lookup, "FRAME_HEIGHT", 720)?,
            frame_rate: parse_var(&lookup, "FRAME_RATE", 30)?,
        };

        if config.width == 0 || config.height == 0 {
            return Err(AppError::Config(format!(
                "FRAME_WIDTH/FRAME_HEIGHT must be non-zero, got {}x{}",
                config.width, config.height
            )));
        }
        if config.frame_rate == 0 || config.frame_rate > 240 {
            return Err(AppError::Config(format!(
                "FRAME_RATE must be between 1 and 240, got {}",
                config.frame_rate
            )));
        }

        Ok(config)
    }

    /// Time between frames; also the processing budget per frame
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has invalid value {:?}", key, raw))),
        None => Ok(default),
    }
}
