//! Frame source trait and implementations
//!
//! Frame sources stand in for the camera: each call yields one raw frame in
//! the configured pixel layout.

use async_trait::async_trait;
use colorpixel_core::{OwnedFrame, PixelFormat};
use image::{Rgb, RgbImage};

use crate::config::{Config, SourceKind};
use crate::error::AppError;
use crate::image_processing::{encode_frame, load_image, resize_cover};

/// Classic color bars, left to right
const BARS: [[u8; 3]; 8] = [
    [255, 255, 255], // White
    [255, 255, 0],   // Yellow
    [0, 255, 255],   // Cyan
    [0, 255, 0],     // Green
    [255, 0, 255],   // Magenta
    [255, 0, 0],     // Red
    [0, 0, 255],     // Blue
    [0, 0, 0],       // Black
];

/// Pixels the pattern scrolls per frame
const SCROLL_STEP: usize = 4;

/// A source of captured frames
#[async_trait]
pub trait FrameSource: Send {
    /// Short description for logs
    fn describe(&self) -> String;

    /// Capture the next frame
    async fn next_frame(&mut self) -> Result<OwnedFrame, AppError>;
}

/// Scrolling color bars
pub struct TestPatternSource {
    width: usize,
    height: usize,
    format: PixelFormat,
    frame_number: usize,
}

impl TestPatternSource {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self, AppError> {
        if width == 0 || height == 0 {
            return Err(AppError::Config(format!(
                "Test pattern needs a non-zero size, got {}x{}",
                width, height
            )));
        }

        Ok(Self {
            width,
            height,
            format,
            frame_number: 0,
        })
    }

    /// Render the bars shifted left by `offset` pixels
    fn render(&self, offset: usize) -> RgbImage {
        let width = self.width;
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, _| {
            let bar = ((x as usize + offset) % width) * BARS.len() / width;
            Rgb(BARS[bar])
        })
    }
}

#[async_trait]
impl FrameSource for TestPatternSource {
    fn describe(&self) -> String {
        format!("color bars {}x{} {}", self.width, self.height, self.format)
    }

    async fn next_frame(&mut self) -> Result<OwnedFrame, AppError> {
        let offset = self.frame_number.wrapping_mul(SCROLL_STEP) % self.width;
        self.frame_number = self.frame_number.wrapping_add(1);
        Ok(encode_frame(&self.render(offset), self.format))
    }
}

/// A still image, decoded and encoded once, delivered every frame
pub struct StillImageSource {
    description: String,
    frame: OwnedFrame,
}

impl StillImageSource {
    pub fn open(
        path: &std::path::Path,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, AppError> {
        let img = load_image(path)?;
        let fitted = resize_cover(&img, width as u32, height as u32);

        tracing::info!(
            "Loaded still image {} ({}x{} -> {}x{})",
            path.display(),
            img.width(),
            img.height(),
            width,
            height
        );

        Ok(Self {
            description: format!("still image {} {}", path.display(), format),
            frame: encode_frame(&fitted, format),
        })
    }
}

#[async_trait]
impl FrameSource for StillImageSource {
    fn describe(&self) -> String {
        self.description.clone()
    }

    async fn next_frame(&mut self) -> Result<OwnedFrame, AppError> {
        Ok(self.frame.clone())
    }
}

/// Build the frame source selected by configuration
pub fn from_config(config: &Config) -> Result<Box<dyn FrameSource>, AppError> {
    match &config.source {
        SourceKind::Pattern => Ok(Box::new(TestPatternSource::new(
            config.width,
            config.height,
            config.format,
        )?)),
        SourceKind::Image(path) => Ok(Box::new(StillImageSource::open(
            path,
            config.width,
            config.height,
            config.format,
        )?)),
    }
}
