//! Capture loop: frames in, dropper readings out
//!
//! One producer task pulls a frame per tick, probes every dropper and
//! publishes the result through a watch channel. Readers only ever see the
//! most recent readings; intermediate ones are overwritten.

use std::sync::Arc;
use std::time::{Duration, Instant};

use colorpixel_core::{probe, OwnedFrame, Palette, RgbColor};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use utoipa::ToSchema;

use crate::capture::FrameSource;
use crate::dropper::{Dropper, DropperPoints};

/// Label shown when a dropper has no reading
pub const UNKNOWN_NAME: &str = "Unknown";

/// Color and nearest palette entry under one dropper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropperReading {
    pub color: RgbColor,
    /// Index into the shared palette
    pub palette_index: usize,
    pub distance: f64,
}

/// Readings for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readings {
    /// Zero until the first frame is processed
    pub frame_number: u64,
    pub top: Option<DropperReading>,
    pub bottom: Option<DropperReading>,
}

impl Readings {
    pub fn get(&self, dropper: Dropper) -> Option<&DropperReading> {
        match dropper {
            Dropper::Top => self.top.as_ref(),
            Dropper::Bottom => self.bottom.as_ref(),
        }
    }

    fn set(&mut self, dropper: Dropper, reading: Option<DropperReading>) {
        match dropper {
            Dropper::Top => self.top = reading,
            Dropper::Bottom => self.bottom = reading,
        }
    }

    /// Resolve palette names for display
    pub fn to_view(&self, palette: &Palette) -> ReadingsView {
        let droppers = Dropper::ALL
            .iter()
            .map(|&dropper| match self.get(dropper) {
                Some(reading) => ReadingView {
                    dropper,
                    name: palette
                        .get(reading.palette_index)
                        .map(|entry| entry.name.clone())
                        .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                    hex: Some(reading.color.to_hex()),
                    rgb: Some(RgbView::from(reading.color)),
                    distance: Some(reading.distance),
                },
                None => ReadingView {
                    dropper,
                    name: UNKNOWN_NAME.to_string(),
                    hex: None,
                    rgb: None,
                    distance: None,
                },
            })
            .collect();

        ReadingsView {
            frame: self.frame_number,
            droppers,
        }
    }
}

/// One dropper's reading as served over HTTP
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadingView {
    pub dropper: Dropper,
    /// Nearest palette color, or "Unknown" without a reading
    pub name: String,
    /// Sampled color as #RRGGBB (clamped for display)
    pub hex: Option<String>,
    /// Sampled color as normalized channels, unclamped
    pub rgb: Option<RgbView>,
    /// Euclidean RGB distance to the named color
    pub distance: Option<f64>,
}

/// Normalized channels of a sampled color
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct RgbView {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl From<RgbColor> for RgbView {
    fn from(c: RgbColor) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

/// Latest readings as served over HTTP
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadingsView {
    pub frame: u64,
    pub droppers: Vec<ReadingView>,
}

/// Producer side of the capture loop
pub struct Pipeline {
    source: Box<dyn FrameSource>,
    palette: Arc<Palette>,
    points: watch::Receiver<DropperPoints>,
    readings: watch::Sender<Readings>,
    frame_interval: Duration,
    frame_number: u64,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn FrameSource>,
        palette: Arc<Palette>,
        points: watch::Receiver<DropperPoints>,
        readings: watch::Sender<Readings>,
        frame_interval: Duration,
    ) -> Self {
        Self {
            source,
            palette,
            points,
            readings,
            frame_interval,
            frame_number: 0,
        }
    }

    /// Probe every dropper on one frame
    ///
    /// A dropper whose probe fails gets no reading for this frame; the other
    /// dropper is unaffected.
    pub fn process_frame(&self, owned: &OwnedFrame, frame_number: u64) -> Readings {
        let mut readings = Readings {
            frame_number,
            ..Readings::default()
        };

        let frame = match owned.as_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Frame {} unusable: {}", frame_number, e);
                return readings;
            }
        };

        let points = *self.points.borrow();
        for dropper in Dropper::ALL {
            let reading = match probe(&frame, points.get(dropper), &self.palette) {
                Ok(reading) => Some(DropperReading {
                    color: reading.color,
                    palette_index: reading.nearest.index,
                    distance: reading.nearest.distance,
                }),
                Err(e) => {
                    tracing::debug!("Frame {} {} dropper: {}", frame_number, dropper, e);
                    None
                }
            };
            readings.set(dropper, reading);
        }

        readings
    }

    /// Capture and publish one frame
    pub async fn tick(&mut self) {
        let started = Instant::now();
        self.frame_number += 1;

        let readings = match self.source.next_frame().await {
            Ok(owned) => self.process_frame(&owned, self.frame_number),
            Err(e) => {
                tracing::debug!("Frame {} capture failed: {}", self.frame_number, e);
                Readings {
                    frame_number: self.frame_number,
                    ..Readings::default()
                }
            }
        };

        self.readings.send_replace(readings);

        let elapsed = started.elapsed();
        if elapsed > self.frame_interval {
            tracing::warn!(
                "Frame {} took {:?}, over the {:?} frame budget",
                self.frame_number,
                elapsed,
                self.frame_interval
            );
        }
    }

    /// Run until every readings receiver is dropped
    pub async fn run(mut self) {
        tracing::info!(
            "Capture started: {} every {:?}",
            self.source.describe(),
            self.frame_interval
        );

        let mut interval = tokio::time::interval(self.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.readings.closed() => break,
            }
            self.tick().await;
        }

        tracing::info!("Capture stopped after {} frames", self.frame_number);
    }
}
