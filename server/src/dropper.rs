//! Dropper types
//!
//! Droppers are the on-screen markers whose positions select the pixels
//! sampled on every frame.

use colorpixel_core::NormalizedPoint;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Available droppers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Dropper {
    /// Upper marker, starts above center
    Top,
    /// Lower marker, starts below center
    Bottom,
}

impl Dropper {
    pub const ALL: [Dropper; 2] = [Dropper::Top, Dropper::Bottom];

    /// Starting position: horizontally centered, 35% / 65% down the frame
    pub fn default_point(&self) -> NormalizedPoint {
        match self {
            Dropper::Top => NormalizedPoint::new(0.5, 0.35),
            Dropper::Bottom => NormalizedPoint::new(0.5, 0.65),
        }
    }
}

impl std::fmt::Display for Dropper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dropper::Top => write!(f, "top"),
            Dropper::Bottom => write!(f, "bottom"),
        }
    }
}

impl std::str::FromStr for Dropper {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Dropper::Top),
            "bottom" => Ok(Dropper::Bottom),
            _ => Err(AppError::UnknownDropper(s.to_string())),
        }
    }
}

/// Requested dropper position (request body)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PointBody {
    /// Horizontal position, 0.0 (left) to 1.0 (right)
    pub x: f64,
    /// Vertical position, 0.0 (top) to 1.0 (bottom)
    pub y: f64,
}

impl TryFrom<PointBody> for NormalizedPoint {
    type Error = AppError;

    fn try_from(body: PointBody) -> Result<Self, Self::Error> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if in_range(body.x) && in_range(body.y) {
            Ok(NormalizedPoint::new(body.x, body.y))
        } else {
            Err(AppError::InvalidPoint(format!(
                "({}, {}) must lie within [0, 1]",
                body.x, body.y
            )))
        }
    }
}

/// Current positions of both droppers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropperPoints {
    pub top: NormalizedPoint,
    pub bottom: NormalizedPoint,
}

impl DropperPoints {
    pub fn get(&self, dropper: Dropper) -> NormalizedPoint {
        match dropper {
            Dropper::Top => self.top,
            Dropper::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, dropper: Dropper, point: NormalizedPoint) {
        match dropper {
            Dropper::Top => self.top = point,
            Dropper::Bottom => self.bottom = point,
        }
    }
}

impl Default for DropperPoints {
    fn default() -> Self {
        Self {
            top: Dropper::Top.default_point(),
            bottom: Dropper::Bottom.default_point(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dropper() {
        assert_eq!("top".parse::<Dropper>().unwrap(), Dropper::Top);
        assert_eq!("bottom".parse::<Dropper>().unwrap(), Dropper::Bottom);
        assert!(matches!(
            "middle".parse::<Dropper>(),
            Err(AppError::UnknownDropper(_))
        ));
    }

    #[test]
    fn test_default_points() {
        let points = DropperPoints::default();
        assert_eq!(points.get(Dropper::Top), NormalizedPoint::new(0.5, 0.35));
        assert_eq!(points.get(Dropper::Bottom), NormalizedPoint::new(0.5, 0.65));
    }

    #[test]
    fn test_point_body_validation() {
        let point = NormalizedPoint::try_from(PointBody { x: 0.0, y: 1.0 }).unwrap();
        assert_eq!((point.x(), point.y()), (0.0, 1.0));

        assert!(NormalizedPoint::try_from(PointBody { x: 1.01, y: 0.5 }).is_err());
        assert!(NormalizedPoint::try_from(PointBody { x: 0.5, y: f64::NAN }).is_err());
    }

    #[test]
    fn test_set_point() {
        let mut points = DropperPoints::default();
        points.set(Dropper::Bottom, NormalizedPoint::new(0.1, 0.9));
        assert_eq!(points.bottom, NormalizedPoint::new(0.1, 0.9));
        assert_eq!(points.top, Dropper::Top.default_point());
    }
}
