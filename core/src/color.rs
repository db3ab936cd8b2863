//! Color and coordinate primitives
//!
//! Channels are `f64` in nominal [0, 1]. Values decoded from YCbCr frames may
//! overshoot that range slightly and are kept as decoded.

/// RGB color with normalized channels (always opaque)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0.0, 0.0, 0.0);
    pub const WHITE: RgbColor = RgbColor::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channel values, each divided by 255
    #[inline]
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Parse `#RRGGBB` or `RRGGBB` (case-insensitive, no alpha)
    ///
    /// Returns `None` unless exactly six hex digits follow the optional `#`.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::from_bytes(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Euclidean distance to another color in RGB space
    #[inline]
    pub fn distance(&self, other: &RgbColor) -> f64 {
        let dr = other.r - self.r;
        let dg = other.g - self.g;
        let db = other.b - self.b;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Clamp to [0, 1] and round to 8-bit channels for display
    pub fn to_bytes(&self) -> [u8; 3] {
        let quantize = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    /// Render as `#RRGGBB`
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

/// A sample position relative to frame size; (0, 0) is top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint {
    x: f64,
    y: f64,
}

impl NormalizedPoint {
    /// Clamp both coordinates into [0, 1]; NaN becomes 0
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Point under a marker at `(x, y)` inside a view of the given size
    pub fn from_view_position(x: f64, y: f64, view_width: f64, view_height: f64) -> Self {
        Self::new(x / view_width, y / view_height)
    }

    /// Point under a marker displaced by `(dx, dy)` from the center of a view
    pub fn from_center_offset(dx: f64, dy: f64, view_width: f64, view_height: f64) -> Self {
        Self::from_view_position(
            view_width / 2.0 + dx,
            view_height / 2.0 + dy,
            view_width,
            view_height,
        )
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

#[inline]
fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
