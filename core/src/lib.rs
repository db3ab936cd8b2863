//! Frame color sampling and nearest-color naming
//!
//! - [`sampler`]: decode one pixel of a bi-planar YCbCr 4:2:0 or BGRA frame
//! - [`classifier`]: name an RGB sample after the closest palette entry
//! - [`palette`]: build the immutable palette from `(name, "#RRGGBB")` records
//!
//! Both sampling and classification are pure functions of their inputs and
//! allocate nothing per call, so they can run inside a capture callback.

pub mod classifier;
pub mod color;
pub mod error;
pub mod frame;
pub mod palette;
pub mod probe;
pub mod sampler;

pub use classifier::{classify, Match};
pub use color::{NormalizedPoint, RgbColor};
pub use error::{Error, OutOfBounds};
pub use frame::{Frame, OwnedFrame, PixelFormat, Plane, Planes};
pub use palette::{Palette, PaletteEntry, PaletteRecord};
pub use probe::{probe, Reading};
pub use sampler::sample;
