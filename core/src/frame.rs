//! Frame descriptors for captured video images
//!
//! A [`Frame`] borrows the capture layer's plane memory for the duration of a
//! call. [`OwnedFrame`] holds its own storage and lends out a `Frame`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, OutOfBounds};

/// Pixel layouts the sampler can decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Bi-planar YCbCr 4:2:0: luma plane + interleaved CbCr plane (NV12)
    PlanarYCbCr420,
    /// Packed 8-bit B, G, R, A
    PackedBgra8,
}

impl PixelFormat {
    /// Number of planes a frame in this format carries
    pub fn plane_count(&self) -> usize {
        match self {
            PixelFormat::PlanarYCbCr420 => 2,
            PixelFormat::PackedBgra8 => 1,
        }
    }

    /// Resolve a FourCC tag as delivered by capture APIs
    ///
    /// `420v` (video range) and `420f` (full range) both decode with the same
    /// conversion; the range flag is not applied.
    pub fn from_fourcc(code: u32) -> Result<Self, Error> {
        match &code.to_be_bytes() {
            b"420v" | b"420f" | b"NV12" => Ok(PixelFormat::PlanarYCbCr420),
            b"BGRA" => Ok(PixelFormat::PackedBgra8),
            bytes => Err(Error::UnsupportedFormat(describe_fourcc(*bytes))),
        }
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "420v" | "420f" | "nv12" => Ok(PixelFormat::PlanarYCbCr420),
            "bgra" => Ok(PixelFormat::PackedBgra8),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::PlanarYCbCr420 => write!(f, "420f"),
            PixelFormat::PackedBgra8 => write!(f, "BGRA"),
        }
    }
}

fn describe_fourcc(bytes: [u8; 4]) -> String {
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        format!("0x{:08X}", u32::from_be_bytes(bytes))
    }
}

/// One plane of pixel memory with its row stride in bytes
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    pub stride: usize,
}

impl<'a> Plane<'a> {
    pub fn new(data: &'a [u8], stride: usize) -> Self {
        Self { data, stride }
    }

    /// Read one byte, failing instead of reading past the plane end
    #[inline]
    pub(crate) fn byte(&self, plane: usize, offset: usize) -> Result<u8, OutOfBounds> {
        self.data
            .get(offset)
            .copied()
            .ok_or(OutOfBounds::PlaneOverrun {
                plane,
                offset,
                len: self.data.len(),
            })
    }
}

/// Planes of a frame, shaped by pixel format
#[derive(Debug, Clone, Copy)]
pub enum Planes<'a> {
    PlanarYCbCr420 { luma: Plane<'a>, chroma: Plane<'a> },
    PackedBgra8 { pixels: Plane<'a> },
}

/// Immutable view over one captured video image
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub width: usize,
    pub height: usize,
    pub planes: Planes<'a>,
}

impl<'a> Frame<'a> {
    pub fn ycbcr420(width: usize, height: usize, luma: Plane<'a>, chroma: Plane<'a>) -> Self {
        Self {
            width,
            height,
            planes: Planes::PlanarYCbCr420 { luma, chroma },
        }
    }

    pub fn bgra8(width: usize, height: usize, pixels: Plane<'a>) -> Self {
        Self {
            width,
            height,
            planes: Planes::PackedBgra8 { pixels },
        }
    }

    /// Assemble a frame from a format tag and a list of planes in capture order
    pub fn from_planes(
        format: PixelFormat,
        width: usize,
        height: usize,
        planes: &[Plane<'a>],
    ) -> Result<Self, Error> {
        let expected = format.plane_count();
        if planes.len() != expected {
            return Err(OutOfBounds::MissingPlane {
                expected,
                found: planes.len(),
            }
            .into());
        }

        Ok(match format {
            PixelFormat::PlanarYCbCr420 => Self::ycbcr420(width, height, planes[0], planes[1]),
            PixelFormat::PackedBgra8 => Self::bgra8(width, height, planes[0]),
        })
    }

    pub fn format(&self) -> PixelFormat {
        match self.planes {
            Planes::PlanarYCbCr420 { .. } => PixelFormat::PlanarYCbCr420,
            Planes::PackedBgra8 { .. } => PixelFormat::PackedBgra8,
        }
    }
}

/// Frame that owns its plane storage
#[derive(Debug, Clone)]
pub struct OwnedFrame {
    pub format: PixelFormat,
    pub width: usize,
    pub height: usize,
    /// (bytes, stride) per plane, in capture order
    pub planes: Vec<(Vec<u8>, usize)>,
}

impl OwnedFrame {
    /// Borrow as a [`Frame`]; the view cannot outlive `self`
    pub fn as_frame(&self) -> Result<Frame<'_>, Error> {
        match (self.format, self.planes.as_slice()) {
            (PixelFormat::PlanarYCbCr420, [(luma, luma_stride), (chroma, chroma_stride)]) => {
                Ok(Frame::ycbcr420(
                    self.width,
                    self.height,
                    Plane::new(luma, *luma_stride),
                    Plane::new(chroma, *chroma_stride),
                ))
            }
            (PixelFormat::PackedBgra8, [(pixels, stride)]) => Ok(Frame::bgra8(
                self.width,
                self.height,
                Plane::new(pixels, *stride),
            )),
            (format, planes) => Err(OutOfBounds::MissingPlane {
                expected: format.plane_count(),
                found: planes.len(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fourcc(tag: &[u8; 4]) -> u32 {
        u32::from_be_bytes(*tag)
    }

    #[test]
    fn test_from_fourcc() {
        assert_eq!(
            PixelFormat::from_fourcc(fourcc(b"420v")).unwrap(),
            PixelFormat::PlanarYCbCr420
        );
        assert_eq!(
            PixelFormat::from_fourcc(fourcc(b"420f")).unwrap(),
            PixelFormat::PlanarYCbCr420
        );
        assert_eq!(
            PixelFormat::from_fourcc(fourcc(b"BGRA")).unwrap(),
            PixelFormat::PackedBgra8
        );

        match PixelFormat::from_fourcc(fourcc(b"y420")) {
            Err(Error::UnsupportedFormat(tag)) => assert_eq!(tag, "y420"),
            other => panic!("unexpected: {:?}", other),
        }
        match PixelFormat::from_fourcc(0x0000_0020) {
            Err(Error::UnsupportedFormat(tag)) => assert_eq!(tag, "0x00000020"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("NV12".parse::<PixelFormat>().unwrap(), PixelFormat::PlanarYCbCr420);
        assert_eq!("bgra".parse::<PixelFormat>().unwrap(), PixelFormat::PackedBgra8);
        assert!(matches!(
            "rgb24".parse::<PixelFormat>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_from_planes_checks_count() {
        let bytes = [0u8; 16];
        let plane = Plane::new(&bytes, 8);

        let result = Frame::from_planes(PixelFormat::PlanarYCbCr420, 2, 2, &[plane]);
        assert!(matches!(
            result,
            Err(Error::OutOfBounds(OutOfBounds::MissingPlane {
                expected: 2,
                found: 1
            }))
        ));

        let frame = Frame::from_planes(PixelFormat::PackedBgra8, 2, 2, &[plane]).unwrap();
        assert_eq!(frame.format(), PixelFormat::PackedBgra8);
    }

    #[test]
    fn test_owned_frame_lends_view() {
        let owned = OwnedFrame {
            format: PixelFormat::PlanarYCbCr420,
            width: 2,
            height: 2,
            planes: vec![(vec![16; 4], 2), (vec![128; 2], 2)],
        };
        let frame = owned.as_frame().unwrap();
        assert_eq!(frame.format(), PixelFormat::PlanarYCbCr420);
        assert_eq!((frame.width, frame.height), (2, 2));
    }
}
