//! Image processing for synthetic capture
//!
//! - Resize source images to the capture resolution
//! - Encode RGB images into the raw layouts a camera delivers:
//!   packed BGRA or bi-planar YCbCr 4:2:0 (NV12), rows padded like capture buffers

use colorpixel_core::{OwnedFrame, PixelFormat};
use image::{DynamicImage, GenericImageView, RgbImage};

use crate::error::AppError;

/// Capture buffers pad each row to a multiple of this many bytes
const ROW_ALIGNMENT: usize = 16;

/// Decode an image file
pub fn load_image(path: &std::path::Path) -> Result<DynamicImage, AppError> {
    image::open(path).map_err(|e| {
        AppError::Capture(format!("Failed to decode image {}: {}", path.display(), e))
    })
}

/// Resize image to cover the target area (fill, then center crop the overflow)
/// Returns an image of exactly target_width x target_height
pub fn resize_cover(img: &DynamicImage, target_width: u32, target_height: u32) -> RgbImage {
    let (src_width, src_height) = img.dimensions();

    // Calculate scale to cover the target area (larger of the two scales)
    let scale_x = target_width as f32 / src_width as f32;
    let scale_y = target_height as f32 / src_height as f32;
    let scale = scale_x.max(scale_y);

    let new_width = ((src_width as f32 * scale).round() as u32).max(target_width);
    let new_height = ((src_height as f32 * scale).round() as u32).max(target_height);

    let resized = img
        .resize_exact(new_width, new_height, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let crop_x = (new_width - target_width) / 2;
    let crop_y = (new_height - target_height) / 2;

    image::imageops::crop_imm(&resized, crop_x, crop_y, target_width, target_height).to_image()
}

/// Encode an RGB image into a raw frame of the given layout
pub fn encode_frame(img: &RgbImage, format: PixelFormat) -> OwnedFrame {
    match format {
        PixelFormat::PackedBgra8 => encode_bgra8(img),
        PixelFormat::PlanarYCbCr420 => encode_ycbcr420(img),
    }
}

fn padded_stride(row_bytes: usize) -> usize {
    row_bytes.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT
}

fn encode_bgra8(img: &RgbImage) -> OwnedFrame {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let stride = padded_stride(width * 4);
    let mut data = vec![0u8; stride * height];

    for (x, y, pixel) in img.enumerate_pixels() {
        let o = y as usize * stride + x as usize * 4;
        let [r, g, b] = pixel.0;
        data[o..o + 4].copy_from_slice(&[b, g, r, 0xFF]);
    }

    OwnedFrame {
        format: PixelFormat::PackedBgra8,
        width,
        height,
        planes: vec![(data, stride)],
    }
}

fn encode_ycbcr420(img: &RgbImage) -> OwnedFrame {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let luma_stride = padded_stride(width);
    let chroma_width = width.div_ceil(2);
    let chroma_height = height.div_ceil(2);
    let chroma_stride = padded_stride(chroma_width * 2);

    let mut luma = vec![0u8; luma_stride * height];
    let mut chroma = vec![128u8; chroma_stride * chroma_height];

    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        luma[y as usize * luma_stride + x as usize] = rgb_to_ycbcr(r, g, b).0;
    }

    // Each chroma pair averages the (up to) four pixels of its 2x2 block
    for cy in 0..chroma_height {
        for cx in 0..chroma_width {
            let (mut sum_cb, mut sum_cr, mut count) = (0.0_f32, 0.0_f32, 0.0_f32);
            for y in (cy * 2)..(cy * 2 + 2).min(height) {
                for x in (cx * 2)..(cx * 2 + 2).min(width) {
                    let [r, g, b] = img.get_pixel(x as u32, y as u32).0;
                    let (_, cb, cr) = rgb_to_ycbcr(r, g, b);
                    sum_cb += cb as f32;
                    sum_cr += cr as f32;
                    count += 1.0;
                }
            }
            let o = cy * chroma_stride + cx * 2;
            chroma[o] = (sum_cb / count).round() as u8;
            chroma[o + 1] = (sum_cr / count).round() as u8;
        }
    }

    OwnedFrame {
        format: PixelFormat::PlanarYCbCr420,
        width,
        height,
        planes: vec![(luma, luma_stride), (chroma, chroma_stride)],
    }
}

/// BT.601 full-range RGB to YCbCr, the inverse of the sampler's matrix
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (r as f32, g as f32, b as f32);

    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = 128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b;

    let to_byte = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    (to_byte(y), to_byte(cb), to_byte(cr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorpixel_core::{NormalizedPoint, RgbColor};
    use image::Rgb;

    #[test]
    fn test_rgb_to_ycbcr_gray_and_primaries() {
        assert_eq!(rgb_to_ycbcr(128, 128, 128), (128, 128, 128));
        assert_eq!(rgb_to_ycbcr(0, 0, 0), (0, 128, 128));
        assert_eq!(rgb_to_ycbcr(255, 255, 255), (255, 128, 128));

        let (_, cb, cr) = rgb_to_ycbcr(255, 0, 0);
        assert!(cr > 250 && cb < 90);
    }

    #[test]
    fn test_bgra_frame_is_exact() {
        let img = RgbImage::from_fn(5, 3, |x, y| Rgb([x as u8 * 40, y as u8 * 60, 7]));
        let owned = encode_frame(&img, PixelFormat::PackedBgra8);
        assert_eq!(owned.planes[0].1, 32);

        let frame = owned.as_frame().unwrap();
        let color = frame.sample(NormalizedPoint::new(0.99, 0.5)).unwrap();
        assert_eq!(color, RgbColor::from_bytes(160, 60, 7));
    }

    #[test]
    fn test_ycbcr_frame_decodes_close_to_source() {
        let img = RgbImage::from_pixel(6, 4, Rgb([30, 144, 255]));
        let owned = encode_frame(&img, PixelFormat::PlanarYCbCr420);
        assert_eq!(owned.planes[0].1, 16);
        assert_eq!(owned.planes[1].1, 16);

        let frame = owned.as_frame().unwrap();
        let color = frame.sample(NormalizedPoint::new(0.5, 0.5)).unwrap();
        let source = RgbColor::from_bytes(30, 144, 255);
        assert!(color.distance(&source) < 0.03, "decoded {:?}", color);
    }

    #[test]
    fn test_chroma_averages_block() {
        // Left column red, right column blue: one shared 2x2 chroma block
        let img = RgbImage::from_fn(2, 2, |x, _| {
            if x == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let owned = encode_frame(&img, PixelFormat::PlanarYCbCr420);
        let (_, cb_red, cr_red) = rgb_to_ycbcr(255, 0, 0);
        let (_, cb_blue, cr_blue) = rgb_to_ycbcr(0, 0, 255);

        let chroma = &owned.planes[1].0;
        assert_eq!(chroma[0], ((cb_red as f32 + cb_blue as f32) / 2.0).round() as u8);
        assert_eq!(chroma[1], ((cr_red as f32 + cr_blue as f32) / 2.0).round() as u8);
    }

    #[test]
    fn test_resize_cover_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([1, 2, 3])));
        let out = resize_cover(&img, 40, 40);
        assert_eq!(out.dimensions(), (40, 40));
        assert_eq!(out.get_pixel(20, 20), &Rgb([1, 2, 3]));
    }
}
