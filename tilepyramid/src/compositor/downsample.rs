//! Half-resolution downsampling.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// Scales `source` to exactly `half × half` pixels.
///
/// A source of `2·half × 2·half` is reduced with an exact 2×2 area
/// average. Any other size is first resized to `2·half` with a triangle
/// filter and then averaged, so the result is deterministic for a given
/// input either way.
pub fn downsample_half(source: &RgbImage, half: u32) -> RgbImage {
    let full = half * 2;
    if source.width() == full && source.height() == full {
        return downsample_box_2x(source);
    }

    let resized = imageops::resize(source, full, full, FilterType::Triangle);
    downsample_box_2x(&resized)
}

/// Downsample image by 2× using a box filter (rounded average).
///
/// Each output pixel is the average of a 2×2 block of input pixels.
pub fn downsample_box_2x(source: &RgbImage) -> RgbImage {
    let new_width = source.width() / 2;
    let new_height = source.height() / 2;

    RgbImage::from_fn(new_width, new_height, |x, y| {
        let p00 = source.get_pixel(x * 2, y * 2);
        let p10 = source.get_pixel(x * 2 + 1, y * 2);
        let p01 = source.get_pixel(x * 2, y * 2 + 1);
        let p11 = source.get_pixel(x * 2 + 1, y * 2 + 1);

        let avg = |c: usize| {
            let sum = p00[c] as u16 + p10[c] as u16 + p01[c] as u16 + p11[c] as u16;
            ((sum + 2) / 4) as u8
        };

        Rgb([avg(0), avg(1), avg(2)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downsample_256_to_128() {
        let source = RgbImage::new(256, 256);
        let downsampled = downsample_half(&source, 128);

        assert_eq!(downsampled.dimensions(), (128, 128));
    }

    #[test]
    fn test_solid_color_is_preserved() {
        let source = RgbImage::from_pixel(8, 8, Rgb([200, 10, 30]));
        let downsampled = downsample_box_2x(&source);

        assert!(downsampled.pixels().all(|p| *p == Rgb([200, 10, 30])));
    }

    #[test]
    fn test_checkerboard_averages_to_grey() {
        let source = RgbImage::from_fn(4, 4, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });

        let downsampled = downsample_box_2x(&source);

        // (0 + 255 + 255 + 0 + 2) / 4 = 128
        assert!(downsampled.pixels().all(|p| *p == Rgb([128, 128, 128])));
    }

    #[test]
    fn test_block_average_per_pixel() {
        let mut source = RgbImage::new(2, 2);
        source.put_pixel(0, 0, Rgb([10, 0, 0]));
        source.put_pixel(1, 0, Rgb([20, 0, 0]));
        source.put_pixel(0, 1, Rgb([30, 0, 0]));
        source.put_pixel(1, 1, Rgb([40, 0, 0]));

        let downsampled = downsample_box_2x(&source);

        assert_eq!(*downsampled.get_pixel(0, 0), Rgb([25, 0, 0]));
    }

    #[test]
    fn test_non_canonical_size_is_resized() {
        let source = RgbImage::from_pixel(100, 60, Rgb([50, 60, 70]));
        let downsampled = downsample_half(&source, 16);

        assert_eq!(downsampled.dimensions(), (16, 16));
        for p in downsampled.pixels() {
            assert!((p[0] as i16 - 50).abs() <= 1);
            assert!((p[1] as i16 - 60).abs() <= 1);
            assert!((p[2] as i16 - 70).abs() <= 1);
        }
    }
}
