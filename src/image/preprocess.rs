//! Conversion of decoded images into model input tensors.

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

use super::{InputTensor, RGB_CHANNELS};

/// Convert a decoded image into a normalized NHWC input tensor.
///
/// The image is:
/// 1. Resized to exactly `size` x `size` with bilinear filtering (aspect
///    ratio is not preserved; the model expects a fixed square input)
/// 2. Converted to RGB if necessary
/// 3. Normalized from [0, 255] to [0, 1]
/// 4. Returned as an NHWC tensor (1, size, size, 3), so the flat element
///    order is row-major pixels with R,G,B interleaved
///
/// Deterministic: the same image and size always produce the same tensor.
#[allow(clippy::cast_possible_truncation)]
pub fn preprocess(img: &DynamicImage, size: u32) -> InputTensor {
    let resized = img.resize_exact(size, size, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let side = size as usize;
    let mut tensor = Array4::<f32>::zeros((1, side, side, RGB_CHANNELS));

    for y in 0..side {
        for x in 0..side {
            // Safe: x and y are bounded by `size` which fits in u32
            let pixel = rgb.get_pixel(x as u32, y as u32);
            tensor[[0, y, x, 0]] = f32::from(pixel[0]) / 255.0;
            tensor[[0, y, x, 1]] = f32::from(pixel[1]) / 255.0;
            tensor[[0, y, x, 2]] = f32::from(pixel[2]) / 255.0;
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_tensor_shape() {
        let img = gradient_image(100, 60);
        let tensor = preprocess(&img, 224);

        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert_eq!(tensor.len(), 224 * 224 * 3);
        assert_eq!(tensor.len() * std::mem::size_of::<f32>(), 224 * 224 * 3 * 4);
    }

    #[test]
    fn test_shape_follows_requested_size() {
        let img = gradient_image(640, 480);
        let tensor = preprocess(&img, 64);

        assert_eq!(tensor.shape(), &[1, 64, 64, 3]);
    }

    #[test]
    fn test_normalization_range() {
        let img = gradient_image(300, 300);
        let tensor = preprocess(&img, 128);

        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_white_image_is_all_ones() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([255, 255, 255])));
        let tensor = preprocess(&img, 32);

        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_channel_interleaving() {
        // Pure red source: every pixel must land as (1, 0, 0) in R,G,B order.
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([255, 0, 0])));
        let tensor = preprocess(&img, 8);

        let flat = tensor.as_slice().unwrap();
        for rgb in flat.chunks_exact(3) {
            assert_eq!(rgb, &[1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_deterministic() {
        let img = gradient_image(123, 77);
        let a = preprocess(&img, 224);
        let b = preprocess(&img, 224);

        assert_eq!(a, b);
    }
}
