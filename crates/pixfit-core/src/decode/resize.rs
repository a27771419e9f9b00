//! Image resampling for width capping and budget-driven shrinking.
//!
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target dimension is
/// zero, and `DecodeError::CorruptedFile` if the pixel buffer does not match
/// the source dimensions.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let view = image
        .as_rgb_view()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&view, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Scale an image down so its width is at most `max_width`, preserving the
/// aspect ratio. Images already narrow enough are returned unchanged; there
/// is no upscaling.
pub fn scale_to_max_width(
    image: &DecodedImage,
    max_width: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    let (width, height) = fit_to_width_dimensions(image.width, image.height, max_width);
    resize(image, width, height, filter)
}

/// Dimensions after capping width at `max_width`.
///
/// `new_height = height * max_width / width`, rounded, never below 1.
pub fn fit_to_width_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }

    let new_height = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, new_height.max(1))
}

/// Dimensions after multiplying both sides by `factor`, rounded, never below 1.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let scale = |side: u32| ((side as f64 * factor).round() as u32).max(1);
    (scale(width), scale(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 50);
        assert_eq!(resized.height, 25);
        assert_eq!(resized.pixels.len(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(matches!(
            resize(&img, 0, 50, FilterType::Bilinear),
            Err(DecodeError::InvalidDimensions { .. })
        ));
        assert!(resize(&img, 50, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_resize_mismatched_buffer() {
        let img = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0u8; 3],
        };
        assert!(matches!(
            resize(&img, 5, 5, FilterType::Bilinear),
            Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_scale_to_max_width_wide_image() {
        let img = create_test_image(2000, 1000);
        let scaled = scale_to_max_width(&img, 800, FilterType::Bilinear).unwrap();

        assert_eq!((scaled.width, scaled.height), (800, 400));
    }

    #[test]
    fn test_scale_to_max_width_narrow_image_unchanged() {
        let img = create_test_image(300, 600);
        let scaled = scale_to_max_width(&img, 800, FilterType::Bilinear).unwrap();

        assert_eq!((scaled.width, scaled.height), (300, 600));
        assert_eq!(scaled.pixels, img.pixels);
    }

    #[test]
    fn test_fit_to_width_dimensions() {
        assert_eq!(fit_to_width_dimensions(2000, 1000, 800), (800, 400));
        assert_eq!(fit_to_width_dimensions(6000, 4000, 2560), (2560, 1707));
        assert_eq!(fit_to_width_dimensions(800, 4000, 800), (800, 4000));
        assert_eq!(fit_to_width_dimensions(5000, 1, 800), (800, 1));
        assert_eq!(fit_to_width_dimensions(0, 0, 800), (0, 0));
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(800, 400, 0.5), (400, 200));
        assert_eq!(scaled_dimensions(800, 400, 0.001), (1, 1));
        assert_eq!(scaled_dimensions(3, 3, 1.0), (3, 3));
    }

    #[test]
    fn test_all_filter_types() {
        let img = create_test_image(100, 50);

        for filter in [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::Lanczos3,
        ] {
            let resized = resize(&img, 50, 25, filter).unwrap();
            assert_eq!((resized.width, resized.height), (50, 25));
        }
    }
}
