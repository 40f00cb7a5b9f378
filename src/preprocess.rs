use crate::image_classifier::interface::ClassificationError;
use image::buffer::ConvertBuffer;
use image::{imageops, DynamicImage, RgbImage, RgbaImage};

/// Scales to exactly `size x size`. Width and height get independent factors,
/// so the aspect ratio is not kept.
pub fn scale_bitmap(image: &DynamicImage, size: u32) -> Result<DynamicImage, ClassificationError> {
    if image.width() == 0 || image.height() == 0 || size == 0 {
        return Err(ClassificationError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }

    if image.width() == size && image.height() == size {
        return Ok(image.clone());
    }

    Ok(image.resize_exact(size, size, imageops::FilterType::Triangle))
}

/// RGBA camera frame to the RGB working colorspace.
pub fn frame_to_rgb(frame: &RgbaImage) -> RgbImage {
    frame.convert()
}

pub fn frame_to_bitmap(frame: &RgbaImage) -> DynamicImage {
    DynamicImage::ImageRgb8(frame_to_rgb(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([10, 20, 30])))
    }

    #[test]
    fn test_scale_always_yields_target_size() {
        for (width, height) in [(1, 1), (640, 480), (100, 1000), (224, 224), (3000, 7)] {
            let scaled = scale_bitmap(&solid(width, height), 224).unwrap();
            assert_eq!((scaled.width(), scaled.height()), (224, 224));
        }
    }

    #[test]
    fn test_scale_is_non_uniform() {
        // Left half red, right half blue, on a wide image.
        let image = ImageBuffer::from_fn(400, 100, |x, _| {
            if x < 200 {
                Rgb([255u8, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let scaled = scale_bitmap(&DynamicImage::ImageRgb8(image), 224)
            .unwrap()
            .to_rgb8();

        // The split stays in the middle of the width and spans the full height.
        assert_eq!(scaled.get_pixel(10, 0), &Rgb([255, 0, 0]));
        assert_eq!(scaled.get_pixel(10, 223), &Rgb([255, 0, 0]));
        assert_eq!(scaled.get_pixel(213, 112), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_scale_rejects_empty_image() {
        let result = scale_bitmap(&DynamicImage::new_rgb8(0, 10), 224);
        assert_eq!(
            result.unwrap_err(),
            ClassificationError::EmptyImage {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn test_frame_to_rgb_drops_alpha() {
        let frame = RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 4]));
        let rgb = frame_to_rgb(&frame);
        assert_eq!((rgb.width(), rgb.height()), (4, 2));
        assert!(rgb.pixels().all(|p| *p == Rgb([1, 2, 3])));
    }
}
