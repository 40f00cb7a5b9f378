use crate::image_classifier::interface::ClassificationError;
use image::DynamicImage;
use tract_onnx::prelude::*;

/// NCHW tensor with every channel normalized as `(value - mean) / std`.
pub fn image_to_tensor(
    image: &DynamicImage,
    mean: f32,
    std: f32,
) -> Result<Tensor, ClassificationError> {
    if std == 0.0 {
        return Err(ClassificationError::Preprocess(
            "channel std must not be zero".to_string(),
        ));
    }

    let rgb = image.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    let tensor = tract_ndarray::Array4::from_shape_fn((1, 3, height, width), |(_, c, y, x)| {
        let pixel = rgb.get_pixel(x as u32, y as u32);
        (pixel[c] as f32 - mean) / std
    });

    Ok(tensor.into_tensor())
}
