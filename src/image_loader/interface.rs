use crate::image_uri::ImageUri;
use image::DynamicImage;

pub trait ImageLoader {
    fn load(&self, uri: &ImageUri) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>>;
}
