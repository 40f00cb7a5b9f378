use crate::image_loader::interface::ImageLoader;
use crate::image_uri::ImageUri;
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use std::sync::Arc;

pub struct ImageLoaderFile {
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageLoaderFile {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_loader").with_namespace("file"),
        }
    }
}

impl ImageLoader for ImageLoaderFile {
    fn load(&self, uri: &ImageUri) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>> {
        let path = uri
            .to_path()
            .ok_or_else(|| format!("unsupported image uri: {}", uri))?;

        self.logger.info(&format!("Loading {}", path.display()))?;
        let image = image::open(&path)?;
        self.logger.info(&format!(
            "Loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        ))?;

        Ok(image)
    }
}
