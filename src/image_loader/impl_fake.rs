use crate::image_loader::interface::ImageLoader;
use crate::image_uri::ImageUri;
use image::DynamicImage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves images registered up front, then the default image if one is set.
/// Any other uri fails to load.
#[derive(Clone, Default)]
pub struct ImageLoaderFake {
    images: HashMap<ImageUri, DynamicImage>,
    default_image: Option<DynamicImage>,
    loaded: Arc<Mutex<Vec<ImageUri>>>,
}

impl ImageLoaderFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, uri: ImageUri, image: DynamicImage) -> Self {
        self.images.insert(uri, image);
        self
    }

    pub fn with_default(mut self, image: DynamicImage) -> Self {
        self.default_image = Some(image);
        self
    }

    pub fn loaded(&self) -> Vec<ImageUri> {
        self.loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ImageLoader for ImageLoaderFake {
    fn load(&self, uri: &ImageUri) -> Result<DynamicImage, Box<dyn std::error::Error + Send + Sync>> {
        self.loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(uri.clone());

        self.images
            .get(uri)
            .or(self.default_image.as_ref())
            .cloned()
            .ok_or_else(|| format!("cannot decode {}", uri).into())
    }
}
