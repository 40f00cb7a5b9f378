use crate::device_photos::interface::DevicePhotos;
use crate::image_uri::ImageUri;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct DevicePhotosFake {
    pub chosen: Option<ImageUri>,
    pub camera_app: bool,
    pub capture_succeeds: bool,
    pub destination_dir: String,
    /// How long the user takes to pick from the gallery.
    pub pick_delay: Duration,
    captures: Arc<AtomicUsize>,
}

impl DevicePhotosFake {
    pub fn new() -> Self {
        Self {
            chosen: None,
            camera_app: true,
            capture_succeeds: true,
            destination_dir: "/photos".to_string(),
            pick_delay: Duration::ZERO,
            captures: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_chosen(mut self, uri: ImageUri) -> Self {
        self.chosen = Some(uri);
        self
    }

    pub fn with_pick_delay(mut self, delay: Duration) -> Self {
        self.pick_delay = delay;
        self
    }

    pub fn without_camera_app(mut self) -> Self {
        self.camera_app = false;
        self
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

impl Default for DevicePhotosFake {
    fn default() -> Self {
        Self::new()
    }
}

impl DevicePhotos for DevicePhotosFake {
    fn choose_image(&self) -> Result<Option<ImageUri>, Box<dyn std::error::Error + Send + Sync>> {
        if !self.pick_delay.is_zero() {
            std::thread::sleep(self.pick_delay);
        }
        Ok(self.chosen.clone())
    }

    fn has_camera_app(&self) -> bool {
        self.camera_app
    }

    fn photo_destination(
        &self,
        file_name: &str,
    ) -> Result<ImageUri, Box<dyn std::error::Error + Send + Sync>> {
        Ok(ImageUri::new(format!(
            "file://{}/{}",
            self.destination_dir, file_name
        )))
    }

    fn capture_photo(
        &self,
        _destination: &ImageUri,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(self.capture_succeeds)
    }
}
