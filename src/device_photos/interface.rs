use crate::image_uri::ImageUri;

/// The platform side of picking and taking photos.
pub trait DevicePhotos {
    /// Asks the user for an existing image. `None` means the user cancelled.
    fn choose_image(&self) -> Result<Option<ImageUri>, Box<dyn std::error::Error + Send + Sync>>;

    /// Whether some camera application can take a photo for us.
    fn has_camera_app(&self) -> bool;

    /// Destination for a new photo, readable by the camera application.
    fn photo_destination(
        &self,
        file_name: &str,
    ) -> Result<ImageUri, Box<dyn std::error::Error + Send + Sync>>;

    /// Lets the camera application write a photo to `destination`. Returns
    /// `false` when the user backed out without taking one.
    fn capture_photo(
        &self,
        destination: &ImageUri,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
