use image::{DynamicImage, RgbaImage};
use std::error::Error;

/// Output side of a screen: the status label, an overlay line, transient
/// messages and the picture (or camera preview) view.
pub trait DeviceDisplay: Send + Sync {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Replace the status label text.
    fn write_status(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Replace the overlay line (fps meter). An empty string hides it.
    fn write_overlay(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Short-lived message, shown on top of everything else.
    fn show_message(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn show_image(&mut self, image: &DynamicImage) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Camera preview frame, borrowed straight from the camera buffer.
    fn show_frame(&mut self, frame: &RgbaImage) -> Result<(), Box<dyn Error + Send + Sync>>;
}
