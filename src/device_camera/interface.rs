use crate::config::CameraSettings;
use image::RgbaImage;
use std::fmt;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct Frame {
    pub image: Arc<RgbaImage>,
    pub captured_at: Instant,
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
            captured_at: Instant::now(),
        }
    }
}

/// Frames are equal when they share the same pixel buffer.
impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image) && self.captured_at == other.captured_at
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({}x{})", self.image.width(), self.image.height())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCameraEvent {
    Started { width: u32, height: u32 },
    Frame(Frame),
    Stopped,
}

pub trait DeviceCamera {
    /// Starts capturing and returns the stream of camera events. The stream
    /// ends with `Stopped` after `stop` is called.
    fn start(
        &self,
        settings: &CameraSettings,
    ) -> Result<Receiver<DeviceCameraEvent>, Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
