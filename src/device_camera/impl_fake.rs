use crate::config::CameraSettings;
use crate::device_camera::interface::{DeviceCamera, DeviceCameraEvent, Frame};
use crate::library::logger::interface::Logger;
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    width: u32,
    height: u32,
    max_frames: Option<usize>,
    running: Arc<AtomicBool>,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            width: 320,
            height: 240,
            max_frames: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Stops emitting frames after `max_frames`, the stream stays open until `stop`.
    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }
}

fn noise_frame(width: u32, height: u32) -> RgbaImage {
    let shade: u8 = rand::random();
    RgbaImage::from_fn(width, height, |x, y| {
        let jitter: u8 = rand::random::<u8>() / 8;
        Rgba([
            shade.wrapping_add(jitter),
            (x % 256) as u8,
            (y % 256) as u8,
            255,
        ])
    })
}

impl DeviceCamera for DeviceCameraFake {
    fn start(
        &self,
        settings: &CameraSettings,
    ) -> Result<Receiver<DeviceCameraEvent>, Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info(&format!(
            "Starting camera {} at {}x{}...",
            settings.camera_index, self.width, self.height
        ))?;

        let (tx, rx) = std::sync::mpsc::channel();
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        let (width, height) = (self.width, self.height);
        let interval = settings.frame_interval;
        let max_frames = self.max_frames;

        std::thread::spawn(move || {
            if tx.send(DeviceCameraEvent::Started { width, height }).is_err() {
                return;
            }

            let mut emitted = 0usize;
            while running.load(Ordering::SeqCst) {
                if max_frames.map_or(true, |max| emitted < max) {
                    let frame = Frame::new(noise_frame(width, height));
                    if tx.send(DeviceCameraEvent::Frame(frame)).is_err() {
                        return;
                    }
                    emitted += 1;
                }
                std::thread::sleep(interval);
            }

            let _ = tx.send(DeviceCameraEvent::Stopped);
        });

        Ok(rx)
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info("Stopping camera...")?;
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}
