use crate::config::CameraSettings;
use crate::device_camera::interface::{DeviceCamera, DeviceCameraEvent, Frame};
use crate::library::logger::interface::Logger;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

/// Replays the images of a directory, in file name order and on a loop, as a
/// continuous camera stream.
pub struct DeviceCameraImageDirectory {
    directory: PathBuf,
    logger: Arc<dyn Logger + Send + Sync>,
    running: Arc<AtomicBool>,
}

impl DeviceCameraImageDirectory {
    pub fn new(directory: impl Into<PathBuf>, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            directory: directory.into(),
            logger: logger.with_namespace("camera").with_namespace("image_directory"),
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

pub fn list_images(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

impl DeviceCamera for DeviceCameraImageDirectory {
    fn start(
        &self,
        settings: &CameraSettings,
    ) -> Result<Receiver<DeviceCameraEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let paths = list_images(&self.directory)?;
        if paths.is_empty() {
            return Err(format!("no images in {}", self.directory.display()).into());
        }

        let first = image::open(&paths[0])?;
        let (width, height) = (first.width(), first.height());

        self.logger.info(&format!(
            "Replaying {} images from {} ({}x{})",
            paths.len(),
            self.directory.display(),
            width,
            height
        ))?;

        let (tx, rx) = std::sync::mpsc::channel();
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);
        let interval = settings.frame_interval;
        let logger = Arc::clone(&self.logger);

        std::thread::spawn(move || {
            if tx.send(DeviceCameraEvent::Started { width, height }).is_err() {
                return;
            }

            for path in paths.iter().cycle() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                match image::open(path) {
                    Ok(image) => {
                        let frame = Frame::new(image.to_rgba8());
                        if tx.send(DeviceCameraEvent::Frame(frame)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = logger.error(&format!("Skipping {}: {}", path.display(), e));
                    }
                }

                std::thread::sleep(interval);
            }

            let _ = tx.send(DeviceCameraEvent::Stopped);
        });

        Ok(rx)
    }

    fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info("Stopping replay")?;
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}
