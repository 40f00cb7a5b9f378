use crate::device_photos::interface::DevicePhotos;
use crate::image_uri::ImageUri;
use crate::library::logger::interface::Logger;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// File dialog for the gallery and an external capture command (for example
/// `fswebcam <path>`) for the camera.
pub struct DevicePhotosDesktop {
    cache_dir: PathBuf,
    capture_command: String,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DevicePhotosDesktop {
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        capture_command: &str,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            capture_command: capture_command.to_string(),
            logger: logger.with_namespace("photos").with_namespace("desktop"),
        }
    }

    fn resolve_capture_command(&self) -> Option<PathBuf> {
        find_in_path(&self.capture_command, std::env::var_os("PATH").as_deref())
    }
}

pub fn find_in_path(command: &str, path_var: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }

    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    std::env::split_paths(path_var?)
        .map(|dir| dir.join(command))
        .find(|path| path.is_file())
}

impl DevicePhotos for DevicePhotosDesktop {
    fn choose_image(&self) -> Result<Option<ImageUri>, Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info("Opening image picker")?;

        let picked = rfd::FileDialog::new()
            .set_title("Choose a picture")
            .add_filter("image", &["png", "jpg", "jpeg", "bmp", "webp", "gif"])
            .pick_file();

        Ok(picked.map(|path| ImageUri::from_path(&path)))
    }

    fn has_camera_app(&self) -> bool {
        self.resolve_capture_command().is_some()
    }

    fn photo_destination(
        &self,
        file_name: &str,
    ) -> Result<ImageUri, Box<dyn std::error::Error + Send + Sync>> {
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(ImageUri::from_path(&self.cache_dir.join(file_name)))
    }

    fn capture_photo(
        &self,
        destination: &ImageUri,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let command = self
            .resolve_capture_command()
            .ok_or_else(|| format!("{} not found", self.capture_command))?;
        let path = destination
            .to_path()
            .ok_or_else(|| format!("cannot write photo to {}", destination))?;

        self.logger.info(&format!(
            "Running {} {}",
            command.display(),
            path.display()
        ))?;
        let status = Command::new(&command).arg(&path).status()?;

        Ok(status.success() && path.is_file())
    }
}
