use crate::image_uri::ImageUri;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

/// What the picker keeps across being torn down and recreated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    /// Where the camera application was asked to write its photo.
    pub pending_photo_uri: Option<ImageUri>,
}

impl SavedState {
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Option<Self>, Box<dyn Error + Send + Sync>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Loads the saved state and removes it, so it is restored only once.
    pub fn take(path: &Path) -> Result<Option<Self>, Box<dyn Error + Send + Sync>> {
        let saved = Self::load(path)?;
        if saved.is_some() {
            std::fs::remove_file(path)?;
        }
        Ok(saved)
    }
}
