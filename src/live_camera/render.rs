use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use crate::live_camera::core::{Event, State};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Written {
    status: Option<String>,
    overlay: Option<String>,
}

pub struct Render {
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    logger: Arc<dyn Logger + Send + Sync>,
    written: Mutex<Written>,
    first_frame: Mutex<Option<Sender<Event>>>,
}

impl Render {
    pub fn new(
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            device_display,
            logger: logger.with_namespace("render"),
            written: Mutex::new(Written::default()),
            first_frame: Mutex::new(None),
        }
    }

    /// `sender` receives `FirstFrameRendered` once the display has been
    /// written to for the first time.
    pub fn notify_first_frame(&self, sender: Sender<Event>) {
        *self
            .first_frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(sender);
    }

    pub fn render(&self, state: &State) {
        if let Err(e) = self.write(state) {
            let _ = self.logger.error(&format!("Failed to render: {}", e));
            return;
        }

        let first_frame = self
            .first_frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(sender) = first_frame {
            let _ = sender.send(Event::FirstFrameRendered);
        }
    }

    fn write(&self, state: &State) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut written = self
            .written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut device_display = self
            .device_display
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if written.status.as_deref() != Some(state.status.as_str()) {
            device_display.write_status(&state.status)?;
            written.status = Some(state.status.clone());
        }

        let overlay = state.overlay();
        if written.overlay.as_deref() != Some(overlay.as_str()) {
            device_display.write_overlay(&overlay)?;
            written.overlay = Some(overlay);
        }

        Ok(())
    }
}
