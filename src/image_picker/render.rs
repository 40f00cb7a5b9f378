use crate::device_display::interface::DeviceDisplay;
use crate::image_picker::core::{Event, State};
use crate::library::logger::interface::Logger;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

pub struct Render {
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    logger: Arc<dyn Logger + Send + Sync>,
    written_status: Mutex<Option<String>>,
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
            written_status: Mutex::new(None),
            first_frame: Mutex::new(None),
        }
    }

    pub fn notify_first_frame(&self, sender: Sender<Event>) {
        *self
            .first_frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(sender);
    }

    /// Only the status label is state-driven; pictures and messages are effects.
    pub fn render(&self, state: &State) {
        let mut written = self
            .written_status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if written.as_deref() != Some(state.status.as_str()) {
            let result = self
                .device_display
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .write_status(&state.status);

            if let Err(e) = result {
                let _ = self.logger.error(&format!("Failed to render: {}", e));
                return;
            }
            *written = Some(state.status.clone());
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
}
