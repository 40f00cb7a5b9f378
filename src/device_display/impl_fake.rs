use crate::device_display::interface::DeviceDisplay;
use image::{DynamicImage, RgbaImage};
use std::error::Error;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Init,
    Status(String),
    Overlay(String),
    Message(String),
    Image { width: u32, height: u32 },
    Frame { width: u32, height: u32 },
}

/// Records every call; clones share the same history.
#[derive(Clone, Default)]
pub struct DeviceDisplayFake {
    calls: Arc<Mutex<Vec<DisplayCall>>>,
}

impl DeviceDisplayFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DisplayCall::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DisplayCall::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DisplayCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(DisplayCall::Init);
        Ok(())
    }

    fn write_status(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(DisplayCall::Status(text.to_string()));
        Ok(())
    }

    fn write_overlay(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(DisplayCall::Overlay(text.to_string()));
        Ok(())
    }

    fn show_message(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(DisplayCall::Message(text.to_string()));
        Ok(())
    }

    fn show_image(&mut self, image: &DynamicImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(DisplayCall::Image {
            width: image.width(),
            height: image.height(),
        });
        Ok(())
    }

    fn show_frame(&mut self, frame: &RgbaImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(DisplayCall::Frame {
            width: frame.width(),
            height: frame.height(),
        });
        Ok(())
    }
}
