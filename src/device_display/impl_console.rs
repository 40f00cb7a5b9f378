use crate::device_display::interface::DeviceDisplay;
use image::{DynamicImage, RgbaImage};
use std::error::Error;

const WIDTH: usize = 48;

pub struct DeviceDisplayConsole {
    status: String,
    overlay: String,
    image_size: Option<(u32, u32)>,
}

impl DeviceDisplayConsole {
    pub fn new() -> Self {
        Self {
            status: String::new(),
            overlay: String::new(),
            image_size: None,
        }
    }

    fn announce_size(&mut self, width: u32, height: u32) {
        if self.image_size != Some((width, height)) {
            self.image_size = Some((width, height));
            println!("[picture {}x{}]", width, height);
        }
    }

    fn render_display(&self) {
        println!("┌{}┐", "─".repeat(WIDTH));
        for line in wrap(&self.status, WIDTH) {
            println!("│{:<width$}│", line, width = WIDTH);
        }
        if !self.overlay.is_empty() {
            println!("│{:>width$}│", truncate(&self.overlay, WIDTH), width = WIDTH);
        }
        println!("└{}┘", "─".repeat(WIDTH));
    }
}

impl Default for DeviceDisplayConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&truncate(word, width));
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.render_display();
        Ok(())
    }

    fn write_status(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.status = text.to_string();
        self.render_display();
        Ok(())
    }

    fn write_overlay(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        // Redrawing for every fps tick would flood the terminal.
        self.overlay = text.to_string();
        Ok(())
    }

    fn show_message(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!(">> {}", text);
        Ok(())
    }

    fn show_image(&mut self, image: &DynamicImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.announce_size(image.width(), image.height());
        Ok(())
    }

    fn show_frame(&mut self, frame: &RgbaImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        // Preview frames repeat at the camera rate; only announce a new size.
        self.announce_size(frame.width(), frame.height());
        Ok(())
    }
}
