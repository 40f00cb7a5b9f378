use crate::device_display::interface::DeviceDisplay;
use image::{DynamicImage, RgbaImage};
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

const MESSAGE_DURATION: Duration = Duration::from_secs(2);

#[derive(Default)]
struct DisplayContent {
    status: String,
    overlay: String,
    message: Option<(String, Instant)>,
    pending_image: Option<egui::ColorImage>,
}

struct DisplayWindow {
    content: Arc<Mutex<DisplayContent>>,
    texture: Option<egui::TextureHandle>,
}

fn lock(content: &Mutex<DisplayContent>) -> MutexGuard<'_, DisplayContent> {
    content
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl eframe::App for DisplayWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (status, overlay, message) = {
            let mut content = lock(&self.content);

            if let Some(image) = content.pending_image.take() {
                self.texture = Some(ctx.load_texture("picture", image, Default::default()));
            }
            if content
                .message
                .as_ref()
                .is_some_and(|(_, shown_at)| shown_at.elapsed() > MESSAGE_DURATION)
            {
                content.message = None;
            }

            (
                content.status.clone(),
                content.overlay.clone(),
                content.message.as_ref().map(|(text, _)| text.clone()),
            )
        };

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(egui::RichText::new(status).monospace().size(16.0));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if !overlay.is_empty() {
                ui.label(
                    egui::RichText::new(overlay)
                        .monospace()
                        .color(egui::Color32::from_rgb(0, 200, 0)),
                );
            }

            if let Some(texture) = &self.texture {
                let available = ui.available_size();
                let size = texture.size_vec2();
                let scale = (available.x / size.x).min(available.y / size.y).min(1.0);
                ui.image((texture.id(), size * scale));
            }

            if let Some(message) = message {
                ui.label(
                    egui::RichText::new(message)
                        .strong()
                        .background_color(egui::Color32::from_gray(40))
                        .color(egui::Color32::WHITE),
                );
            }
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

/// Clones share the same window content, so one clone can be handed to a
/// screen while another runs the window.
#[derive(Clone)]
pub struct DeviceDisplayGui {
    content: Arc<Mutex<DisplayContent>>,
    title: String,
}

impl DeviceDisplayGui {
    pub fn new(title: &str) -> Self {
        Self {
            content: Arc::new(Mutex::new(DisplayContent::default())),
            title: title.to_string(),
        }
    }

    /// Opens the window and blocks until it is closed. Must be called from
    /// the main thread.
    pub fn run_window(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([480.0, 520.0]),
            ..Default::default()
        };

        let window = DisplayWindow {
            content: self.content.clone(),
            texture: None,
        };

        eframe::run_native(&self.title, options, Box::new(|_cc| Box::new(window)))
            .map_err(|e| e.to_string().into())
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        *lock(&self.content) = DisplayContent::default();
        Ok(())
    }

    fn write_status(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        lock(&self.content).status = text.to_string();
        Ok(())
    }

    fn write_overlay(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        lock(&self.content).overlay = text.to_string();
        Ok(())
    }

    fn show_message(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        lock(&self.content).message = Some((text.to_string(), Instant::now()));
        Ok(())
    }

    fn show_image(&mut self, image: &DynamicImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        match image.as_rgba8() {
            Some(rgba) => self.show_frame(rgba),
            None => self.show_frame(&image.to_rgba8()),
        }
    }

    fn show_frame(&mut self, frame: &RgbaImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        let size = [frame.width() as usize, frame.height() as usize];
        lock(&self.content).pending_image = Some(egui::ColorImage::from_rgba_unmultiplied(
            size,
            frame.as_raw(),
        ));
        Ok(())
    }
}
