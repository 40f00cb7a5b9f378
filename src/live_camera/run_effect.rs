use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DeviceDisplay;
use crate::image_classifier::interface::ClassifierFactory;
use crate::library::logger::interface::Logger;
use crate::live_camera::core::{Effect, Event};
use crate::session::classification_session::ClassificationSession;
use crate::session::slot::SessionSlot;
use crate::session::worker::{ClassificationJob, JobInput, SubmitOutcome};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct RunEffect {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    classifier_factory: ClassifierFactory,
    session: Arc<SessionSlot>,
}

impl RunEffect {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        classifier_factory: ClassifierFactory,
        session: Arc<SessionSlot>,
    ) -> Self {
        Self {
            config,
            logger: logger.with_namespace("run_effect"),
            device_camera,
            device_display,
            classifier_factory,
            session,
        }
    }

    pub fn run_effect(&self, effect: Effect, event_sender: Sender<Event>) {
        if !matches!(
            effect,
            Effect::DisplayFrame(_) | Effect::ClassifyFrame { .. }
        ) {
            let _ = self.logger.info(&format!("Running effect: {:?}", effect));
        }

        match effect {
            Effect::StartCamera(settings) => match self.device_camera.start(&settings) {
                Ok(events) => {
                    std::thread::spawn(move || {
                        for event in events {
                            if event_sender.send(Event::Camera(event)).is_err() {
                                break;
                            }
                        }
                    });
                }
                Err(e) => {
                    let _ = self.logger.error(&format!("Failed to start camera: {}", e));
                    let _ = event_sender.send(Event::CameraFailed(e.to_string()));
                }
            },
            Effect::StopCamera => {
                if let Err(e) = self.device_camera.stop() {
                    let _ = self.logger.error(&format!("Failed to stop camera: {}", e));
                }
            }
            Effect::InitializeSession => {
                let session = Arc::clone(&self.session);
                let factory = Arc::clone(&self.classifier_factory);
                let config = self.config.clone();
                let logger = Arc::clone(&self.logger);

                std::thread::spawn(move || {
                    let done_sender = event_sender.clone();
                    let result = session.initialize(|| {
                        ClassificationSession::create(
                            &factory,
                            &config,
                            Box::new(move |job_id, result| {
                                let _ = done_sender.send(Event::ClassifyDone { job_id, result });
                            }),
                            logger,
                        )
                    });
                    let _ = event_sender.send(Event::SessionInitialized(result.map(|_| ())));
                });
            }
            Effect::DisplayFrame(frame) => {
                let mut device_display = self
                    .device_display
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Err(e) = device_display.show_frame(&frame.image) {
                    let _ = self.logger.error(&format!("Failed to show frame: {}", e));
                }
            }
            Effect::ClassifyFrame { job_id, frame } => {
                let outcome = self.session.submit(ClassificationJob {
                    id: job_id,
                    input: JobInput::Frame(frame.image),
                });
                if outcome != SubmitOutcome::Queued {
                    let _ = self
                        .logger
                        .info(&format!("Frame {} submitted: {:?}", job_id, outcome));
                }
            }
            Effect::ShutdownSession => self.session.destroy(),
        }
    }
}
