use crate::config::Config;
use crate::device_display::interface::DeviceDisplay;
use crate::device_photos::interface::DevicePhotos;
use crate::image_classifier::interface::{ClassificationError, ClassifierFactory};
use crate::image_loader::interface::ImageLoader;
use crate::image_picker::core::{Effect, Event, Picture};
use crate::library::logger::interface::Logger;
use crate::session::classification_session::ClassificationSession;
use crate::session::slot::SessionSlot;
use crate::session::worker::{ClassificationJob, JobInput, SubmitOutcome};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

/// Routes results of outside activities (gallery, camera application) to the
/// screen instance that is current when they finish, which may not be the one
/// that started them.
#[derive(Clone, Default)]
pub struct ActivityResults {
    current: Arc<Mutex<Option<Sender<Event>>>>,
}

impl ActivityResults {
    pub fn attach(&self, sender: Sender<Event>) {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(sender);
    }

    pub fn deliver(&self, event: Event) -> bool {
        let current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match current.as_ref() {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Like [`ActivityResults::deliver`], but a result no screen is
    /// listening for is logged as lost.
    pub fn deliver_or_log(&self, event: Event, logger: &(dyn Logger + Send + Sync)) {
        let description = format!("{:?}", event);
        if !self.deliver(event) {
            let _ = logger.error(&format!("No screen to receive {}", description));
        }
    }
}

pub fn photo_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("TF_{}.jpg", now.timestamp_millis())
}

#[derive(Clone)]
pub struct RunEffect {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    device_photos: Arc<dyn DevicePhotos + Send + Sync>,
    image_loader: Arc<dyn ImageLoader + Send + Sync>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    classifier_factory: ClassifierFactory,
    session: Arc<SessionSlot>,
    activity_results: ActivityResults,
}

impl RunEffect {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_photos: Arc<dyn DevicePhotos + Send + Sync>,
        image_loader: Arc<dyn ImageLoader + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        classifier_factory: ClassifierFactory,
        session: Arc<SessionSlot>,
        activity_results: ActivityResults,
    ) -> Self {
        Self {
            config,
            logger: logger.with_namespace("run_effect"),
            device_photos,
            image_loader,
            device_display,
            classifier_factory,
            session,
            activity_results,
        }
    }

    pub fn run_effect(&self, effect: Effect, event_sender: Sender<Event>) {
        let _ = self.logger.info(&format!("Running effect: {:?}", effect));

        match effect {
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
            Effect::OpenGallery => {
                let device_photos = Arc::clone(&self.device_photos);
                let activity_results = self.activity_results.clone();
                let logger = Arc::clone(&self.logger);

                std::thread::spawn(move || {
                    let chosen = device_photos.choose_image().map_err(|e| e.to_string());
                    activity_results.deliver_or_log(Event::GalleryResult(chosen), logger.as_ref());
                });
            }
            Effect::PreparePhotoCapture => {
                if !self.device_photos.has_camera_app() {
                    let _ = event_sender.send(Event::CameraUnavailable);
                    return;
                }

                let file_name = photo_file_name(chrono::Utc::now());
                match self.device_photos.photo_destination(&file_name) {
                    Ok(destination) => {
                        let _ = event_sender.send(Event::PhotoDestinationReady(destination));
                    }
                    Err(e) => {
                        let _ = self
                            .logger
                            .error(&format!("Failed to create {}: {}", file_name, e));
                        let _ = event_sender.send(Event::CameraResult(Err(e.to_string())));
                    }
                }
            }
            Effect::LaunchCamera { destination } => {
                let device_photos = Arc::clone(&self.device_photos);
                let activity_results = self.activity_results.clone();
                let logger = Arc::clone(&self.logger);

                std::thread::spawn(move || {
                    let taken = device_photos
                        .capture_photo(&destination)
                        .map_err(|e| e.to_string());
                    activity_results.deliver_or_log(Event::CameraResult(taken), logger.as_ref());
                });
            }
            Effect::LoadImage { uri } => {
                let image_loader = Arc::clone(&self.image_loader);
                let logger = Arc::clone(&self.logger);

                std::thread::spawn(move || {
                    let result = image_loader.load(&uri).map(Picture::new).map_err(|e| {
                        let _ = logger.error(&format!("Failed to load {}: {}", uri, e));
                        e.to_string()
                    });
                    let _ = event_sender.send(Event::ImageLoadDone { uri, result });
                });
            }
            Effect::ShowImage(picture) => {
                let result = self
                    .device_display
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .show_image(&picture.0);
                if let Err(e) = result {
                    let _ = self.logger.error(&format!("Failed to show picture: {}", e));
                }
            }
            Effect::ShowMessage(text) => {
                let result = self
                    .device_display
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .show_message(&text);
                if let Err(e) = result {
                    let _ = self.logger.error(&format!("Failed to show message: {}", e));
                }
            }
            Effect::ClassifyImage { job_id, picture } => {
                let outcome = self.session.submit(ClassificationJob {
                    id: job_id,
                    input: JobInput::Bitmap(picture.0),
                });
                let error = match outcome {
                    SubmitOutcome::Closed => ClassificationError::NotInitialized,
                    SubmitOutcome::DroppedNewest => {
                        ClassificationError::Worker("queue is full".to_string())
                    }
                    SubmitOutcome::Queued | SubmitOutcome::ReplacedOldest => return,
                };
                let _ = self
                    .logger
                    .error(&format!("Picture {} not classified: {}", job_id, error));
                let _ = event_sender.send(Event::ClassifyDone {
                    job_id,
                    result: Err(error),
                });
            }
            Effect::PersistInstanceState(saved) => {
                if let Err(e) = saved.save(&self.config.instance_state_path) {
                    let _ = self
                        .logger
                        .error(&format!("Failed to save instance state: {}", e));
                }
            }
            Effect::ShutdownSession => self.session.destroy(),
        }
    }
}
