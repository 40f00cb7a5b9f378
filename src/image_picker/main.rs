use crate::config::Config;
use crate::device_display::interface::DeviceDisplay;
use crate::device_photos::interface::DevicePhotos;
use crate::image_classifier::interface::ClassifierFactory;
use crate::image_loader::interface::ImageLoader;
use crate::image_picker::core::{init, is_done, transition, Effect, Event, State};
use crate::image_picker::render::Render;
use crate::image_picker::run_effect::{ActivityResults, RunEffect};
use crate::image_picker::saved_state::SavedState;
use crate::library::logger::interface::Logger;
use crate::library::state_machine::StateMachine;
use crate::session::slot::SessionSlot;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

/// The picker screen. Each call to [`ImagePicker::run`] is one screen
/// instance with its own classification session.
pub struct ImagePicker {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    device_photos: Arc<dyn DevicePhotos + Send + Sync>,
    image_loader: Arc<dyn ImageLoader + Send + Sync>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    classifier_factory: ClassifierFactory,
    activity_results: ActivityResults,
}

impl ImagePicker {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_photos: Arc<dyn DevicePhotos + Send + Sync>,
        image_loader: Arc<dyn ImageLoader + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        classifier_factory: ClassifierFactory,
    ) -> Self {
        Self {
            config,
            logger: logger.with_namespace("image_picker"),
            device_photos,
            image_loader,
            device_display,
            classifier_factory,
            activity_results: ActivityResults::default(),
        }
    }

    /// Runs one screen instance until it is destroyed or reconfigured. The
    /// final state carries the exit reason.
    pub fn run(
        &self,
        restored: Option<SavedState>,
        connect: impl FnOnce(Sender<Event>),
    ) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        self.device_display
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .init()?;

        let run_effect = RunEffect::new(
            self.config.clone(),
            self.logger.clone(),
            self.device_photos.clone(),
            self.image_loader.clone(),
            self.device_display.clone(),
            self.classifier_factory.clone(),
            Arc::new(SessionSlot::new(self.logger.clone())),
            self.activity_results.clone(),
        );
        let render = Arc::new(Render::new(
            self.device_display.clone(),
            self.logger.clone(),
        ));

        let config = self.config.clone();
        let logger = self.logger.clone();
        let machine = StateMachine::new(
            move |state: State, event: Event| {
                let _ = logger.info(&format!("Processing event: {:?}", event));
                transition(&config, state, event)
            },
            {
                let render = render.clone();
                move |state: &State| render.render(state)
            },
            move |effect: Effect, sender: Sender<Event>| run_effect.run_effect(effect, sender),
            is_done,
        );

        let sender = machine.event_sender();
        render.notify_first_frame(sender.clone());
        self.activity_results.attach(sender.clone());
        connect(sender);

        if let Some(saved) = &restored {
            let _ = self
                .logger
                .info(&format!("Restoring instance state: {:?}", saved));
        }
        machine.run(init(restored))
    }
}
