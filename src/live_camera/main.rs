use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DeviceDisplay;
use crate::image_classifier::interface::ClassifierFactory;
use crate::library::logger::interface::Logger;
use crate::library::state_machine::StateMachine;
use crate::live_camera::core::{init, is_done, transition, Effect, Event, State};
use crate::live_camera::render::Render;
use crate::live_camera::run_effect::RunEffect;
use crate::session::slot::SessionSlot;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

pub struct LiveCamera {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    classifier_factory: ClassifierFactory,
}

impl LiveCamera {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        classifier_factory: ClassifierFactory,
    ) -> Self {
        Self {
            config,
            logger: logger.with_namespace("live_camera"),
            device_camera,
            device_display,
            classifier_factory,
        }
    }

    /// Runs the screen on the calling thread until `Event::Destroy`.
    /// `connect` gets a sender for driving the screen from outside.
    pub fn run(
        &self,
        connect: impl FnOnce(Sender<Event>),
    ) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        self.device_display
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .init()?;

        let run_effect = RunEffect::new(
            self.config.clone(),
            self.logger.clone(),
            self.device_camera.clone(),
            self.device_display.clone(),
            self.classifier_factory.clone(),
            Arc::new(SessionSlot::new(self.logger.clone())),
        );

        let render = Arc::new(Render::new(
            self.device_display.clone(),
            self.logger.clone(),
        ));

        let config = self.config.clone();
        let logger = self.logger.clone();
        let machine = StateMachine::new(
            move |state: State, event: Event| {
                if !matches!(event, Event::Camera(_)) {
                    let _ = logger.info(&format!("Processing event: {:?}", event));
                }
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
        sender.send(Event::Start)?;
        connect(sender);

        machine.run(init())
    }
}
