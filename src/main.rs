use config::Config;
use device_camera::impl_fake::DeviceCameraFake;
use device_camera::impl_image_directory::DeviceCameraImageDirectory;
use device_camera::interface::DeviceCamera;
use device_display::impl_console::DeviceDisplayConsole;
use device_display::impl_gui::DeviceDisplayGui;
use device_display::interface::DeviceDisplay;
use device_photos::impl_desktop::DevicePhotosDesktop;
use image_classifier::impl_fake::ImageClassifierFake;
use image_classifier::impl_tract_onnx::ImageClassifierTractOnnx;
use image_classifier::interface::{ClassificationError, ClassifierFactory, ImageClassifier};
use image_loader::impl_file::ImageLoaderFile;
use image_picker::core::Exit;
use image_picker::main::ImagePicker;
use image_picker::saved_state::SavedState;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use live_camera::main::LiveCamera;
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

mod config;
mod device_camera;
mod device_display;
mod device_photos;
mod image_classifier;
mod image_loader;
mod image_picker;
mod image_uri;
mod library;
mod live_camera;
mod preprocess;
mod session;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Sender of whichever screen instance is currently running.
type CurrentScreen<TEvent> = Arc<Mutex<Option<Sender<TEvent>>>>;

fn main() -> Result<(), BoxError> {
    let config = Config::from_env();
    let logger: Arc<dyn Logger + Send + Sync> =
        Arc::new(LoggerConsole::new(config.logger_timezone));

    let mode = std::env::args().nth(1).unwrap_or_else(|| "live".to_string());
    let classifier_factory = classifier_factory(&config, logger.clone());
    let window = config
        .use_gui
        .then(|| DeviceDisplayGui::new("camera-classifier"));
    let device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>> = match &window {
        Some(window) => Arc::new(Mutex::new(window.clone())),
        None => Arc::new(Mutex::new(DeviceDisplayConsole::new())),
    };

    match mode.as_str() {
        "live" => run_live(config, logger, device_display, classifier_factory, window),
        "picker" => run_picker(config, logger, device_display, classifier_factory, window),
        other => Err(format!("unknown mode {:?}, expected `live` or `picker`", other).into()),
    }
}

fn classifier_factory(config: &Config, logger: Arc<dyn Logger + Send + Sync>) -> ClassifierFactory {
    if config.use_fake_classifier {
        let (factory, _) = ImageClassifierFake::new(logger).into_factory();
        return factory;
    }

    let model = config.model.clone();
    Arc::new(
        move || -> Result<Arc<dyn ImageClassifier + Send + Sync>, ClassificationError> {
            let _ = logger.info(&format!("Loading model {}...", model.model_path.display()));
            Ok(Arc::new(ImageClassifierTractOnnx::create(model.clone())?))
        },
    )
}

/// Reads commands from stdin on a background thread. End of input counts as
/// `quit`.
fn spawn_commands<TEvent: Send + 'static>(
    current: CurrentScreen<TEvent>,
    parse: fn(&str) -> Option<TEvent>,
    quit: fn() -> TEvent,
    logger: Arc<dyn Logger + Send + Sync>,
) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = line.trim();
            if command == "quit" {
                break;
            }
            match parse(command) {
                Some(event) => send(&current, event),
                None if command.is_empty() => {}
                None => {
                    let _ = logger.error(&format!("Unknown command {:?}", command));
                }
            }
        }
        send(&current, quit());
    });
}

fn send<TEvent>(current: &CurrentScreen<TEvent>, event: TEvent) {
    let current = current
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(sender) = current.as_ref() {
        let _ = sender.send(event);
    }
}

fn run_live(
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    classifier_factory: ClassifierFactory,
    window: Option<DeviceDisplayGui>,
) -> Result<(), BoxError> {
    use live_camera::core::Event;

    let device_camera: Arc<dyn DeviceCamera + Send + Sync> = match &config.camera_image_dir {
        Some(dir) => Arc::new(DeviceCameraImageDirectory::new(dir, logger.clone())),
        None => Arc::new(DeviceCameraFake::new(logger.clone())),
    };
    let live_camera = LiveCamera::new(
        config,
        logger.clone(),
        device_camera,
        device_display,
        classifier_factory,
    );

    println!("Commands: stop, quit");
    let current: CurrentScreen<Event> = Arc::new(Mutex::new(None));
    spawn_commands(
        current.clone(),
        |command| (command == "stop").then_some(Event::Stop),
        || Event::Destroy,
        logger,
    );

    let connect = {
        let current = current.clone();
        move |sender: Sender<Event>| {
            *current
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(sender)
        }
    };

    match window {
        None => live_camera.run(connect).map(|_| ()),
        Some(window) => {
            let screen = std::thread::spawn(move || live_camera.run(connect).map(|_| ()));
            window.run_window()?;
            send(&current, Event::Destroy);
            screen
                .join()
                .map_err(|_| BoxError::from("live camera screen panicked"))?
        }
    }
}

fn run_picker(
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    classifier_factory: ClassifierFactory,
    window: Option<DeviceDisplayGui>,
) -> Result<(), BoxError> {
    use image_picker::core::Event;

    let image_picker = ImagePicker::new(
        config.clone(),
        logger.clone(),
        Arc::new(DevicePhotosDesktop::new(
            &config.photo_cache_dir,
            &config.capture_command,
            logger.clone(),
        )),
        Arc::new(ImageLoaderFile::new(logger.clone())),
        device_display,
        classifier_factory,
    );

    println!("Commands: gallery, photo, rotate, quit");
    let current: CurrentScreen<Event> = Arc::new(Mutex::new(None));
    spawn_commands(
        current.clone(),
        |command| match command {
            "gallery" => Some(Event::ChooseFromGalleryClicked),
            "photo" => Some(Event::TakePhotoClicked),
            "rotate" => Some(Event::Reconfigure),
            _ => None,
        },
        || Event::Destroy,
        logger.clone(),
    );

    let screens = {
        let current = current.clone();
        move || -> Result<(), BoxError> {
            let mut restored = restore(&config, &logger);
            loop {
                let state = image_picker.run(restored.take(), |sender| {
                    *current
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(sender)
                })?;

                match state.exit {
                    Some(Exit::Reconfigured(saved)) => {
                        let _ = logger.info("Recreating picker screen");
                        restored = restore(&config, &logger).or(Some(saved));
                    }
                    _ => return Ok(()),
                }
            }
        }
    };

    match window {
        None => screens(),
        Some(window) => {
            let handle = std::thread::spawn(screens);
            window.run_window()?;
            send(&current, Event::Destroy);
            handle
                .join()
                .map_err(|_| BoxError::from("picker screen panicked"))?
        }
    }
}

fn restore(config: &Config, logger: &Arc<dyn Logger + Send + Sync>) -> Option<SavedState> {
    match SavedState::take(&config.instance_state_path) {
        Ok(saved) => saved,
        Err(e) => {
            let _ = logger.error(&format!("Ignoring saved picker state: {}", e));
            None
        }
    }
}
