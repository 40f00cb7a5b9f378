use chrono::Offset;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub label_path: PathBuf,
    pub input_size: u32,
    pub image_mean: f32,
    pub image_std: f32,
    pub input_name: Option<String>,
    pub output_name: Option<String>,
    pub max_results: usize,
    pub threshold: f32,
    pub apply_softmax: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model/tensorflow_inception_graph.onnx"),
            label_path: PathBuf::from("model/imagenet_comp_graph_label_strings.txt"),
            input_size: 224,
            image_mean: 117.0,
            image_std: 1.0,
            input_name: Some("input".to_string()),
            output_name: Some("output".to_string()),
            max_results: 3,
            threshold: 0.1,
            apply_softmax: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackpressurePolicy {
    /// A full queue gives its slot to the newest job.
    DropOldest,
    /// A full queue rejects the newest job.
    DropNewest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    pub queue_capacity: usize,
    pub policy: BackpressurePolicy,
    pub thread_name: String,
}

impl WorkerConfig {
    pub fn capacity(&self) -> usize {
        self.queue_capacity.clamp(1, 2)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1,
            policy: BackpressurePolicy::DropOldest,
            thread_name: "ThreadPool-ImageClassifier".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    /// 0 is the rear camera, 1 the front one.
    pub camera_index: u32,
    pub show_fps: bool,
    pub frame_interval: Duration,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            show_fps: true,
            frame_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Messages {
    pub processing: String,
    pub no_camera_app: String,
    pub image_load_failed: String,
    pub results_prefix: String,
    pub classification_failed: String,
    pub classifier_unavailable: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            processing: "Processing...".to_string(),
            no_camera_app: "No camera app available".to_string(),
            image_load_failed: "Failed to load image".to_string(),
            results_prefix: "results".to_string(),
            classification_failed: "Classification failed".to_string(),
            classifier_unavailable: "Classifier unavailable".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub worker: WorkerConfig,
    pub camera: CameraSettings,
    pub messages: Messages,
    pub logger_timezone: chrono::FixedOffset,
    pub photo_cache_dir: PathBuf,
    pub instance_state_path: PathBuf,
    pub camera_image_dir: Option<PathBuf>,
    pub capture_command: String,
    pub use_fake_classifier: bool,
    pub use_gui: bool,
}

impl Default for Config {
    fn default() -> Self {
        let cache_dir = std::env::temp_dir().join("camera-classifier");
        Self {
            model: ModelConfig::default(),
            worker: WorkerConfig::default(),
            camera: CameraSettings::default(),
            messages: Messages::default(),
            logger_timezone: utc(),
            photo_cache_dir: cache_dir.join("photos"),
            instance_state_path: cache_dir.join("picker_state.json"),
            camera_image_dir: None,
            capture_command: "fswebcam".to_string(),
            use_fake_classifier: false,
            use_gui: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("CLASSIFIER_MODEL_PATH") {
            config.model.model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CLASSIFIER_LABEL_PATH") {
            config.model.label_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("CLASSIFIER_CAMERA_DIR") {
            config.camera_image_dir = Some(PathBuf::from(dir));
        }
        if let Some(command) = lookup("CLASSIFIER_CAPTURE_COMMAND") {
            config.capture_command = command;
        }
        if let Some(dir) = lookup("CLASSIFIER_CACHE_DIR") {
            let dir = PathBuf::from(dir);
            config.photo_cache_dir = dir.join("photos");
            config.instance_state_path = dir.join("picker_state.json");
        }
        if let Some(capacity) = lookup("CLASSIFIER_QUEUE_CAPACITY").and_then(|v| v.trim().parse().ok()) {
            config.worker.queue_capacity = capacity;
        }
        if let Some(policy) = lookup("CLASSIFIER_QUEUE_POLICY") {
            config.worker.policy = match policy.trim().to_lowercase().as_str() {
                "drop_newest" | "newest" => BackpressurePolicy::DropNewest,
                _ => BackpressurePolicy::DropOldest,
            };
        }
        config.use_fake_classifier = lookup("CLASSIFIER_FAKE").is_some_and(|v| is_truthy(&v));
        config.use_gui = lookup("CLASSIFIER_GUI").is_some_and(|v| is_truthy(&v));

        config
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn utc() -> chrono::FixedOffset {
    chrono::Utc.fix()
}
