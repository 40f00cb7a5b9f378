use image::DynamicImage;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.label, self.confidence * 100.0)
    }
}

/// Predictions ordered from the most to the least confident.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationOutput {
    pub classifications: Vec<Classification>,
}

impl ClassificationOutput {
    pub fn new(mut classifications: Vec<Classification>) -> Self {
        classifications.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self { classifications }
    }
}

impl fmt::Display for ClassificationOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, classification) in self.classifications.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", classification)?;
        }
        write!(f, "]")
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("classification session is not initialized")]
    NotInitialized,
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("failed to load model: {0}")]
    ModelLoad(String),
    #[error("failed to read labels: {0}")]
    Labels(String),
    #[error("failed to prepare input: {0}")]
    Preprocess(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("classification worker failed: {0}")]
    Worker(String),
    #[error("classification cancelled")]
    Cancelled,
}

pub trait ImageClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationOutput, ClassificationError>;
}

/// Builds the classifier for a session. Sessions call it at most once.
pub type ClassifierFactory = Arc<
    dyn Fn() -> Result<Arc<dyn ImageClassifier + Send + Sync>, ClassificationError> + Send + Sync,
>;
