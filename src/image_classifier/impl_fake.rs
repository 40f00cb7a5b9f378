use crate::image_classifier::interface::{
    Classification, ClassificationError, ClassificationOutput, ClassifierFactory, ImageClassifier,
};
use crate::library::logger::interface::Logger;
use image::DynamicImage;
use rand::distr::{Distribution, Uniform};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Behavior {
    Random,
    Fixed(ClassificationOutput),
    Fail(ClassificationError),
}

pub struct ImageClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    behavior: Behavior,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ImageClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier").with_namespace("fake"),
            behavior: Behavior::Random,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fixed(logger: Arc<dyn Logger + Send + Sync>, output: ClassificationOutput) -> Self {
        Self {
            behavior: Behavior::Fixed(output),
            ..Self::new(logger)
        }
    }

    pub fn failing(logger: Arc<dyn Logger + Send + Sync>, error: ClassificationError) -> Self {
        Self {
            behavior: Behavior::Fail(error),
            ..Self::new(logger)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Factory handing out this classifier. The counter tracks how many times
    /// the factory was called.
    pub fn into_factory(self) -> (ClassifierFactory, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let classifier: Arc<dyn ImageClassifier + Send + Sync> = Arc::new(self);

        let counter = Arc::clone(&created);
        let factory: ClassifierFactory = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::clone(&classifier))
        });

        (factory, created)
    }

    fn random_output() -> Result<ClassificationOutput, ClassificationError> {
        let objects = [
            "dog", "cat", "person", "car", "chair", "table", "bird", "tree", "bicycle", "book",
            "laptop", "phone", "cup", "bottle", "keyboard", "mouse", "plant", "clock",
        ];

        let mut rng = rand::rng();

        let index_dist = Uniform::new(0, objects.len())
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;
        let confidence_dist =
            Uniform::new(0.1, 1.0).map_err(|e| ClassificationError::Inference(e.to_string()))?;

        let classifications = (0..3)
            .map(|_| Classification {
                label: objects[index_dist.sample(&mut rng)].to_string(),
                confidence: confidence_dist.sample(&mut rng),
            })
            .collect();

        Ok(ClassificationOutput::new(classifications))
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationOutput, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.logger.info(&format!(
            "Classifying {}x{} image with fake classifier...",
            image.width(),
            image.height()
        ));

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        match &self.behavior {
            Behavior::Random => Self::random_output(),
            Behavior::Fixed(output) => Ok(output.clone()),
            Behavior::Fail(error) => Err(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_random_output_is_ordered() {
        let classifier = ImageClassifierFake::new(Arc::new(LoggerFake::new()));
        let output = classifier.classify(&DynamicImage::new_rgb8(4, 4)).unwrap();

        assert_eq!(output.classifications.len(), 3);
        assert!(output
            .classifications
            .windows(2)
            .all(|pair| pair[0].confidence >= pair[1].confidence));
    }

    #[test]
    fn test_counts_calls() {
        let classifier = ImageClassifierFake::failing(
            Arc::new(LoggerFake::new()),
            ClassificationError::Inference("boom".to_string()),
        );
        let calls = classifier.calls();

        assert!(classifier.classify(&DynamicImage::new_rgb8(1, 1)).is_err());
        assert!(classifier.classify(&DynamicImage::new_rgb8(1, 1)).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_factory_counts_constructions() {
        let (factory, created) = ImageClassifierFake::new(Arc::new(LoggerFake::new())).into_factory();

        assert!(factory().is_ok());
        assert!(factory().is_ok());
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }
}
