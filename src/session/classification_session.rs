use crate::config::{Config, WorkerConfig};
use crate::image_classifier::interface::{ClassificationError, ClassifierFactory, ImageClassifier};
use crate::library::logger::interface::Logger;
use crate::session::cancellation::CancellationToken;
use crate::session::worker::{ClassificationJob, ClassificationWorker, CompletionFn, SubmitOutcome};
use std::sync::Arc;

/// Everything one screen needs to classify images: the classifier handle, its
/// worker thread and the token that stops both when the screen goes away.
pub struct ClassificationSession {
    worker: ClassificationWorker,
    cancel: CancellationToken,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ClassificationSession {
    pub fn start(
        classifier: Arc<dyn ImageClassifier + Send + Sync>,
        config: &WorkerConfig,
        input_size: u32,
        on_done: CompletionFn,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, ClassificationError> {
        let logger = logger.with_namespace("session");
        let cancel = CancellationToken::new();
        let worker = ClassificationWorker::spawn(
            classifier,
            config,
            input_size,
            cancel.clone(),
            on_done,
            Arc::clone(&logger),
        )?;

        let _ = logger.info(&format!(
            "Session started (queue capacity {}, {:?})",
            config.capacity(),
            config.policy
        ));

        Ok(Self {
            worker,
            cancel,
            logger,
        })
    }

    /// Builds the classifier with `factory` and starts the worker for it.
    pub fn create(
        factory: &ClassifierFactory,
        config: &Config,
        on_done: CompletionFn,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, ClassificationError> {
        let classifier = factory()?;
        Self::start(
            classifier,
            &config.worker,
            config.model.input_size,
            on_done,
            logger,
        )
    }

    pub fn submit(&self, job: ClassificationJob) -> SubmitOutcome {
        self.worker.submit(job)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn shutdown(mut self) {
        let _ = self.logger.info("Shutting session down");
        self.worker.shutdown();
    }
}
