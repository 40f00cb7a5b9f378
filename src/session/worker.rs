use crate::config::{BackpressurePolicy, WorkerConfig};
use crate::image_classifier::interface::{
    ClassificationError, ClassificationOutput, ImageClassifier,
};
use crate::library::logger::interface::Logger;
use crate::preprocess::{frame_to_bitmap, scale_bitmap};
use crate::session::cancellation::CancellationToken;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use image::{DynamicImage, RgbaImage};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Clone)]
pub enum JobInput {
    /// Raw RGBA camera frame, converted to RGB on the worker.
    Frame(Arc<RgbaImage>),
    /// Already decoded picture.
    Bitmap(Arc<DynamicImage>),
}

impl fmt::Debug for JobInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobInput::Frame(frame) => write!(f, "Frame({}x{})", frame.width(), frame.height()),
            JobInput::Bitmap(image) => write!(f, "Bitmap({}x{})", image.width(), image.height()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationJob {
    pub id: u64,
    pub input: JobInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Queued,
    ReplacedOldest,
    DroppedNewest,
    Closed,
}

pub type JobResult = Result<ClassificationOutput, ClassificationError>;

pub type CompletionFn = Box<dyn Fn(u64, JobResult) + Send>;

/// Single worker thread behind a bounded queue. Jobs run in submission order
/// and `submit` never waits for room in the queue.
pub struct ClassificationWorker {
    sender: Option<Sender<ClassificationJob>>,
    overflow: Receiver<ClassificationJob>,
    policy: BackpressurePolicy,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ClassificationWorker {
    pub fn spawn(
        classifier: Arc<dyn ImageClassifier + Send + Sync>,
        config: &WorkerConfig,
        input_size: u32,
        cancel: CancellationToken,
        on_done: CompletionFn,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, ClassificationError> {
        let logger = logger.with_namespace("worker");
        let (sender, receiver) = bounded::<ClassificationJob>(config.capacity());
        let overflow = receiver.clone();

        let worker_cancel = cancel.clone();
        let worker_logger = Arc::clone(&logger);

        let handle = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                for job in receiver.iter() {
                    if worker_cancel.is_cancelled() {
                        break;
                    }

                    let result = process_job(classifier.as_ref(), &job.input, input_size);

                    if worker_cancel.is_cancelled() {
                        let _ = worker_logger.info(&format!(
                            "Discarding result of job {} after cancellation",
                            job.id
                        ));
                        break;
                    }

                    on_done(job.id, result);
                }
                let _ = worker_logger.info("Worker finished");
            })
            .map_err(|e| ClassificationError::Worker(e.to_string()))?;

        Ok(Self {
            sender: Some(sender),
            overflow,
            policy: config.policy,
            cancel,
            handle: Some(handle),
            logger,
        })
    }

    pub fn submit(&self, job: ClassificationJob) -> SubmitOutcome {
        let Some(sender) = &self.sender else {
            return SubmitOutcome::Closed;
        };
        if self.cancel.is_cancelled() {
            return SubmitOutcome::Closed;
        }

        match sender.try_send(job) {
            Ok(()) => SubmitOutcome::Queued,
            Err(TrySendError::Disconnected(_)) => SubmitOutcome::Closed,
            Err(TrySendError::Full(job)) => match self.policy {
                BackpressurePolicy::DropNewest => {
                    let _ = self
                        .logger
                        .info(&format!("Queue full, dropping job {}", job.id));
                    SubmitOutcome::DroppedNewest
                }
                BackpressurePolicy::DropOldest => {
                    let replaced = match self.overflow.try_recv() {
                        Ok(oldest) => {
                            let _ = self.logger.info(&format!(
                                "Queue full, job {} replaces job {}",
                                job.id, oldest.id
                            ));
                            true
                        }
                        Err(_) => false,
                    };

                    match sender.try_send(job) {
                        Ok(()) if replaced => SubmitOutcome::ReplacedOldest,
                        Ok(()) => SubmitOutcome::Queued,
                        Err(TrySendError::Full(_)) => SubmitOutcome::DroppedNewest,
                        Err(TrySendError::Disconnected(_)) => SubmitOutcome::Closed,
                    }
                }
            },
        }
    }

    /// Cancels pending work, closes the queue and waits for the thread.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        self.sender.take();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                let _ = self.logger.error("Worker thread panicked");
            }
        }
    }
}

impl Drop for ClassificationWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn process_job(
    classifier: &(dyn ImageClassifier + Send + Sync),
    input: &JobInput,
    input_size: u32,
) -> JobResult {
    let scaled = match input {
        JobInput::Frame(frame) => scale_bitmap(&frame_to_bitmap(frame), input_size)?,
        JobInput::Bitmap(image) => scale_bitmap(image, input_size)?,
    };

    catch_unwind(AssertUnwindSafe(|| classifier.classify(&scaled))).unwrap_or_else(|_| {
        Err(ClassificationError::Inference(
            "classifier panicked".to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_classifier::impl_fake::ImageClassifierFake;
    use crate::image_classifier::interface::Classification;
    use crate::library::logger::impl_fake::LoggerFake;
    use std::sync::atomic::Ordering;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn output() -> ClassificationOutput {
        ClassificationOutput::new(vec![Classification {
            label: "dog".to_string(),
            confidence: 0.9,
        }])
    }

    fn bitmap_job(id: u64) -> ClassificationJob {
        ClassificationJob {
            id,
            input: JobInput::Bitmap(Arc::new(DynamicImage::new_rgb8(32, 16))),
        }
    }

    fn spawn_worker(
        classifier: ImageClassifierFake,
        config: WorkerConfig,
    ) -> (ClassificationWorker, mpsc::Receiver<(u64, JobResult)>, CancellationToken) {
        let (tx, rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let worker = ClassificationWorker::spawn(
            Arc::new(classifier),
            &config,
            8,
            cancel.clone(),
            Box::new(move |id, result| {
                let _ = tx.send((id, result));
            }),
            Arc::new(LoggerFake::new()),
        )
        .unwrap();
        (worker, rx, cancel)
    }

    #[test]
    fn test_jobs_run_in_submission_order() {
        let logger = Arc::new(LoggerFake::new());
        let config = WorkerConfig {
            queue_capacity: 2,
            ..WorkerConfig::default()
        };
        let (worker, rx, _) = spawn_worker(ImageClassifierFake::fixed(logger, output()), config);

        for id in 0..2 {
            assert_eq!(worker.submit(bitmap_job(id)), SubmitOutcome::Queued);
            // Let the worker drain so nothing is dropped.
            let (done_id, result) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(done_id, id);
            assert_eq!(result.unwrap(), output());
        }
    }

    #[test]
    fn test_submit_does_not_block_while_busy() {
        let logger = Arc::new(LoggerFake::new());
        let classifier =
            ImageClassifierFake::fixed(logger, output()).with_delay(Duration::from_millis(300));
        let (worker, rx, _) = spawn_worker(classifier, WorkerConfig::default());

        assert_eq!(worker.submit(bitmap_job(0)), SubmitOutcome::Queued);
        // Job 0 is now running on the worker.
        std::thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        let outcomes: Vec<SubmitOutcome> = (1..10).map(|id| worker.submit(bitmap_job(id))).collect();
        assert!(started.elapsed() < Duration::from_millis(200));

        assert_eq!(outcomes[0], SubmitOutcome::Queued);
        assert!(outcomes[1..]
            .iter()
            .all(|outcome| *outcome == SubmitOutcome::ReplacedOldest));

        // The running job and the newest one are the only ones classified.
        let mut done: Vec<u64> = Vec::new();
        while let Ok((id, _)) = rx.recv_timeout(Duration::from_secs(2)) {
            done.push(id);
        }
        assert_eq!(done, vec![0, 9]);
    }

    #[test]
    fn test_drop_newest_keeps_queued_job() {
        let logger = Arc::new(LoggerFake::new());
        let classifier =
            ImageClassifierFake::fixed(logger, output()).with_delay(Duration::from_millis(200));
        let config = WorkerConfig {
            policy: BackpressurePolicy::DropNewest,
            ..WorkerConfig::default()
        };
        let (worker, rx, _) = spawn_worker(classifier, config);

        assert_eq!(worker.submit(bitmap_job(1)), SubmitOutcome::Queued);
        // Wait until job 1 is running so job 2 sits in the queue.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(worker.submit(bitmap_job(2)), SubmitOutcome::Queued);
        assert_eq!(worker.submit(bitmap_job(3)), SubmitOutcome::DroppedNewest);

        let done: Vec<u64> = (0..2)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap().0)
            .collect();
        assert_eq!(done, vec![1, 2]);
    }

    #[test]
    fn test_cancelled_worker_delivers_nothing() {
        let logger = Arc::new(LoggerFake::new());
        let classifier =
            ImageClassifierFake::fixed(logger, output()).with_delay(Duration::from_millis(100));
        let (mut worker, rx, cancel) = spawn_worker(classifier, WorkerConfig::default());

        assert_eq!(worker.submit(bitmap_job(1)), SubmitOutcome::Queued);
        std::thread::sleep(Duration::from_millis(20));
        cancel.cancel();

        assert_eq!(worker.submit(bitmap_job(2)), SubmitOutcome::Closed);
        worker.shutdown();

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_shutdown_closes_queue() {
        let logger = Arc::new(LoggerFake::new());
        let classifier = ImageClassifierFake::fixed(logger, output());
        let calls = classifier.calls();
        let (mut worker, _rx, _) = spawn_worker(classifier, WorkerConfig::default());

        worker.shutdown();

        assert_eq!(worker.submit(bitmap_job(1)), SubmitOutcome::Closed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_process_job_scales_frames_before_classifying() {
        struct SizeCheck;
        impl ImageClassifier for SizeCheck {
            fn classify(
                &self,
                image: &DynamicImage,
            ) -> Result<ClassificationOutput, ClassificationError> {
                assert_eq!((image.width(), image.height()), (224, 224));
                assert!(image.as_rgb8().is_some());
                Ok(ClassificationOutput::default())
            }
        }

        let frame = JobInput::Frame(Arc::new(RgbaImage::new(640, 480)));
        assert!(process_job(&SizeCheck, &frame, 224).is_ok());
    }

    #[test]
    fn test_process_job_reports_empty_input() {
        let classifier = ImageClassifierFake::new(Arc::new(LoggerFake::new()));
        let input = JobInput::Bitmap(Arc::new(DynamicImage::new_rgb8(0, 0)));

        assert!(matches!(
            process_job(&classifier, &input, 224),
            Err(ClassificationError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_process_job_turns_panics_into_errors() {
        struct Panics;
        impl ImageClassifier for Panics {
            fn classify(
                &self,
                _image: &DynamicImage,
            ) -> Result<ClassificationOutput, ClassificationError> {
                panic!("bad model");
            }
        }

        let input = JobInput::Bitmap(Arc::new(DynamicImage::new_rgb8(4, 4)));
        assert!(matches!(
            process_job(&Panics, &input, 4),
            Err(ClassificationError::Inference(_))
        ));
    }
}
