use crate::config::{Config, Messages};
use crate::image_classifier::interface::ClassificationError;
use crate::image_picker::saved_state::SavedState;
use crate::image_uri::ImageUri;
use crate::session::status::{describe_result, SessionStatus};
use crate::session::worker::JobResult;
use image::DynamicImage;
use std::fmt;
use std::sync::Arc;

/// A decoded picture shared between the display and the classifier.
#[derive(Clone)]
pub struct Picture(pub Arc<DynamicImage>);

impl Picture {
    pub fn new(image: DynamicImage) -> Self {
        Self(Arc::new(image))
    }
}

impl PartialEq for Picture {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Picture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Picture({}x{})", self.0.width(), self.0.height())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    Idle,
    WaitingForGallery,
    WaitingForCamera,
    LoadingImage { uri: ImageUri },
    /// Loaded before the session was ready; classified once it is.
    AwaitingSession { picture: Picture },
    Classifying { job_id: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Exit {
    Finished,
    /// Torn down to be recreated from the saved state.
    Reconfigured(SavedState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub activity: Activity,
    pub session: SessionStatus,
    pub status: String,
    pub pending_photo_uri: Option<ImageUri>,
    pub next_job_id: u64,
    pub exit: Option<Exit>,
}

impl State {
    fn saved_state(&self) -> SavedState {
        SavedState {
            pending_photo_uri: self.pending_photo_uri.clone(),
        }
    }
}

#[derive(Debug)]
pub enum Event {
    FirstFrameRendered,
    SessionInitialized(Result<(), ClassificationError>),
    ChooseFromGalleryClicked,
    GalleryResult(Result<Option<ImageUri>, String>),
    TakePhotoClicked,
    CameraUnavailable,
    PhotoDestinationReady(ImageUri),
    CameraResult(Result<bool, String>),
    ImageLoadDone {
        uri: ImageUri,
        result: Result<Picture, String>,
    },
    ClassifyDone {
        job_id: u64,
        result: JobResult,
    },
    Reconfigure,
    Destroy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    InitializeSession,
    OpenGallery,
    PreparePhotoCapture,
    LaunchCamera { destination: ImageUri },
    LoadImage { uri: ImageUri },
    ShowImage(Picture),
    ShowMessage(String),
    ClassifyImage { job_id: u64, picture: Picture },
    PersistInstanceState(SavedState),
    ShutdownSession,
}

pub fn init(restored: Option<SavedState>) -> (State, Vec<Effect>) {
    (
        State {
            activity: Activity::Idle,
            session: SessionStatus::Uninitialized,
            status: String::new(),
            pending_photo_uri: restored.and_then(|saved| saved.pending_photo_uri),
            next_job_id: 0,
            exit: None,
        },
        vec![],
    )
}

pub fn transition(config: &Config, state: State, event: Event) -> (State, Vec<Effect>) {
    if state.exit.is_some() {
        return (state, vec![]);
    }
    let messages = &config.messages;

    match (state.activity.clone(), event) {
        (_, Event::FirstFrameRendered) => match state.session {
            SessionStatus::Uninitialized => (
                State {
                    session: SessionStatus::Initializing,
                    ..state
                },
                vec![Effect::InitializeSession],
            ),
            _ => (state, vec![]),
        },

        (Activity::AwaitingSession { picture }, Event::SessionInitialized(Ok(()))) => classify(
            State {
                session: SessionStatus::Ready,
                ..state
            },
            picture,
        ),
        (_, Event::SessionInitialized(Ok(()))) => (
            State {
                session: SessionStatus::Ready,
                ..state
            },
            vec![],
        ),
        (activity, Event::SessionInitialized(Err(error))) => (
            State {
                activity: match activity {
                    Activity::AwaitingSession { .. } => Activity::Idle,
                    other => other,
                },
                status: format!("{}: {}", messages.classifier_unavailable, error),
                session: SessionStatus::Failed(error.to_string()),
                ..state
            },
            vec![],
        ),

        (Activity::WaitingForGallery | Activity::WaitingForCamera, Event::ChooseFromGalleryClicked) => {
            (state, vec![])
        }
        (_, Event::ChooseFromGalleryClicked) => (
            State {
                activity: Activity::WaitingForGallery,
                ..state
            },
            vec![Effect::OpenGallery],
        ),
        // Like camera results, a pick can land on a recreated, idle screen.
        (_, Event::GalleryResult(Ok(Some(uri)))) => load(state, uri, messages),
        (activity, Event::GalleryResult(Ok(None))) => (
            State {
                activity: match activity {
                    Activity::WaitingForGallery => Activity::Idle,
                    other => other,
                },
                ..state
            },
            vec![],
        ),
        (_, Event::GalleryResult(Err(_))) => load_failed(state, messages),

        (Activity::WaitingForGallery | Activity::WaitingForCamera, Event::TakePhotoClicked) => {
            (state, vec![])
        }
        (_, Event::TakePhotoClicked) => (state, vec![Effect::PreparePhotoCapture]),
        (_, Event::CameraUnavailable) => (
            state,
            vec![Effect::ShowMessage(messages.no_camera_app.clone())],
        ),
        (_, Event::PhotoDestinationReady(destination)) => (
            State {
                activity: Activity::WaitingForCamera,
                pending_photo_uri: Some(destination.clone()),
                ..state
            },
            vec![Effect::LaunchCamera { destination }],
        ),
        // After a restore the camera result arrives while the screen is idle.
        (_, Event::CameraResult(Ok(true))) => match state.pending_photo_uri.clone() {
            Some(uri) => load(state, uri, messages),
            None => (state, vec![]),
        },
        (activity, Event::CameraResult(Ok(false))) => (
            State {
                activity: match activity {
                    Activity::WaitingForCamera => Activity::Idle,
                    other => other,
                },
                pending_photo_uri: None,
                ..state
            },
            vec![],
        ),
        (_, Event::CameraResult(Err(_))) => load_failed(
            State {
                pending_photo_uri: None,
                ..state
            },
            messages,
        ),

        (Activity::LoadingImage { uri: loading }, Event::ImageLoadDone { uri, result })
            if loading == uri =>
        {
            let pending_photo_uri = match state.pending_photo_uri {
                Some(pending) if pending == uri => None,
                other => other,
            };
            let state = State {
                pending_photo_uri,
                ..state
            };

            match result {
                Err(_) => load_failed(state, messages),
                Ok(picture) => {
                    let show = Effect::ShowImage(picture.clone());
                    let (state, mut effects) = match state.session.clone() {
                        SessionStatus::Ready => classify(state, picture),
                        SessionStatus::Failed(error) => (
                            State {
                                activity: Activity::Idle,
                                status: format!("{}: {}", messages.classifier_unavailable, error),
                                ..state
                            },
                            vec![],
                        ),
                        _ => (
                            State {
                                activity: Activity::AwaitingSession { picture },
                                ..state
                            },
                            vec![],
                        ),
                    };
                    effects.insert(0, show);
                    (state, effects)
                }
            }
        }

        (Activity::Classifying { job_id: current }, Event::ClassifyDone { job_id, result })
            if current == job_id =>
        {
            (
                State {
                    activity: Activity::Idle,
                    status: describe_result(messages, &result, true),
                    ..state
                },
                vec![],
            )
        }

        (_, Event::Reconfigure) => {
            let saved = state.saved_state();
            (
                State {
                    exit: Some(Exit::Reconfigured(saved.clone())),
                    ..state
                },
                vec![
                    Effect::PersistInstanceState(saved),
                    Effect::ShutdownSession,
                ],
            )
        }
        (_, Event::Destroy) => (
            State {
                exit: Some(Exit::Finished),
                ..state
            },
            vec![Effect::ShutdownSession],
        ),

        _ => (state, vec![]),
    }
}

pub fn is_done(state: &State) -> bool {
    state.exit.is_some()
}

fn load(state: State, uri: ImageUri, messages: &Messages) -> (State, Vec<Effect>) {
    (
        State {
            activity: Activity::LoadingImage { uri: uri.clone() },
            status: messages.processing.clone(),
            ..state
        },
        vec![Effect::LoadImage { uri }],
    )
}

fn load_failed(state: State, messages: &Messages) -> (State, Vec<Effect>) {
    (
        State {
            activity: Activity::Idle,
            status: messages.image_load_failed.clone(),
            ..state
        },
        vec![Effect::ShowMessage(messages.image_load_failed.clone())],
    )
}

fn classify(state: State, picture: Picture) -> (State, Vec<Effect>) {
    let job_id = state.next_job_id;
    (
        State {
            activity: Activity::Classifying { job_id },
            next_job_id: job_id + 1,
            ..state
        },
        vec![Effect::ClassifyImage { job_id, picture }],
    )
}
