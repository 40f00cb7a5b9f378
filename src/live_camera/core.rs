use crate::config::{CameraSettings, Config};
use crate::device_camera::interface::{DeviceCameraEvent, Frame};
use crate::image_classifier::interface::ClassificationError;
use crate::live_camera::fps_meter::FpsMeter;
use crate::session::status::{describe_result, SessionStatus};
use crate::session::worker::JobResult;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    NotStarted,
    Started,
    Stopped,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub phase: Phase,
    pub session: SessionStatus,
    /// Working buffer size, known once the camera reports it.
    pub frame_size: Option<(u32, u32)>,
    pub fps: FpsMeter,
    pub show_fps: bool,
    pub status: String,
    /// Latest submitted job still waiting for its result.
    pub pending_job: Option<u64>,
    pub next_job_id: u64,
}

impl State {
    pub fn overlay(&self) -> String {
        if self.show_fps {
            self.fps.label()
        } else {
            String::new()
        }
    }
}

#[derive(Debug)]
pub enum Event {
    Start,
    FirstFrameRendered,
    SessionInitialized(Result<(), ClassificationError>),
    Camera(DeviceCameraEvent),
    CameraFailed(String),
    ClassifyDone { job_id: u64, result: JobResult },
    Stop,
    Destroy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartCamera(CameraSettings),
    StopCamera,
    InitializeSession,
    DisplayFrame(Frame),
    ClassifyFrame { job_id: u64, frame: Frame },
    ShutdownSession,
}

pub fn init() -> (State, Vec<Effect>) {
    (
        State {
            phase: Phase::NotStarted,
            session: SessionStatus::Uninitialized,
            frame_size: None,
            fps: FpsMeter::default(),
            show_fps: false,
            status: String::new(),
            pending_job: None,
            next_job_id: 0,
        },
        vec![],
    )
}

pub fn transition(config: &Config, state: State, event: Event) -> (State, Vec<Effect>) {
    if state.phase == Phase::Destroyed {
        return (state, vec![]);
    }

    match (state.phase.clone(), event) {
        (Phase::NotStarted, Event::Start) => (
            State {
                phase: Phase::Started,
                show_fps: config.camera.show_fps,
                ..state
            },
            vec![Effect::StartCamera(config.camera.clone())],
        ),

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

        (_, Event::SessionInitialized(Ok(()))) => (
            State {
                session: SessionStatus::Ready,
                ..state
            },
            vec![],
        ),
        (_, Event::SessionInitialized(Err(error))) => (
            State {
                status: format!("{}: {}", config.messages.classifier_unavailable, error),
                session: SessionStatus::Failed(error.to_string()),
                ..state
            },
            vec![],
        ),

        (Phase::Started, Event::Camera(DeviceCameraEvent::Started { width, height })) => {
            let mut state = state;
            state.frame_size = Some((width, height));
            state.fps.reset();
            (state, vec![])
        }
        (Phase::Started, Event::Camera(DeviceCameraEvent::Frame(frame))) => {
            let mut state = state;
            state.fps.record(frame.captured_at);

            if !state.session.is_ready() {
                return (state, vec![Effect::DisplayFrame(frame)]);
            }

            let job_id = state.next_job_id;
            state.next_job_id += 1;
            state.pending_job = Some(job_id);
            (
                state,
                vec![
                    Effect::DisplayFrame(frame.clone()),
                    Effect::ClassifyFrame { job_id, frame },
                ],
            )
        }
        (_, Event::Camera(DeviceCameraEvent::Stopped)) => (
            State {
                phase: Phase::Stopped,
                frame_size: None,
                ..state
            },
            vec![],
        ),
        (_, Event::CameraFailed(message)) => (
            State {
                phase: Phase::Stopped,
                frame_size: None,
                status: message,
                ..state
            },
            vec![],
        ),

        (_, Event::ClassifyDone { job_id, result }) => {
            let pending_job = match state.pending_job {
                Some(pending) if pending == job_id => None,
                other => other,
            };
            (
                State {
                    status: describe_result(&config.messages, &result, false),
                    pending_job,
                    ..state
                },
                vec![],
            )
        }

        (Phase::Started, Event::Stop) => (
            State {
                phase: Phase::Stopped,
                ..state
            },
            vec![Effect::StopCamera],
        ),

        (phase, Event::Destroy) => {
            let mut effects = vec![];
            if phase == Phase::Started {
                effects.push(Effect::StopCamera);
            }
            effects.push(Effect::ShutdownSession);
            (
                State {
                    phase: Phase::Destroyed,
                    pending_job: None,
                    ..state
                },
                effects,
            )
        }

        _ => (state, vec![]),
    }
}

pub fn is_done(state: &State) -> bool {
    state.phase == Phase::Destroyed
}
