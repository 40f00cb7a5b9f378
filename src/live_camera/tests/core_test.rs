use crate::config::Config;
use crate::device_camera::interface::{DeviceCameraEvent, Frame};
use crate::image_classifier::interface::ClassificationError;
use crate::live_camera::core::{init, is_done, transition, Effect, Event, Phase, State};
use crate::live_camera::tests::fixture::tabby;
use crate::session::status::SessionStatus;
use image::RgbaImage;

fn frame() -> Frame {
    Frame::new(RgbaImage::new(4, 3))
}

fn started(config: &Config) -> State {
    let (state, _) = init();
    let (state, _) = transition(config, state, Event::Start);
    state
}

fn ready(config: &Config) -> State {
    let state = started(config);
    let (state, _) = transition(config, state, Event::FirstFrameRendered);
    let (state, _) = transition(config, state, Event::SessionInitialized(Ok(())));
    state
}

#[test]
fn test_init() {
    let (state, effects) = init();

    assert_eq!(state.phase, Phase::NotStarted);
    assert_eq!(state.session, SessionStatus::Uninitialized);
    assert!(effects.is_empty());
}

#[test]
fn test_start_opens_rear_camera_with_fps_overlay() {
    let config = Config::default();
    let (state, _) = init();

    let (state, effects) = transition(&config, state, Event::Start);

    assert_eq!(state.phase, Phase::Started);
    assert!(state.show_fps);
    assert_eq!(effects, vec![Effect::StartCamera(config.camera.clone())]);
    assert_eq!(config.camera.camera_index, 0);
}

#[test]
fn test_first_frame_initializes_session_once() {
    let config = Config::default();
    let state = started(&config);

    let (state, effects) = transition(&config, state, Event::FirstFrameRendered);
    assert_eq!(state.session, SessionStatus::Initializing);
    assert_eq!(effects, vec![Effect::InitializeSession]);

    let (state, effects) = transition(&config, state, Event::FirstFrameRendered);
    assert!(effects.is_empty());

    let (state, _) = transition(&config, state, Event::SessionInitialized(Ok(())));
    let (_, effects) = transition(&config, state, Event::FirstFrameRendered);
    assert!(effects.is_empty());
}

#[test]
fn test_frames_before_session_ready_are_only_displayed() {
    let config = Config::default();
    let state = started(&config);
    let frame = frame();

    let (state, effects) = transition(
        &config,
        state,
        Event::Camera(DeviceCameraEvent::Frame(frame.clone())),
    );

    assert_eq!(effects, vec![Effect::DisplayFrame(frame)]);
    assert_eq!(state.pending_job, None);
}

#[test]
fn test_frame_is_displayed_and_classified_when_ready() {
    let config = Config::default();
    let state = ready(&config);
    let frame = frame();

    let (state, effects) = transition(
        &config,
        state,
        Event::Camera(DeviceCameraEvent::Frame(frame.clone())),
    );

    assert_eq!(
        effects,
        vec![
            Effect::DisplayFrame(frame.clone()),
            Effect::ClassifyFrame { job_id: 0, frame },
        ]
    );
    assert_eq!(state.pending_job, Some(0));
    assert_eq!(state.next_job_id, 1);
}

#[test]
fn test_result_is_written_to_status() {
    let config = Config::default();
    let state = ready(&config);
    let (state, _) = transition(
        &config,
        state,
        Event::Camera(DeviceCameraEvent::Frame(frame())),
    );

    let (state, effects) = transition(
        &config,
        state,
        Event::ClassifyDone {
            job_id: 0,
            result: Ok(tabby()),
        },
    );

    assert_eq!(state.status, "[tabby (80.0%), tiger cat (15.0%)]");
    assert_eq!(state.pending_job, None);
    assert!(effects.is_empty());
}

#[test]
fn test_failure_is_written_to_status() {
    let config = Config::default();
    let state = ready(&config);

    let (state, _) = transition(
        &config,
        state,
        Event::ClassifyDone {
            job_id: 0,
            result: Err(ClassificationError::Inference("bad tensor".to_string())),
        },
    );

    assert_eq!(
        state.status,
        "Classification failed: inference failed: bad tensor"
    );
}

#[test]
fn test_older_result_keeps_newer_job_pending() {
    let config = Config::default();
    let state = ready(&config);
    let (state, _) = transition(&config, state, Event::Camera(DeviceCameraEvent::Frame(frame())));
    let (state, _) = transition(&config, state, Event::Camera(DeviceCameraEvent::Frame(frame())));

    let (state, _) = transition(
        &config,
        state,
        Event::ClassifyDone {
            job_id: 0,
            result: Ok(tabby()),
        },
    );

    assert_eq!(state.pending_job, Some(1));
}

#[test]
fn test_session_failure_is_reported() {
    let config = Config::default();
    let state = started(&config);
    let (state, _) = transition(&config, state, Event::FirstFrameRendered);

    let (state, _) = transition(
        &config,
        state,
        Event::SessionInitialized(Err(ClassificationError::ModelLoad("missing".to_string()))),
    );

    assert!(matches!(state.session, SessionStatus::Failed(_)));
    assert!(state.status.starts_with("Classifier unavailable"));
}

#[test]
fn test_camera_started_records_buffer_and_stopped_releases_it() {
    let config = Config::default();
    let state = started(&config);

    let (state, _) = transition(
        &config,
        state,
        Event::Camera(DeviceCameraEvent::Started {
            width: 640,
            height: 480,
        }),
    );
    assert_eq!(state.frame_size, Some((640, 480)));

    let (state, effects) = transition(&config, state, Event::Stop);
    assert_eq!(effects, vec![Effect::StopCamera]);
    assert_eq!(state.phase, Phase::Stopped);

    let (state, _) = transition(&config, state, Event::Camera(DeviceCameraEvent::Stopped));
    assert_eq!(state.frame_size, None);
}

#[test]
fn test_frames_after_stop_are_ignored() {
    let config = Config::default();
    let state = ready(&config);
    let (state, _) = transition(&config, state, Event::Stop);

    let (_, effects) = transition(&config, state, Event::Camera(DeviceCameraEvent::Frame(frame())));

    assert!(effects.is_empty());
}

#[test]
fn test_destroy_stops_camera_and_shuts_session_down() {
    let config = Config::default();
    let state = ready(&config);

    let (state, effects) = transition(&config, state, Event::Destroy);

    assert_eq!(effects, vec![Effect::StopCamera, Effect::ShutdownSession]);
    assert!(is_done(&state));

    let (_, effects) = transition(
        &config,
        state,
        Event::ClassifyDone {
            job_id: 0,
            result: Ok(tabby()),
        },
    );
    assert!(effects.is_empty());
}
