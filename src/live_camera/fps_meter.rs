use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

/// Frame rate over the last second of frame timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FpsMeter {
    frames: VecDeque<Instant>,
}

impl FpsMeter {
    pub fn record(&mut self, at: Instant) {
        self.frames.push_back(at);
        while let Some(oldest) = self.frames.front() {
            if at.saturating_duration_since(*oldest) > WINDOW {
                self.frames.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn reset(&mut self) {
        self.frames.clear();
    }

    pub fn fps(&self) -> Option<f32> {
        let (first, last) = (self.frames.front()?, self.frames.back()?);
        let elapsed = last.saturating_duration_since(*first).as_secs_f32();
        if self.frames.len() < 2 || elapsed == 0.0 {
            return None;
        }
        Some((self.frames.len() - 1) as f32 / elapsed)
    }

    pub fn label(&self) -> String {
        match self.fps() {
            Some(fps) => format!("{:.1} FPS", fps),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_from_evenly_spaced_frames() {
        let start = Instant::now();
        let mut meter = FpsMeter::default();
        for i in 0..5 {
            meter.record(start + Duration::from_millis(100 * i));
        }

        assert_eq!(meter.label(), "10.0 FPS");
    }

    #[test]
    fn test_old_frames_leave_the_window() {
        let start = Instant::now();
        let mut meter = FpsMeter::default();
        meter.record(start);
        meter.record(start + Duration::from_secs(5));
        meter.record(start + Duration::from_millis(5500));

        assert_eq!(meter.label(), "2.0 FPS");
    }

    #[test]
    fn test_single_frame_has_no_rate() {
        let mut meter = FpsMeter::default();
        meter.record(Instant::now());

        assert_eq!(meter.fps(), None);
        assert_eq!(meter.label(), "");
    }
}
