//! Frame clock: play/pause/stop state machine driven by external ticks.

use log::debug;

use crate::format::Header;

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// At frame 0, not advancing.
    #[default]
    Stopped,
    /// Advancing on each tick.
    Playing,
    /// Frozen on the current frame, resumable.
    Paused,
}

/// Fixed-duration frame clock.
///
/// Holds no timers of its own: the host calls [`PlaybackEngine::tick`] with
/// the time elapsed since the previous call.
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    frame_count: usize,
    frame_duration_ms: f64,
    looping: bool,
    loop_start_frame: usize,
    current_frame: usize,
    accumulated_ms: f64,
    status: PlaybackStatus,
}

impl PlaybackEngine {
    /// Create a stopped engine for the given header's timeline.
    pub fn new(header: &Header) -> Self {
        Self::with_timing(
            header.frame_count as usize,
            header.frame_duration_ms,
            header.looping(),
            header.loop_start_frame as usize,
        )
    }

    /// Create a stopped engine from raw timing values.
    pub fn with_timing(
        frame_count: usize,
        frame_duration_ms: u32,
        looping: bool,
        loop_start_frame: usize,
    ) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_duration_ms: f64::from(frame_duration_ms),
            looping,
            loop_start_frame,
            current_frame: 0,
            accumulated_ms: 0.0,
            status: PlaybackStatus::Stopped,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Time carried toward the next frame.
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    fn last_frame(&self) -> usize {
        self.frame_count - 1
    }

    /// Start or resume playback. No-op while already playing.
    ///
    /// A non-looping animation parked on its last frame restarts from frame 0.
    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        if !self.looping && self.current_frame == self.last_frame() && self.frame_count > 1 {
            self.current_frame = 0;
            self.accumulated_ms = 0.0;
        }
        self.status = PlaybackStatus::Playing;
    }

    /// Freeze on the current frame, keeping accumulated time.
    pub fn pause(&mut self) {
        if self.is_playing() {
            self.status = PlaybackStatus::Paused;
        }
    }

    /// Play if paused or stopped, pause if playing.
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Rewind to frame 0 and stop. The caller should redraw frame 0.
    pub fn stop(&mut self) {
        self.status = PlaybackStatus::Stopped;
        self.current_frame = 0;
        self.accumulated_ms = 0.0;
    }

    /// Jump to a frame, clamped into range. Accumulated time is dropped.
    pub fn seek(&mut self, frame: usize) {
        self.current_frame = frame.min(self.last_frame());
        self.accumulated_ms = 0.0;
    }

    /// Feed elapsed time; returns how many frame steps were applied.
    ///
    /// Every whole frame duration in the accumulator advances one frame, so a
    /// late tick catches up in constant time. A zero duration advances at most
    /// one frame.
    pub fn tick(&mut self, elapsed_ms: f64) -> usize {
        if !self.is_playing() {
            return 0;
        }

        if self.frame_duration_ms <= 0.0 {
            self.accumulated_ms = 0.0;
            return self.advance_by(1) as usize;
        }

        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.accumulated_ms += elapsed_ms;
        }

        if self.accumulated_ms < self.frame_duration_ms {
            return 0;
        }

        let remainder = self.accumulated_ms % self.frame_duration_ms;
        let whole = ((self.accumulated_ms - remainder) / self.frame_duration_ms).round();
        self.accumulated_ms = remainder;

        // Float to int casts saturate.
        let applied = self.advance_by(whole as u64);
        usize::try_from(applied).unwrap_or(usize::MAX)
    }

    /// Apply `steps` frame advances; returns how many took effect before a
    /// non-looping animation paused.
    fn advance_by(&mut self, steps: u64) -> u64 {
        let last = self.last_frame();
        let to_last = (last - self.current_frame) as u64;
        if steps <= to_last {
            self.current_frame += steps as usize;
            return steps;
        }

        let past_last = steps - to_last;
        if !self.looping {
            self.current_frame = last;
            self.status = PlaybackStatus::Paused;
            self.accumulated_ms = 0.0;
            debug!("Reached last frame {}; pausing", self.current_frame);
            return to_last + 1;
        }

        let loop_start = self.loop_start_frame.min(last);
        let loop_len = (last - loop_start + 1) as u64;
        self.current_frame = loop_start + ((past_last - 1) % loop_len) as usize;
        debug!("Looped back to frame {}", loop_start);
        steps
    }
}
