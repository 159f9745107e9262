//! Frame timing and notification debouncing.
//!
//! [`Time`] counts the frames a session has actually produced. It does not
//! advance while paused, and resuming does not compensate for the frames
//! that were skipped.
//!
//! [`Debounce`] coalesces a burst of notifications (a window being dragged
//! to a new size) into a single deadline.

use std::time::{Duration, Instant};

/// Fixed delay used to coalesce resize notifications.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Frame counting for an animation session.
#[derive(Debug)]
pub struct Time {
    /// When the timer was created.
    start: Instant,
    /// Frames produced since start.
    frame_count: u64,
    /// Frames per second over the last measurement window.
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    /// Total time spent paused.
    pause_elapsed: Duration,
    paused_at: Option<Instant>,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
            paused_at: None,
        }
    }

    /// Record one produced frame. Ignored while paused.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        let now = Instant::now();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Total frames produced.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.paused_at = Some(Instant::now());
        }
    }

    /// Resume counting. The FPS window restarts so the pause does not drag
    /// the measured rate down.
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            if let Some(at) = self.paused_at.take() {
                self.pause_elapsed += now.duration_since(at);
            }
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            self.paused = false;
        }
    }

    /// Time spent producing frames, excluding pauses.
    pub fn active_duration(&self) -> Duration {
        let paused_now = self
            .paused_at
            .map(|at| at.elapsed())
            .unwrap_or(Duration::ZERO);
        self.start
            .elapsed()
            .saturating_sub(self.pause_elapsed + paused_now)
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Coalesces repeated triggers into one deadline `window` after the last.
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Note a notification at `now`, pushing the deadline back.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// True exactly once, the first time `now` reaches the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}
