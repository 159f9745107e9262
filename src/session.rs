//! Animation sessions: one running particle network on one surface.
//!
//! A session is driven by its host's frame scheduler. Each frame callback
//! runs `advance → connections → paint` and requests the next frame; that
//! request is the only point where control returns to the host.
//!
//! ```text
//! Uninitialized ──mount──▶ Running ◀──resume/visible── Paused
//!        │                   │ ──────pause/hidden──────▶ │
//!        └───────────────────┴────────destroy────────────┴──▶ Destroyed
//! ```
//!
//! Cancellation is cooperative: pausing or destroying releases the pending
//! frame handle, and a callback that arrives with a released handle is
//! ignored.

use std::fmt;
use std::time::Instant;

use glam::Vec2;
use log::debug;
use rand::rngs::StdRng;

use crate::config::NetworkConfig;
use crate::connections::{pointer_links, ProximityGraph};
use crate::particles::ParticleField;
use crate::render::{paint, paint_pointer_links, Painter};
use crate::surface::{Bounds, Surface, SurfaceHost};
use crate::theme::{Theme, ThemeSignal, ThemeWatcher};
use crate::time::{Debounce, Time};

/// Identifier of the drawing surface a session is mounted on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the host to report a nonzero size.
    Uninitialized,
    Running,
    Paused,
    /// Terminal.
    Destroyed,
}

/// Page or window visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Opaque token for one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The host's per-display-refresh callback mechanism.
pub trait FrameScheduler {
    /// Ask for one frame callback for `session`.
    fn request_frame(&mut self, session: &SessionId) -> FrameHandle;
    /// Withdraw a pending request. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A particle network mounted on one surface.
pub struct AnimationSession {
    id: SessionId,
    host: Box<dyn SurfaceHost>,
    surface: Option<Surface>,
    /// Configuration as mounted, before breakpoints.
    base_config: NetworkConfig,
    /// Configuration of the current generation.
    config: NetworkConfig,
    field: ParticleField,
    graph: ProximityGraph,
    state: SessionState,
    frame: Option<FrameHandle>,
    theme_watcher: Option<ThemeWatcher>,
    theme: Theme,
    pointer: Option<Vec2>,
    hidden: bool,
    resize: Debounce,
    time: Time,
    generation: u64,
    rng: StdRng,
}

impl fmt::Debug for AnimationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("surface", &self.surface)
            .field("particles", &self.field.len())
            .field("generation", &self.generation)
            .field("frame", &self.frame)
            .finish()
    }
}

impl AnimationSession {
    /// Create an uninitialized session. Call [`mount`](Self::mount) to start it.
    pub fn new(
        id: impl Into<SessionId>,
        host: Box<dyn SurfaceHost>,
        config: NetworkConfig,
        theme: &ThemeSignal,
        rng: StdRng,
    ) -> Self {
        let config = config.normalized();
        let mut watcher = theme.subscribe();
        let current = watcher.poll().unwrap_or_default();
        Self {
            id: id.into(),
            host,
            surface: None,
            base_config: config.clone(),
            config,
            field: ParticleField::empty(Bounds::new(0.0, 0.0)),
            graph: ProximityGraph::new(),
            state: SessionState::Uninitialized,
            frame: None,
            theme_watcher: Some(watcher),
            theme: current,
            pointer: None,
            hidden: false,
            resize: Debounce::default(),
            time: Time::new(),
            generation: 0,
            rng,
        }
    }

    /// Sync the surface, generate the first field and start the frame loop.
    ///
    /// Stays uninitialized (and returns `false`) while the host reports zero
    /// area; the next resize retries. A hidden page mounts straight into
    /// [`SessionState::Paused`].
    pub fn mount(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state != SessionState::Uninitialized {
            return false;
        }
        let Some(surface) = Surface::measure(self.host.as_ref()) else {
            debug!("session {}: host has no area yet, deferring", self.id);
            return false;
        };
        self.surface = Some(surface);
        self.regenerate();

        if self.hidden {
            self.state = SessionState::Paused;
            self.time.pause();
        } else {
            self.state = SessionState::Running;
            self.frame = Some(scheduler.request_frame(&self.id));
        }
        debug!(
            "session {}: mounted {}x{} @{}x with {} particles ({:?})",
            self.id,
            surface.width(),
            surface.height(),
            surface.pixel_ratio(),
            self.field.len(),
            self.state
        );
        true
    }

    /// Handle a frame callback.
    ///
    /// Returns `false` without drawing when the handle is not the one this
    /// session is waiting for (paused, destroyed or superseded).
    pub fn frame(
        &mut self,
        handle: FrameHandle,
        painter: &mut dyn Painter,
        scheduler: &mut dyn FrameScheduler,
    ) -> bool {
        if self.state != SessionState::Running || self.frame != Some(handle) {
            return false;
        }
        self.frame = None;

        if let Some(theme) = self.theme_watcher.as_mut().and_then(ThemeWatcher::poll) {
            if theme != self.theme {
                debug!("session {}: theme -> {:?}", self.id, theme);
            }
            self.theme = theme;
        }

        self.field.advance();
        self.graph.rebuild(self.field.particles(), self.config.max_connection_distance);
        self.render(painter);
        self.time.tick();

        self.frame = Some(scheduler.request_frame(&self.id));
        true
    }

    /// Draw the current state without stepping the simulation.
    pub fn render(&self, painter: &mut dyn Painter) {
        let particles = self.field.particles();
        paint(painter, particles, self.graph.edges(), self.theme, &self.config);

        if let (Some(style), Some(pointer)) = (self.config.pointer.as_ref(), self.pointer) {
            let reach = self.config.max_connection_distance * style.distance_multiplier;
            let links = pointer_links(particles, pointer, reach);
            paint_pointer_links(
                painter,
                particles,
                pointer,
                &links,
                style,
                self.config.connection_opacity,
            );
        }
    }

    /// Stop producing frames.
    pub fn pause(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state != SessionState::Running {
            return;
        }
        if let Some(handle) = self.frame.take() {
            scheduler.cancel_frame(handle);
        }
        self.state = SessionState::Paused;
        self.time.pause();
        debug!("session {}: paused after {} frames", self.id, self.time.frame());
    }

    /// Continue from the current state with one fresh frame request.
    pub fn resume(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state != SessionState::Paused {
            return;
        }
        self.state = SessionState::Running;
        self.time.resume();
        self.frame = Some(scheduler.request_frame(&self.id));
        debug!("session {}: resumed", self.id);
    }

    /// Apply a visibility change from the host.
    pub fn set_visibility(&mut self, visibility: Visibility, scheduler: &mut dyn FrameScheduler) {
        if self.state == SessionState::Destroyed {
            return;
        }
        self.hidden = visibility == Visibility::Hidden;
        match (self.state, visibility) {
            (SessionState::Running, Visibility::Hidden) => self.pause(scheduler),
            (SessionState::Paused, Visibility::Visible) => self.resume(scheduler),
            _ => {}
        }
    }

    /// Note that the host may have changed size. Work happens in
    /// [`poll`](Self::poll) once the debounce window has passed.
    pub fn notify_resize(&mut self, now: Instant) {
        if self.state != SessionState::Destroyed {
            self.resize.trigger(now);
        }
    }

    /// Flush a due resize: re-sync the surface and regenerate the field when
    /// the geometry or the effective configuration changed. An uninitialized
    /// session retries its mount instead.
    ///
    /// Returns `true` when a new generation was created.
    pub fn poll(&mut self, now: Instant, scheduler: &mut dyn FrameScheduler) -> bool {
        if !self.resize.fire(now) {
            return false;
        }
        match self.state {
            SessionState::Destroyed => false,
            SessionState::Uninitialized => self.mount(scheduler),
            SessionState::Running | SessionState::Paused => {
                let Some(surface) = self.surface.as_mut() else {
                    return false;
                };
                let geometry_changed = surface.sync(self.host.as_ref());
                let adapted = self.base_config.adapted_to(self.host.viewport_width());
                if !geometry_changed && adapted == self.config {
                    return false;
                }
                self.regenerate();
                true
            }
        }
    }

    /// Deadline of a pending debounced resize.
    pub fn resize_deadline(&self) -> Option<Instant> {
        self.resize.deadline()
    }

    /// Replace the mounted configuration and regenerate in place.
    pub fn reconfigure(&mut self, config: NetworkConfig) {
        if self.state == SessionState::Destroyed {
            return;
        }
        self.base_config = config.normalized();
        if self.surface.is_some() {
            self.regenerate();
        } else {
            self.config = self.base_config.clone();
        }
    }

    /// Update the pointer position (logical px). Positions off the surface
    /// clear the pointer.
    pub fn set_pointer(&mut self, position: Option<Vec2>) {
        self.pointer = match (position, self.surface) {
            (Some(p), Some(surface)) if surface.contains(p) => Some(p),
            _ => None,
        };
    }

    /// Tear down: release the pending frame and detach the theme watcher.
    /// Terminal; every later call is ignored.
    pub fn destroy(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state == SessionState::Destroyed {
            return;
        }
        if let Some(handle) = self.frame.take() {
            scheduler.cancel_frame(handle);
        }
        self.theme_watcher = None;
        self.resize.cancel();
        self.graph.clear();
        self.field = ParticleField::empty(self.field.bounds());
        self.pointer = None;
        self.state = SessionState::Destroyed;
        debug!("session {}: destroyed after {} frames", self.id, self.time.frame());
    }

    fn regenerate(&mut self) {
        let Some(surface) = self.surface else {
            return;
        };
        self.config = self.base_config.adapted_to(self.host.viewport_width());
        self.field = ParticleField::generate(&self.config, surface.bounds(), &mut self.rng);
        self.graph.clear();
        self.generation += 1;
        if self.pointer.is_some_and(|p| !surface.contains(p)) {
            self.pointer = None;
        }
        debug!(
            "session {}: generation {} with {} particles, link distance {}",
            self.id,
            self.generation,
            self.field.len(),
            self.config.max_connection_distance
        );
    }

    #[inline]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn surface(&self) -> Option<Surface> {
        self.surface
    }

    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    #[inline]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    #[inline]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[inline]
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Frames produced so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.time.frame()
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.time.fps()
    }

    /// Number of field generations created.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The frame this session is waiting for.
    #[inline]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    /// Whether the session still observes the theme signal.
    #[inline]
    pub fn is_observing_theme(&self) -> bool {
        self.theme_watcher.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;
    use crate::surface::StaticHost;
    use rand::SeedableRng;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        next: u64,
        pending: Vec<FrameHandle>,
    }

    impl FrameScheduler for Recorder {
        fn request_frame(&mut self, _session: &SessionId) -> FrameHandle {
            self.next += 1;
            let handle = FrameHandle(self.next);
            self.pending.push(handle);
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.pending.retain(|h| *h != handle);
        }
    }

    fn session(host: &StaticHost, signal: &ThemeSignal) -> AnimationSession {
        AnimationSession::new(
            "network-canvas",
            Box::new(host.clone()),
            NetworkConfig::default(),
            signal,
            StdRng::seed_from_u64(11),
        )
    }

    #[test]
    fn test_mount_starts_running() {
        let host = StaticHost::new(1280.0, 720.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);

        assert_eq!(s.state(), SessionState::Uninitialized);
        assert!(s.mount(&mut sched));
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.field().len(), 50);
        assert_eq!(sched.pending.len(), 1);
        assert!(!s.mount(&mut sched));
    }

    #[test]
    fn test_frame_runs_pipeline_and_reschedules() {
        let host = StaticHost::new(1280.0, 720.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        s.mount(&mut sched);

        let mut list = DrawList::new();
        let handle = sched.pending.pop().unwrap();
        assert!(s.frame(handle, &mut list, &mut sched));
        assert_eq!(s.frames(), 1);
        assert!(!list.is_empty());
        assert_eq!(sched.pending.len(), 1);

        // The same handle cannot run twice.
        assert!(!s.frame(handle, &mut list, &mut sched));
    }

    #[test]
    fn test_hidden_at_mount_starts_paused() {
        let host = StaticHost::new(800.0, 600.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);

        s.set_visibility(Visibility::Hidden, &mut sched);
        s.mount(&mut sched);
        assert_eq!(s.state(), SessionState::Paused);
        assert!(sched.pending.is_empty());

        s.set_visibility(Visibility::Visible, &mut sched);
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(sched.pending.len(), 1);
    }

    #[test]
    fn test_resize_is_debounced() {
        let host = StaticHost::new(1280.0, 720.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        s.mount(&mut sched);
        let t0 = Instant::now();

        host.resize(1100.0, 700.0);
        s.notify_resize(t0);
        host.resize(1000.0, 700.0);
        s.notify_resize(t0 + Duration::from_millis(50));

        assert!(!s.poll(t0 + Duration::from_millis(100), &mut sched));
        assert!(s.poll(t0 + Duration::from_millis(150), &mut sched));
        assert_eq!(s.generation(), 2);
        assert_eq!(s.surface().unwrap().width(), 1000.0);
        // Tablet breakpoint: floor(50 * 0.8)
        assert_eq!(s.field().len(), 40);
        assert_eq!(s.state(), SessionState::Running);
    }

    #[test]
    fn test_resize_without_change_keeps_generation() {
        let host = StaticHost::new(1280.0, 720.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        s.mount(&mut sched);

        let t0 = Instant::now();
        s.notify_resize(t0);
        assert!(!s.poll(t0 + Duration::from_secs(1), &mut sched));
        assert_eq!(s.generation(), 1);
    }

    #[test]
    fn test_theme_change_applies_next_frame() {
        let host = StaticHost::new(800.0, 600.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        s.mount(&mut sched);
        assert_eq!(s.theme(), Theme::Dark);

        signal.set_theme(Theme::Light);
        assert_eq!(s.theme(), Theme::Dark);

        let handle = sched.pending.pop().unwrap();
        s.frame(handle, &mut DrawList::new(), &mut sched);
        assert_eq!(s.theme(), Theme::Light);
    }

    #[test]
    fn test_pointer_off_surface_is_cleared() {
        let host = StaticHost::new(800.0, 600.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        s.mount(&mut sched);

        s.set_pointer(Some(Vec2::new(400.0, 300.0)));
        assert_eq!(s.pointer(), Some(Vec2::new(400.0, 300.0)));
        s.set_pointer(Some(Vec2::new(-5.0, 300.0)));
        assert_eq!(s.pointer(), None);
    }

    #[test]
    fn test_destroy_detaches_everything() {
        let host = StaticHost::new(800.0, 600.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        s.mount(&mut sched);
        assert_eq!(signal.watcher_count(), 1);

        s.destroy(&mut sched);
        assert_eq!(s.state(), SessionState::Destroyed);
        assert!(sched.pending.is_empty());
        assert_eq!(signal.watcher_count(), 0);
        assert!(!s.is_observing_theme());

        s.resume(&mut sched);
        s.set_visibility(Visibility::Visible, &mut sched);
        s.notify_resize(Instant::now());
        assert!(sched.pending.is_empty());
        assert_eq!(s.state(), SessionState::Destroyed);
    }

    fn fixed(count: usize) -> NetworkConfig {
        NetworkConfig {
            particle_count: count,
            responsive: false,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn test_reconfigure_running_starts_new_generation() {
        let host = StaticHost::new(800.0, 600.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        s.mount(&mut sched);
        let pending = s.pending_frame();
        assert_eq!(s.generation(), 1);

        s.reconfigure(fixed(12));
        assert_eq!(s.generation(), 2);
        assert_eq!(s.field().len(), 12);
        assert_eq!(s.config().particle_count, 12);
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.pending_frame(), pending);
        assert_eq!(sched.pending.len(), 1);
    }

    #[test]
    fn test_reconfigure_before_mount_is_used_by_mount() {
        let host = StaticHost::new(0.0, 0.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        assert!(!s.mount(&mut sched));

        s.reconfigure(fixed(7));
        assert_eq!(s.state(), SessionState::Uninitialized);
        assert_eq!(s.generation(), 0);
        assert!(s.field().is_empty());
        assert_eq!(s.config().particle_count, 7);

        host.resize(800.0, 600.0);
        assert!(s.mount(&mut sched));
        assert_eq!(s.generation(), 1);
        assert_eq!(s.field().len(), 7);
    }

    #[test]
    fn test_reconfigure_after_destroy_is_ignored() {
        let host = StaticHost::new(800.0, 600.0);
        let signal = ThemeSignal::default();
        let mut sched = Recorder::default();
        let mut s = session(&host, &signal);
        s.mount(&mut sched);
        s.destroy(&mut sched);
        let before = s.config().clone();

        s.reconfigure(fixed(12));
        assert_eq!(s.config(), &before);
        assert_eq!(s.generation(), 1);
        assert!(s.field().is_empty());
        assert_eq!(s.state(), SessionState::Destroyed);
        assert!(sched.pending.is_empty());
    }
}
