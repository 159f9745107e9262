//! Registry of active sessions, at most one per surface identifier.

use std::collections::HashMap;
use std::time::Instant;

use glam::Vec2;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::NetworkConfig;
use crate::render::Painter;
use crate::session::{
    AnimationSession, FrameHandle, FrameScheduler, SessionId, SessionState, Visibility,
};
use crate::surface::SurfaceHost;
use crate::theme::ThemeSignal;

/// Owns every session of a host and the scheduler they share.
///
/// Creating a session for an identifier that already has one destroys the
/// old session first, so two loops never animate the same surface.
pub struct SessionManager<S: FrameScheduler> {
    scheduler: S,
    theme: ThemeSignal,
    sessions: HashMap<SessionId, AnimationSession>,
    visibility: Visibility,
    seed: Option<u64>,
    created: u64,
}

impl<S: FrameScheduler> SessionManager<S> {
    pub fn new(scheduler: S, theme: ThemeSignal) -> Self {
        Self {
            scheduler,
            theme,
            sessions: HashMap::new(),
            visibility: Visibility::Visible,
            seed: None,
            created: 0,
        }
    }

    /// Seed particle generation for reproducible layouts. Each session gets
    /// its own stream derived from the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Mount a session on `host`.
    ///
    /// A missing host is a silent no-op. Returns the new session, which may
    /// still be [`SessionState::Uninitialized`] if the host has no area yet.
    pub fn create(
        &mut self,
        id: impl Into<SessionId>,
        host: Option<Box<dyn SurfaceHost>>,
        config: NetworkConfig,
    ) -> Option<&AnimationSession> {
        let id = id.into();
        let Some(host) = host else {
            debug!("no surface for {}, skipping", id);
            return None;
        };
        self.destroy(&id);

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.created)),
            None => StdRng::from_entropy(),
        };
        self.created += 1;

        let mut session = AnimationSession::new(id.clone(), host, config, &self.theme, rng);
        session.set_visibility(self.visibility, &mut self.scheduler);
        session.mount(&mut self.scheduler);
        info!("mounted session {} ({:?})", id, session.state());

        self.sessions.insert(id.clone(), session);
        self.sessions.get(&id)
    }

    /// Tear down and forget a session. Returns whether one existed.
    pub fn destroy(&mut self, id: &SessionId) -> bool {
        match self.sessions.remove(id) {
            Some(mut session) => {
                session.destroy(&mut self.scheduler);
                true
            }
            None => false,
        }
    }

    pub fn destroy_all(&mut self) {
        for (_, mut session) in self.sessions.drain() {
            session.destroy(&mut self.scheduler);
        }
    }

    /// Deliver a frame callback to its session.
    pub fn frame(
        &mut self,
        id: &SessionId,
        handle: FrameHandle,
        painter: &mut dyn Painter,
    ) -> bool {
        match self.sessions.get_mut(id) {
            Some(session) => session.frame(handle, painter, &mut self.scheduler),
            None => false,
        }
    }

    /// Broadcast page visibility to every session.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        for session in self.sessions.values_mut() {
            session.set_visibility(visibility, &mut self.scheduler);
        }
    }

    pub fn pause(&mut self, id: &SessionId) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.pause(&mut self.scheduler);
        }
    }

    pub fn resume(&mut self, id: &SessionId) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.resume(&mut self.scheduler);
        }
    }

    /// Tell every session its host may have been resized.
    pub fn notify_resize(&mut self, now: Instant) {
        for session in self.sessions.values_mut() {
            session.notify_resize(now);
        }
    }

    /// Flush due resizes. Returns how many sessions regenerated or mounted.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut changed = 0;
        for session in self.sessions.values_mut() {
            if session.poll(now, &mut self.scheduler) {
                changed += 1;
            }
        }
        changed
    }

    /// Earliest pending resize deadline across sessions.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sessions.values().filter_map(AnimationSession::resize_deadline).min()
    }

    pub fn set_pointer(&mut self, id: &SessionId, position: Option<Vec2>) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.set_pointer(position);
        }
    }

    pub fn reconfigure(&mut self, id: &SessionId, config: NetworkConfig) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.reconfigure(config);
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<&AnimationSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut AnimationSession> {
        self.sessions.get_mut(id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions currently producing frames.
    pub fn running(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.state() == SessionState::Running)
            .count()
    }

    pub fn theme_signal(&self) -> &ThemeSignal {
        &self.theme
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S: FrameScheduler> Drop for SessionManager<S> {
    fn drop(&mut self) {
        self.destroy_all();
    }
}
