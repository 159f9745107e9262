//! Display theme resolution and the theme signal sessions subscribe to.
//!
//! The theme is owned by the host (a settings toggle, the OS appearance, a
//! page attribute). Sessions only read it: the host publishes [`ThemeHints`]
//! on a [`ThemeSignal`], and every session holds a [`ThemeWatcher`] that
//! notices new publications and re-resolves the theme for its next frame.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::render::Rgba;

/// The two color schemes the renderer knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Parse an explicit theme attribute value.
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Raw presentation state a theme can be derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeHints {
    /// Explicit theme attribute, e.g. `"light"`.
    pub attribute: Option<String>,
    /// Resolved background color of the page or window.
    pub background: Option<Rgba>,
}

impl ThemeHints {
    pub fn with_attribute(value: impl Into<String>) -> Self {
        Self {
            attribute: Some(value.into()),
            background: None,
        }
    }

    pub fn with_background(background: Rgba) -> Self {
        Self {
            attribute: None,
            background: Some(background),
        }
    }
}

/// Resolve hints to a theme.
///
/// Precedence: a recognized explicit attribute, then the luminance of an
/// opaque background, then [`Theme::Dark`].
pub fn resolve_theme(hints: &ThemeHints) -> Theme {
    if let Some(theme) = hints.attribute.as_deref().and_then(Theme::from_attribute) {
        return theme;
    }
    match hints.background {
        Some(bg) if bg.a > 0.0 => {
            if bg.luminance() > 0.5 {
                Theme::Light
            } else {
                Theme::Dark
            }
        }
        _ => Theme::Dark,
    }
}

#[derive(Debug)]
struct SignalInner {
    hints: RwLock<ThemeHints>,
    version: AtomicU64,
    watchers: AtomicUsize,
}

/// Host-owned theme state.
///
/// Cloning yields another handle to the same signal.
#[derive(Debug, Clone)]
pub struct ThemeSignal {
    inner: Arc<SignalInner>,
}

impl Default for ThemeSignal {
    fn default() -> Self {
        Self::new(ThemeHints::default())
    }
}

impl ThemeSignal {
    pub fn new(hints: ThemeHints) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                hints: RwLock::new(hints),
                version: AtomicU64::new(0),
                watchers: AtomicUsize::new(0),
            }),
        }
    }

    /// Publish new hints and notify watchers.
    pub fn publish(&self, hints: ThemeHints) {
        match self.inner.hints.write() {
            Ok(mut guard) => *guard = hints,
            Err(poisoned) => *poisoned.into_inner() = hints,
        }
        self.inner.version.fetch_add(1, Ordering::Release);
    }

    /// Shorthand for publishing an explicit attribute.
    pub fn set_theme(&self, theme: Theme) {
        let attribute = match theme {
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        self.publish(ThemeHints::with_attribute(attribute));
    }

    pub fn hints(&self) -> ThemeHints {
        match self.inner.hints.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The currently resolved theme.
    pub fn theme(&self) -> Theme {
        resolve_theme(&self.hints())
    }

    /// Start observing the signal.
    pub fn subscribe(&self) -> ThemeWatcher {
        self.inner.watchers.fetch_add(1, Ordering::AcqRel);
        ThemeWatcher {
            inner: Arc::clone(&self.inner),
            seen: None,
        }
    }

    /// Number of live watchers.
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.load(Ordering::Acquire)
    }
}

/// A read-only subscription to a [`ThemeSignal`].
///
/// Dropping the watcher detaches it.
#[derive(Debug)]
pub struct ThemeWatcher {
    inner: Arc<SignalInner>,
    seen: Option<u64>,
}

impl ThemeWatcher {
    /// The resolved theme if the signal changed since the last poll.
    ///
    /// The first poll always reports.
    pub fn poll(&mut self) -> Option<Theme> {
        let version = self.inner.version.load(Ordering::Acquire);
        if self.seen == Some(version) {
            return None;
        }
        self.seen = Some(version);
        Some(self.current())
    }

    pub fn current(&self) -> Theme {
        match self.inner.hints.read() {
            Ok(guard) => resolve_theme(&guard),
            Err(poisoned) => resolve_theme(&poisoned.into_inner()),
        }
    }
}

impl Drop for ThemeWatcher {
    fn drop(&mut self) {
        self.inner.watchers.fetch_sub(1, Ordering::AcqRel);
    }
}
