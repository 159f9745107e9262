//! # constellation
//!
//! Animated particle-network backdrops: particles drift across a surface,
//! bounce off its edges, and nearby pairs are joined by lines that fade with
//! distance. Colors follow the host's light or dark theme.
//!
//! ## Quick Start
//!
//! ```ignore
//! use constellation::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     Backdrop::new("network-canvas-skills")
//!         .with_title("Skills")
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Surfaces
//!
//! A [`SurfaceHost`] reports the logical size and pixel ratio of whatever is
//! being drawn on. The [`Surface`] built from it is what the rest of the
//! engine sees; a host with zero area defers everything until it grows.
//!
//! ### Sessions
//!
//! An [`AnimationSession`] owns one particle field and runs
//! `advance → connections → paint` once per frame callback from a
//! [`FrameScheduler`]. The [`SessionManager`] keeps at most one session per
//! surface identifier and broadcasts visibility changes:
//!
//! ```ignore
//! let mut manager = SessionManager::new(scheduler, ThemeSignal::default());
//! manager.create("hero", Some(Box::new(StaticHost::new(800.0, 600.0))), NetworkConfig::default());
//! manager.set_visibility(Visibility::Hidden); // pauses every session
//! ```
//!
//! ### Rendering
//!
//! Drawing goes through the [`Painter`] trait. [`DrawList`] records commands,
//! which the GPU canvas tessellates and draws; tests inspect them directly.
//!
//! ## Logging
//!
//! Lifecycle events are reported through the `log` facade. The binary
//! installs `env_logger`; set `RUST_LOG=constellation=debug` for per-session
//! detail.

pub mod backdrop;
pub mod config;
pub mod connections;
pub mod error;
mod gpu;
pub mod input;
pub mod manager;
pub mod particles;
pub mod render;
pub mod session;
pub mod surface;
pub mod theme;
pub mod time;

pub use backdrop::Backdrop;
pub use config::{Breakpoint, NetworkConfig, PointerConfig, Section};
pub use connections::{
    connections, link_weight, pointer_links, Connection, PointerLink, ProximityGraph,
};
pub use error::{AppError, ConfigError, GpuError};
pub use glam::Vec2;
pub use gpu::{tessellate, Vertex, CIRCLE_SEGMENTS};
pub use input::Pointer;
pub use manager::SessionManager;
pub use particles::{advance, generate, Particle, ParticleField};
pub use render::{paint, paint_pointer_links, DrawCommand, DrawList, Painter, Rgba, ThemePalette};
pub use session::{
    AnimationSession, FrameHandle, FrameScheduler, SessionId, SessionState, Visibility,
};
pub use surface::{Bounds, Extent, StaticHost, Surface, SurfaceHost};
pub use theme::{resolve_theme, Theme, ThemeHints, ThemeSignal, ThemeWatcher};
pub use time::{Debounce, Time};

/// Convenient imports for common usage.
///
/// ```ignore
/// use constellation::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backdrop::Backdrop;
    pub use crate::config::{NetworkConfig, PointerConfig, Section};
    pub use crate::error::AppError;
    pub use crate::manager::SessionManager;
    pub use crate::render::{DrawList, Painter, Rgba};
    pub use crate::session::{FrameHandle, FrameScheduler, SessionId, SessionState, Visibility};
    pub use crate::surface::{StaticHost, SurfaceHost};
    pub use crate::theme::{Theme, ThemeSignal};
    pub use glam::Vec2;
}
