//! Viewport surface: the drawable region a session paints into.
//!
//! Drawing coordinates are logical (CSS-style) pixels. The backing store is
//! sized in device pixels, `logical * pixel_ratio`, so lines stay crisp on
//! high-density displays without the simulation ever seeing device pixels.
//!
//! The host that actually owns the region (a window, a canvas element, an
//! offscreen target) is abstracted behind [`SurfaceHost`].

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

/// Smallest logical width a surface is allowed to have.
pub const MIN_WIDTH: f32 = 300.0;
/// Smallest logical height a surface is allowed to have.
pub const MIN_HEIGHT: f32 = 200.0;

/// A measured rectangle size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when the host has not been laid out yet (or is collapsed).
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Something that owns a drawable rectangle and can report its size.
///
/// Implemented by the windowed host and by [`StaticHost`] for headless use.
pub trait SurfaceHost {
    /// Current rendered size in logical pixels.
    fn measure(&self) -> Extent;

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Width used for responsive breakpoints.
    ///
    /// Defaults to the measured width; hosts embedded in a larger viewport
    /// report the viewport instead.
    fn viewport_width(&self) -> f32 {
        self.measure().width
    }
}

/// The synchronized drawing surface of one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    width: f32,
    height: f32,
    pixel_ratio: f32,
}

impl Surface {
    /// Build a surface from a measurement, clamping to the minimum size.
    ///
    /// Returns `None` for a zero-area measurement: the host is not ready and
    /// the caller should try again later.
    pub fn from_extent(extent: Extent, pixel_ratio: f32) -> Option<Self> {
        if extent.is_empty() {
            return None;
        }
        Some(Self {
            width: extent.width.max(MIN_WIDTH),
            height: extent.height.max(MIN_HEIGHT),
            pixel_ratio: sanitize_ratio(pixel_ratio),
        })
    }

    /// Measure a host. `None` while the host reports zero area.
    pub fn measure(host: &dyn SurfaceHost) -> Option<Self> {
        Self::from_extent(host.measure(), host.pixel_ratio())
    }

    /// Re-measure the host and adopt its geometry.
    ///
    /// Returns `true` when the geometry changed. A zero-area measurement
    /// after initialization is clamped like any other undersized one, so the
    /// surface never drops below the minimum.
    pub fn sync(&mut self, host: &dyn SurfaceHost) -> bool {
        let extent = host.measure();
        let next = Self {
            width: extent.width.max(MIN_WIDTH),
            height: extent.height.max(MIN_HEIGHT),
            pixel_ratio: sanitize_ratio(host.pixel_ratio()),
        };
        if next == *self {
            return false;
        }
        *self = next;
        true
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Logical size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Backing store size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round().max(1.0) as u32,
            (self.height * self.pixel_ratio).round().max(1.0) as u32,
        )
    }

    /// Simulation bounds for this surface.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Whether a logical point lies on the surface.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

fn sanitize_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

/// Axis-aligned simulation area anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The interior rectangle left after insetting every edge by `margin`.
    ///
    /// On an axis too small to hold the inset, both ends collapse onto the
    /// center of that axis.
    pub fn interior(&self, margin: f32) -> (Vec2, Vec2) {
        let (lo_x, hi_x) = inset_axis(self.width, margin);
        let (lo_y, hi_y) = inset_axis(self.height, margin);
        (Vec2::new(lo_x, lo_y), Vec2::new(hi_x, hi_y))
    }
}

fn inset_axis(size: f32, margin: f32) -> (f32, f32) {
    let lo = margin;
    let hi = size - margin;
    if hi >= lo {
        (lo, hi)
    } else {
        let mid = size * 0.5;
        (mid, mid)
    }
}

/// A host with a fixed, externally adjustable size.
///
/// Clones share the same size cell, so a test or an offscreen renderer can
/// keep one handle and resize the host a session was mounted on.
#[derive(Debug, Clone)]
pub struct StaticHost {
    extent: Rc<Cell<Extent>>,
    pixel_ratio: Rc<Cell<f32>>,
}

impl StaticHost {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            extent: Rc::new(Cell::new(Extent::new(width, height))),
            pixel_ratio: Rc::new(Cell::new(1.0)),
        }
    }

    pub fn with_pixel_ratio(self, ratio: f32) -> Self {
        self.pixel_ratio.set(ratio);
        self
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.extent.set(Extent::new(width, height));
    }

    pub fn set_pixel_ratio(&self, ratio: f32) {
        self.pixel_ratio.set(ratio);
    }
}

impl SurfaceHost for StaticHost {
    fn measure(&self) -> Extent {
        self.extent.get()
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio.get()
    }
}
