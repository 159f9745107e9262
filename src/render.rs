//! Theme-adaptive rendering of the particle network.
//!
//! The renderer never touches a graphics API directly. It issues drawing
//! commands through the [`Painter`] trait, which the GPU canvas, a test
//! recorder or any other 2D backend can implement. Every frame starts with a
//! full clear, so the output depends only on the current state and never on
//! pixels from a previous frame.
//!
//! ```ignore
//! let mut list = DrawList::new();
//! paint(&mut list, field.particles(), graph.edges(), Theme::Dark, &config);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{NetworkConfig, PointerConfig};
use crate::connections::{Connection, PointerLink};
use crate::particles::Particle;
use crate::theme::Theme;

/// Straight-alpha RGBA color, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Relative luminance (sRGB primaries, linearized), alpha ignored.
    pub fn luminance(&self) -> f32 {
        fn linear(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Parse a CSS color as reported by computed styles:
    /// `rgb(r, g, b)`, `rgba(r, g, b, a)`, `#rgb` or `#rrggbb`.
    pub fn parse_css(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = text.to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |s: &str| s.parse::<f32>().ok().map(|v| (v / 255.0).clamp(0.0, 1.0));
        let alpha = match parts.get(3) {
            Some(a) => a.parse::<f32>().ok()?.clamp(0.0, 1.0),
            None => 1.0,
        };
        Some(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha))
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        3 => {
            let (r, g, b) = (digit(0, 1)?, digit(1, 1)?, digit(2, 1)?);
            Some(Rgba::from_rgb8(r * 17, g * 17, b * 17))
        }
        6 => Some(Rgba::from_rgb8(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
        _ => None,
    }
}

/// A 2D drawing backend in logical pixels.
pub trait Painter {
    /// Replace the whole surface with `color`.
    fn clear(&mut self, color: Rgba);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);
}

/// One recorded drawing operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgba,
    },
    Disc {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Rgba,
    },
}

/// A [`Painter`] that records commands for later playback.
///
/// A clear discards everything recorded before it, mirroring what a clear
/// does to real pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The color of the most recent clear, if any.
    pub fn clear_color(&self) -> Option<Rgba> {
        match self.commands.first() {
            Some(DrawCommand::Clear { color }) => Some(*color),
            _ => None,
        }
    }
}

impl Painter for DrawList {
    fn clear(&mut self, color: Rgba) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Disc { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Ring {
            center,
            radius,
            width,
            color,
        });
    }
}

/// Colors and outline style of one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    pub background: Rgba,
    /// Opaque ink for connections and particles; alpha comes from config.
    pub ink: Rgba,
    pub outline_alpha: f32,
    pub outline_width: f32,
}

impl ThemePalette {
    /// Light themes draw dark ink, dark themes light ink.
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Rgba::from_rgb8(248, 248, 248),
                ink: Rgba::BLACK,
                outline_alpha: 0.3,
                outline_width: 0.5,
            },
            Theme::Dark => Self {
                background: Rgba::from_rgb8(11, 13, 18),
                ink: Rgba::WHITE,
                outline_alpha: 0.5,
                outline_width: 0.8,
            },
        }
    }
}

/// Extra radius of the contrast outline around each particle.
pub const OUTLINE_OFFSET: f32 = 0.5;

/// Draw one complete frame.
///
/// Clears, strokes every connection at `weight * connection_opacity`, then
/// fills each particle at `particle_opacity` with a thin outline.
pub fn paint(
    painter: &mut dyn Painter,
    particles: &[Particle],
    connections: &[Connection],
    theme: Theme,
    config: &NetworkConfig,
) {
    let palette = ThemePalette::for_theme(theme);
    painter.clear(palette.background);

    for edge in connections {
        let (Some(a), Some(b)) = (particles.get(edge.a), particles.get(edge.b)) else {
            continue;
        };
        let alpha = edge.weight * config.connection_opacity;
        painter.stroke_line(
            a.position,
            b.position,
            config.line_width,
            palette.ink.with_alpha(alpha),
        );
    }

    let fill = palette.ink.with_alpha(config.particle_opacity);
    let outline = palette.ink.with_alpha(palette.outline_alpha);
    for p in particles {
        painter.fill_circle(p.position, p.radius, fill);
        painter.stroke_circle(
            p.position,
            p.radius + OUTLINE_OFFSET,
            palette.outline_width,
            outline,
        );
    }
}

/// Draw particle-to-pointer links in the accent color.
///
/// Independent of theme; called after [`paint`] so the links sit on top.
pub fn paint_pointer_links(
    painter: &mut dyn Painter,
    particles: &[Particle],
    pointer: Vec2,
    links: &[PointerLink],
    style: &PointerConfig,
    connection_opacity: f32,
) {
    for link in links {
        let Some(p) = particles.get(link.index) else {
            continue;
        };
        let color = style.accent.with_alpha(style.accent.a * link.weight * connection_opacity);
        painter.stroke_line(p.position, pointer, style.line_width, color);
    }
}
