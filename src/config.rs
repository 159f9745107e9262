//! Network configuration, section presets and responsive breakpoints.
//!
//! A [`NetworkConfig`] is immutable for the lifetime of one particle field
//! generation. Tuning differences between page sections are expressed as
//! [`Section`] presets rather than separate code paths, and the viewport
//! width scales a preset through a [`Breakpoint`].
//!
//! Configurations serialize to JSON:
//!
//! ```ignore
//! let config = NetworkConfig::from_json_str(r#"{ "particle_count": 80 }"#)?;
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::Rgba;

/// Complete configuration of one animation session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of particles in a generation.
    pub particle_count: usize,
    /// Pairs closer than this (logical px) are connected.
    pub max_connection_distance: f32,
    /// Velocity components are drawn from `[-base_speed/2, base_speed/2]`.
    pub base_speed: f32,
    /// Inclusive radius range in logical px.
    pub particle_size_range: (f32, f32),
    /// Opacity multiplier applied to connection weights.
    pub connection_opacity: f32,
    /// Fill opacity of particles.
    pub particle_opacity: f32,
    /// Stroke width of connections.
    pub line_width: f32,
    /// Scale the configuration by viewport breakpoints.
    pub responsive: bool,
    /// Draw links to the pointer when set.
    pub pointer: Option<PointerConfig>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            particle_count: 50,
            max_connection_distance: 120.0,
            base_speed: 0.5,
            particle_size_range: (0.8, 2.3),
            connection_opacity: 0.4,
            particle_opacity: 0.7,
            line_width: 0.8,
            responsive: true,
            pointer: None,
        }
    }
}

impl NetworkConfig {
    /// Default configuration with the tuning of a page section.
    pub fn for_section(section: Section) -> Self {
        let (distance, count, speed) = section.tuning();
        Self {
            particle_count: count,
            max_connection_distance: distance,
            base_speed: speed,
            ..Self::default()
        }
    }

    /// Enable pointer links with default styling.
    pub fn with_pointer(mut self, pointer: PointerConfig) -> Self {
        self.pointer = Some(pointer);
        self
    }

    /// The configuration a surface of the given viewport width should use.
    ///
    /// Non-responsive configurations are returned unchanged.
    pub fn adapted_to(&self, viewport_width: f32) -> Self {
        if !self.responsive {
            return self.clone();
        }
        Breakpoint::from_width(viewport_width).apply(self)
    }

    /// Clamp out-of-range values into something drawable.
    ///
    /// Non-finite numbers fall back to their defaults. Zero particles and
    /// non-positive distances are left alone: they are valid degenerate
    /// settings that simply render nothing.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.connection_opacity = clamp_unit(self.connection_opacity);
        self.particle_opacity = clamp_unit(self.particle_opacity);
        self.base_speed = non_negative(finite_or(self.base_speed, defaults.base_speed));
        self.line_width = non_negative(finite_or(self.line_width, defaults.line_width));
        self.max_connection_distance =
            finite_or(self.max_connection_distance, defaults.max_connection_distance);

        let (a, b) = self.particle_size_range;
        let (default_a, default_b) = defaults.particle_size_range;
        let (a, b) = (
            non_negative(finite_or(a, default_a)),
            non_negative(finite_or(b, default_b)),
        );
        self.particle_size_range = if a <= b { (a, b) } else { (b, a) };

        if let Some(pointer) = self.pointer.as_mut() {
            let defaults = PointerConfig::default();
            pointer.distance_multiplier = non_negative(finite_or(
                pointer.distance_multiplier,
                defaults.distance_multiplier,
            ));
            pointer.line_width = non_negative(finite_or(pointer.line_width, defaults.line_width));
        }
        self
    }

    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Styling of the optional particle-to-pointer pass.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    /// Pointer reach as a multiple of `max_connection_distance`.
    pub distance_multiplier: f32,
    /// Line color; theme independent.
    pub accent: Rgba,
    pub line_width: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            distance_multiplier: 1.5,
            accent: Rgba::new(0.39, 0.4, 0.95, 1.0),
            line_width: 1.0,
        }
    }
}

/// Page sections with their own network tuning.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Section {
    #[default]
    Hero,
    About,
    Skills,
    Projects,
    Contact,
}

impl Section {
    /// `(max_connection_distance, particle_count, base_speed)`.
    fn tuning(self) -> (f32, usize, f32) {
        match self {
            Section::Hero => (120.0, 50, 0.5),
            Section::About => (100.0, 35, 0.3),
            Section::Skills => (140.0, 60, 0.4),
            Section::Projects => (110.0, 40, 0.6),
            Section::Contact => (90.0, 30, 0.25),
        }
    }

    /// Pick the section whose keyword appears in a canvas identifier,
    /// e.g. `network-canvas-skills`. Portuguese section names are accepted
    /// too. Unknown identifiers get [`Section::Hero`].
    pub fn from_canvas_id(id: &str) -> Self {
        let id = id.to_ascii_lowercase();
        [
            ("about", Section::About),
            ("sobre", Section::About),
            ("skills", Section::Skills),
            ("projects", Section::Projects),
            ("projetos", Section::Projects),
            ("contact", Section::Contact),
            ("contato", Section::Contact),
        ]
        .into_iter()
        .find(|(keyword, _)| id.contains(keyword))
        .map(|(_, section)| section)
        .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Skills => "skills",
            Section::Projects => "projects",
            Section::Contact => "contact",
        }
    }
}

/// Viewport width classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Breakpoint {
    /// Narrower than 480 px.
    Compact,
    /// Narrower than 768 px.
    Mobile,
    /// Narrower than 1024 px.
    Tablet,
    Desktop,
}

impl Breakpoint {
    pub fn from_width(width: f32) -> Self {
        if width < 480.0 {
            Breakpoint::Compact
        } else if width < 768.0 {
            Breakpoint::Mobile
        } else if width < 1024.0 {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }

    /// `(count, distance, speed)` multipliers.
    fn factors(self) -> (f32, f32, f32) {
        match self {
            Breakpoint::Compact => (0.4, 0.7, 0.8),
            Breakpoint::Mobile => (0.6, 0.8, 0.9),
            Breakpoint::Tablet => (0.8, 0.9, 1.0),
            Breakpoint::Desktop => (1.0, 1.0, 1.0),
        }
    }

    /// Scale a configuration. Count and distance are floored.
    pub fn apply(self, config: &NetworkConfig) -> NetworkConfig {
        if self == Breakpoint::Desktop {
            return config.clone();
        }
        let (count, distance, speed) = self.factors();
        NetworkConfig {
            particle_count: (config.particle_count as f32 * count).floor() as usize,
            max_connection_distance: (config.max_connection_distance * distance).floor(),
            base_speed: config.base_speed * speed,
            ..config.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_from_canvas_id() {
        assert_eq!(Section::from_canvas_id("network-canvas"), Section::Hero);
        assert_eq!(Section::from_canvas_id("network-canvas-about"), Section::About);
        assert_eq!(Section::from_canvas_id("network-canvas-Skills"), Section::Skills);
        assert_eq!(Section::from_canvas_id("projects-bg"), Section::Projects);
        assert_eq!(Section::from_canvas_id("network-canvas-contato"), Section::Contact);
        assert_eq!(Section::from_canvas_id("network-canvas-sobre"), Section::About);
        assert_eq!(Section::from_canvas_id("contact"), Section::Contact);
        assert_eq!(Section::from_canvas_id("network-canvas-projetos").name(), "projects");
    }

    #[test]
    fn test_section_presets() {
        let skills = NetworkConfig::for_section(Section::Skills);
        assert_eq!(skills.particle_count, 60);
        assert_eq!(skills.max_connection_distance, 140.0);
        assert_eq!(skills.base_speed, 0.4);
        assert_eq!(skills.connection_opacity, 0.4);
    }

    #[test]
    fn test_breakpoint_classes() {
        assert_eq!(Breakpoint::from_width(320.0), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(480.0), Breakpoint::Mobile);
        assert_eq!(Breakpoint::from_width(800.0), Breakpoint::Tablet);
        assert_eq!(Breakpoint::from_width(1024.0), Breakpoint::Desktop);
    }

    #[test]
    fn test_compact_breakpoint_scaling() {
        let config = NetworkConfig::default().adapted_to(375.0);
        // floor(50 * 0.4) = 20, floor(120 * 0.7) = 84
        assert_eq!(config.particle_count, 20);
        assert_eq!(config.max_connection_distance, 84.0);
        assert!((config.base_speed - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_tablet_keeps_speed() {
        let base = NetworkConfig::for_section(Section::Contact);
        let config = base.adapted_to(900.0);
        assert_eq!(config.particle_count, 24);
        assert_eq!(config.max_connection_distance, 81.0);
        assert_eq!(config.base_speed, base.base_speed);
    }

    #[test]
    fn test_non_responsive_is_unchanged() {
        let base = NetworkConfig {
            responsive: false,
            ..NetworkConfig::default()
        };
        assert_eq!(base.adapted_to(320.0), base);
    }

    #[test]
    fn test_normalized_clamps() {
        let config = NetworkConfig {
            connection_opacity: 3.0,
            particle_opacity: -1.0,
            base_speed: -2.0,
            particle_size_range: (3.0, 1.0),
            ..NetworkConfig::default()
        }
        .normalized();

        assert_eq!(config.connection_opacity, 1.0);
        assert_eq!(config.particle_opacity, 0.0);
        assert_eq!(config.base_speed, 0.0);
        assert_eq!(config.particle_size_range, (1.0, 3.0));
    }

    #[test]
    fn test_normalized_replaces_non_finite() {
        let config = NetworkConfig {
            base_speed: f32::INFINITY,
            line_width: f32::NAN,
            max_connection_distance: f32::NEG_INFINITY,
            particle_size_range: (0.5, f32::INFINITY),
            pointer: Some(PointerConfig {
                distance_multiplier: f32::INFINITY,
                line_width: f32::INFINITY,
                ..PointerConfig::default()
            }),
            ..NetworkConfig::default()
        }
        .normalized();

        assert_eq!(config.base_speed, 0.5);
        assert_eq!(config.line_width, 0.8);
        assert_eq!(config.max_connection_distance, 120.0);
        assert_eq!(config.particle_size_range, (0.5, 2.3));
        let pointer = config.pointer.unwrap();
        assert_eq!(pointer.distance_multiplier, 1.5);
        assert_eq!(pointer.line_width, 1.0);
    }

    #[test]
    fn test_overflowing_json_value_is_replaced() {
        let config =
            NetworkConfig::from_json_str(r#"{ "particle_size_range": [0.5, 1e39] }"#).unwrap();
        assert_eq!(config.particle_size_range, (0.5, 2.3));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = NetworkConfig::from_json_str(
            r#"{ "particle_count": 80, "max_connection_distance": 0 }"#,
        )
        .unwrap();
        assert_eq!(config.particle_count, 80);
        assert_eq!(config.max_connection_distance, 0.0);
        assert_eq!(config.particle_opacity, 0.7);
        assert!(config.pointer.is_none());
    }

    #[test]
    fn test_json_pointer_section() {
        let config = NetworkConfig::from_json_str(
            r#"{ "pointer": { "distance_multiplier": 2.0 } }"#,
        )
        .unwrap();
        let pointer = config.pointer.unwrap();
        assert_eq!(pointer.distance_multiplier, 2.0);
        assert_eq!(pointer.line_width, 1.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config =
            NetworkConfig::for_section(Section::About).with_pointer(PointerConfig::default());
        let json = config.to_json().unwrap();
        assert_eq!(NetworkConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            NetworkConfig::from_json_str("{ particle_count: }"),
            Err(ConfigError::Json(_))
        ));
    }
}
