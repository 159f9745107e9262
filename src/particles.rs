//! The particle field: simulated points and their kinematics.
//!
//! Particles drift at constant velocity and reflect elastically off the
//! edges of the surface. The reflection happens at an inset margin rather
//! than at the raw edge, so a particle never clips against the border of the
//! drawing area.

use glam::Vec2;
use rand::Rng;

use crate::config::NetworkConfig;
use crate::surface::Bounds;

/// Inset from each edge inside which particles are spawned.
pub const SPAWN_MARGIN: f32 = 20.0;
/// Inset from each edge at which particles bounce.
pub const EDGE_MARGIN: f32 = 10.0;

/// A single drifting point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in logical pixels.
    pub position: Vec2,
    /// Displacement per frame.
    pub velocity: Vec2,
    pub radius: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }
}

/// Produce a fresh batch of `config.particle_count` particles.
///
/// Positions are uniform inside `bounds` inset by [`SPAWN_MARGIN`], velocity
/// components uniform in `[-base_speed/2, base_speed/2]`, radii uniform in
/// `config.particle_size_range`.
pub fn generate<R: Rng + ?Sized>(
    config: &NetworkConfig,
    bounds: Bounds,
    rng: &mut R,
) -> Vec<Particle> {
    let (lo, hi) = bounds.interior(SPAWN_MARGIN);
    let (r_min, r_max) = config.particle_size_range;
    let speed = config.base_speed;

    (0..config.particle_count)
        .map(|_| {
            let position = Vec2::new(sample(rng, lo.x, hi.x), sample(rng, lo.y, hi.y));
            let velocity = Vec2::new(
                (rng.gen::<f32>() - 0.5) * speed,
                (rng.gen::<f32>() - 0.5) * speed,
            );
            let radius = sample(rng, r_min.min(r_max), r_max.max(r_min));
            Particle::new(position, velocity, radius)
        })
        .collect()
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo && (hi - lo).is_finite() {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

/// Advance every particle by one frame and apply the boundary rule.
///
/// After this call each position lies within `[EDGE_MARGIN, size - EDGE_MARGIN]`
/// on both axes. A particle that reaches an inset edge has its velocity on
/// that axis pointed back inward and its position clamped to the edge.
pub fn advance(particles: &mut [Particle], bounds: Bounds) {
    let (lo, hi) = bounds.interior(EDGE_MARGIN);

    for p in particles.iter_mut() {
        p.position += p.velocity;

        if p.position.x <= lo.x {
            p.velocity.x = p.velocity.x.abs();
            p.position.x = lo.x;
        } else if p.position.x >= hi.x {
            p.velocity.x = -p.velocity.x.abs();
            p.position.x = hi.x;
        }

        if p.position.y <= lo.y {
            p.velocity.y = p.velocity.y.abs();
            p.position.y = lo.y;
        } else if p.position.y >= hi.y {
            p.velocity.y = -p.velocity.y.abs();
            p.position.y = hi.y;
        }

        // NaN compares false against both edges above.
        if !p.position.is_finite() {
            p.position = (lo + hi) * 0.5;
        }
    }
}

/// One generation of particles bound to a surface size.
///
/// A generation is never reconfigured: when the surface or the effective
/// configuration changes the owner builds a new one.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: Bounds,
}

impl ParticleField {
    /// A field with no particles.
    pub fn empty(bounds: Bounds) -> Self {
        Self {
            particles: Vec::new(),
            bounds,
        }
    }

    pub fn generate<R: Rng + ?Sized>(config: &NetworkConfig, bounds: Bounds, rng: &mut R) -> Self {
        Self {
            particles: generate(config, bounds, rng),
            bounds,
        }
    }

    /// Step the field one frame.
    pub fn advance(&mut self) {
        advance(&mut self.particles, self.bounds);
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
