//! Proximity graph: which particles are close enough to be linked.
//!
//! Every unordered pair is examined once per frame, an O(n²) pass. At the
//! particle counts a backdrop uses (tens to ~150) this is cheaper than
//! maintaining a spatial index; it is not meant for thousands of particles.

use glam::Vec2;

use crate::particles::Particle;

/// A link between particles `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    /// `1 - distance / max_distance`, in `(0, 1]`.
    pub weight: f32,
}

/// A link between a particle and the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerLink {
    pub index: usize,
    pub weight: f32,
}

/// Fade weight for two points `distance` apart, or `None` when they are not
/// connected. A non-positive `max_distance` connects nothing.
#[inline]
pub fn link_weight(distance: f32, max_distance: f32) -> Option<f32> {
    if max_distance > 0.0 && distance < max_distance {
        Some(1.0 - distance / max_distance)
    } else {
        None
    }
}

/// All connected pairs, ordered by `(a, b)`.
pub fn connections(particles: &[Particle], max_distance: f32) -> Vec<Connection> {
    let mut out = Vec::new();
    collect_connections(particles, max_distance, &mut out);
    out
}

fn collect_connections(particles: &[Particle], max_distance: f32, out: &mut Vec<Connection>) {
    out.clear();
    if max_distance <= 0.0 || particles.len() < 2 {
        return;
    }
    let max_sq = max_distance * max_distance;

    for (a, pa) in particles.iter().enumerate() {
        for (offset, pb) in particles[a + 1..].iter().enumerate() {
            let dist_sq = pa.position.distance_squared(pb.position);
            if dist_sq >= max_sq {
                continue;
            }
            if let Some(weight) = link_weight(dist_sq.sqrt(), max_distance) {
                out.push(Connection {
                    a,
                    b: a + 1 + offset,
                    weight,
                });
            }
        }
    }
}

/// Particles within `max_distance` of the pointer.
pub fn pointer_links(particles: &[Particle], pointer: Vec2, max_distance: f32) -> Vec<PointerLink> {
    particles
        .iter()
        .enumerate()
        .filter_map(|(index, p)| {
            link_weight(p.position.distance(pointer), max_distance)
                .map(|weight| PointerLink { index, weight })
        })
        .collect()
}

/// Reusable edge buffer, rebuilt each frame without reallocating.
#[derive(Debug, Default, Clone)]
pub struct ProximityGraph {
    edges: Vec<Connection>,
}

impl ProximityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the edges for the current particle positions.
    pub fn rebuild(&mut self, particles: &[Particle], max_distance: f32) -> &[Connection] {
        collect_connections(particles, max_distance, &mut self.edges);
        &self.edges
    }

    #[inline]
    pub fn edges(&self) -> &[Connection] {
        &self.edges
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn at(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::ZERO, 1.0)
    }

    #[test]
    fn test_weight_of_close_pair() {
        let edges = connections(&[at(10.0, 10.0), at(20.0, 10.0)], 100.0);
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].a, edges[0].b), (0, 1));
        assert!((edges[0].weight - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_far_pair_is_not_connected() {
        assert!(connections(&[at(10.0, 10.0), at(500.0, 10.0)], 100.0).is_empty());
    }

    #[test]
    fn test_exact_threshold_is_excluded() {
        assert!(connections(&[at(0.0, 0.0), at(100.0, 0.0)], 100.0).is_empty());
    }

    #[test]
    fn test_coincident_pair_has_full_weight() {
        let edges = connections(&[at(5.0, 5.0), at(5.0, 5.0)], 50.0);
        assert_eq!(edges[0].weight, 1.0);
    }

    #[test]
    fn test_non_positive_distance_connects_nothing() {
        let particles = [at(0.0, 0.0), at(0.0, 0.0), at(1.0, 1.0)];
        assert!(connections(&particles, 0.0).is_empty());
        assert!(connections(&particles, -10.0).is_empty());
        assert!(pointer_links(&particles, Vec2::ZERO, 0.0).is_empty());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(connections(&[], 100.0).is_empty());
        assert!(connections(&[at(1.0, 1.0)], 100.0).is_empty());
    }

    #[test]
    fn test_pairs_unique_and_ordered() {
        let mut rng = StdRng::seed_from_u64(5);
        let particles: Vec<Particle> = (0..80)
            .map(|_| at(rng.gen_range(0.0..300.0), rng.gen_range(0.0..200.0)))
            .collect();

        let edges = connections(&particles, 90.0);
        let mut seen = HashSet::new();
        for edge in &edges {
            assert!(edge.a < edge.b);
            assert!(seen.insert((edge.a, edge.b)));
            assert!(edge.weight > 0.0 && edge.weight <= 1.0);
        }

        // Brute-force cross check.
        let expected = (0..particles.len())
            .flat_map(|a| (a + 1..particles.len()).map(move |b| (a, b)))
            .filter(|&(a, b)| particles[a].position.distance(particles[b].position) < 90.0)
            .count();
        assert_eq!(edges.len(), expected);
    }

    #[test]
    fn test_pointer_links() {
        let particles = [at(0.0, 0.0), at(30.0, 40.0), at(300.0, 0.0)];
        let links = pointer_links(&particles, Vec2::ZERO, 100.0);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0], PointerLink { index: 0, weight: 1.0 });
        assert_eq!(links[1].index, 1);
        assert!((links[1].weight - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_graph_rebuild_reuses_buffer() {
        let mut graph = ProximityGraph::new();
        let near = [at(0.0, 0.0), at(10.0, 0.0)];
        assert_eq!(graph.rebuild(&near, 50.0).len(), 1);

        let far = [at(0.0, 0.0), at(100.0, 0.0)];
        assert!(graph.rebuild(&far, 50.0).is_empty());
        assert!(graph.edges().is_empty());
    }
}
