use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{config::ShapeConfig, Mode};

/// Destination shapes a particle group keeps a buffer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Tree,
    Sphere,
    Explosion,
    Glyph,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Tree,
        ShapeKind::Sphere,
        ShapeKind::Explosion,
        ShapeKind::Glyph,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<Mode> for ShapeKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Tree => ShapeKind::Tree,
            Mode::Explode => ShapeKind::Explosion,
            Mode::Sphere => ShapeKind::Sphere,
            Mode::Fuyo => ShapeKind::Glyph,
        }
    }
}

/// Position of particle `index` of group `group_offset` in the global
/// sequence, in `[0, 1)`. Groups are interleaved so each spans the whole
/// range.
pub fn interleave(
    index: usize,
    group_count: usize,
    group_offset: usize,
    total_count: usize,
) -> f32 {
    if total_count == 0 {
        return 0.0;
    }
    (index * group_count + group_offset) as f32 / total_count as f32
}

/// Point on the spiral tree. Radius narrows linearly from the base to the tip
/// with uniform jitter.
pub fn tree_point<R: Rng + ?Sized>(t: f32, config: &ShapeConfig, rng: &mut R) -> Vec3 {
    let angle = t * TAU * config.tree_turns;
    let mut radius = config.tree_max_radius * (1.0 - t);
    if config.tree_jitter > 0.0 {
        radius += rng.random_range(-config.tree_jitter..config.tree_jitter);
    }
    let height = t * config.tree_height - config.tree_height / 2.0;
    Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
}

/// Uniform point on a sphere surface of the configured radius.
pub fn sphere_point<R: Rng + ?Sized>(config: &ShapeConfig, rng: &mut R) -> Vec3 {
    unit_direction(rng) * config.sphere_radius
}

/// Point inside the explosion cloud.
///
/// The radius is drawn uniformly rather than by cube root, so points cluster
/// toward the centre instead of filling the volume evenly.
pub fn explosion_point<R: Rng + ?Sized>(config: &ShapeConfig, rng: &mut R) -> Vec3 {
    let direction = unit_direction(rng);
    let radius = if config.explosion_radius > 0.0 {
        rng.random_range(0.0..=config.explosion_radius)
    } else {
        0.0
    };
    direction * radius
}

fn unit_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.random_range(0.0..TAU);
    let phi = rng.random_range(-1.0f32..=1.0).acos();
    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}
