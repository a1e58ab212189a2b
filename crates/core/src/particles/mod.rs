use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::{AppConfig, ParticleConfig, Rgb},
    glyph::GlyphMask,
    shapes::{self, ShapeKind},
};

/// Struct-of-arrays storage for one particle group. Every buffer has the
/// same length.
#[derive(Debug, Clone)]
pub struct ParticleGroup {
    current: Vec<Vec3>,
    targets: [Vec<Vec3>; 4],
    colors: Vec<Rgb>,
}

impl ParticleGroup {
    /// Generates every target buffer for group `group_offset`. Particles start
    /// on the tree.
    pub fn generate<R: Rng + ?Sized>(
        group_offset: usize,
        config: &AppConfig,
        mask: &GlyphMask,
        rng: &mut R,
    ) -> Self {
        let particles = &config.particles;
        let size = particles.group_size();

        let mut targets: [Vec<Vec3>; 4] = Default::default();
        for buffer in &mut targets {
            buffer.reserve_exact(size);
        }
        let mut colors = Vec::with_capacity(size);

        for index in 0..size {
            let t = shapes::interleave(
                index,
                particles.group_count,
                group_offset,
                particles.total_count,
            );

            targets[ShapeKind::Tree.index()].push(shapes::tree_point(t, &config.shapes, rng));
            targets[ShapeKind::Sphere.index()].push(shapes::sphere_point(&config.shapes, rng));
            targets[ShapeKind::Explosion.index()]
                .push(shapes::explosion_point(&config.shapes, rng));
            let glyph = mask
                .sample(rng, config.glyph.world_scale, config.glyph.depth_jitter)
                .unwrap_or(Vec3::ZERO);
            targets[ShapeKind::Glyph.index()].push(glyph);

            colors.push(pick_color(particles, rng));
        }

        Self {
            current: targets[ShapeKind::Tree.index()].clone(),
            targets,
            colors,
        }
    }

    /// Builds a group from explicit buffers. Fails when lengths differ.
    pub fn from_buffers(
        current: Vec<Vec3>,
        targets: [Vec<Vec3>; 4],
        colors: Vec<Rgb>,
    ) -> crate::Result<Self> {
        let len = current.len();
        if targets.iter().any(|buffer| buffer.len() != len) || colors.len() != len {
            return Err(crate::MorphError::invalid(
                "particle buffers must all have the same length",
            ));
        }
        Ok(Self {
            current,
            targets,
            colors,
        })
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    pub fn target(&self, shape: ShapeKind) -> &[Vec3] {
        &self.targets[shape.index()]
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Moves every particle `speed` of the way toward `shape`.
    pub fn step_towards(&mut self, shape: ShapeKind, speed: f32) {
        let target = &self.targets[shape.index()];
        for (current, target) in self.current.iter_mut().zip(target) {
            *current += (*target - *current) * speed;
        }
    }
}

fn pick_color<R: Rng + ?Sized>(config: &ParticleConfig, rng: &mut R) -> Rgb {
    let total: f32 = config.palette_weights.iter().sum();
    if total <= 0.0 {
        return config.palette[0];
    }

    let mut roll = rng.random_range(0.0..total);
    for (color, weight) in config.palette.iter().zip(config.palette_weights) {
        if roll < weight {
            return *color;
        }
        roll -= weight;
    }
    config.palette[config.palette.len() - 1]
}

/// Every particle group in the scene.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    groups: Vec<ParticleGroup>,
}

impl ParticleField {
    pub fn generate<R: Rng + ?Sized>(config: &AppConfig, mask: &GlyphMask, rng: &mut R) -> Self {
        let groups: Vec<_> = (0..config.particles.group_count)
            .map(|offset| ParticleGroup::generate(offset, config, mask, rng))
            .collect();

        tracing::info!(
            groups = groups.len(),
            per_group = config.particles.group_size(),
            dropped = config.particles.total_count
                - config.particles.group_size() * config.particles.group_count,
            "particle field generated"
        );

        Self { groups }
    }

    /// Builds the glyph mask and every group described by `config`, seeding
    /// the generators from `config.seed` when set.
    pub fn from_config(config: &AppConfig) -> crate::Result<Self> {
        let mask = GlyphMask::from_config(&config.glyph)?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self::generate(config, &mask, &mut rng))
    }

    pub fn from_groups(groups: Vec<ParticleGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[ParticleGroup] {
        &self.groups
    }

    pub fn particle_count(&self) -> usize {
        self.groups.iter().map(ParticleGroup::len).sum()
    }

    pub fn step_towards(&mut self, shape: ShapeKind, speed: f32) {
        for group in &mut self.groups {
            group.step_towards(shape, speed);
        }
    }

    /// Mean distance between current positions and `shape`'s targets.
    pub fn mean_offset(&self, shape: ShapeKind) -> f32 {
        let count = self.particle_count();
        if count == 0 {
            return 0.0;
        }
        let sum: f32 = self
            .groups
            .iter()
            .flat_map(|group| group.current().iter().zip(group.target(shape)))
            .map(|(current, target)| current.distance(*target))
            .sum();
        sum / count as f32
    }
}
