use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{config::Rgb, particles::ParticleField, Mode, Result};

/// Positions and colours of one group as handed to a display surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Rgb>,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub mode: Mode,
    pub rotation_y: f32,
    pub groups: Vec<GroupSnapshot>,
}

impl FrameSnapshot {
    pub fn capture(frame: u64, mode: Mode, rotation_y: f32, field: &ParticleField) -> Self {
        let groups = field
            .groups()
            .iter()
            .map(|group| GroupSnapshot {
                positions: group.current().to_vec(),
                colors: group.colors().to_vec(),
            })
            .collect();

        Self {
            frame,
            mode,
            rotation_y,
            groups,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.groups.iter().map(|group| group.positions.len()).sum()
    }

    /// Mean particle position, or the origin for an empty frame.
    pub fn centroid(&self) -> Vec3 {
        let count = self.particle_count();
        if count == 0 {
            return Vec3::ZERO;
        }
        let sum: Vec3 = self
            .groups
            .iter()
            .flat_map(|group| group.positions.iter().copied())
            .sum();
        sum / count as f32
    }
}

/// External renderer that draws particle frames.
pub trait DisplaySurface {
    fn present(&mut self, frame: &FrameSnapshot) -> Result<()>;
}

/// Fans each frame out to the registered surfaces.
#[derive(Default)]
pub struct RenderGraph {
    surfaces: Vec<Box<dyn DisplaySurface>>,
    frames_presented: u64,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_surface(&mut self, surface: Box<dyn DisplaySurface>) {
        self.surfaces.push(surface);
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Snapshots are only built when at least one surface is registered.
    pub fn draw(
        &mut self,
        frame: u64,
        mode: Mode,
        rotation_y: f32,
        field: &ParticleField,
    ) -> Result<()> {
        if self.surfaces.is_empty() {
            return Ok(());
        }

        let snapshot = FrameSnapshot::capture(frame, mode, rotation_y, field);
        for surface in &mut self.surfaces {
            surface.present(&snapshot)?;
        }
        self.frames_presented += 1;
        Ok(())
    }
}

impl std::fmt::Debug for RenderGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderGraph")
            .field("surfaces", &self.surfaces.len())
            .field("frames_presented", &self.frames_presented)
            .finish()
    }
}
