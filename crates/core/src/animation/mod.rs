use crate::{
    particles::ParticleField, render::RenderGraph, shapes::ShapeKind, Mode, Result, SharedMode,
};

/// Per-display-frame driver. Reads the shared mode, pulls every particle
/// toward the selected shape, turns the scene and presents the frame.
#[derive(Debug)]
pub struct AnimationLoop {
    field: ParticleField,
    mode: SharedMode,
    lerp_speed: f32,
    rotation_step: f32,
    rotation_y: f32,
    frame: u64,
}

impl AnimationLoop {
    pub fn new(
        field: ParticleField,
        mode: SharedMode,
        lerp_speed: f32,
        rotation_step: f32,
    ) -> Self {
        Self {
            field,
            mode,
            lerp_speed,
            rotation_step,
            rotation_y: 0.0,
            frame: 0,
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Advances one frame without presenting it. Returns the mode used.
    pub fn step(&mut self) -> Mode {
        let mode = self.mode.mode();
        self.field.step_towards(ShapeKind::from(mode), self.lerp_speed);
        self.rotation_y += self.mode.rotation_speed() * self.rotation_step;
        self.frame += 1;
        mode
    }

    /// Advances one frame and hands it to `render`.
    pub fn tick(&mut self, render: &mut RenderGraph) -> Result<Mode> {
        let mode = self.step();
        render.draw(self.frame, mode, self.rotation_y, &self.field)?;
        Ok(mode)
    }
}
