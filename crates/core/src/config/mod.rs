use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub particles: ParticleConfig,
    pub shapes: ShapeConfig,
    pub glyph: GlyphConfig,
    pub gesture: GestureConfig,
    pub timing: TimingConfig,
    /// Seed for every random draw made while building the scene. `None`
    /// seeds from the operating system.
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields fall back to their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

/// Particle counts, palette and blend rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub total_count: usize,
    pub group_count: usize,
    pub lerp_speed: f32,
    /// Primary, secondary and accent colours.
    pub palette: [Rgb; 3],
    /// Selection weights for `palette`, in the same order.
    pub palette_weights: [f32; 3],
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            total_count: 15_000,
            group_count: 3,
            lerp_speed: 0.05,
            palette: [
                Rgb::from_hex(0xFFD700),
                Rgb::from_hex(0xFF4500),
                Rgb::from_hex(0xFFFFFF),
            ],
            palette_weights: [0.7, 0.2, 0.1],
        }
    }
}

impl ParticleConfig {
    /// Particles per group. Any remainder is dropped.
    pub fn group_size(&self) -> usize {
        if self.group_count == 0 {
            0
        } else {
            self.total_count / self.group_count
        }
    }
}

/// Geometry of the procedural target shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub tree_turns: f32,
    pub tree_height: f32,
    pub tree_max_radius: f32,
    pub tree_jitter: f32,
    pub sphere_radius: f32,
    pub explosion_radius: f32,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            tree_turns: 20.0,
            tree_height: 30.0,
            tree_max_radius: 12.0,
            tree_jitter: 0.5,
            sphere_radius: 15.0,
            explosion_radius: 40.0,
        }
    }
}

/// Offscreen canvas used to rasterize the glyph silhouette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphConfig {
    pub text: String,
    /// Optional picture used instead of `text`, for glyphs the built-in font
    /// does not cover.
    pub image_path: Option<String>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Luma above which a pixel counts as part of the glyph.
    pub threshold: u8,
    /// World units per canvas pixel.
    pub world_scale: f32,
    pub depth_jitter: f32,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            text: "FUYO".to_string(),
            image_path: None,
            canvas_width: 256,
            canvas_height: 128,
            threshold: 128,
            world_scale: 0.15,
            depth_jitter: 1.0,
        }
    }
}

/// Thresholds of the landmark classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Tip-to-wrist over base-to-wrist ratio above which a finger is open.
    pub open_ratio: f32,
    /// Looser ratio used when confirming index and middle for the victory sign.
    pub victory_ratio: f32,
    /// Thumb tip to index tip distance under which the hand is pinching.
    pub pinch_distance: f32,
    pub rotation_gain: f32,
    pub default_rotation_speed: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_ratio: 1.2,
            victory_ratio: 1.1,
            pinch_distance: 0.05,
            rotation_gain: 5.0,
            default_rotation_speed: 1.0,
        }
    }
}

/// Rates used by the headless frame scheduler and the scene rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub display_hz: f32,
    pub video_hz: f32,
    /// Yaw in radians added per display frame for each unit of rotation speed.
    pub rotation_step: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            display_hz: 60.0,
            video_hz: 30.0,
            rotation_step: 0.005,
        }
    }
}
