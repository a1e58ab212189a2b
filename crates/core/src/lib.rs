//! Core library for the Handmorph visualiser.
//!
//! Particles morph between a spiral tree, a sphere, an exploded cloud and a
//! text silhouette. The shape is chosen from hand landmarks: the detection
//! pipeline classifies each video frame into a [`Mode`] and publishes it to a
//! [`SharedMode`] cell, and the [`AnimationLoop`] reads that cell once per
//! display frame to pull the particles toward the matching target buffer.
//!
//! Rendering and the landmark model itself stay outside the crate behind the
//! [`DisplaySurface`] and [`HandDetector`] traits.

pub mod animation;
pub mod config;
pub mod detection;
pub mod error;
pub mod gesture;
pub mod glyph;
pub mod landmarks;
pub mod particles;
pub mod render;
pub mod shapes;
pub mod state;
pub mod timeline;

pub use animation::AnimationLoop;
pub use config::{
    AppConfig, GestureConfig, GlyphConfig, ParticleConfig, Rgb, ShapeConfig, TimingConfig,
};
pub use detection::{
    spawn_model_loader, DetectionPipeline, DetectorState, HandDetector, ModelLoader,
    RecordedSession, ReplayDetector, ReplayLoader, StatusSink, VideoFrame,
};
pub use error::{MorphError, Result};
pub use gesture::{GestureClassifier, GestureReading, Mode, StatusReport};
pub use glyph::GlyphMask;
pub use landmarks::{DetectionResult, HandLandmarks, Landmark};
pub use particles::{ParticleField, ParticleGroup};
pub use render::{DisplaySurface, FrameSnapshot, GroupSnapshot, RenderGraph};
pub use shapes::ShapeKind;
pub use state::SharedMode;
pub use timeline::{FrameClock, Scheduler, Tick};
