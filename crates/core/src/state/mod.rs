use std::sync::{
    atomic::{AtomicU32, AtomicU8, Ordering},
    Arc,
};

use crate::Mode;

/// Mode and rotation speed shared between the detection pipeline (sole
/// writer) and the animation loop (sole reader).
///
/// Clones share the same cell. Reads may observe a value one detection frame
/// old; nothing orders them against the writer.
#[derive(Clone, Debug)]
pub struct SharedMode {
    inner: Arc<ModeCell>,
}

#[derive(Debug)]
struct ModeCell {
    mode: AtomicU8,
    rotation_bits: AtomicU32,
}

impl SharedMode {
    pub fn new(rotation_speed: f32) -> Self {
        Self {
            inner: Arc::new(ModeCell {
                mode: AtomicU8::new(Mode::default() as u8),
                rotation_bits: AtomicU32::new(rotation_speed.to_bits()),
            }),
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.inner.mode.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn rotation_speed(&self) -> f32 {
        f32::from_bits(self.inner.rotation_bits.load(Ordering::Relaxed))
    }

    /// Overwrites both values. Returns the mode that was replaced.
    pub fn publish(&self, mode: Mode, rotation_speed: f32) -> Mode {
        self.inner
            .rotation_bits
            .store(rotation_speed.to_bits(), Ordering::Relaxed);
        let previous = self.inner.mode.swap(mode as u8, Ordering::Relaxed);
        Mode::from_u8(previous).unwrap_or_default()
    }
}

impl Default for SharedMode {
    fn default() -> Self {
        Self::new(1.0)
    }
}
