use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::MorphError;

pub const LANDMARKS_PER_HAND: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_BASE: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_BASE: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_BASE: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_BASE: usize = 17;
pub const PINKY_TIP: usize = 20;

/// One normalized joint coordinate. `x` and `y` are in `[0, 1]` image space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Planar distance; depth is ignored.
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        self.xy().distance(other.xy())
    }
}

/// The four non-thumb fingers, each identified by its base knuckle and tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn base(self) -> usize {
        match self {
            Finger::Index => INDEX_BASE,
            Finger::Middle => MIDDLE_BASE,
            Finger::Ring => RING_BASE,
            Finger::Pinky => PINKY_BASE,
        }
    }

    pub fn tip(self) -> usize {
        match self {
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }
}

/// A single detected hand. Always holds exactly [`LANDMARKS_PER_HAND`] points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct HandLandmarks {
    points: [Landmark; LANDMARKS_PER_HAND],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARKS_PER_HAND]) -> Self {
        Self { points }
    }

    pub fn wrist(&self) -> &Landmark {
        &self.points[WRIST]
    }

    pub fn set(&mut self, index: usize, landmark: Landmark) {
        self.points[index] = landmark;
    }
}

impl std::ops::Index<usize> for HandLandmarks {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl TryFrom<Vec<Landmark>> for HandLandmarks {
    type Error = MorphError;

    fn try_from(value: Vec<Landmark>) -> Result<Self, Self::Error> {
        let len = value.len();
        let points: [Landmark; LANDMARKS_PER_HAND] = value.try_into().map_err(|_| {
            MorphError::invalid(format!(
                "a hand needs {LANDMARKS_PER_HAND} landmarks, got {len}"
            ))
        })?;
        Ok(Self { points })
    }
}

impl From<HandLandmarks> for Vec<Landmark> {
    fn from(value: HandLandmarks) -> Self {
        value.points.to_vec()
    }
}

/// Hands found on one video frame, in detector order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Timestamp of the source frame in milliseconds.
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl DetectionResult {
    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            hands: Vec::new(),
        }
    }

    pub fn primary_hand(&self) -> Option<&HandLandmarks> {
        self.hands.first()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}
