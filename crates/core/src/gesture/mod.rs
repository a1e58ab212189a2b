use serde::{Deserialize, Serialize};

use crate::{
    config::{GestureConfig, Rgb},
    landmarks::{DetectionResult, Finger, HandLandmarks, INDEX_TIP, MIDDLE_BASE, THUMB_TIP},
};

/// Target shape selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Tree = 0,
    Explode = 1,
    Sphere = 2,
    Fuyo = 3,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Tree, Mode::Explode, Mode::Sphere, Mode::Fuyo];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Tree => "TREE",
            Mode::Explode => "EXPLODE",
            Mode::Sphere => "SPHERE",
            Mode::Fuyo => "FUYO",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic output for the UI status indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub mode: Mode,
    pub label: String,
    pub color: Rgb,
}

impl StatusReport {
    pub fn new(mode: Mode, label: impl Into<String>, color: Rgb) -> Self {
        Self {
            mode,
            label: label.into(),
            color,
        }
    }

    /// Status shown when the landmark model could not be loaded.
    pub fn model_failed() -> Self {
        Self::new(Mode::Tree, "Model failed to load", Rgb::from_hex(0xFF3333))
    }
}

/// Everything the classifier derives from one detection result.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureReading {
    pub mode: Mode,
    pub rotation_speed: f32,
    pub open_fingers: usize,
    pub status: StatusReport,
}

/// Maps the first detected hand to a [`Mode`] and a rotation speed.
///
/// Rules are evaluated in a fixed priority order:
///
/// | Priority | Condition | Mode |
/// |---|---|---|
/// | 1 | three or more fingers open | `Explode` |
/// | 2 | thumb tip touching index tip | `Sphere` |
/// | 3 | exactly index and middle open | `Fuyo` |
/// | 4 | anything else, or no hand | `Tree` |
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    /// Classifies the first hand of `result`. Other hands are ignored.
    pub fn classify(&self, result: &DetectionResult) -> GestureReading {
        let Some(hand) = result.primary_hand() else {
            return GestureReading {
                mode: Mode::Tree,
                rotation_speed: self.config.default_rotation_speed,
                open_fingers: 0,
                status: StatusReport::new(Mode::Tree, "No hand -> Tree", Rgb::from_hex(0x888888)),
            };
        };

        let open_fingers = self.open_fingers(hand);
        let mode = self.resolve_mode(hand, open_fingers);
        let rotation_speed = (hand[MIDDLE_BASE].x - 0.5) * self.config.rotation_gain;

        GestureReading {
            mode,
            rotation_speed,
            open_fingers,
            status: hand_status(mode),
        }
    }

    /// Number of non-thumb fingers extended past the open ratio.
    pub fn open_fingers(&self, hand: &HandLandmarks) -> usize {
        Finger::ALL
            .iter()
            .filter(|finger| is_extended(hand, **finger, self.config.open_ratio))
            .count()
    }

    fn resolve_mode(&self, hand: &HandLandmarks, open_fingers: usize) -> Mode {
        if open_fingers >= 3 {
            return Mode::Explode;
        }

        let pinch = hand[THUMB_TIP].distance_2d(&hand[INDEX_TIP]);
        if pinch < self.config.pinch_distance {
            return Mode::Sphere;
        }

        let ratio = self.config.victory_ratio;
        if open_fingers == 2
            && is_extended(hand, Finger::Index, ratio)
            && is_extended(hand, Finger::Middle, ratio)
        {
            return Mode::Fuyo;
        }

        Mode::Tree
    }
}

fn is_extended(hand: &HandLandmarks, finger: Finger, ratio: f32) -> bool {
    let wrist = hand.wrist();
    hand[finger.tip()].distance_2d(wrist) > hand[finger.base()].distance_2d(wrist) * ratio
}

fn hand_status(mode: Mode) -> StatusReport {
    match mode {
        Mode::Explode => StatusReport::new(mode, "Hand OPEN -> Explode!", Rgb::from_hex(0xFF4500)),
        Mode::Sphere => StatusReport::new(mode, "OK Pinch -> Sphere", Rgb::from_hex(0x00BFFF)),
        Mode::Fuyo => StatusReport::new(mode, "Victory -> FUYO", Rgb::from_hex(0xFFD700)),
        Mode::Tree => StatusReport::new(mode, "Hand CLOSED -> Tree", Rgb::from_hex(0x32CD32)),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::landmarks::{Finger, HandLandmarks, Landmark, LANDMARKS_PER_HAND, THUMB_TIP, WRIST};

    /// Builds a hand with the wrist at `(0.5, 0.9)`, every base knuckle 0.2
    /// above it, and the listed fingers extended to 0.4 above it. Closed
    /// fingers curl back to the knuckle height. The thumb tip sits far from
    /// the index tip.
    pub fn hand(open: &[Finger]) -> HandLandmarks {
        let mut hand = HandLandmarks::new([Landmark::new(0.5, 0.9); LANDMARKS_PER_HAND]);
        hand.set(WRIST, Landmark::new(0.5, 0.9));
        for (column, finger) in Finger::ALL.iter().enumerate() {
            let x = 0.44 + column as f32 * 0.04;
            hand.set(finger.base(), Landmark::new(x, 0.7));
            let tip_y = if open.contains(finger) { 0.5 } else { 0.75 };
            hand.set(finger.tip(), Landmark::new(x, tip_y));
        }
        hand.set(THUMB_TIP, Landmark::new(0.2, 0.8));
        hand
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::fixtures::hand;
    use super::*;
    use crate::landmarks::{Landmark, INDEX_TIP, THUMB_TIP};

    fn classify(hand: HandLandmarks) -> GestureReading {
        let result = DetectionResult {
            timestamp: 0.0,
            hands: vec![hand],
        };
        GestureClassifier::default().classify(&result)
    }

    #[test]
    fn no_hand_falls_back_to_tree_with_default_speed() {
        let reading = GestureClassifier::default().classify(&DetectionResult::empty(0.0));
        assert_eq!(reading.mode, Mode::Tree);
        assert_eq!(reading.rotation_speed, 1.0);
        assert_eq!(reading.status.label, "No hand -> Tree");
    }

    #[test]
    fn open_hand_explodes() {
        let reading = classify(hand(&Finger::ALL));
        assert_eq!(reading.open_fingers, 4);
        assert_eq!(reading.mode, Mode::Explode);
        assert_eq!(reading.status.label, "Hand OPEN -> Explode!");
    }

    #[test]
    fn pinch_with_one_finger_open_is_sphere() {
        // Moving the index tip up to the thumb extends it past its knuckle.
        let mut h = hand(&[]);
        h.set(THUMB_TIP, Landmark::new(0.50, 0.50));
        h.set(INDEX_TIP, Landmark::new(0.52, 0.51));
        let reading = classify(h);
        assert_eq!(reading.open_fingers, 1);
        assert_eq!(reading.mode, Mode::Sphere);
    }

    #[test]
    fn victory_sign_is_fuyo() {
        let h = hand(&[Finger::Index, Finger::Middle]);
        assert!(h[THUMB_TIP].distance_2d(&h[INDEX_TIP]) >= 0.3);
        assert_eq!(classify(h).mode, Mode::Fuyo);
    }

    /// Places `finger`'s tip on the wrist-to-knuckle ray at `ratio` times the
    /// knuckle's distance from the wrist.
    fn extend(hand: &mut HandLandmarks, finger: Finger, ratio: f32) {
        let wrist = hand.wrist().xy();
        let base = hand[finger.base()].xy();
        let tip = wrist + (base - wrist) * ratio;
        hand.set(finger.tip(), Landmark::new(tip.x, tip.y));
    }

    #[test]
    fn victory_uses_the_looser_ratio_for_middle() {
        let mut h = hand(&[]);
        extend(&mut h, Finger::Index, 1.3);
        extend(&mut h, Finger::Ring, 1.3);
        extend(&mut h, Finger::Middle, 1.15);
        let reading = classify(h.clone());
        assert_eq!(reading.open_fingers, 2);
        assert_eq!(reading.mode, Mode::Fuyo);

        extend(&mut h, Finger::Middle, 1.05);
        let reading = classify(h);
        assert_eq!(reading.open_fingers, 2);
        assert_eq!(reading.mode, Mode::Tree);
    }

    #[test]
    fn two_open_fingers_other_than_victory_is_tree() {
        let reading = classify(hand(&[Finger::Ring, Finger::Pinky]));
        assert_eq!(reading.mode, Mode::Tree);
        assert_eq!(reading.status.label, "Hand CLOSED -> Tree");
    }

    #[test]
    fn fist_is_tree() {
        assert_eq!(classify(hand(&[])).mode, Mode::Tree);
    }

    #[test]
    fn rotation_follows_middle_knuckle_position() {
        let mut h = hand(&[]);
        h.set(MIDDLE_BASE, Landmark::new(0.7, 0.7));
        let reading = classify(h);
        assert!((reading.rotation_speed - 1.0).abs() < 1e-5);

        let mut h = hand(&[]);
        h.set(MIDDLE_BASE, Landmark::new(0.3, 0.7));
        assert!((classify(h).rotation_speed + 1.0).abs() < 1e-5);
    }

    #[test]
    fn only_first_hand_is_classified() {
        let result = DetectionResult {
            timestamp: 0.0,
            hands: vec![hand(&[]), hand(&Finger::ALL)],
        };
        assert_eq!(GestureClassifier::default().classify(&result).mode, Mode::Tree);
    }

    #[test]
    fn mode_round_trips_through_u8() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_u8(mode as u8), Some(mode));
        }
        assert_eq!(Mode::from_u8(9), None);
    }

    fn finger_subset() -> impl Strategy<Value = Vec<Finger>> {
        proptest::sample::subsequence(Finger::ALL.to_vec(), 0..=4)
    }

    proptest! {
        #[test]
        fn three_open_fingers_always_explode(
            open in proptest::sample::subsequence(Finger::ALL.to_vec(), 3..=4),
            tx in 0.0f32..1.0,
            ty in 0.0f32..1.0,
        ) {
            let mut h = hand(&open);
            h.set(THUMB_TIP, Landmark::new(tx, ty));
            prop_assert_eq!(classify(h).mode, Mode::Explode);
        }

        #[test]
        fn pinch_below_three_fingers_is_sphere(
            open in proptest::sample::subsequence(Finger::ALL.to_vec(), 0..=2),
            dx in -0.035f32..0.035,
            dy in -0.035f32..0.035,
        ) {
            let mut h = hand(&open);
            let index_tip = h[INDEX_TIP];
            h.set(THUMB_TIP, Landmark::new(index_tip.x + dx, index_tip.y + dy));
            prop_assert_eq!(classify(h).mode, Mode::Sphere);
        }

        #[test]
        fn mode_is_explode_iff_three_or_more_open(open in finger_subset()) {
            let reading = classify(hand(&open));
            prop_assert_eq!(reading.open_fingers, open.len());
            prop_assert_eq!(reading.mode == Mode::Explode, open.len() >= 3);
        }

        #[test]
        fn victory_sign_away_from_thumb_is_fuyo(
            distance in 0.051f32..0.5,
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let mut h = hand(&[Finger::Index, Finger::Middle]);
            let index_tip = h[INDEX_TIP];
            h.set(
                THUMB_TIP,
                Landmark::new(
                    index_tip.x + distance * angle.cos(),
                    index_tip.y + distance * angle.sin(),
                ),
            );
            prop_assert!(h[THUMB_TIP].distance_2d(&h[INDEX_TIP]) >= 0.05);
            prop_assert_eq!(classify(h).mode, Mode::Fuyo);
        }
    }
}
