use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::{HandDetector, ModelLoader, VideoFrame};
use crate::{landmarks::DetectionResult, MorphError, Result};

/// Landmark frames captured from an earlier run, ordered by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedSession {
    pub frames: Vec<DetectionResult>,
}

impl RecordedSession {
    pub fn new(mut frames: Vec<DetectionResult>) -> Self {
        frames.sort_by(|a, b| a.timestamp.partial_cmp(&b.timestamp).unwrap_or(Ordering::Equal));
        Self { frames }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let session: RecordedSession = serde_json::from_str(&text)?;
        Ok(Self::new(session.frames))
    }

    /// Last timestamp in the recording, in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.frames.last().map(|frame| frame.timestamp).unwrap_or(0.0)
    }

    /// Recorded hands at (or before) `timestamp`. Before the first recorded
    /// frame no hands are reported.
    pub fn sample_at(&self, timestamp: f64) -> DetectionResult {
        let hands = match self.frames.binary_search_by(|frame| {
            frame
                .timestamp
                .partial_cmp(&timestamp)
                .unwrap_or(Ordering::Equal)
        }) {
            Ok(index) => self.frames[index].hands.clone(),
            Err(0) => Vec::new(),
            Err(index) => self.frames[index - 1].hands.clone(),
        };

        DetectionResult { timestamp, hands }
    }
}

/// Detector that plays back a [`RecordedSession`] instead of running a model.
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    session: RecordedSession,
}

impl ReplayDetector {
    pub fn new(session: RecordedSession) -> Self {
        Self { session }
    }
}

impl HandDetector for ReplayDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<DetectionResult> {
        Ok(self.session.sample_at(frame.timestamp))
    }
}

/// Loads a recorded session from disk in place of a model asset.
#[derive(Debug, Clone)]
pub struct ReplayLoader {
    path: PathBuf,
}

impl ReplayLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for ReplayLoader {
    fn load(self: Box<Self>) -> Result<Box<dyn HandDetector>> {
        let session = RecordedSession::load(&self.path).map_err(|err| {
            MorphError::ModelLoad(format!("{}: {err}", self.path.display()))
        })?;
        tracing::info!(
            path = %self.path.display(),
            frames = session.frames.len(),
            "recorded landmark session loaded"
        );
        Ok(Box::new(ReplayDetector::new(session)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gesture::fixtures::hand, landmarks::Finger};

    fn session() -> RecordedSession {
        RecordedSession::new(vec![
            DetectionResult {
                timestamp: 100.0,
                hands: vec![hand(&Finger::ALL)],
            },
            DetectionResult::empty(200.0),
            DetectionResult {
                timestamp: 0.0,
                hands: vec![hand(&[])],
            },
        ])
    }

    #[test]
    fn frames_are_sorted_on_construction() {
        let session = session();
        let stamps: Vec<f64> = session.frames.iter().map(|f| f.timestamp).collect();
        assert_eq!(stamps, vec![0.0, 100.0, 200.0]);
        assert_eq!(session.duration_ms(), 200.0);
    }

    #[test]
    fn samples_hold_the_previous_frame() {
        let session = session();
        assert_eq!(session.sample_at(150.0).hands, vec![hand(&Finger::ALL)]);
        assert_eq!(session.sample_at(100.0).hands, vec![hand(&Finger::ALL)]);
        assert!(session.sample_at(250.0).hands.is_empty());
        assert_eq!(session.sample_at(150.0).timestamp, 150.0);
    }

    #[test]
    fn before_the_first_frame_no_hands_are_seen() {
        let session = RecordedSession::new(vec![DetectionResult {
            timestamp: 50.0,
            hands: vec![hand(&[])],
        }]);
        assert!(session.sample_at(10.0).is_empty());
    }

    #[test]
    fn loader_reads_sessions_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, serde_json::to_string(&session()).unwrap()).unwrap();

        let mut detector = Box::new(ReplayLoader::new(&path)).load().unwrap();
        let result = detector
            .detect(&VideoFrame {
                index: 0,
                timestamp: 120.0,
            })
            .unwrap();
        assert_eq!(result.hands.len(), 1);
    }

    #[test]
    fn missing_sessions_are_model_load_errors() {
        let err = Box::new(ReplayLoader::new("/no/such/session.json"))
            .load()
            .err()
            .expect("loading should fail");
        assert!(matches!(err, MorphError::ModelLoad(_)));
    }
}
