mod replay;

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

pub use replay::{RecordedSession, ReplayDetector, ReplayLoader};

use crate::{
    gesture::{GestureClassifier, GestureReading, StatusReport},
    landmarks::DetectionResult,
    MorphError, Result, SharedMode,
};

/// One frame delivered by the video source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoFrame {
    pub index: u64,
    /// Presentation time in milliseconds.
    pub timestamp: f64,
}

/// Hand-landmark model, ready to run.
pub trait HandDetector: Send {
    fn detect(&mut self, frame: &VideoFrame) -> Result<DetectionResult>;
}

/// Fetches and initialises a [`HandDetector`]. Runs on its own thread.
pub trait ModelLoader: Send + 'static {
    fn load(self: Box<Self>) -> Result<Box<dyn HandDetector>>;
}

/// Receives the human-readable status after every classified frame.
pub trait StatusSink {
    fn publish(&mut self, status: &StatusReport);
}

impl<F: FnMut(&StatusReport)> StatusSink for F {
    fn publish(&mut self, status: &StatusReport) {
        self(status)
    }
}

/// Spawn `loader` on its own thread and return the channel its result
/// arrives on.
pub fn spawn_model_loader<L: ModelLoader>(loader: L) -> Receiver<Result<Box<dyn HandDetector>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(Box::new(loader).load());
    });
    rx
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorState {
    Loading,
    Ready,
    /// Terminal. Detection stays off.
    Failed(String),
}

/// Only writer of [`SharedMode`]. It never blocks on the model: until the
/// loader thread reports back, frames are skipped and the mode stays at its
/// default.
pub struct DetectionPipeline {
    classifier: GestureClassifier,
    shared: SharedMode,
    state: DetectorState,
    pending: Option<Receiver<Result<Box<dyn HandDetector>>>>,
    detector: Option<Box<dyn HandDetector>>,
    last_timestamp: Option<f64>,
}

impl DetectionPipeline {
    /// Pipeline waiting on a model that is still loading.
    pub fn new(
        classifier: GestureClassifier,
        shared: SharedMode,
        model: Receiver<Result<Box<dyn HandDetector>>>,
    ) -> Self {
        Self {
            classifier,
            shared,
            state: DetectorState::Loading,
            pending: Some(model),
            detector: None,
            last_timestamp: None,
        }
    }

    /// Pipeline around a detector that is already initialised.
    pub fn with_detector(
        classifier: GestureClassifier,
        shared: SharedMode,
        detector: Box<dyn HandDetector>,
    ) -> Self {
        Self {
            classifier,
            shared,
            state: DetectorState::Ready,
            pending: None,
            detector: Some(detector),
            last_timestamp: None,
        }
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn shared(&self) -> &SharedMode {
        &self.shared
    }

    /// Checks whether the loader has finished. A load failure is returned
    /// exactly once; afterwards the pipeline stays in
    /// [`DetectorState::Failed`] and never retries.
    pub fn poll_model<S: StatusSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        let Some(pending) = &self.pending else {
            return Ok(());
        };

        let outcome = match pending.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return Ok(()),
            Err(TryRecvError::Disconnected) => Err(MorphError::ModelLoad(
                "loader exited without reporting".to_string(),
            )),
        };
        self.pending = None;

        match outcome {
            Ok(detector) => {
                tracing::info!("hand landmark model ready");
                self.detector = Some(detector);
                self.state = DetectorState::Ready;
                Ok(())
            }
            Err(err) => {
                let err = match err {
                    MorphError::ModelLoad(_) => err,
                    other => MorphError::ModelLoad(other.to_string()),
                };
                tracing::error!(error = %err, "gesture detection disabled");
                self.state = DetectorState::Failed(err.to_string());
                sink.publish(&StatusReport::model_failed());
                Err(err)
            }
        }
    }

    /// Runs detection and classification for `frame` and publishes the
    /// result. Returns `Ok(None)` when the frame was skipped: model not ready,
    /// repeated timestamp, or a detector error on this frame.
    pub fn process<S: StatusSink + ?Sized>(
        &mut self,
        frame: &VideoFrame,
        sink: &mut S,
    ) -> Result<Option<GestureReading>> {
        self.poll_model(sink)?;

        let Some(detector) = self.detector.as_mut() else {
            tracing::debug!(
                frame = frame.index,
                state = ?self.state,
                "model not ready, frame skipped"
            );
            return Ok(None);
        };

        if self.last_timestamp == Some(frame.timestamp) {
            tracing::debug!(frame = frame.index, timestamp = frame.timestamp, "repeated timestamp");
            return Ok(None);
        }
        self.last_timestamp = Some(frame.timestamp);

        let result = match detector.detect(frame) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(frame = frame.index, error = %err, "hand detection failed");
                return Ok(None);
            }
        };

        let reading = self.classifier.classify(&result);
        let previous = self.shared.publish(reading.mode, reading.rotation_speed);
        if previous != reading.mode {
            tracing::info!(
                from = %previous,
                to = %reading.mode,
                label = %reading.status.label,
                "mode changed"
            );
        }
        sink.publish(&reading.status);

        Ok(Some(reading))
    }
}

impl std::fmt::Debug for DetectionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionPipeline")
            .field("state", &self.state)
            .field("last_timestamp", &self.last_timestamp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{gesture::fixtures::hand, landmarks::Finger, Mode};

    /// Returns the same hands for every frame.
    struct Fixed {
        result: DetectionResult,
    }

    impl HandDetector for Fixed {
        fn detect(&mut self, frame: &VideoFrame) -> Result<DetectionResult> {
            Ok(DetectionResult {
                timestamp: frame.timestamp,
                ..self.result.clone()
            })
        }
    }

    struct Failing;

    impl ModelLoader for Failing {
        fn load(self: Box<Self>) -> Result<Box<dyn HandDetector>> {
            Err(MorphError::msg("asset fetch failed"))
        }
    }

    struct Flaky;

    impl HandDetector for Flaky {
        fn detect(&mut self, _frame: &VideoFrame) -> Result<DetectionResult> {
            Err(MorphError::msg("inference error"))
        }
    }

    fn open_hand() -> Box<dyn HandDetector> {
        Box::new(Fixed {
            result: DetectionResult {
                timestamp: 0.0,
                hands: vec![hand(&Finger::ALL)],
            },
        })
    }

    fn frame(index: u64, timestamp: f64) -> VideoFrame {
        VideoFrame { index, timestamp }
    }

    #[test]
    fn classified_frames_update_shared_mode_and_status() {
        let shared = SharedMode::default();
        let mut pipeline = DetectionPipeline::with_detector(
            GestureClassifier::default(),
            shared.clone(),
            open_hand(),
        );
        let mut labels = Vec::new();
        let mut sink = |status: &StatusReport| labels.push(status.label.clone());

        let reading = pipeline.process(&frame(0, 0.0), &mut sink).unwrap().unwrap();
        assert_eq!(reading.mode, Mode::Explode);
        assert_eq!(shared.mode(), Mode::Explode);
        assert_eq!(labels, vec!["Hand OPEN -> Explode!".to_string()]);
    }

    #[test]
    fn repeated_timestamps_are_skipped() {
        let mut pipeline = DetectionPipeline::with_detector(
            GestureClassifier::default(),
            SharedMode::default(),
            open_hand(),
        );
        let mut sink = |_: &StatusReport| {};

        assert!(pipeline.process(&frame(0, 33.0), &mut sink).unwrap().is_some());
        assert!(pipeline.process(&frame(1, 33.0), &mut sink).unwrap().is_none());
        assert!(pipeline.process(&frame(2, 66.0), &mut sink).unwrap().is_some());
    }

    #[test]
    fn frames_are_skipped_while_loading() {
        let (_tx, rx) = mpsc::channel();
        let shared = SharedMode::default();
        let mut pipeline = DetectionPipeline::new(GestureClassifier::default(), shared.clone(), rx);
        let mut sink = |_: &StatusReport| {};

        assert!(pipeline.process(&frame(0, 0.0), &mut sink).unwrap().is_none());
        assert_eq!(pipeline.state(), &DetectorState::Loading);
        assert_eq!(shared.mode(), Mode::Tree);
    }

    #[test]
    fn becomes_ready_once_the_loader_reports() {
        let (tx, rx) = mpsc::channel();
        let mut pipeline =
            DetectionPipeline::new(GestureClassifier::default(), SharedMode::default(), rx);
        let mut sink = |_: &StatusReport| {};

        tx.send(Ok(open_hand())).unwrap();
        let reading = pipeline.process(&frame(0, 0.0), &mut sink).unwrap();
        assert_eq!(pipeline.state(), &DetectorState::Ready);
        assert_eq!(reading.map(|r| r.mode), Some(Mode::Explode));
    }

    #[test]
    fn load_failure_is_reported_once_and_never_retried() {
        let rx = spawn_model_loader(Failing);
        let shared = SharedMode::default();
        let mut pipeline = DetectionPipeline::new(GestureClassifier::default(), shared.clone(), rx);
        let mut statuses = Vec::new();
        let mut sink = |status: &StatusReport| statuses.push(status.clone());

        let mut first_error = None;
        for index in 0..200 {
            match pipeline.process(&frame(index, index as f64), &mut sink) {
                Err(err) => {
                    first_error = Some(err);
                    break;
                }
                Ok(reading) => assert!(reading.is_none()),
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        let err = first_error.expect("loader failure should surface");
        assert!(matches!(err, MorphError::ModelLoad(_)));
        assert!(matches!(pipeline.state(), DetectorState::Failed(_)));
        assert!(pipeline.process(&frame(500, 500.0), &mut sink).unwrap().is_none());
        assert_eq!(statuses, vec![StatusReport::model_failed()]);
        assert_eq!(shared.mode(), Mode::Tree);
    }

    #[test]
    fn detector_errors_skip_the_frame() {
        let shared = SharedMode::default();
        shared.publish(Mode::Sphere, 0.0);
        let mut pipeline = DetectionPipeline::with_detector(
            GestureClassifier::default(),
            shared.clone(),
            Box::new(Flaky),
        );
        let mut sink = |_: &StatusReport| {};

        assert!(pipeline.process(&frame(0, 0.0), &mut sink).unwrap().is_none());
        assert_eq!(shared.mode(), Mode::Sphere);
    }

    #[test]
    fn no_hands_resets_to_tree() {
        let shared = SharedMode::default();
        shared.publish(Mode::Explode, 3.0);
        let detector = Box::new(Fixed {
            result: DetectionResult::empty(0.0),
        });
        let mut pipeline = DetectionPipeline::with_detector(
            GestureClassifier::default(),
            shared.clone(),
            detector,
        );
        let mut sink = |_: &StatusReport| {};

        pipeline.process(&frame(0, 10.0), &mut sink).unwrap();
        assert_eq!(shared.mode(), Mode::Tree);
        assert_eq!(shared.rotation_speed(), 1.0);
    }
}
