//! Feature extractor: raw frame in, optional feature record out.

use crate::defaults;
use crate::error::Result;
use crate::extract::landmarks::{FeatureRecord, Handedness, Landmark};
use crate::model::registry::ModelRegistry;
use crate::video::RawFrame;
use std::sync::Arc;
use tracing::debug;

/// Runs the pose, hand, and face detectors over a single frame and collapses
/// their output into a [`FeatureRecord`].
///
/// Pure over its inputs plus the read-only registry. Any detector fault is
/// caught here, logged, and reported as "no features" — extraction never
/// propagates an error to the caller.
pub struct FeatureExtractor {
    registry: Arc<ModelRegistry>,
}

impl FeatureExtractor {
    /// Creates an extractor over the given registry.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Extracts features from one frame.
    ///
    /// Returns `None` both for frames with no usable signal (no pose and no
    /// hands) and for frames where a detector faulted.
    pub fn extract(&self, frame: &RawFrame) -> Option<FeatureRecord> {
        match self.try_extract(frame) {
            Ok(record) => record,
            Err(e) => {
                debug!(
                    error = %e,
                    timestamp_ms = frame.timestamp_ms,
                    "detector fault during extraction, dropping frame"
                );
                None
            }
        }
    }

    fn try_extract(&self, frame: &RawFrame) -> Result<Option<FeatureRecord>> {
        // Detectors consume RGB; capture sources commonly deliver BGR.
        let rgb = frame.to_rgb();

        let pose = self.registry.pose().detect(&rgb)?;
        let hands = self.registry.hands().detect(&rgb)?;
        let face_mesh = self.registry.face().detect(&rgb)?;

        // Assign hands by the detector's own handedness label. With more
        // than one detection per side, the last one wins.
        let mut left_hand: Vec<Landmark> = Vec::new();
        let mut right_hand: Vec<Landmark> = Vec::new();
        for detection in hands {
            match detection.handedness {
                Handedness::Left => left_hand = detection.landmarks,
                Handedness::Right => right_hand = detection.landmarks,
            }
        }

        // Reduce the face mesh to the fixed mouth/eyebrow/jaw subset.
        let face: Vec<Landmark> = defaults::FACE_LANDMARK_INDICES
            .iter()
            .filter_map(|&idx| face_mesh.get(idx).copied())
            .collect();

        if pose.is_empty() && left_hand.is_empty() && right_hand.is_empty() {
            // A face-only reading is not meaningful signal.
            return Ok(None);
        }

        Ok(Some(FeatureRecord {
            pose,
            left_hand,
            right_hand,
            face,
            timestamp_ms: frame.timestamp_ms,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::capability::{
        MockFaceDetector, MockHandDetector, MockPoseDetector, MockSignToTextModel,
        MockTextToSignModel,
    };
    use crate::video::PixelFormat;

    fn frame(timestamp_ms: u64) -> RawFrame {
        RawFrame::new(2, 2, PixelFormat::Bgr8, vec![0; 12], timestamp_ms)
    }

    fn registry(
        pose: MockPoseDetector,
        hands: MockHandDetector,
        face: MockFaceDetector,
    ) -> Arc<ModelRegistry> {
        let registry = ModelRegistry::builder()
            .with_pose(Arc::new(pose))
            .with_hands(Arc::new(hands))
            .with_face(Arc::new(face))
            .with_sign_to_text(Arc::new(MockSignToTextModel::new("mock-s2t")))
            .with_text_to_sign(Arc::new(MockTextToSignModel::new("mock-t2s")))
            .build()
            .unwrap();
        registry.initialize().unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_extract_with_pose_and_hands() {
        let registry = registry(
            MockPoseDetector::new().with_landmarks(33),
            MockHandDetector::new()
                .with_hand(Handedness::Left, 21)
                .with_hand(Handedness::Right, 21),
            MockFaceDetector::new().with_landmarks(478),
        );
        let extractor = FeatureExtractor::new(registry);

        let record = extractor.extract(&frame(10)).expect("should extract");
        assert_eq!(record.pose.len(), 33);
        assert_eq!(record.left_hand.len(), 21);
        assert_eq!(record.right_hand.len(), 21);
        assert_eq!(record.timestamp_ms, 10);
    }

    #[test]
    fn test_face_subset_is_bounded() {
        let registry = registry(
            MockPoseDetector::new().with_landmarks(33),
            MockHandDetector::new(),
            MockFaceDetector::new().with_landmarks(478),
        );
        let extractor = FeatureExtractor::new(registry);

        let record = extractor.extract(&frame(0)).expect("should extract");
        assert_eq!(record.face.len(), defaults::FACE_LANDMARK_INDICES.len());
    }

    #[test]
    fn test_face_only_returns_none() {
        let registry = registry(
            MockPoseDetector::new(),
            MockHandDetector::new(),
            MockFaceDetector::new().with_landmarks(478),
        );
        let extractor = FeatureExtractor::new(registry);

        assert!(extractor.extract(&frame(0)).is_none());
    }

    #[test]
    fn test_no_detections_returns_none() {
        let registry = registry(
            MockPoseDetector::new(),
            MockHandDetector::new(),
            MockFaceDetector::new(),
        );
        let extractor = FeatureExtractor::new(registry);

        assert!(extractor.extract(&frame(0)).is_none());
    }

    #[test]
    fn test_detector_fault_returns_none() {
        let registry = registry(
            MockPoseDetector::new().with_failure(),
            MockHandDetector::new().with_hand(Handedness::Right, 21),
            MockFaceDetector::new(),
        );
        let extractor = FeatureExtractor::new(registry);

        // The fault is recovered as "no features", never an error.
        assert!(extractor.extract(&frame(0)).is_none());
    }

    #[test]
    fn test_duplicate_handedness_last_wins() {
        let mut second_left = MockHandDetector::new().with_hand(Handedness::Left, 21);
        second_left = second_left.with_hand(Handedness::Left, 5);
        let registry = registry(
            MockPoseDetector::new(),
            second_left,
            MockFaceDetector::new(),
        );
        let extractor = FeatureExtractor::new(registry);

        let record = extractor.extract(&frame(0)).expect("should extract");
        assert_eq!(record.left_hand.len(), 5);
        assert!(record.right_hand.is_empty());
    }

    #[test]
    fn test_partial_face_mesh_keeps_in_range_indices() {
        // A mesh shorter than the highest subset index yields only the
        // in-range landmarks.
        let registry = registry(
            MockPoseDetector::new().with_landmarks(1),
            MockHandDetector::new(),
            MockFaceDetector::new().with_landmarks(100),
        );
        let extractor = FeatureExtractor::new(registry);

        let record = extractor.extract(&frame(0)).expect("should extract");
        let expected = defaults::FACE_LANDMARK_INDICES
            .iter()
            .filter(|&&idx| idx < 100)
            .count();
        assert_eq!(record.face.len(), expected);
    }
}
