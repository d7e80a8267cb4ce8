//! Landmark types and the per-frame feature record.

/// A detected landmark in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    /// Creates a new landmark.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A body pose landmark with the detector's visibility estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Likelihood in [0,1] that the landmark is visible in the frame.
    pub visibility: f32,
}

impl PoseLandmark {
    /// Creates a new pose landmark.
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }
}

/// Which hand a detection belongs to, as labeled by the detector itself.
///
/// Apparent screen-side position is unreliable under self-occlusion or when
/// the signer faces away, so assignment always follows the detector label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

/// One detected hand: its handedness label and landmark set.
#[derive(Debug, Clone, PartialEq)]
pub struct HandDetection {
    pub handedness: Handedness,
    pub landmarks: Vec<Landmark>,
}

impl HandDetection {
    /// Creates a new hand detection.
    pub fn new(handedness: Handedness, landmarks: Vec<Landmark>) -> Self {
        Self {
            handedness,
            landmarks,
        }
    }
}

/// One video frame's extracted signal.
///
/// Constructed by the feature extractor only when the frame carries usable
/// signal: a record with empty pose, left hand, and right hand sequences is
/// "no signal" and is never built (a face-only reading is not meaningful).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub pose: Vec<PoseLandmark>,
    pub left_hand: Vec<Landmark>,
    pub right_hand: Vec<Landmark>,
    /// Bounded facial subset (mouth/eyebrow/jaw region), never the full mesh.
    pub face: Vec<Landmark>,
    /// Capture timestamp of the source frame in milliseconds.
    pub timestamp_ms: u64,
}

impl FeatureRecord {
    /// Returns true when the record carries usable sign language signal.
    ///
    /// Pose or either hand qualifies; face landmarks alone do not.
    pub fn has_signal(&self) -> bool {
        !self.pose.is_empty() || !self.left_hand.is_empty() || !self.right_hand.is_empty()
    }

    /// Total number of landmarks across all sequences.
    pub fn landmark_count(&self) -> usize {
        self.pose.len() + self.left_hand.len() + self.right_hand.len() + self.face.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(
        pose: usize,
        left: usize,
        right: usize,
        face: usize,
        timestamp_ms: u64,
    ) -> FeatureRecord {
        FeatureRecord {
            pose: vec![PoseLandmark::new(0.5, 0.5, 0.0, 1.0); pose],
            left_hand: vec![Landmark::new(0.1, 0.1, 0.0); left],
            right_hand: vec![Landmark::new(0.9, 0.1, 0.0); right],
            face: vec![Landmark::new(0.5, 0.2, 0.0); face],
            timestamp_ms,
        }
    }

    #[test]
    fn test_has_signal_with_pose_only() {
        assert!(record_with(33, 0, 0, 0, 0).has_signal());
    }

    #[test]
    fn test_has_signal_with_one_hand_only() {
        assert!(record_with(0, 21, 0, 0, 0).has_signal());
        assert!(record_with(0, 0, 21, 0, 0).has_signal());
    }

    #[test]
    fn test_face_only_is_not_signal() {
        assert!(!record_with(0, 0, 0, 46, 0).has_signal());
    }

    #[test]
    fn test_landmark_count_sums_all_sequences() {
        let record = record_with(33, 21, 21, 46, 0);
        assert_eq!(record.landmark_count(), 121);
    }
}
