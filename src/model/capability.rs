//! Capability traits for the loaded detection and inference models.
//!
//! Every handle is stateless with respect to a single call: safe to invoke
//! concurrently from multiple sessions, never copied, only referenced.

use crate::error::{Result, SignflowError};
use crate::extract::landmarks::{FeatureRecord, HandDetection, Handedness, Landmark, PoseLandmark};
use crate::video::RawFrame;
use crate::window::SequenceWindow;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait for body pose detection over a single frame.
pub trait PoseDetector: Send + Sync {
    /// Detect pose landmarks; an empty result means no pose in frame.
    fn detect(&self, frame: &RawFrame) -> Result<Vec<PoseLandmark>>;

    /// Get the name of the loaded detector.
    fn name(&self) -> &str;
}

/// Trait for hand detection over a single frame.
pub trait HandDetector: Send + Sync {
    /// Detect hands with the detector's own handedness labels.
    fn detect(&self, frame: &RawFrame) -> Result<Vec<HandDetection>>;

    /// Get the name of the loaded detector.
    fn name(&self) -> &str;
}

/// Trait for face mesh detection over a single frame.
pub trait FaceDetector: Send + Sync {
    /// Detect the full face mesh; the extractor reduces it to a fixed subset.
    fn detect(&self, frame: &RawFrame) -> Result<Vec<Landmark>>;

    /// Get the name of the loaded detector.
    fn name(&self) -> &str;
}

/// Full-accuracy prediction over an assembled sequence window.
#[derive(Debug, Clone, PartialEq)]
pub struct SignPrediction {
    pub text: String,
    /// Model confidence in [0,1].
    pub confidence: f32,
    /// Model-internal inference latency in milliseconds.
    pub latency_ms: u64,
}

/// Low-latency prediction from the partial entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialPrediction {
    pub text: String,
    /// Model confidence in [0,1].
    pub confidence: f32,
}

/// Trait for sign-to-text recognition.
///
/// This trait allows swapping implementations (real model vs mock).
pub trait SignToTextModel: Send + Sync {
    /// Full-accuracy prediction over a complete utterance window.
    fn predict(&self, window: &SequenceWindow) -> Result<SignPrediction>;

    /// Low-latency partial prediction from a single feature record.
    ///
    /// Trades accuracy for turnaround; used for live feedback before an
    /// utterance is finalized.
    fn predict_partial(&self, record: &FeatureRecord) -> Result<PartialPrediction>;

    /// Get the name of the loaded model.
    fn name(&self) -> &str;

    /// Check if the model is ready.
    fn is_ready(&self) -> bool;
}

/// Implement SignToTextModel for Arc<T> to allow sharing across sessions.
impl<T: SignToTextModel> SignToTextModel for Arc<T> {
    fn predict(&self, window: &SequenceWindow) -> Result<SignPrediction> {
        (**self).predict(window)
    }

    fn predict_partial(&self, record: &FeatureRecord) -> Result<PartialPrediction> {
        (**self).predict_partial(record)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// One gesture in a generated sign sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureKeyframe {
    /// Identifier of the gesture in the synthesis gesture inventory.
    pub gesture_id: String,
    /// Offset from sequence start in milliseconds.
    pub offset_ms: u64,
    /// Gesture duration in milliseconds.
    pub duration_ms: u64,
}

/// An ordered sequence of gesture keyframes representing signed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignSequence {
    pub keyframes: Vec<GestureKeyframe>,
}

impl SignSequence {
    /// Creates a sequence from ordered keyframes.
    pub fn new(keyframes: Vec<GestureKeyframe>) -> Self {
        Self { keyframes }
    }

    /// Number of keyframes in the sequence.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Returns true when the sequence has no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Total playback duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.keyframes
            .last()
            .map(|kf| kf.offset_ms + kf.duration_ms)
            .unwrap_or(0)
    }
}

/// Output of text-to-sign generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignGeneration {
    pub sequence: SignSequence,
    /// Model confidence in [0,1].
    pub confidence: f32,
    /// Model-internal generation latency in milliseconds.
    pub latency_ms: u64,
}

/// Trait for text-to-sign generation.
pub trait TextToSignModel: Send + Sync {
    /// Generate a gesture keyframe sequence for the given text.
    fn generate(&self, text: &str, language: &str) -> Result<SignGeneration>;

    /// Get the name of the loaded model.
    fn name(&self) -> &str;

    /// Check if the model is ready.
    fn is_ready(&self) -> bool;
}

/// Implement TextToSignModel for Arc<T> to allow sharing across sessions.
impl<T: TextToSignModel> TextToSignModel for Arc<T> {
    fn generate(&self, text: &str, language: &str) -> Result<SignGeneration> {
        (**self).generate(text, language)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

// ── Mock implementations for testing ─────────────────────────────────────

/// Mock pose detector for testing.
#[derive(Debug, Clone, Default)]
pub struct MockPoseDetector {
    landmarks: Vec<PoseLandmark>,
    should_fail: bool,
}

impl MockPoseDetector {
    /// Create a mock that detects nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to report `count` synthesized landmarks per frame.
    pub fn with_landmarks(mut self, count: usize) -> Self {
        self.landmarks = (0..count)
            .map(|i| PoseLandmark::new(i as f32 * 0.01, i as f32 * 0.01, 0.0, 1.0))
            .collect();
        self
    }

    /// Configure the mock to fail on detect.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl PoseDetector for MockPoseDetector {
    fn detect(&self, _frame: &RawFrame) -> Result<Vec<PoseLandmark>> {
        if self.should_fail {
            Err(SignflowError::Extraction {
                message: "mock pose detector failure".to_string(),
            })
        } else {
            Ok(self.landmarks.clone())
        }
    }

    fn name(&self) -> &str {
        "mock-pose"
    }
}

/// Mock hand detector for testing.
#[derive(Debug, Clone, Default)]
pub struct MockHandDetector {
    detections: Vec<HandDetection>,
    should_fail: bool,
}

impl MockHandDetector {
    /// Create a mock that detects nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hand detection with `count` synthesized landmarks.
    pub fn with_hand(mut self, handedness: Handedness, count: usize) -> Self {
        let landmarks = (0..count)
            .map(|i| Landmark::new(i as f32 * 0.02, i as f32 * 0.02, 0.0))
            .collect();
        self.detections.push(HandDetection::new(handedness, landmarks));
        self
    }

    /// Configure the mock to fail on detect.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl HandDetector for MockHandDetector {
    fn detect(&self, _frame: &RawFrame) -> Result<Vec<HandDetection>> {
        if self.should_fail {
            Err(SignflowError::Extraction {
                message: "mock hand detector failure".to_string(),
            })
        } else {
            Ok(self.detections.clone())
        }
    }

    fn name(&self) -> &str {
        "mock-hands"
    }
}

/// Mock face detector for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFaceDetector {
    landmarks: Vec<Landmark>,
    should_fail: bool,
}

impl MockFaceDetector {
    /// Create a mock that detects nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to report a mesh of `count` landmarks per frame.
    pub fn with_landmarks(mut self, count: usize) -> Self {
        self.landmarks = (0..count)
            .map(|i| Landmark::new(i as f32 * 0.001, i as f32 * 0.001, 0.0))
            .collect();
        self
    }

    /// Configure the mock to fail on detect.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&self, _frame: &RawFrame) -> Result<Vec<Landmark>> {
        if self.should_fail {
            Err(SignflowError::Extraction {
                message: "mock face detector failure".to_string(),
            })
        } else {
            Ok(self.landmarks.clone())
        }
    }

    fn name(&self) -> &str {
        "mock-face"
    }
}

/// Mock sign-to-text model for testing.
#[derive(Debug, Clone)]
pub struct MockSignToTextModel {
    model_name: String,
    response: String,
    partial_response: String,
    confidence: f32,
    latency_ms: u64,
    should_fail: bool,
}

impl MockSignToTextModel {
    /// Create a new mock model with default settings.
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock translation".to_string(),
            partial_response: "mock partial".to_string(),
            confidence: 0.9,
            latency_ms: 5,
            should_fail: false,
        }
    }

    /// Configure the full-prediction response text.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the partial-prediction response text.
    pub fn with_partial_response(mut self, response: &str) -> Self {
        self.partial_response = response.to_string();
        self
    }

    /// Configure the reported confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Configure the mock to fail on both prediction entry points.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SignToTextModel for MockSignToTextModel {
    fn predict(&self, _window: &SequenceWindow) -> Result<SignPrediction> {
        if self.should_fail {
            Err(SignflowError::ModelInvocation {
                capability: "sign_to_text".to_string(),
                message: "mock prediction failure".to_string(),
            })
        } else {
            Ok(SignPrediction {
                text: self.response.clone(),
                confidence: self.confidence,
                latency_ms: self.latency_ms,
            })
        }
    }

    fn predict_partial(&self, _record: &FeatureRecord) -> Result<PartialPrediction> {
        if self.should_fail {
            Err(SignflowError::ModelInvocation {
                capability: "sign_to_text".to_string(),
                message: "mock partial prediction failure".to_string(),
            })
        } else {
            Ok(PartialPrediction {
                text: self.partial_response.clone(),
                confidence: self.confidence,
            })
        }
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

/// Mock text-to-sign model for testing.
///
/// Generates one keyframe per whitespace-separated word, which keeps test
/// assertions readable.
#[derive(Debug, Clone)]
pub struct MockTextToSignModel {
    model_name: String,
    confidence: f32,
    latency_ms: u64,
    should_fail: bool,
}

impl MockTextToSignModel {
    /// Create a new mock model with default settings.
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            confidence: 0.85,
            latency_ms: 8,
            should_fail: false,
        }
    }

    /// Configure the reported confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Configure the mock to fail on generate.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl TextToSignModel for MockTextToSignModel {
    fn generate(&self, text: &str, _language: &str) -> Result<SignGeneration> {
        if self.should_fail {
            return Err(SignflowError::ModelInvocation {
                capability: "text_to_sign".to_string(),
                message: "mock generation failure".to_string(),
            });
        }

        let keyframes = text
            .split_whitespace()
            .enumerate()
            .map(|(i, word)| GestureKeyframe {
                gesture_id: word.trim_matches(|c: char| c.is_ascii_punctuation()).to_string(),
                offset_ms: i as u64 * 600,
                duration_ms: 500,
            })
            .collect();

        Ok(SignGeneration {
            sequence: SignSequence::new(keyframes),
            confidence: self.confidence,
            latency_ms: self.latency_ms,
        })
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
