//! Process-wide model registry with explicit lifecycle.
//!
//! The registry is constructed once from injected capability handles,
//! initialized before any session or batch call is admitted, and torn down
//! after the last session closes. It is deliberately not ambient: every
//! component receives it at construction time.

use crate::error::{Result, SignflowError};
use crate::model::capability::{
    FaceDetector, HandDetector, PoseDetector, SignToTextModel, TextToSignModel,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Registry lifecycle: created → initialized → torn down, each edge once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Initialized,
    TornDown,
}

/// Holds one handle per model capability for the life of the process.
pub struct ModelRegistry {
    pose: Arc<dyn PoseDetector>,
    hands: Arc<dyn HandDetector>,
    face: Arc<dyn FaceDetector>,
    sign_to_text: Arc<dyn SignToTextModel>,
    text_to_sign: Arc<dyn TextToSignModel>,
    lifecycle: Mutex<Lifecycle>,
}

impl ModelRegistry {
    /// Starts building a registry.
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        // A panic while holding this one-word lock leaves no torn state.
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks the registry initialized.
    ///
    /// Must be called exactly once, before any session is admitted.
    pub fn initialize(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle();
        match *lifecycle {
            Lifecycle::Created => {
                *lifecycle = Lifecycle::Initialized;
                info!(
                    sign_to_text = self.sign_to_text.name(),
                    text_to_sign = self.text_to_sign.name(),
                    "model registry initialized"
                );
                Ok(())
            }
            Lifecycle::Initialized => Err(SignflowError::Registry {
                message: "already initialized".to_string(),
            }),
            Lifecycle::TornDown => Err(SignflowError::Registry {
                message: "cannot reinitialize after teardown".to_string(),
            }),
        }
    }

    /// Releases the registry.
    ///
    /// Must be called exactly once, after all sessions are closed. Capability
    /// handles drop with the registry; no partial reinitialization exists.
    pub fn teardown(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle();
        match *lifecycle {
            Lifecycle::Initialized => {
                *lifecycle = Lifecycle::TornDown;
                info!("model registry torn down");
                Ok(())
            }
            Lifecycle::Created => Err(SignflowError::Registry {
                message: "teardown before initialize".to_string(),
            }),
            Lifecycle::TornDown => Err(SignflowError::Registry {
                message: "already torn down".to_string(),
            }),
        }
    }

    /// Returns true while the registry is initialized and not torn down.
    pub fn is_initialized(&self) -> bool {
        *self.lifecycle() == Lifecycle::Initialized
    }

    /// Pose detector handle.
    pub fn pose(&self) -> &Arc<dyn PoseDetector> {
        &self.pose
    }

    /// Hand detector handle.
    pub fn hands(&self) -> &Arc<dyn HandDetector> {
        &self.hands
    }

    /// Face detector handle.
    pub fn face(&self) -> &Arc<dyn FaceDetector> {
        &self.face
    }

    /// Sign-to-text model handle.
    pub fn sign_to_text(&self) -> &Arc<dyn SignToTextModel> {
        &self.sign_to_text
    }

    /// Text-to-sign model handle.
    pub fn text_to_sign(&self) -> &Arc<dyn TextToSignModel> {
        &self.text_to_sign
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("pose", &self.pose.name())
            .field("hands", &self.hands.name())
            .field("face", &self.face.name())
            .field("sign_to_text", &self.sign_to_text.name())
            .field("text_to_sign", &self.text_to_sign.name())
            .field("lifecycle", &*self.lifecycle())
            .finish()
    }
}

/// Builder collecting the five capability handles.
#[derive(Default)]
pub struct ModelRegistryBuilder {
    pose: Option<Arc<dyn PoseDetector>>,
    hands: Option<Arc<dyn HandDetector>>,
    face: Option<Arc<dyn FaceDetector>>,
    sign_to_text: Option<Arc<dyn SignToTextModel>>,
    text_to_sign: Option<Arc<dyn TextToSignModel>>,
}

impl ModelRegistryBuilder {
    /// Sets the pose detector handle.
    pub fn with_pose(mut self, pose: Arc<dyn PoseDetector>) -> Self {
        self.pose = Some(pose);
        self
    }

    /// Sets the hand detector handle.
    pub fn with_hands(mut self, hands: Arc<dyn HandDetector>) -> Self {
        self.hands = Some(hands);
        self
    }

    /// Sets the face detector handle.
    pub fn with_face(mut self, face: Arc<dyn FaceDetector>) -> Self {
        self.face = Some(face);
        self
    }

    /// Sets the sign-to-text model handle.
    pub fn with_sign_to_text(mut self, model: Arc<dyn SignToTextModel>) -> Self {
        self.sign_to_text = Some(model);
        self
    }

    /// Sets the text-to-sign model handle.
    pub fn with_text_to_sign(mut self, model: Arc<dyn TextToSignModel>) -> Self {
        self.text_to_sign = Some(model);
        self
    }

    /// Builds the registry; every capability must be present.
    pub fn build(self) -> Result<ModelRegistry> {
        fn require<T>(handle: Option<T>, capability: &str) -> Result<T> {
            handle.ok_or_else(|| SignflowError::CapabilityMissing {
                capability: capability.to_string(),
            })
        }

        Ok(ModelRegistry {
            pose: require(self.pose, "pose")?,
            hands: require(self.hands, "hands")?,
            face: require(self.face, "face")?,
            sign_to_text: require(self.sign_to_text, "sign_to_text")?,
            text_to_sign: require(self.text_to_sign, "text_to_sign")?,
            lifecycle: Mutex::new(Lifecycle::Created),
        })
    }
}
