//! signflow - bidirectional sign language / text translation pipeline.
//!
//! Frame-level landmark extraction, temporal window assembly, and batch plus
//! streaming inference orchestration over injected model capabilities. The
//! transport layer, record store, and the detection/inference models are
//! external collaborators reached through traits.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod config;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod model;
pub mod session;
pub mod store;
pub mod translate;
pub mod video;
pub mod window;

// Collaborator traits (frame → features → window → model → store)
pub use model::capability::{
    FaceDetector, HandDetector, PoseDetector, SignToTextModel, TextToSignModel,
};
pub use store::RecordStore;
pub use video::VideoDecoder;

// Pipeline
pub use extract::{FeatureExtractor, FeatureRecord};
pub use model::registry::{ModelRegistry, ModelRegistryBuilder};
pub use session::{ClientMessage, SessionEvent, SessionState, StreamingEngine, StreamingSession};
pub use translate::{TranslationEngine, TranslationOutput, TranslationResult, VideoReference};
pub use window::{SequenceBuffer, SequenceWindow, WindowConfig};

// Error handling
pub use error::{Result, SignflowError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.0.1+abc1234"` when git hash is available, `"0.0.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
