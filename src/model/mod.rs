//! Model capabilities and the process-wide registry.
//!
//! Detection and inference models are external collaborators reached
//! through the traits in [`capability`]; the [`registry`] owns one handle
//! per capability for the life of the process and is injected into every
//! component at construction time.

pub mod capability;
pub mod registry;

pub use capability::{
    FaceDetector, GestureKeyframe, HandDetector, PartialPrediction, PoseDetector, SignGeneration,
    SignPrediction, SignSequence, SignToTextModel, TextToSignModel,
};
pub use registry::{ModelRegistry, ModelRegistryBuilder};
