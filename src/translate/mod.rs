//! Batch translation orchestration.
//!
//! End-to-end sign→text and text→sign flows: decode, extract, window,
//! infer, post-process, dispatch synthesis, and persist best-effort.

pub mod orchestrator;
pub mod post_process;
pub mod synthesis;

pub use orchestrator::{TranslationEngine, TranslationOutput, TranslationResult};
pub use post_process::{finalize_text, normalize_input};
pub use synthesis::{SynthesisDispatcher, VideoReference};
