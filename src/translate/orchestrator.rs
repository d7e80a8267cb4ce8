//! Batch translation engine: sign→text and text→sign end-to-end flows.

use crate::defaults;
use crate::error::{Result, SignflowError};
use crate::extract::FeatureExtractor;
use crate::model::capability::SignSequence;
use crate::model::registry::ModelRegistry;
use crate::store::{RecordStore, TranslationDirection, TranslationRecord};
use crate::translate::post_process;
use crate::translate::synthesis::{SynthesisDispatcher, VideoReference};
use crate::video::{VideoClip, VideoDecoder};
use crate::window::{SequenceBuffer, WindowConfig};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Payload of a completed translation.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutput {
    /// Sign→text: the post-processed translation.
    Text { text: String },
    /// Text→sign: the gesture sequence plus the pending video artifact.
    Sign {
        sequence: SignSequence,
        video: VideoReference,
    },
}

/// Outcome of one batch translation call.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub output: TranslationOutput,
    /// Model confidence in [0,1].
    pub confidence: f32,
    /// End-to-end processing latency in milliseconds.
    pub latency_ms: u64,
    /// Frames that contributed usable features (sign→text; 0 for text→sign).
    pub features_detected: usize,
    pub source_language: String,
    pub target_language: String,
}

/// Orchestrates batch translations over the injected collaborators.
pub struct TranslationEngine {
    registry: Arc<ModelRegistry>,
    decoder: Arc<dyn VideoDecoder>,
    store: Arc<dyn RecordStore>,
    synthesis: SynthesisDispatcher,
}

impl TranslationEngine {
    /// Creates an engine over an initialized registry.
    ///
    /// Fails if the registry has not completed its single initialization.
    pub fn new(
        registry: Arc<ModelRegistry>,
        decoder: Arc<dyn VideoDecoder>,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self> {
        if !registry.is_initialized() {
            return Err(SignflowError::Registry {
                message: "translation engine requires an initialized registry".to_string(),
            });
        }
        Ok(Self {
            registry,
            decoder,
            synthesis: SynthesisDispatcher::new(store.clone()),
            store,
        })
    }

    /// Translates a sign language clip to text.
    ///
    /// Decodes the clip, extracts features from every frame, assembles one
    /// window over the whole clip, and runs full-accuracy prediction. Fails
    /// with [`SignflowError::EmptyInput`] when no frame carried usable
    /// signal.
    pub async fn translate_sign_to_text(
        &self,
        clip: &VideoClip,
        source_language: &str,
        target_language: &str,
        caller_id: &str,
    ) -> Result<TranslationResult> {
        let started = Instant::now();

        let frames = self.decoder.extract_frames(clip)?;

        let extractor = FeatureExtractor::new(self.registry.clone());
        let mut buffer = SequenceBuffer::with_config(WindowConfig::batch(frames.len()));
        for frame in &frames {
            if let Some(record) = extractor.extract(frame) {
                buffer.append(record);
            }
        }

        // Batch mode ignores readiness gating and finalizes at end-of-clip.
        let window = buffer.drain().ok_or(SignflowError::EmptyInput)?;
        let features_detected = window.len();

        let model = self.registry.sign_to_text().clone();
        let prediction = tokio::task::spawn_blocking(move || model.predict(&window))
            .await
            .map_err(|e| SignflowError::ModelInvocation {
                capability: "sign_to_text".to_string(),
                message: format!("prediction task panicked: {e}"),
            })??;

        let text = post_process::finalize_text(&prediction.text);
        let latency_ms = started.elapsed().as_millis() as u64;

        info!(
            caller = caller_id,
            features = features_detected,
            latency_ms,
            "sign-to-text translation completed"
        );

        self.persist(TranslationRecord {
            caller_id: caller_id.to_string(),
            direction: TranslationDirection::SignToText,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            text: Some(text.clone()),
            sign_sequence: None,
            video_reference: None,
            confidence: prediction.confidence,
            latency_ms,
            created_at: Utc::now(),
        })
        .await;

        Ok(TranslationResult {
            output: TranslationOutput::Text { text },
            confidence: prediction.confidence,
            latency_ms,
            features_detected,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        })
    }

    /// Translates text to a sign sequence with a pending video artifact.
    pub async fn translate_text_to_sign(
        &self,
        text: &str,
        target_sign_language: &str,
        caller_id: &str,
    ) -> Result<TranslationResult> {
        let started = Instant::now();

        let normalized = post_process::normalize_input(text);

        let model = self.registry.text_to_sign().clone();
        let input = normalized.clone();
        let language = target_sign_language.to_string();
        let generation = tokio::task::spawn_blocking(move || model.generate(&input, &language))
            .await
            .map_err(|e| SignflowError::ModelInvocation {
                capability: "text_to_sign".to_string(),
                message: format!("generation task panicked: {e}"),
            })??;

        // Rendering runs asynchronously; only the reference returns inline.
        let video = self.synthesis.dispatch(&generation.sequence, caller_id).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        info!(
            caller = caller_id,
            keyframes = generation.sequence.len(),
            latency_ms,
            "text-to-sign translation completed"
        );

        self.persist(TranslationRecord {
            caller_id: caller_id.to_string(),
            direction: TranslationDirection::TextToSign,
            source_language: defaults::DEFAULT_TEXT_LANGUAGE.to_string(),
            target_language: target_sign_language.to_string(),
            text: Some(normalized),
            sign_sequence: Some(generation.sequence.clone()),
            video_reference: Some(video.as_str().to_string()),
            confidence: generation.confidence,
            latency_ms,
            created_at: Utc::now(),
        })
        .await;

        Ok(TranslationResult {
            output: TranslationOutput::Sign {
                sequence: generation.sequence,
                video,
            },
            confidence: generation.confidence,
            latency_ms,
            features_detected: 0,
            source_language: defaults::DEFAULT_TEXT_LANGUAGE.to_string(),
            target_language: target_sign_language.to_string(),
        })
    }

    /// Best-effort persistence: the failure is logged as a degraded
    /// condition and discarded, never surfaced to the caller.
    async fn persist(&self, record: TranslationRecord) {
        if let Err(e) = self.store.insert_translation(record).await {
            warn!(error = %e, "failed to persist translation record");
        }
    }
}
