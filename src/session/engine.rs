//! Per-connection streaming session state machine.

use crate::config::Config;
use crate::error::{Result, SignflowError};
use crate::extract::FeatureExtractor;
use crate::model::capability::PartialPrediction;
use crate::model::registry::ModelRegistry;
use crate::session::protocol::{self, ClientMessage, SessionEvent};
use crate::store::{RecordStore, TranslationDirection, TranslationRecord};
use crate::translate::post_process;
use crate::video::RawFrame;
use crate::window::{AppendOutcome, SequenceBuffer, SequenceWindow};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Lifecycle of one streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no open window yet.
    Open,
    /// At least one feature record accumulated toward the current window.
    Accumulating,
    /// Disconnected. Terminal; every message is rejected.
    Closed,
}

/// Constructs per-connection sessions over shared, read-only collaborators.
///
/// The engine holds no per-client state: opening a session for a client id
/// that was seen before yields brand-new session state.
pub struct StreamingEngine {
    registry: Arc<ModelRegistry>,
    store: Arc<dyn RecordStore>,
    config: Config,
}

impl StreamingEngine {
    /// Creates an engine over an initialized registry.
    ///
    /// Fails if the registry has not completed its single initialization —
    /// no session is admitted before that.
    pub fn new(
        registry: Arc<ModelRegistry>,
        store: Arc<dyn RecordStore>,
        config: Config,
    ) -> Result<Self> {
        if !registry.is_initialized() {
            return Err(SignflowError::Registry {
                message: "streaming engine requires an initialized registry".to_string(),
            });
        }
        Ok(Self {
            registry,
            store,
            config,
        })
    }

    /// Opens a fresh session for one live connection.
    pub fn open_session(&self, client_id: &str) -> StreamingSession {
        debug!(client = client_id, "opening streaming session");
        StreamingSession {
            client_id: client_id.to_string(),
            state: SessionState::Open,
            buffer: SequenceBuffer::with_config(self.config.window.clone()),
            extractor: FeatureExtractor::new(self.registry.clone()),
            registry: self.registry.clone(),
            store: self.store.clone(),
            source_language: self.config.languages.sign_language.clone(),
            target_language: self.config.languages.text_language.clone(),
            frames_received: 0,
            frames_with_features: 0,
            partials_emitted: 0,
            last_partial: None,
        }
    }

    /// Bound for session event channels, from configuration.
    pub fn event_buffer(&self) -> usize {
        self.config.session.event_buffer
    }
}

/// One live connection's mutable state.
///
/// Exclusively owned by its connection handler; messages are processed
/// strictly in arrival order and the buffer is never touched from any other
/// code path. Dropping the session at any point is safe and discards all
/// state without side effects.
pub struct StreamingSession {
    client_id: String,
    state: SessionState,
    buffer: SequenceBuffer,
    extractor: FeatureExtractor,
    registry: Arc<ModelRegistry>,
    store: Arc<dyn RecordStore>,
    source_language: String,
    target_language: String,
    frames_received: u64,
    frames_with_features: u64,
    partials_emitted: u64,
    last_partial: Option<PartialPrediction>,
}

impl StreamingSession {
    /// Client identifier this session serves.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Total frame messages received.
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// Frames that produced a usable feature record.
    pub fn frames_with_features(&self) -> u64 {
        self.frames_with_features
    }

    /// Partial translations emitted so far.
    pub fn partials_emitted(&self) -> u64 {
        self.partials_emitted
    }

    /// Most recent partial prediction, if any.
    pub fn last_partial(&self) -> Option<&PartialPrediction> {
        self.last_partial.as_ref()
    }

    /// Number of records in the open window.
    pub fn buffered_frames(&self) -> usize {
        self.buffer.len()
    }

    /// Handles one raw client payload.
    ///
    /// Unknown or malformed message types become an `error` event naming the
    /// unrecognized type; the session remains open.
    pub async fn handle_raw(&mut self, raw: &str) -> Vec<SessionEvent> {
        match protocol::decode_message(raw) {
            Ok(message) => self.handle_message(message).await,
            Err(message) => vec![SessionEvent::Error { message }],
        }
    }

    /// Handles one decoded client message, returning the events to emit.
    pub async fn handle_message(&mut self, message: ClientMessage) -> Vec<SessionEvent> {
        if self.state == SessionState::Closed {
            return vec![SessionEvent::Error {
                message: "session closed".to_string(),
            }];
        }

        match message {
            ClientMessage::SignFrame { frame } => self.handle_frame(frame).await,
            ClientMessage::EndOfUtterance => self.finalize_utterance().await,
        }
    }

    async fn handle_frame(&mut self, frame: RawFrame) -> Vec<SessionEvent> {
        self.frames_received += 1;

        let Some(record) = self.extractor.extract(&frame) else {
            // Counts toward trailing silence; informational, not an error.
            self.buffer.note_silence();
            return vec![SessionEvent::NoFeatures];
        };
        self.frames_with_features += 1;

        if self.buffer.append(record.clone()) == AppendOutcome::OutOfOrder {
            debug!(
                client = %self.client_id,
                timestamp_ms = record.timestamp_ms,
                "dropping out-of-order frame"
            );
            return vec![];
        }
        self.state = SessionState::Accumulating;

        if !self.buffer.is_ready() {
            return vec![];
        }

        // Low-latency feedback path; full accuracy waits for end-of-utterance.
        let model = self.registry.sign_to_text().clone();
        let outcome = tokio::task::spawn_blocking(move || model.predict_partial(&record)).await;
        match outcome {
            Ok(Ok(partial)) => {
                self.partials_emitted += 1;
                self.last_partial = Some(partial.clone());
                vec![SessionEvent::PartialTranslation {
                    text: partial.text,
                    confidence: partial.confidence,
                    features_detected: true,
                }]
            }
            Ok(Err(e)) => vec![SessionEvent::Error {
                message: e.to_string(),
            }],
            Err(e) => vec![SessionEvent::Error {
                message: format!("partial prediction task panicked: {e}"),
            }],
        }
    }

    async fn finalize_utterance(&mut self) -> Vec<SessionEvent> {
        // Force-drain regardless of readiness; append/drain stay atomic with
        // respect to this session's message loop.
        self.buffer.flag_end_of_input();
        let window = self.buffer.drain();
        self.state = SessionState::Open;

        let Some(window) = window else {
            return vec![SessionEvent::Error {
                message: "no usable features in utterance".to_string(),
            }];
        };

        match self.predict_full(window).await {
            Ok(event) => vec![event],
            Err(e) => vec![SessionEvent::Error {
                message: e.to_string(),
            }],
        }
    }

    async fn predict_full(&mut self, window: SequenceWindow) -> Result<SessionEvent> {
        let started = Instant::now();
        let model = self.registry.sign_to_text().clone();
        let prediction = tokio::task::spawn_blocking(move || model.predict(&window))
            .await
            .map_err(|e| SignflowError::ModelInvocation {
                capability: "sign_to_text".to_string(),
                message: format!("prediction task panicked: {e}"),
            })??;

        let text = post_process::finalize_text(&prediction.text);
        let latency_ms = started.elapsed().as_millis() as u64;
        self.last_partial = None;

        // Only finalized utterances are persisted, and only best-effort.
        let record = TranslationRecord {
            caller_id: self.client_id.clone(),
            direction: TranslationDirection::SignToText,
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            text: Some(text.clone()),
            sign_sequence: None,
            video_reference: None,
            confidence: prediction.confidence,
            latency_ms,
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.insert_translation(record).await {
            warn!(
                error = %e,
                client = %self.client_id,
                "failed to persist finalized utterance"
            );
        }

        Ok(SessionEvent::TranslationResult {
            text,
            confidence: prediction.confidence,
            latency_ms,
        })
    }

    /// Marks the session closed and discards all accumulated state.
    ///
    /// Safe at any point; an unflushed partial buffer is dropped without
    /// persistence.
    pub fn close(&mut self) {
        debug!(
            client = %self.client_id,
            frames = self.frames_received,
            "closing streaming session"
        );
        self.state = SessionState::Closed;
        self.buffer.reset();
        self.last_partial = None;
    }

    /// Drives the session from a message channel until the client
    /// disconnects (channel closes) or the event receiver goes away.
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<ClientMessage>,
        output: mpsc::Sender<SessionEvent>,
    ) {
        'receive: while let Some(message) = input.recv().await {
            for event in self.handle_message(message).await {
                if output.send(event).await.is_err() {
                    break 'receive;
                }
            }
        }
        self.close();
    }
}
