//! JSON message protocol between the transport layer and a streaming session.

use crate::video::RawFrame;
use serde::{Deserialize, Serialize};

/// Messages sent by a connected client into its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// One captured video frame for incremental translation.
    SignFrame { frame: RawFrame },
    /// The signer finished an utterance; finalize the open window.
    EndOfUtterance,
}

impl ClientMessage {
    /// Serialize message to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize message from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Events emitted by a session toward its client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Low-latency feedback while an utterance is still open.
    PartialTranslation {
        text: String,
        confidence: f32,
        features_detected: bool,
    },
    /// The last frame carried no usable signal. Informational, not an error.
    NoFeatures,
    /// Final translation of a completed utterance.
    TranslationResult {
        text: String,
        confidence: f32,
        latency_ms: u64,
    },
    /// Something went wrong; the session remains open.
    Error { message: String },
}

impl SessionEvent {
    /// Serialize event to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize event from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Decodes a raw client payload, naming unrecognized message types.
///
/// The error string is ready to be wrapped in a [`SessionEvent::Error`]; the
/// session stays open either way.
pub fn decode_message(raw: &str) -> Result<ClientMessage, String> {
    match ClientMessage::from_json(raw) {
        Ok(message) => Ok(message),
        Err(_) => {
            let kind = serde_json::from_str::<serde_json::Value>(raw)
                .ok()
                .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string));
            Err(match kind {
                Some(ty) => format!("unknown message type: {ty}"),
                None => "malformed message".to_string(),
            })
        }
    }
}
