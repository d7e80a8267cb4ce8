//! Persisted record shapes and the external record-store collaborator.
//!
//! The store is best-effort from the pipeline's point of view: orchestrators
//! log insert failures and discard them, so translation correctness never
//! depends on successful persistence.

use crate::error::{Result, SignflowError};
use crate::model::capability::SignSequence;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Direction of a completed translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationDirection {
    SignToText,
    TextToSign,
}

/// Lifecycle of an asynchronous synthesis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Ready,
    Failed,
}

/// One completed translation, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub caller_id: String,
    pub direction: TranslationDirection,
    pub source_language: String,
    pub target_language: String,
    /// Translated text (sign→text) or normalized input text (text→sign).
    pub text: Option<String>,
    /// Generated gesture sequence, text→sign only.
    pub sign_sequence: Option<SignSequence>,
    /// Reference to the synthesis artifact, text→sign only.
    pub video_reference: Option<String>,
    pub confidence: f32,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// A queued sign-video rendering job, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisJob {
    pub id: Uuid,
    pub caller_id: String,
    pub reference: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// Storage backend for completed translations and synthesis jobs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a completed translation.
    async fn insert_translation(&self, record: TranslationRecord) -> Result<()>;

    /// Persist a synthesis job.
    async fn insert_synthesis_job(&self, job: SynthesisJob) -> Result<()>;
}

/// In-memory record store for testing.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    translations: Mutex<Vec<TranslationRecord>>,
    jobs: Mutex<Vec<SynthesisJob>>,
}

impl MemoryRecordStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of persisted translations.
    pub async fn translations(&self) -> Vec<TranslationRecord> {
        self.translations.lock().await.clone()
    }

    /// Snapshot of persisted synthesis jobs.
    pub async fn jobs(&self) -> Vec<SynthesisJob> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_translation(&self, record: TranslationRecord) -> Result<()> {
        self.translations.lock().await.push(record);
        Ok(())
    }

    async fn insert_synthesis_job(&self, job: SynthesisJob) -> Result<()> {
        self.jobs.lock().await.push(job);
        Ok(())
    }
}

/// Record store whose every insert fails, for degraded-path testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRecordStore;

impl FailingRecordStore {
    /// Create a store that rejects everything.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn insert_translation(&self, _record: TranslationRecord) -> Result<()> {
        Err(SignflowError::Persistence {
            record_kind: "translation record".to_string(),
            message: "store unavailable".to_string(),
        })
    }

    async fn insert_synthesis_job(&self, _job: SynthesisJob) -> Result<()> {
        Err(SignflowError::Persistence {
            record_kind: "synthesis job".to_string(),
            message: "store unavailable".to_string(),
        })
    }
}
