//! Sign-video synthesis dispatch.
//!
//! Rendering a gesture sequence into a playable video runs asynchronously in
//! an external renderer; dispatch only mints the artifact reference, records
//! a pending job, and returns. Consumers learn about `Ready`/`Failed`
//! transitions from the store, not from this module.

use crate::model::capability::SignSequence;
use crate::store::{JobStatus, RecordStore, SynthesisJob};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use uuid::Uuid;

/// Reference to a synthesis artifact, unique per dispatch call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoReference(String);

impl VideoReference {
    /// Derives a reference from the caller, submission time, and a
    /// process-wide discriminant that breaks same-millisecond ties.
    fn derive(caller_id: &str, submitted_at: DateTime<Utc>, discriminant: u64) -> Self {
        Self(format!(
            "sign-videos/{}-{}-{}.mp4",
            caller_id,
            submitted_at.timestamp_millis(),
            discriminant
        ))
    }

    /// The reference as a path-like string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns generated sign sequences into queued rendering jobs.
pub struct SynthesisDispatcher {
    store: Arc<dyn RecordStore>,
    dispatch_counter: AtomicU64,
}

impl SynthesisDispatcher {
    /// Creates a dispatcher recording jobs in the given store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            dispatch_counter: AtomicU64::new(0),
        }
    }

    /// Queues rendering of `sequence` and returns the artifact reference
    /// immediately, without blocking on the render.
    ///
    /// The job record is best-effort: a store failure is logged and the
    /// reference is still returned.
    pub async fn dispatch(&self, sequence: &SignSequence, caller_id: &str) -> VideoReference {
        let submitted_at = Utc::now();
        let discriminant = self.dispatch_counter.fetch_add(1, Ordering::Relaxed);
        let reference = VideoReference::derive(caller_id, submitted_at, discriminant);

        debug!(
            caller = caller_id,
            reference = %reference,
            keyframes = sequence.len(),
            "dispatching sign-video synthesis"
        );

        let job = SynthesisJob {
            id: Uuid::new_v4(),
            caller_id: caller_id.to_string(),
            reference: reference.as_str().to_string(),
            status: JobStatus::Pending,
            created_at: submitted_at,
        };
        if let Err(e) = self.store.insert_synthesis_job(job).await {
            warn!(error = %e, caller = caller_id, "failed to record synthesis job");
        }

        reference
    }
}
