//! Temporal window assembly.
//!
//! Accumulates per-frame feature records into candidate utterance windows.
//! A window is finalized when it fills, when trailing silence is observed,
//! or when the caller flags end-of-input; out-of-order frames are dropped,
//! never reordered.

use crate::defaults;
use crate::extract::landmarks::FeatureRecord;
use serde::{Deserialize, Serialize};

/// Configuration for window assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Maximum records per window. Once full, the oldest record slides out.
    pub max_frames: usize,
    /// Minimum records before a window is considered usable.
    pub min_frames: usize,
    /// Consecutive no-signal frames that mark trailing silence.
    pub trailing_silence_frames: u32,
    /// Maximum temporal span of a window in milliseconds.
    pub max_span_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_frames: defaults::MAX_WINDOW_FRAMES,
            min_frames: defaults::MIN_WINDOW_FRAMES,
            trailing_silence_frames: defaults::TRAILING_SILENCE_FRAMES,
            max_span_ms: defaults::MAX_WINDOW_SPAN_MS,
        }
    }
}

impl WindowConfig {
    /// Configuration for batch assembly over a decoded clip.
    ///
    /// Batch mode always finalizes at end-of-clip, so the window is bounded
    /// by the clip itself and readiness gating never applies.
    pub fn batch(frame_count: usize) -> Self {
        Self {
            max_frames: frame_count.max(1),
            min_frames: 1,
            ..Self::default()
        }
    }
}

/// Outcome of appending a record to a sequence buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Record accepted in timestamp order.
    Accepted,
    /// Record not strictly newer than the buffer tail; dropped.
    OutOfOrder,
}

/// An ordered, non-empty run of feature records representing one candidate
/// sign utterance.
///
/// Only [`SequenceBuffer::drain`] constructs windows, which guarantees both
/// invariants: never empty, strictly timestamp-increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceWindow {
    records: Vec<FeatureRecord>,
}

impl SequenceWindow {
    fn new(records: Vec<FeatureRecord>) -> Self {
        debug_assert!(!records.is_empty(), "windows are never empty");
        Self { records }
    }

    /// Records in timestamp order.
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// Number of records in the window.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Windows are non-empty by construction; kept for API completeness.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capture timestamp of the first record.
    pub fn first_timestamp_ms(&self) -> u64 {
        self.records.first().map(|r| r.timestamp_ms).unwrap_or(0)
    }

    /// Capture timestamp of the last record.
    pub fn last_timestamp_ms(&self) -> u64 {
        self.records.last().map(|r| r.timestamp_ms).unwrap_or(0)
    }

    /// Temporal span covered by the window in milliseconds.
    pub fn span_ms(&self) -> u64 {
        self.last_timestamp_ms() - self.first_timestamp_ms()
    }

    /// Consumes the window, yielding its records.
    pub fn into_records(self) -> Vec<FeatureRecord> {
        self.records
    }
}

/// Accumulates feature records into sequence windows.
///
/// Exclusively owned by one session or one batch call; `append` and `drain`
/// form a single atomic step relative to the owner's message loop.
#[derive(Debug)]
pub struct SequenceBuffer {
    config: WindowConfig,
    records: Vec<FeatureRecord>,
    /// Consecutive no-signal frames observed since the last accepted record.
    silence_run: u32,
    end_of_input: bool,
}

impl SequenceBuffer {
    /// Creates a buffer with default configuration.
    pub fn new() -> Self {
        Self::with_config(WindowConfig::default())
    }

    /// Creates a buffer with custom configuration.
    pub fn with_config(config: WindowConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            silence_run: 0,
            end_of_input: false,
        }
    }

    /// Appends a record, enforcing strict timestamp order.
    ///
    /// A record whose timestamp is not strictly greater than the buffer's
    /// last is dropped. When the buffer is full the oldest record slides
    /// out, keeping the window bounded.
    pub fn append(&mut self, record: FeatureRecord) -> AppendOutcome {
        if let Some(last) = self.records.last()
            && record.timestamp_ms <= last.timestamp_ms
        {
            return AppendOutcome::OutOfOrder;
        }

        self.silence_run = 0;
        if self.records.len() >= self.config.max_frames && !self.records.is_empty() {
            self.records.remove(0);
        }
        self.records.push(record);
        AppendOutcome::Accepted
    }

    /// Records a no-signal frame for trailing-silence detection.
    ///
    /// Silence before the first accepted record carries no information and
    /// is ignored.
    pub fn note_silence(&mut self) {
        if !self.records.is_empty() {
            self.silence_run = self.silence_run.saturating_add(1);
        }
    }

    /// Flags explicit end-of-input from the caller.
    pub fn flag_end_of_input(&mut self) {
        self.end_of_input = true;
    }

    /// Number of accumulated records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no records have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current trailing-silence run length.
    pub fn silence_run(&self) -> u32 {
        self.silence_run
    }

    /// Returns true when the buffer holds a usable, finalizable window.
    pub fn is_ready(&self) -> bool {
        let len = self.records.len();
        if len < self.config.min_frames.max(1) {
            return false;
        }
        len >= self.config.max_frames
            || self.silence_run >= self.config.trailing_silence_frames
            || self.end_of_input
            || self.span_ms() >= self.config.max_span_ms
    }

    fn span_ms(&self) -> u64 {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0,
        }
    }

    /// Returns the accumulated window and resets the buffer, or `None` when
    /// nothing was accumulated. A returned window is never empty.
    pub fn drain(&mut self) -> Option<SequenceWindow> {
        self.silence_run = 0;
        self.end_of_input = false;
        if self.records.is_empty() {
            return None;
        }
        Some(SequenceWindow::new(std::mem::take(&mut self.records)))
    }

    /// Resets all buffer state without producing a window.
    pub fn reset(&mut self) {
        self.records.clear();
        self.silence_run = 0;
        self.end_of_input = false;
    }
}

impl Default for SequenceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::landmarks::PoseLandmark;

    fn record(timestamp_ms: u64) -> FeatureRecord {
        FeatureRecord {
            pose: vec![PoseLandmark::new(0.5, 0.5, 0.0, 1.0)],
            left_hand: vec![],
            right_hand: vec![],
            face: vec![],
            timestamp_ms,
        }
    }

    fn small_config() -> WindowConfig {
        WindowConfig {
            max_frames: 4,
            min_frames: 2,
            trailing_silence_frames: 3,
            max_span_ms: 10_000,
        }
    }

    #[test]
    fn test_append_in_order() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        assert_eq!(buffer.append(record(10)), AppendOutcome::Accepted);
        assert_eq!(buffer.append(record(20)), AppendOutcome::Accepted);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_out_of_order_dropped_not_reordered() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        buffer.append(record(10));
        buffer.append(record(30));

        assert_eq!(buffer.append(record(20)), AppendOutcome::OutOfOrder);
        assert_eq!(buffer.append(record(30)), AppendOutcome::OutOfOrder);
        assert_eq!(buffer.len(), 2);

        let window = buffer.drain().expect("window");
        assert_eq!(window.last_timestamp_ms(), 30);
    }

    #[test]
    fn test_not_ready_below_min_frames() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        buffer.append(record(10));
        buffer.flag_end_of_input();
        assert!(!buffer.is_ready(), "one record is below min_frames");
    }

    #[test]
    fn test_ready_when_full() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        for t in [10, 20, 30, 40] {
            buffer.append(record(t));
        }
        assert!(buffer.is_ready());
    }

    #[test]
    fn test_ready_on_trailing_silence() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        buffer.append(record(10));
        buffer.append(record(20));
        assert!(!buffer.is_ready());

        buffer.note_silence();
        buffer.note_silence();
        assert!(!buffer.is_ready());
        buffer.note_silence();
        assert!(buffer.is_ready());
    }

    #[test]
    fn test_silence_run_resets_on_signal() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        buffer.append(record(10));
        buffer.note_silence();
        buffer.note_silence();
        buffer.append(record(20));
        assert_eq!(buffer.silence_run(), 0);
    }

    #[test]
    fn test_leading_silence_is_ignored() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        for _ in 0..5 {
            buffer.note_silence();
        }
        assert_eq!(buffer.silence_run(), 0);
        buffer.append(record(10));
        buffer.append(record(20));
        assert!(!buffer.is_ready());
    }

    #[test]
    fn test_ready_on_end_of_input() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        buffer.append(record(10));
        buffer.append(record(20));
        assert!(!buffer.is_ready());
        buffer.flag_end_of_input();
        assert!(buffer.is_ready());
    }

    #[test]
    fn test_ready_on_span_exceeded() {
        let config = WindowConfig {
            max_span_ms: 100,
            ..small_config()
        };
        let mut buffer = SequenceBuffer::with_config(config);
        buffer.append(record(10));
        buffer.append(record(120));
        assert!(buffer.is_ready());
    }

    #[test]
    fn test_drain_returns_records_in_order_and_resets() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        for t in [10, 20, 30] {
            buffer.append(record(t));
        }
        buffer.flag_end_of_input();

        let window = buffer.drain().expect("window");
        assert_eq!(window.len(), 3);
        assert_eq!(window.first_timestamp_ms(), 10);
        assert_eq!(window.last_timestamp_ms(), 30);
        assert_eq!(window.span_ms(), 20);

        assert!(buffer.is_empty());
        assert!(buffer.drain().is_none(), "second drain yields nothing");
        assert!(!buffer.is_ready(), "end-of-input flag cleared by drain");
    }

    #[test]
    fn test_drain_empty_returns_none() {
        let mut buffer = SequenceBuffer::new();
        assert!(buffer.drain().is_none());
    }

    #[test]
    fn test_full_buffer_slides_oldest_out() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        for t in [10, 20, 30, 40, 50] {
            assert_eq!(buffer.append(record(t)), AppendOutcome::Accepted);
        }
        assert_eq!(buffer.len(), 4);

        let window = buffer.drain().expect("window");
        assert_eq!(window.first_timestamp_ms(), 20);
        assert_eq!(window.last_timestamp_ms(), 50);
    }

    #[test]
    fn test_batch_config_bounds_to_clip() {
        let config = WindowConfig::batch(30);
        assert_eq!(config.max_frames, 30);
        assert_eq!(config.min_frames, 1);

        let mut buffer = SequenceBuffer::with_config(config);
        for t in 0..30u64 {
            buffer.append(record(t * 33));
        }
        let window = buffer.drain().expect("window");
        assert_eq!(window.len(), 30);
    }

    #[test]
    fn test_batch_config_never_zero_frames() {
        assert_eq!(WindowConfig::batch(0).max_frames, 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        buffer.append(record(10));
        buffer.note_silence();
        buffer.flag_end_of_input();

        buffer.reset();
        assert!(buffer.is_empty());
        assert_eq!(buffer.silence_run(), 0);
        assert!(!buffer.is_ready());
    }

    #[test]
    fn test_window_into_records_preserves_order() {
        let mut buffer = SequenceBuffer::with_config(small_config());
        buffer.append(record(1));
        buffer.append(record(2));
        let records = buffer.drain().expect("window").into_records();
        assert_eq!(records[0].timestamp_ms, 1);
        assert_eq!(records[1].timestamp_ms, 2);
    }
}
