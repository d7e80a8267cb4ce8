//! Default configuration constants for signflow.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

/// Maximum number of feature records in a sequence window.
///
/// 90 frames corresponds to roughly three seconds of video at 30fps, which
/// covers a single sign utterance for most signers.
pub const MAX_WINDOW_FRAMES: usize = 90;

/// Minimum number of feature records before a window is considered usable.
///
/// Below this a window carries too little temporal context for the
/// recognition model to produce anything meaningful.
pub const MIN_WINDOW_FRAMES: usize = 5;

/// Consecutive no-signal frames that mark the end of an utterance.
///
/// 10 frames is about a third of a second at 30fps — long enough to span
/// transition blur between signs, short enough for responsive turnaround.
pub const TRAILING_SILENCE_FRAMES: u32 = 10;

/// Maximum temporal span of a sequence window in milliseconds.
pub const MAX_WINDOW_SPAN_MS: u64 = 6_000;

/// Default sign language tag.
pub const DEFAULT_SIGN_LANGUAGE: &str = "asl";

/// Default spoken/written language tag.
pub const DEFAULT_TEXT_LANGUAGE: &str = "en";

/// Default bound for session event channels.
pub const EVENT_BUFFER: usize = 32;

/// Facial landmark indices retained per frame.
///
/// The full face mesh is far too large to carry per frame; sign language
/// reads from the mouth, eyebrow, and jaw region, so extraction keeps only
/// this fixed subset of mesh indices.
pub const FACE_LANDMARK_INDICES: [usize; 46] = [
    0, 17, 18, 200, 199, 175, 176, 148, 149, 150, 136, 172, 58, 132, 93, 234, 127, 162, 21, 54,
    103, 67, 109, 10, 151, 9, 8, 168, 6, 197, 195, 196, 3, 51, 48, 115, 131, 134, 102, 49, 220,
    305, 292, 308, 324, 318,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_subset_is_bounded() {
        assert_eq!(FACE_LANDMARK_INDICES.len(), 46);
    }

    #[test]
    fn face_subset_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for idx in FACE_LANDMARK_INDICES {
            assert!(seen.insert(idx), "duplicate face landmark index: {}", idx);
        }
    }

    #[test]
    fn window_limits_are_consistent() {
        assert!(MIN_WINDOW_FRAMES >= 1);
        assert!(MIN_WINDOW_FRAMES < MAX_WINDOW_FRAMES);
    }
}
