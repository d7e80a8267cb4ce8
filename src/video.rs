//! Raw frame and clip types, plus the video-decoding collaborator trait.
//!
//! Decoding an uploaded clip into frames is owned by an external
//! collaborator; the pipeline only consumes the ordered frame sequence.

use crate::error::{Result, SignflowError};
use serde::{Deserialize, Serialize};

/// Pixel layout of a raw frame's byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit blue/green/red interleaved (common camera capture order).
    Bgr8,
    /// 8-bit red/green/blue interleaved (what the detectors consume).
    Rgb8,
}

/// One decoded video frame with its capture timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Interleaved pixel bytes, `width * height * 3` long.
    pub data: Vec<u8>,
    /// Capture timestamp in milliseconds, strictly increasing within a clip
    /// or stream.
    pub timestamp_ms: u64,
}

impl RawFrame {
    /// Creates a new raw frame.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>, timestamp_ms: u64) -> Self {
        Self {
            width,
            height,
            format,
            data,
            timestamp_ms,
        }
    }

    /// Returns the number of pixels in this frame.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns a copy of this frame in the RGB layout the detectors require.
    ///
    /// BGR input gets its first and third channels swapped per pixel; RGB
    /// input is returned as-is.
    pub fn to_rgb(&self) -> RawFrame {
        match self.format {
            PixelFormat::Rgb8 => self.clone(),
            PixelFormat::Bgr8 => {
                let mut data = self.data.clone();
                for px in data.chunks_exact_mut(3) {
                    px.swap(0, 2);
                }
                RawFrame {
                    width: self.width,
                    height: self.height,
                    format: PixelFormat::Rgb8,
                    data,
                    timestamp_ms: self.timestamp_ms,
                }
            }
        }
    }
}

/// An uploaded video clip, opaque to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoClip {
    data: Vec<u8>,
}

impl VideoClip {
    /// Wraps encoded clip bytes for handoff to the decoder.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Encoded clip bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Trait for video decoding.
///
/// This trait allows swapping implementations (real decoder vs mock).
pub trait VideoDecoder: Send + Sync {
    /// Decode a clip into its ordered frame sequence.
    ///
    /// Frames must come back in presentation order with strictly increasing
    /// timestamps.
    fn extract_frames(&self, clip: &VideoClip) -> Result<Vec<RawFrame>>;
}

/// Mock video decoder for testing.
#[derive(Debug, Clone, Default)]
pub struct MockVideoDecoder {
    frames: Vec<RawFrame>,
    should_fail: bool,
}

impl MockVideoDecoder {
    /// Create a mock decoder that yields no frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to return the given frames for any clip.
    pub fn with_frames(mut self, frames: Vec<RawFrame>) -> Self {
        self.frames = frames;
        self
    }

    /// Configure the mock to fail on extract_frames.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl VideoDecoder for MockVideoDecoder {
    fn extract_frames(&self, _clip: &VideoClip) -> Result<Vec<RawFrame>> {
        if self.should_fail {
            Err(SignflowError::Decode {
                message: "mock decode failure".to_string(),
            })
        } else {
            Ok(self.frames.clone())
        }
    }
}
