//! Frame sampling.
//!
//! Only every `stride`-th frame of a recording is inspected. The sequence is
//! lazy and restartable, so a caller can both size a progress bar from
//! [`FrameIndices::len`] and iterate it.

use image::RgbImage;

/// Lazy sequence of frame indices `0, stride, 2*stride, ...` below `frame_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIndices {
    next: u64,
    stride: u64,
    frame_count: u64,
}

/// Builds the sampling sequence for a recording.
///
/// A zero stride is treated as one so the sequence always terminates;
/// configuration validation rejects zero before a run gets here.
pub fn frame_indices(frame_count: u64, stride: u64) -> FrameIndices {
    FrameIndices {
        next: 0,
        stride: stride.max(1),
        frame_count,
    }
}

impl FrameIndices {
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Number of indices still to be yielded.
    pub fn len(&self) -> u64 {
        if self.next >= self.frame_count {
            0
        } else {
            (self.frame_count - self.next).div_ceil(self.stride)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for FrameIndices {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.frame_count {
            return None;
        }
        let index = self.next;
        self.next = self.next.saturating_add(self.stride);
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.len()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// A decoded frame at a sampled index.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub index: u64,
    /// Presentation time reported by the decoder.
    pub timestamp_secs: f64,
    pub image: RgbImage,
}

/// Outcome of reading one sampled index.
#[derive(Debug, Clone)]
pub enum FrameRead {
    Decoded(SampledFrame),
    /// The frame could not be produced; callers skip it.
    Failed { index: u64 },
}

impl FrameRead {
    pub fn index(&self) -> u64 {
        match self {
            FrameRead::Decoded(frame) => frame.index,
            FrameRead::Failed { index } => *index,
        }
    }
}

/// Returned by a frame handler to keep decoding or stop early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeControl {
    Continue,
    Stop,
}
