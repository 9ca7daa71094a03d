//! Decoded frame buffers

use std::collections::TryReserveError;

use super::Resolution;

/// How a payload was turned into its canonical buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadEncoding {
    /// Payload matched the canonical size and was copied directly
    #[default]
    Raw,

    /// Payload was decompressed through the configured codec
    Compressed,

    /// No payload was stored; the buffer holds the neutral value (zero)
    Absent,
}

/// The most recently decoded depth and color capture.
///
/// Buffers are sized once from the reader's [`Resolution`] and overwritten on
/// every decode, so `depth.len()` and `color.len()` never change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedFrame {
    /// Capture timestamp as stored in the record
    pub timestamp: i64,

    /// 0-based position of the record in the log
    pub index: usize,

    /// Depth samples, one per pixel
    pub depth: Vec<u16>,

    /// Interleaved 3-channel color, three bytes per pixel
    pub color: Vec<u8>,

    pub depth_encoding: PayloadEncoding,
    pub color_encoding: PayloadEncoding,
}

impl DecodedFrame {
    /// Allocate zeroed canonical buffers for `resolution`.
    pub(crate) fn try_with_resolution(resolution: Resolution) -> Result<Self, TryReserveError> {
        let mut depth = Vec::new();
        depth.try_reserve_exact(resolution.pixel_count())?;
        depth.resize(resolution.pixel_count(), 0);

        let mut color = Vec::new();
        color.try_reserve_exact(resolution.color_bytes())?;
        color.resize(resolution.color_bytes(), 0);

        Ok(Self {
            timestamp: 0,
            index: 0,
            depth,
            color,
            depth_encoding: PayloadEncoding::Raw,
            color_encoding: PayloadEncoding::Absent,
        })
    }

    /// Number of pixels in each buffer.
    pub fn pixel_count(&self) -> usize {
        self.depth.len()
    }

    /// Depth sample at `(x, y)` for a frame `width` pixels wide.
    pub fn depth_at(&self, x: usize, y: usize, width: usize) -> Option<u16> {
        if x >= width {
            return None;
        }
        self.depth.get(y * width + x).copied()
    }

    /// Color triple at `(x, y)` for a frame `width` pixels wide.
    pub fn color_at(&self, x: usize, y: usize, width: usize) -> Option<[u8; 3]> {
        if x >= width {
            return None;
        }
        let start = (y * width + x) * 3;
        let pixel = self.color.get(start..start + 3)?;
        Some([pixel[0], pixel[1], pixel[2]])
    }

    /// Copy little-endian depth bytes into the sample buffer.
    pub(crate) fn fill_depth_le(&mut self, bytes: &[u8]) {
        for (sample, pair) in self.depth.iter_mut().zip(bytes.chunks_exact(2)) {
            *sample = u16::from_le_bytes([pair[0], pair[1]]);
        }
    }
}
