//! Test utilities for building synthetic raw logs
//!
//! Logs are assembled in memory so tests and benchmarks never depend on
//! capture files being present on disk.

#![cfg(any(test, feature = "benchmark"))]

use crate::types::Resolution;

/// One record as it will be written to the log.
#[derive(Debug, Clone)]
struct RecordSpec {
    timestamp: i64,
    depth: Vec<u8>,
    color: Vec<u8>,
}

/// Builds the bytes of a raw log record by record.
///
/// The frame-count header defaults to the number of records added; use
/// [`declared_frames`](Self::declared_frames) to write a mismatching count.
#[derive(Debug, Clone, Default)]
pub struct LogBuilder {
    declared: Option<i32>,
    records: Vec<RecordSpec>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record with the given raw payloads (an empty color payload is written as size 0).
    pub fn frame(mut self, timestamp: i64, depth: impl Into<Vec<u8>>, color: impl Into<Vec<u8>>) -> Self {
        self.records.push(RecordSpec { timestamp, depth: depth.into(), color: color.into() });
        self
    }

    /// Override the frame count written to the header.
    pub fn declared_frames(mut self, count: i32) -> Self {
        self.declared = Some(count);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn build(&self) -> Vec<u8> {
        let declared = self.declared.unwrap_or(self.records.len() as i32);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&declared.to_le_bytes());

        for record in &self.records {
            bytes.extend_from_slice(&record.timestamp.to_le_bytes());
            bytes.extend_from_slice(&(record.depth.len() as i32).to_le_bytes());
            bytes.extend_from_slice(&(record.color.len() as i32).to_le_bytes());
            bytes.extend_from_slice(&record.depth);
            bytes.extend_from_slice(&record.color);
        }
        bytes
    }
}

/// Canonically sized depth and color payloads unique to `seed`.
pub fn patterned_payloads(resolution: Resolution, seed: usize) -> (Vec<u8>, Vec<u8>) {
    let depth = (0..resolution.depth_bytes()).map(|i| (i * 7 + seed * 31) as u8).collect();
    let color = (0..resolution.color_bytes()).map(|i| (i * 13 + seed * 17 + 1) as u8).collect();
    (depth, color)
}

/// A log of `frames` raw records with timestamps 1000, 1033, 1066, ...
pub fn patterned_log(resolution: Resolution, frames: usize) -> LogBuilder {
    (0..frames).fold(LogBuilder::new(), |builder, seed| {
        let (depth, color) = patterned_payloads(resolution, seed);
        builder.frame(1000 + seed as i64 * 33, depth, color)
    })
}

/// zlib-compress a payload the way the capture tool does for depth.
#[cfg(feature = "zlib")]
pub fn zlib_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::{Compression, write::ZlibEncoder};
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_writes_header_and_records() {
        let bytes = LogBuilder::new().frame(100, vec![0xAA; 4], Vec::new()).build();
        assert_eq!(&bytes[0..4], &1i32.to_le_bytes());
        assert_eq!(&bytes[4..12], &100i64.to_le_bytes());
        assert_eq!(&bytes[12..16], &4i32.to_le_bytes());
        assert_eq!(&bytes[16..20], &0i32.to_le_bytes());
        assert_eq!(&bytes[20..], &[0xAA; 4]);
    }

    #[test]
    fn declared_count_overrides_header() {
        let bytes = LogBuilder::new().declared_frames(9).build();
        assert_eq!(bytes, 9i32.to_le_bytes().to_vec());
    }

    #[test]
    fn patterned_frames_differ() {
        let res = Resolution::new(4, 2);
        let (d0, c0) = patterned_payloads(res, 0);
        let (d1, c1) = patterned_payloads(res, 1);
        assert_eq!(d0.len(), res.depth_bytes());
        assert_eq!(c0.len(), res.color_bytes());
        assert_ne!(d0, d1);
        assert_ne!(c0, c1);
        assert_eq!(patterned_log(res, 3).len(), 3);
    }
}
