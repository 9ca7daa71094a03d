//! Raw RGB-D log format structures and parsing
//!
//! ## File Structure
//!
//! 1. **Header** (4 bytes) - `i32` number of frame records
//! 2. **Frame Records** - repeated once per frame:
//!    - `i64` timestamp
//!    - `i32` depth payload size
//!    - `i32` color payload size
//!    - depth payload bytes
//!    - color payload bytes (omitted when the size is 0)
//!
//! All integers are little-endian.

use crate::error::RecordField;
use crate::{LogError, Result};
use std::io::{ErrorKind, Read};
use tracing::trace;

pub const LOG_HEADER_SIZE: usize = 4;
pub const RECORD_HEADER_SIZE: usize = 16;

const TIMESTAMP_END: usize = 8;
const DEPTH_SIZE_END: usize = 12;

/// File header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    pub total_frames: usize,
}

impl LogHeader {
    pub fn parse_from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header_data = [0u8; LOG_HEADER_SIZE];
        let read = read_up_to(reader, &mut header_data)?;
        if read < LOG_HEADER_SIZE {
            return Err(LogError::format(
                "Log header reading",
                format!("Expected {} header bytes, found {}", LOG_HEADER_SIZE, read),
            ));
        }

        let declared = parse_i32_le(&header_data, 0)?;
        let total_frames = usize::try_from(declared).map_err(|_| {
            LogError::format("Log header validation", format!("Negative frame count {}", declared))
        })?;

        trace!("Parsed log header: total_frames={}", total_frames);
        Ok(Self { total_frames })
    }
}

/// Fixed-width fields at the start of each frame record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub timestamp: i64,
    pub depth_size: i32,
    pub color_size: i32,
}

impl RecordHeader {
    /// Read a record header for frame `frame` starting at stream offset `offset`.
    pub fn parse_from_reader<R: Read>(reader: &mut R, frame: usize, offset: u64) -> Result<Self> {
        let mut data = [0u8; RECORD_HEADER_SIZE];
        let read = read_up_to(reader, &mut data)?;
        if read < RECORD_HEADER_SIZE {
            let (field, start, end) = if read < TIMESTAMP_END {
                (RecordField::Timestamp, 0, TIMESTAMP_END)
            } else if read < DEPTH_SIZE_END {
                (RecordField::DepthSize, TIMESTAMP_END, DEPTH_SIZE_END)
            } else {
                (RecordField::ColorSize, DEPTH_SIZE_END, RECORD_HEADER_SIZE)
            };
            return Err(LogError::TruncatedRecord {
                field,
                frame,
                offset: offset + start as u64,
                expected: (end - start) as u64,
                available: (read - start) as u64,
            });
        }

        Ok(Self {
            timestamp: parse_i64_le(&data, 0)?,
            depth_size: parse_i32_le(&data, TIMESTAMP_END)?,
            color_size: parse_i32_le(&data, DEPTH_SIZE_END)?,
        })
    }

    /// Check declared payload sizes and convert them to byte counts.
    pub fn payload_sizes(&self, frame: usize, max_payload: usize) -> Result<(usize, usize)> {
        let depth = checked_size(self.depth_size, RecordField::DepthSize, frame, max_payload)?;
        let color = checked_size(self.color_size, RecordField::ColorSize, frame, max_payload)?;
        Ok((depth, color))
    }
}

fn checked_size(declared: i32, field: RecordField, frame: usize, max_payload: usize) -> Result<usize> {
    let size = usize::try_from(declared).map_err(|_| {
        LogError::format(
            format!("Frame {} record validation", frame),
            format!("Declared {} {} is negative", field, declared),
        )
    })?;
    if size > max_payload {
        return Err(LogError::format(
            format!("Frame {} record validation", frame),
            format!("Declared {} {} exceeds the {} byte ceiling", field, size, max_payload),
        ));
    }
    Ok(size)
}

/// Lower bound on the byte length of a log declaring `total_frames` records.
///
/// Only record headers are counted since payload sizes are per-record.
pub fn min_log_length(total_frames: usize) -> u64 {
    (LOG_HEADER_SIZE as u64).saturating_add((total_frames as u64).saturating_mul(RECORD_HEADER_SIZE as u64))
}

/// Read until `buf` is full or the stream ends, returning the bytes read.
pub(crate) fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn parse_i32_le(data: &[u8], offset: usize) -> Result<i32> {
    let bytes = data.get(offset..offset + 4).ok_or_else(|| {
        LogError::format(
            "Integer parsing",
            format!("Insufficient data for i32 at offset {} (have {})", offset, data.len()),
        )
    })?;
    Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn parse_i64_le(data: &[u8], offset: usize) -> Result<i64> {
    let bytes = data.get(offset..offset + 8).ok_or_else(|| {
        LogError::format(
            "Long integer parsing",
            format!("Insufficient data for i64 at offset {} (have {})", offset, data.len()),
        )
    })?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(i64::from_le_bytes(raw))
}
