//! Error types for raw log reading.
//!
//! Every failure the reader can hit is surfaced as a [`LogError`]; nothing is
//! retried or swallowed internally. Errors carry the record offset, frame index
//! and declared sizes involved so a broken capture can be diagnosed without a
//! hex editor.
//!
//! ## Error Categories
//!
//! - **Io**: opening, reopening or seeking the underlying stream failed
//! - **Format**: header or payload sizes are inconsistent with the configuration
//! - **TruncatedRecord**: the stream ended before a declared field or payload
//! - **Allocation**: a payload buffer could not be reserved
//! - **State**: the operation is invalid for the reader's current state
//! - **NoMoreFrames**: a forward read was attempted past the last frame
//!
//! ```rust
//! use rawlog::LogError;
//!
//! let error = LogError::state("no prior frame to return to");
//! assert!(error.is_recoverable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::collections::TryReserveError;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::codec::CodecError;

const UNKNOWN_PATH: &str = "<unknown>";

/// Result type alias for raw log operations.
pub type Result<T, E = LogError> = std::result::Result<T, E>;

/// Field of a frame record, used to name the offending part of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Timestamp,
    DepthSize,
    ColorSize,
    DepthPayload,
    ColorPayload,
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordField::Timestamp => "timestamp",
            RecordField::DepthSize => "depth size",
            RecordField::ColorSize => "color size",
            RecordField::DepthPayload => "depth payload",
            RecordField::ColorPayload => "color payload",
        };
        f.write_str(name)
    }
}

/// Main error type for raw log operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LogError {
    #[error("Raw log I/O error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Format error in {context}: {details}")]
    Format { context: String, details: String },

    #[error(
        "Truncated {field} in frame {frame} at offset {offset:#x}: expected {expected} bytes, found {available}"
    )]
    TruncatedRecord {
        field: RecordField,
        frame: usize,
        offset: u64,
        expected: u64,
        available: u64,
    },

    #[error("Failed to allocate {requested} bytes for {field} of frame {frame}")]
    Allocation {
        field: RecordField,
        frame: usize,
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Invalid reader state: {reason}")]
    State { reason: String },

    #[error("No more frames: all {total} frames have been read")]
    NoMoreFrames { total: usize },

    #[error("Codec failed on {field} of frame {frame}")]
    Codec {
        field: RecordField,
        frame: usize,
        #[source]
        source: CodecError,
    },
}

impl LogError {
    /// Returns whether the reader can keep being used after this error without reopening.
    ///
    /// State and end-of-log errors leave the stream untouched; everything else
    /// leaves the reader faulted until it is rewound.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LogError::State { .. } => true,
            LogError::NoMoreFrames { .. } => true,
            LogError::Io { .. } => false,
            LogError::Format { .. } => false,
            LogError::TruncatedRecord { .. } => false,
            LogError::Allocation { .. } => false,
            LogError::Codec { .. } => false,
        }
    }

    /// Returns whether this error reports malformed log content.
    pub fn is_format_error(&self) -> bool {
        matches!(self, LogError::Format { .. } | LogError::Codec { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LogError::Io { .. } => vec![
                "Check the log file exists and is readable",
                "Check file permissions",
                "Verify the file was not moved while reading",
            ],
            LogError::Format { .. } => vec![
                "Verify the configured resolution matches the capture",
                "Configure a codec for compressed payloads",
                "Check the file is a raw RGB-D log",
            ],
            LogError::TruncatedRecord { .. } => vec![
                "The capture was likely interrupted while writing",
                "Rewind and stop before the damaged frame",
            ],
            LogError::Allocation { .. } => vec![
                "Lower the payload size ceiling in the reader configuration",
                "Check the declared payload sizes for corruption",
                "Free memory and retry",
            ],
            LogError::State { .. } => vec![
                "Check rewound() before stepping back",
                "Rewind the reader after a failed decode",
                "Do not use a reader after closing it",
            ],
            LogError::NoMoreFrames { .. } => {
                vec!["Check has_more() before reading", "Rewind to replay the log"]
            }
            LogError::Codec { .. } => vec![
                "Check the configured codec matches the capture's compression",
                "Verify the configured resolution matches the capture",
            ],
        }
    }

    /// Helper constructor for I/O errors with path context.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        LogError::Io { path, source }
    }

    /// Helper constructor for format errors.
    pub fn format(context: impl Into<String>, details: impl Into<String>) -> Self {
        LogError::Format { context: context.into(), details: details.into() }
    }

    /// Helper constructor for state errors.
    pub fn state(reason: impl Into<String>) -> Self {
        LogError::State { reason: reason.into() }
    }

    /// Attach a log path to I/O errors converted without one.
    pub(crate) fn with_path(self, path: &Path) -> Self {
        match self {
            LogError::Io { path: unknown, source } if unknown == Path::new(UNKNOWN_PATH) => {
                LogError::Io { path: path.to_path_buf(), source }
            }
            other => other,
        }
    }
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::Io { path: PathBuf::from(UNKNOWN_PATH), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn truncation_messages_name_field_and_offset(
            frame in 0usize..100_000,
            offset in 0u64..0x1_0000_0000u64,
            expected in 1u64..10_000_000,
            available in 0u64..10_000_000,
        ) {
            let err = LogError::TruncatedRecord {
                field: RecordField::DepthPayload,
                frame,
                offset,
                expected,
                available,
            };
            let msg = err.to_string();
            let hex_offset = format!("{:#x}", offset);
            prop_assert!(msg.contains("depth payload"));
            prop_assert!(msg.contains(&hex_offset));
            prop_assert!(msg.contains(&expected.to_string()));
            prop_assert!(msg.contains(&frame.to_string()));
        }

        #[test]
        fn format_messages_keep_context(context in "[a-z ]{1,20}", details in ".*") {
            let msg = LogError::format(context.clone(), details.clone()).to_string();
            prop_assert!(msg.contains(&context));
            prop_assert!(msg.contains(&details));
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<LogError>();

        let error = LogError::state("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_classification() {
        assert!(LogError::state("closed").is_recoverable());
        assert!(LogError::NoMoreFrames { total: 3 }.is_recoverable());
        assert!(!LogError::format("header", "short").is_recoverable());

        let truncated = LogError::TruncatedRecord {
            field: RecordField::Timestamp,
            frame: 0,
            offset: 4,
            expected: 8,
            available: 2,
        };
        assert!(!truncated.is_recoverable());

        for suggestion in truncated.recovery_suggestions() {
            assert!(suggestion.len() > 5);
        }
    }

    #[test]
    fn io_conversion_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing log");
        match LogError::from(io_err) {
            LogError::Io { source, .. } => assert_eq!(source.to_string(), "missing log"),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn with_path_fills_unknown_paths_only() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        match LogError::from(io_err).with_path(Path::new("capture.klg")) {
            LogError::Io { path, .. } => assert_eq!(path, PathBuf::from("capture.klg")),
            other => panic!("Expected Io error, got {:?}", other),
        }

        let named = LogError::io_error(
            PathBuf::from("a.klg"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        match named.with_path(Path::new("b.klg")) {
            LogError::Io { path, .. } => assert_eq!(path, PathBuf::from("a.klg")),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn codec_errors_chain_their_source() {
        let err = LogError::Codec {
            field: RecordField::ColorPayload,
            frame: 7,
            source: CodecError::Corrupt("bad header".to_string()),
        };
        assert!(err.is_format_error());
        let source = std::error::Error::source(&err).expect("codec source");
        assert!(source.to_string().contains("bad header"));
    }
}
