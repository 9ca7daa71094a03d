//! Sequential reader for raw RGB-D capture logs.
//!
//! A raw log is a frame-count header followed by timestamped records, each
//! holding a depth payload and an optional color payload. [`RawLogReader`]
//! decodes records into fixed-resolution buffers and keeps a history of record
//! offsets so playback can step back, skip ahead or start over.
//!
//! # Features
//!
//! - **Navigation**: forward reads, one-step back, fast-forward, rewind
//! - **Canonical buffers**: every frame decodes to the configured resolution
//! - **Pluggable decompression**: payloads that are not raw go through a [`PayloadCodec`]
//! - **Typed failures**: truncated or malformed captures surface as [`LogError`], never a panic
//!
//! ## Example
//!
//! ```rust,no_run
//! use rawlog::{RawLogReader, ReaderConfig, Resolution};
//!
//! fn main() -> rawlog::Result<()> {
//!     let mut reader = RawLogReader::open("capture.klg", ReaderConfig::new(Resolution::VGA))?;
//!
//!     while reader.has_more() {
//!         let frame = reader.next_frame()?;
//!         println!("{}: {} depth samples", frame.timestamp, frame.depth.len());
//!     }
//!
//!     reader.back()?;
//!     reader.rewind()?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
mod error;
pub mod klg;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Core exports
pub use codec::{CodecError, PayloadCodec};
pub use config::ReaderConfig;
pub use error::*;
pub use types::{ColorPolicy, DecodedFrame, PayloadEncoding, Resolution};

pub use klg::RawLogReader;

#[cfg(feature = "zlib")]
pub use codec::ZlibCodec;
