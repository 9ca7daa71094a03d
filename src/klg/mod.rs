//! KLG raw RGB-D log reading
//!
//! This module reads the flat depth + color log format: a frame-count header
//! followed by variable-length timestamped records.

pub mod format;
pub mod navigation;
pub mod reader;

pub use navigation::NavigationStack;
pub use reader::RawLogReader;
