//! Core types for decoded RGB-D frames.
//!
//! - [`Resolution`] is the canonical pixel grid every decoded buffer conforms to
//! - [`DecodedFrame`] holds one frame's timestamp, depth samples and color bytes
//! - [`ColorPolicy`] selects the channel order applied after decoding
//!
//! ```rust
//! use rawlog::types::{ColorPolicy, Resolution, swap_red_blue};
//!
//! let res = Resolution::new(8, 4);
//! assert_eq!(res.depth_bytes(), 64);
//!
//! let mut bgr = vec![10, 20, 30];
//! swap_red_blue(&mut bgr);
//! assert_eq!(bgr, vec![30, 20, 10]);
//! assert_eq!(ColorPolicy::default(), ColorPolicy::Preserve);
//! ```

mod color;
mod frame;
mod resolution;

pub use color::{ColorPolicy, swap_red_blue};
pub use frame::{DecodedFrame, PayloadEncoding};
pub use resolution::{COLOR_BYTES_PER_PIXEL, DEPTH_BYTES_PER_PIXEL, Resolution};
