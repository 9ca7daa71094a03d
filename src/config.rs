//! Reader configuration
//!
//! ```rust
//! use rawlog::{ColorPolicy, ReaderConfig, Resolution};
//!
//! let config = ReaderConfig::new(Resolution::QVGA)
//!     .with_color_policy(ColorPolicy::SwapRedBlue)
//!     .with_max_payload_bytes(16 * 1024 * 1024);
//! assert_eq!(config.resolution.pixel_count(), 76_800);
//! ```

use std::sync::Arc;

use crate::codec::PayloadCodec;
use crate::types::{ColorPolicy, Resolution};

/// Default ceiling for a single declared payload (256 MiB)
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Settings fixed for the lifetime of a reader.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Canonical resolution of decoded buffers
    pub resolution: Resolution,

    /// Channel order applied to decoded color
    pub color_policy: ColorPolicy,

    /// Codec for depth payloads that are not canonically sized
    pub depth_codec: Option<Arc<dyn PayloadCodec>>,

    /// Codec for color payloads that are not canonically sized
    pub color_codec: Option<Arc<dyn PayloadCodec>>,

    /// Declared payload sizes above this are rejected as malformed
    pub max_payload_bytes: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new(Resolution::default())
    }
}

impl ReaderConfig {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            color_policy: ColorPolicy::Preserve,
            depth_codec: None,
            color_codec: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn with_color_policy(mut self, policy: ColorPolicy) -> Self {
        self.color_policy = policy;
        self
    }

    /// Shorthand for `with_color_policy(ColorPolicy::SwapRedBlue)` when `flip` is set.
    pub fn with_flipped_colors(self, flip: bool) -> Self {
        let policy = if flip { ColorPolicy::SwapRedBlue } else { ColorPolicy::Preserve };
        self.with_color_policy(policy)
    }

    pub fn with_depth_codec(mut self, codec: impl PayloadCodec + 'static) -> Self {
        self.depth_codec = Some(Arc::new(codec));
        self
    }

    pub fn with_color_codec(mut self, codec: impl PayloadCodec + 'static) -> Self {
        self.color_codec = Some(Arc::new(codec));
        self
    }

    /// Decompress non-canonical depth payloads as zlib.
    #[cfg(feature = "zlib")]
    pub fn with_zlib_depth(self) -> Self {
        self.with_depth_codec(crate::codec::ZlibCodec)
    }

    pub fn with_max_payload_bytes(mut self, max: usize) -> Self {
        self.max_payload_bytes = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.resolution, Resolution::VGA);
        assert_eq!(config.color_policy, ColorPolicy::Preserve);
        assert!(config.depth_codec.is_none());
        assert!(config.color_codec.is_none());
        assert_eq!(config.max_payload_bytes, DEFAULT_MAX_PAYLOAD_BYTES);
    }

    #[test]
    fn flipped_colors_selects_swap() {
        let config = ReaderConfig::default().with_flipped_colors(true);
        assert_eq!(config.color_policy, ColorPolicy::SwapRedBlue);
        let config = config.with_flipped_colors(false);
        assert_eq!(config.color_policy, ColorPolicy::Preserve);
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn zlib_depth_installs_codec() {
        let config = ReaderConfig::default().with_zlib_depth();
        assert!(config.depth_codec.is_some());
        assert!(config.color_codec.is_none());
    }
}
