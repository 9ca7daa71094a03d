//! Canonical frame resolution

use serde::{Deserialize, Serialize};

/// Bytes per depth sample (16-bit millimetre depth)
pub const DEPTH_BYTES_PER_PIXEL: usize = 2;

/// Bytes per color pixel (8-bit interleaved triple)
pub const COLOR_BYTES_PER_PIXEL: usize = 3;

/// Fixed pixel dimensions every decoded frame conforms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

impl Resolution {
    /// 640x480, the native mode of most structured-light RGB-D sensors.
    pub const VGA: Resolution = Resolution { width: 640, height: 480 };

    /// 320x240
    pub const QVGA: Resolution = Resolution { width: 320, height: 240 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in one frame (width x height).
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size in bytes of an uncompressed depth payload.
    pub const fn depth_bytes(&self) -> usize {
        self.pixel_count() * DEPTH_BYTES_PER_PIXEL
    }

    /// Size in bytes of an uncompressed color payload.
    pub const fn color_bytes(&self) -> usize {
        self.pixel_count() * COLOR_BYTES_PER_PIXEL
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count, or `None` if it does not fit in `usize`.
    pub const fn checked_pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Depth payload size, or `None` if it does not fit in `usize`.
    pub const fn checked_depth_bytes(&self) -> Option<usize> {
        match self.checked_pixel_count() {
            Some(pixels) => pixels.checked_mul(DEPTH_BYTES_PER_PIXEL),
            None => None,
        }
    }

    /// Color payload size, or `None` if it does not fit in `usize`.
    pub const fn checked_color_bytes(&self) -> Option<usize> {
        match self.checked_pixel_count() {
            Some(pixels) => pixels.checked_mul(COLOR_BYTES_PER_PIXEL),
            None => None,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_sizes_follow_pixel_count() {
        let res = Resolution::new(8, 4);
        assert_eq!(res.pixel_count(), 32);
        assert_eq!(res.depth_bytes(), 64);
        assert_eq!(res.color_bytes(), 96);
        assert_eq!(res.to_string(), "8x4");
    }

    #[test]
    fn default_is_vga() {
        assert_eq!(Resolution::default().pixel_count(), 307_200);
        assert!(Resolution::new(0, 480).is_empty());
    }

    #[test]
    fn checked_sizes_detect_overflow() {
        let res = Resolution::new(8, 4);
        assert_eq!(res.checked_depth_bytes(), Some(64));
        assert_eq!(res.checked_color_bytes(), Some(96));

        let huge = Resolution::new(u32::MAX, u32::MAX);
        assert!(!huge.is_empty());
        assert_eq!(huge.checked_color_bytes(), None);
    }

    #[test]
    fn loads_from_yaml_config() {
        let yaml = serde_yaml_ng::to_string(&Resolution::QVGA).unwrap();
        assert!(yaml.contains("width: 320"));
        assert!(yaml.contains("height: 240"));

        let parsed: Resolution = serde_yaml_ng::from_str("width: 8\nheight: 4\n").unwrap();
        assert_eq!(parsed.pixel_count(), 32);
    }
}
