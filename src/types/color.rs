//! Color channel ordering

use serde::{Deserialize, Serialize};

/// Channel-order policy applied to every decoded color buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorPolicy {
    /// Keep bytes in the order they were captured
    #[default]
    Preserve,

    /// Swap the first and third byte of every pixel (BGR <-> RGB)
    SwapRedBlue,
}

impl ColorPolicy {
    /// Apply the policy to an interleaved 3-channel buffer in place.
    pub fn apply(self, color: &mut [u8]) {
        match self {
            ColorPolicy::Preserve => {}
            ColorPolicy::SwapRedBlue => swap_red_blue(color),
        }
    }
}

/// Swap byte 0 and byte 2 of every complete triple.
///
/// Trailing bytes that do not form a full pixel are left alone. Applying this
/// twice restores the input.
pub fn swap_red_blue(color: &mut [u8]) {
    for pixel in color.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn swap_is_an_involution(original in prop::collection::vec(any::<u8>(), 0..512)) {
            let mut buf = original.clone();
            swap_red_blue(&mut buf);
            swap_red_blue(&mut buf);
            prop_assert_eq!(buf, original);
        }

        #[test]
        fn swap_leaves_green_and_tail(original in prop::collection::vec(any::<u8>(), 0..512)) {
            let mut buf = original.clone();
            swap_red_blue(&mut buf);
            let full = original.len() / 3 * 3;
            for i in (0..full).step_by(3) {
                prop_assert_eq!(buf[i], original[i + 2]);
                prop_assert_eq!(buf[i + 1], original[i + 1]);
                prop_assert_eq!(buf[i + 2], original[i]);
            }
            prop_assert_eq!(&buf[full..], &original[full..]);
        }
    }

    #[test]
    fn preserve_is_a_no_op() {
        let mut buf = vec![1, 2, 3, 4, 5, 6];
        ColorPolicy::Preserve.apply(&mut buf);
        assert_eq!(buf, vec![1, 2, 3, 4, 5, 6]);

        ColorPolicy::SwapRedBlue.apply(&mut buf);
        assert_eq!(buf, vec![3, 2, 1, 6, 5, 4]);
    }
}
