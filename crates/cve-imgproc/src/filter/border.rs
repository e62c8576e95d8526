/// Border handling modes used to resolve kernel samples outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Mirror the image at the border without repeating the edge sample.
    ///
    /// Example: ...d c b | a b c d | c b a...
    ///
    /// Corresponds to OpenCV's `BORDER_REFLECT_101`.
    #[default]
    Reflect,

    /// Repeat the outermost row or column of pixels.
    ///
    /// Example: ...a a a | a b c d | d d d...
    Replicate,

    /// Treat every sample outside the image as zero.
    ///
    /// Example: ...0 0 0 | a b c d | 0 0 0...
    ZeroPad,

    /// Wrap the content from the opposite side of the image.
    ///
    /// Example: ...b c d | a b c d | a b c...
    Wrap,
}

impl BorderMode {
    #[inline]
    fn reflect101(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let period = 2 * (len as isize - 1);
        let i = i.rem_euclid(period);
        if i >= len as isize {
            (period - i) as usize
        } else {
            i as usize
        }
    }

    #[inline]
    fn wrap(i: isize, len: usize) -> usize {
        i.rem_euclid(len as isize) as usize
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the border mode.
    ///
    /// - `Reflect`: mirror excluding edge, `-1 -> 1` and `len -> len - 2`
    /// - `Replicate`: clamp to edge
    /// - `ZeroPad`: `None` when `i` is outside, the caller substitutes a zero sample
    /// - `Wrap`: circular wrap
    ///
    /// The mapping is defined for every `isize`, however far outside the image.
    ///
    /// # Arguments
    ///
    /// * `i` - The (possibly out-of-range) coordinate index.
    /// * `len` - The valid length of the dimension, must be greater than zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use cve_imgproc::filter::BorderMode;
    ///
    /// assert_eq!(BorderMode::Reflect.map_index(-1, 5), Some(1));
    /// assert_eq!(BorderMode::Reflect.map_index(5, 5), Some(3));
    /// assert_eq!(BorderMode::Replicate.map_index(-7, 5), Some(0));
    /// assert_eq!(BorderMode::ZeroPad.map_index(5, 5), None);
    /// assert_eq!(BorderMode::Wrap.map_index(-1, 5), Some(4));
    /// ```
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        debug_assert!(len > 0, "border mapping needs a non-empty dimension");
        match self {
            BorderMode::Reflect => Some(Self::reflect101(i, len)),
            BorderMode::Replicate => Some(i.clamp(0, len as isize - 1) as usize),
            BorderMode::ZeroPad => (i >= 0 && i < len as isize).then_some(i as usize),
            BorderMode::Wrap => Some(Self::wrap(i, len)),
        }
    }
}
