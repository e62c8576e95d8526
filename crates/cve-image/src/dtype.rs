use std::fmt::Debug;

/// Trait for the numeric sample types an [`crate::Image`] can hold.
///
/// Every filter reads samples through [`ImageDtype::as_f64`] and writes them
/// back through [`ImageDtype::from_f64`], which makes `from_f64` the one cast
/// rule applied at every type boundary of the crate family.
///
/// The cast mirrors a plain C assignment rather than a saturating conversion:
///
/// - floating point targets receive the value as is (rounded to the target precision),
/// - integer targets truncate toward zero and then wrap modulo `2^bits`,
/// - `NaN` becomes `0` for integer targets.
///
/// # Examples
///
/// ```
/// use cve_image::ImageDtype;
///
/// assert_eq!(u8::from_f64(300.7), 44);
/// assert_eq!(u8::from_f64(-1.0), 255);
/// assert_eq!(i16::from_f64(-2.9), -2);
/// assert_eq!(f32::from_f64(0.5), 0.5f32);
/// ```
pub trait ImageDtype:
    Copy + Default + Debug + PartialEq + Send + Sync + num_traits::Zero + 'static
{
    /// Widen the sample into a `f64`.
    fn as_f64(self) -> f64;

    /// Truncating, non-saturating cast from a `f64`.
    fn from_f64(x: f64) -> Self;
}

macro_rules! impl_image_dtype_float {
    ($($t:ty),*) => {
        $(
            impl ImageDtype for $t {
                #[inline]
                fn as_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(x: f64) -> Self {
                    x as $t
                }
            }
        )*
    };
}

macro_rules! impl_image_dtype_int {
    ($($t:ty),*) => {
        $(
            impl ImageDtype for $t {
                #[inline]
                fn as_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(x: f64) -> Self {
                    // f64 -> i64 truncates toward zero, i64 -> narrow wraps
                    (x as i64) as $t
                }
            }
        )*
    };
}

impl_image_dtype_float!(f32, f64);
impl_image_dtype_int!(u8, i8, u16, i16, u32, i32);

/// Cast a single sample from one image type to another through [`ImageDtype::from_f64`].
#[inline]
pub fn cast_sample<T: ImageDtype, U: ImageDtype>(x: T) -> U {
    U::from_f64(x.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_to_u8_wraps() {
        assert_eq!(u8::from_f64(255.0), 255);
        assert_eq!(u8::from_f64(256.0), 0);
        assert_eq!(u8::from_f64(257.9), 1);
        assert_eq!(u8::from_f64(-2.0), 254);
        assert_eq!(u8::from_f64(f64::NAN), 0);
    }

    #[test]
    fn cast_to_signed_truncates_toward_zero() {
        assert_eq!(i32::from_f64(-3.99), -3);
        assert_eq!(i32::from_f64(3.99), 3);
        assert_eq!(i8::from_f64(128.0), -128);
    }

    #[test]
    fn cast_between_types() {
        assert_eq!(cast_sample::<u8, f32>(200), 200.0);
        assert_eq!(cast_sample::<f32, u8>(12.75), 12);
        assert_eq!(cast_sample::<i16, u8>(-1), 255);
        assert_eq!(cast_sample::<f64, f32>(0.25), 0.25);
    }
}
