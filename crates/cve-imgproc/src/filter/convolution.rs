use cve_image::{Image, ImageDtype, ImageError};

use super::{BorderMode, Kernel, KernelScalar};
use crate::parallel::{self, ExecutionStrategy};

fn check_filter_sizes<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &Image<U, C>,
) -> Result<(), ImageError>
where
    T: ImageDtype,
    U: ImageDtype,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if src.cols() == 0 || src.rows() == 0 {
        return Err(ImageError::EmptyImage(src.cols(), src.rows()));
    }

    Ok(())
}

/// Convolve an image with a kernel with execution strategy control.
///
/// Each output sample is `sum_k kernel[k] * src[border(p + offset_k)]`, evaluated
/// independently per channel. The sum is accumulated in the kernel scalar `K`
/// and written with [`ImageDtype::from_f64`], i.e. truncated and wrapped for
/// integer destinations, never clamped.
///
/// `1 x N` and `N x 1` kernels cost `O(N)` per output sample.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
/// * `border` - How samples outside the image are resolved.
/// * `strategy` - Execution strategy: `Serial`, `Parallel`, or `Auto`.
///
/// # Errors
///
/// Returns an error if `src` and `dst` differ in size or have no pixels.
pub fn filter2d_with_strategy<T, U, K, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    kernel: &Kernel<K>,
    border: BorderMode,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError>
where
    T: ImageDtype,
    U: ImageDtype,
    K: KernelScalar,
{
    check_filter_sizes(src, dst)?;

    let rows = src.rows();
    let cols = src.cols();
    let taps = kernel.taps();
    let src_data = src.as_slice();

    parallel::for_each_row(dst.as_slice_mut(), cols * C, strategy, |r, dst_row| {
        for c in 0..cols {
            let mut acc = [K::zero(); C];
            for &(dr, dc, k) in taps.iter() {
                let (Some(sr), Some(sc)) = (
                    border.map_index(r as isize + dr, rows),
                    border.map_index(c as isize + dc, cols),
                ) else {
                    continue;
                };
                let idx = (sr * cols + sc) * C;
                for (ch, acc_val) in acc.iter_mut().enumerate() {
                    *acc_val = *acc_val + k * K::from_f64(src_data[idx + ch].as_f64());
                }
            }

            let out_idx = c * C;
            for (ch, &acc_val) in acc.iter().enumerate() {
                dst_row[out_idx + ch] = U::from_f64(acc_val.as_f64());
            }
        }
    });

    Ok(())
}

/// Convolve an image with a kernel on the current thread.
///
/// See [`filter2d_with_strategy`] for the definition of the output.
///
/// # Example
///
/// ```
/// use cve_image::Image;
/// use cve_imgproc::filter::{filter2d, BorderMode, Kernel};
///
/// let src = Image::<u8, 1>::new([4, 1].into(), vec![1, 2, 4, 8]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
/// let kernel = Kernel::row(&[-1.0f32, 0.0, 1.0]).unwrap();
///
/// filter2d(&src, &mut dst, &kernel, BorderMode::Replicate).unwrap();
///
/// assert_eq!(dst.as_slice(), &[1.0, 3.0, 6.0, 4.0]);
/// ```
pub fn filter2d<T, U, K, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    kernel: &Kernel<K>,
    border: BorderMode,
) -> Result<(), ImageError>
where
    T: ImageDtype,
    U: ImageDtype,
    K: KernelScalar,
{
    filter2d_with_strategy(src, dst, kernel, border, ExecutionStrategy::Serial)
}

/// Apply a separable filter: a horizontal pass with `kernel_x` followed by a
/// vertical pass with `kernel_y`.
///
/// The intermediate result is kept in the kernel scalar type, only the final
/// pass is cast into `U`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
/// * `border` - How samples outside the image are resolved.
pub fn separable_filter<T, U, K, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    kernel_x: &[K],
    kernel_y: &[K],
    border: BorderMode,
) -> Result<(), ImageError>
where
    T: ImageDtype,
    U: ImageDtype,
    K: KernelScalar,
{
    check_filter_sizes(src, dst)?;

    let kernel_x = Kernel::row(kernel_x)?;
    let kernel_y = Kernel::column(kernel_y)?;

    let mut temp = Image::<K, C>::from_size_val(src.size(), K::zero())?;
    filter2d(src, &mut temp, &kernel_x, border)?;
    filter2d(&temp, dst, &kernel_y, border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cve_image::ImageSize;

    fn impulse_5x5() -> Result<Image<f32, 1>, ImageError> {
        let mut img = Image::<f32, 1>::from_size_val([5, 5].into(), 0.0)?;
        img.set_pixel(2, 2, 0, 1.0)?;
        Ok(img)
    }

    #[test]
    fn test_filter2d_row_kernel() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::new([5, 1].into(), vec![0.0, 1.0, 4.0, 9.0, 16.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        let kernel = Kernel::row(&[-1.0f32, 0.0, 1.0])?;

        filter2d(&img, &mut dst, &kernel, BorderMode::Reflect)?;
        // reflect: [1] 0 1 4 9 16 [9]
        assert_eq!(dst.as_slice(), &[0.0, 4.0, 8.0, 12.0, 0.0]);

        filter2d(&img, &mut dst, &kernel, BorderMode::Replicate)?;
        assert_eq!(dst.as_slice(), &[1.0, 4.0, 8.0, 12.0, 7.0]);

        filter2d(&img, &mut dst, &kernel, BorderMode::ZeroPad)?;
        assert_eq!(dst.as_slice(), &[1.0, 4.0, 8.0, 12.0, -9.0]);

        filter2d(&img, &mut dst, &kernel, BorderMode::Wrap)?;
        assert_eq!(dst.as_slice(), &[-15.0, 4.0, 8.0, 12.0, -9.0]);

        Ok(())
    }

    #[test]
    fn test_filter2d_column_kernel() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::new([1, 4].into(), vec![1.0, 2.0, 3.0, 4.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        let kernel = Kernel::column(&[1.0f32, 1.0, 1.0])?;

        filter2d(&img, &mut dst, &kernel, BorderMode::ZeroPad)?;
        assert_eq!(dst.as_slice(), &[3.0, 6.0, 9.0, 7.0]);

        Ok(())
    }

    #[test]
    fn test_filter2d_channels_independent() -> Result<(), ImageError> {
        let img = Image::<f32, 2>::new([3, 1].into(), vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0])?;
        let mut dst = Image::<f32, 2>::from_size_val(img.size(), 0.0)?;
        let kernel = Kernel::row(&[1.0f32, 1.0, 1.0])?;

        filter2d(&img, &mut dst, &kernel, BorderMode::ZeroPad)?;
        assert_eq!(dst.as_slice(), &[3.0, 30.0, 6.0, 60.0, 5.0, 50.0]);

        Ok(())
    }

    #[test]
    fn test_filter2d_cast_wraps() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::new([3, 1].into(), vec![200, 200, 200])?;
        let mut dst = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        let kernel = Kernel::row(&[1.0f32, 1.0, 1.0])?;

        // 600 wraps to 88, 400 wraps to 144: no saturation on store
        filter2d(&img, &mut dst, &kernel, BorderMode::ZeroPad)?;
        assert_eq!(dst.as_slice(), &[144, 88, 144]);

        let kernel = Kernel::row(&[0.0f32, -1.0, 0.0])?;
        filter2d(&img, &mut dst, &kernel, BorderMode::ZeroPad)?;
        assert_eq!(dst.as_slice(), &[56, 56, 56]);

        Ok(())
    }

    #[test]
    fn test_filter2d_size_mismatch() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::from_size_val([3, 3].into(), 0.0)?;
        let mut dst = Image::<f32, 1>::from_size_val([3, 4].into(), 0.0)?;
        let kernel = Kernel::row(&[1.0f32])?;
        assert_eq!(
            filter2d(&img, &mut dst, &kernel, BorderMode::Reflect),
            Err(ImageError::InvalidImageSize(3, 3, 3, 4))
        );

        let empty = Image::<f32, 1>::from_size_val([0, 3].into(), 0.0)?;
        let mut empty_dst = empty.clone();
        assert_eq!(
            filter2d(&empty, &mut empty_dst, &kernel, BorderMode::Reflect),
            Err(ImageError::EmptyImage(0, 3))
        );
        Ok(())
    }

    #[test]
    fn test_separable_filter_f32() -> Result<(), ImageError> {
        let img = impulse_5x5()?;
        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        let kernel = [1.0f32, 1.0, 1.0];
        separable_filter(&img, &mut dst, &kernel, &kernel, BorderMode::ZeroPad)?;

        #[rustfmt::skip]
        assert_eq!(
            dst.as_slice(),
            &[
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
            ]
        );

        let xsum = dst.as_slice().iter().sum::<f32>();
        assert_eq!(xsum, 9.0);

        Ok(())
    }

    #[test]
    fn test_separable_matches_direct_2d() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 7,
            height: 6,
        };
        let img = Image::<f64, 3>::from_size_fn(size, |r, c, ch| {
            ((r * 31 + c * 17 + ch * 7) % 23) as f64 - 11.0
        })?;

        let smooth = [1.0f64, 2.0, 1.0];
        let diff = [-1.0f64, 0.0, 1.0];
        let direct_kernel = Kernel::outer(&smooth, &diff)?;

        for border in [
            BorderMode::Reflect,
            BorderMode::Replicate,
            BorderMode::ZeroPad,
            BorderMode::Wrap,
        ] {
            let mut separable = Image::<f64, 3>::from_size_val(size, 0.0)?;
            separable_filter(&img, &mut separable, &diff, &smooth, border)?;

            let mut direct = Image::<f64, 3>::from_size_val(size, 0.0)?;
            filter2d(&img, &mut direct, &direct_kernel, border)?;

            for (a, b) in separable.as_slice().iter().zip(direct.as_slice()) {
                assert_relative_eq!(a, b, epsilon = 1e-9);
            }
        }

        Ok(())
    }

    #[test]
    fn test_filter2d_with_strategy() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 33,
            height: 17,
        };
        let img = Image::<u8, 3>::from_size_fn(size, |r, c, ch| (r * 7 + c * 3 + ch) as u8)?;
        let kernel = Kernel::new(vec![0.5f32, -1.0, 0.25, 1.0, 2.0, -0.5], 2, 3)?;

        let mut dst_serial = Image::<f32, 3>::from_size_val(size, 0.0)?;
        filter2d_with_strategy(
            &img,
            &mut dst_serial,
            &kernel,
            BorderMode::Wrap,
            ExecutionStrategy::Serial,
        )?;

        let mut dst_parallel = Image::<f32, 3>::from_size_val(size, 0.0)?;
        filter2d_with_strategy(
            &img,
            &mut dst_parallel,
            &kernel,
            BorderMode::Wrap,
            ExecutionStrategy::Parallel,
        )?;

        assert_eq!(dst_serial, dst_parallel);

        Ok(())
    }
}
