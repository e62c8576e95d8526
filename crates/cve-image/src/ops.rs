use num_traits::Float;

use crate::{Image, ImageDtype, ImageError};

fn check_same_size<T1, T2, const C: usize>(
    a: &Image<T1, C>,
    b: &Image<T2, C>,
) -> Result<(), ImageError>
where
    T1: ImageDtype,
    T2: ImageDtype,
{
    if a.size() != b.size() {
        return Err(ImageError::InvalidImageSize(
            a.width(),
            a.height(),
            b.width(),
            b.height(),
        ));
    }
    Ok(())
}

/// Cast the pixel data of an image into a preallocated image of another type.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, same size as `src`.
///
/// Example:
///
/// ```
/// use cve_image::{Image, ImageSize};
/// use cve_image::ops::cast_into;
///
/// let image = Image::<f32, 1>::new([2, 1].into(), vec![3.7, -1.0]).unwrap();
/// let mut image_u8 = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// cast_into(&image, &mut image_u8).unwrap();
///
/// assert_eq!(image_u8.as_slice(), &[3, 255]);
/// ```
pub fn cast_into<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
) -> Result<(), ImageError>
where
    T: ImageDtype,
    U: ImageDtype,
{
    check_same_size(src, dst)?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(out, &inp)| *out = U::from_f64(inp.as_f64()));

    Ok(())
}

/// Compute the squared gradient magnitude `gx^2 + gy^2` elementwise.
pub fn magnitude_sq<T, const C: usize>(
    gx: &Image<T, C>,
    gy: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: ImageDtype + Float,
{
    check_same_size(gx, gy)?;
    check_same_size(gx, dst)?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(gx.as_slice().iter().zip(gy.as_slice()))
        .for_each(|(out, (&x, &y))| *out = x * x + y * y);

    Ok(())
}

/// Compute the gradient magnitude `sqrt(gx^2 + gy^2)` elementwise.
pub fn magnitude<T, const C: usize>(
    gx: &Image<T, C>,
    gy: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: ImageDtype + Float,
{
    magnitude_sq(gx, gy, dst)?;
    dst.as_slice_mut().iter_mut().for_each(|v| *v = v.sqrt());
    Ok(())
}

/// Multiply two images elementwise into `dst`.
pub fn mul<T, const C: usize>(
    a: &Image<T, C>,
    b: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: ImageDtype + Float,
{
    check_same_size(a, b)?;
    check_same_size(a, dst)?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(a.as_slice().iter().zip(b.as_slice()))
        .for_each(|(out, (&x, &y))| *out = x * y);

    Ok(())
}

/// Accumulate `dst += factor * src` elementwise.
pub fn scaled_add<T, const C: usize>(
    dst: &mut Image<T, C>,
    src: &Image<T, C>,
    factor: T,
) -> Result<(), ImageError>
where
    T: ImageDtype + Float,
{
    check_same_size(src, dst)?;

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice())
        .for_each(|(out, &x)| *out = *out + factor * x);

    Ok(())
}

/// Mean of all samples of the image, over every channel.
///
/// Returns `None` for an image without pixels.
pub fn mean<T: ImageDtype, const C: usize>(image: &Image<T, C>) -> Option<f64> {
    if image.is_empty() {
        return None;
    }
    let sum = image.as_slice().iter().map(|v| v.as_f64()).sum::<f64>();
    Some(sum / image.as_slice().len() as f64)
}
