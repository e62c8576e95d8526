use std::{fs, path::Path};

use cve_image::{Image, ImageDtype};

use crate::{
    error::IoError,
    pnm::{self, PnmFormat},
};

const PPM_EXTENSIONS: &[&str] = &["ppm", "pnm"];

/// Decode a PPM stream (`P6` or `P3`) into an RGB image.
///
/// Samples are rescaled to `0..=255` with `value * 255 / max_value`.
///
/// # Arguments
///
/// * `bytes` - The encoded PPM stream.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
pub fn decode_ppm(bytes: &[u8]) -> Result<Image<u8, 3>, IoError> {
    let (header, samples) = pnm::decode_pnm(bytes)?;
    if header.format.num_channels() != 3 {
        return Err(IoError::MissingSignature("P3, P6"));
    }
    Ok(Image::new([header.width, header.height].into(), samples)?)
}

/// Encode the first three channels of an image as a binary PPM (`P6`) stream.
///
/// Channels beyond the third are ignored. Samples are cast to `u8` with
/// [`ImageDtype::from_f64`].
///
/// # Errors
///
/// Returns [`IoError::NotEnoughChannels`] if the image has fewer than 3 channels.
pub fn encode_ppm<T: ImageDtype, const C: usize>(image: &Image<T, C>) -> Result<Vec<u8>, IoError> {
    pnm::encode_raw(image, PnmFormat::RawRgb)
}

/// Read a PPM image with three channels (rgb8).
///
/// # Arguments
///
/// * `file_path` - The path to the PPM file, with a `ppm` or `pnm` extension.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
pub fn read_image_ppm(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();
    pnm::check_read_path(file_path, PPM_EXTENSIONS)?;
    decode_ppm(&fs::read(file_path)?)
}

/// Write the first three channels of an image to the given file path as binary PPM.
///
/// # Arguments
///
/// * `file_path` - The path to the PPM file, with a `ppm` or `pnm` extension.
/// * `image` - The image to write, with at least 3 channels.
pub fn write_image_ppm<T: ImageDtype, const C: usize>(
    file_path: impl AsRef<Path>,
    image: &Image<T, C>,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    pnm::check_extension(file_path, PPM_EXTENSIONS)?;
    fs::write(file_path, encode_ppm(image)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_rescaled() -> Result<(), IoError> {
        let image = decode_ppm(b"P3\n# tiny\n2 1\n1\n1 0 0  0 1 1\n")?;
        assert_eq!(image.num_channels(), 3);
        assert_eq!(image.as_slice(), &[255, 0, 0, 0, 255, 255]);
        Ok(())
    }

    #[test]
    fn encode_rgba_drops_alpha() -> Result<(), IoError> {
        let image = Image::<u8, 4>::new([1, 1].into(), vec![1, 2, 3, 4])?;
        assert_eq!(encode_ppm(&image)?, b"P6\n1 1\n255\n\x01\x02\x03");
        Ok(())
    }

    #[test]
    fn encode_gray_fails() -> Result<(), IoError> {
        let image = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        assert!(matches!(
            encode_ppm(&image),
            Err(IoError::NotEnoughChannels(1, 3))
        ));
        Ok(())
    }

    #[test]
    fn write_invalid_extension() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let image = Image::<u8, 3>::from_size_val([2, 2].into(), 7)?;
        assert!(matches!(
            write_image_ppm(tmp_dir.path().join("image.png"), &image),
            Err(IoError::InvalidFileExtension(_))
        ));
        Ok(())
    }
}
