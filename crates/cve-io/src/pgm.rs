use std::{fs, path::Path};

use cve_image::{Image, ImageDtype};

use crate::{
    error::IoError,
    pnm::{self, PnmFormat},
};

const PGM_EXTENSIONS: &[&str] = &["pgm", "pnm"];

/// Decode a PGM stream (`P5` or `P2`) into a grayscale image.
///
/// Samples are rescaled to `0..=255` with `value * 255 / max_value`.
///
/// # Arguments
///
/// * `bytes` - The encoded PGM stream.
///
/// # Returns
///
/// A grayscale image with a single channel (mono8).
pub fn decode_pgm(bytes: &[u8]) -> Result<Image<u8, 1>, IoError> {
    let (header, samples) = pnm::decode_pnm(bytes)?;
    if header.format.num_channels() != 1 {
        return Err(IoError::MissingSignature("P2, P5"));
    }
    Ok(Image::new([header.width, header.height].into(), samples)?)
}

/// Encode a grayscale image as a binary PGM (`P5`) stream with max value 255.
///
/// Samples are cast to `u8` with [`ImageDtype::from_f64`], i.e. truncated and
/// wrapped, never clamped.
pub fn encode_pgm<T: ImageDtype>(image: &Image<T, 1>) -> Result<Vec<u8>, IoError> {
    pnm::encode_raw(image, PnmFormat::RawGray)
}

/// Read a PGM image with a single channel (mono8).
///
/// # Arguments
///
/// * `file_path` - The path to the PGM file, with a `pgm` or `pnm` extension.
///
/// # Returns
///
/// A grayscale image with a single channel (mono8).
pub fn read_image_pgm(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let file_path = file_path.as_ref();
    pnm::check_read_path(file_path, PGM_EXTENSIONS)?;
    decode_pgm(&fs::read(file_path)?)
}

/// Write a grayscale image to the given file path as binary PGM.
///
/// # Arguments
///
/// * `file_path` - The path to the PGM file, with a `pgm` or `pnm` extension.
/// * `image` - The image to write.
pub fn write_image_pgm<T: ImageDtype>(
    file_path: impl AsRef<Path>,
    image: &Image<T, 1>,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    pnm::check_extension(file_path, PGM_EXTENSIONS)?;
    fs::write(file_path, encode_pgm(image)?)?;
    Ok(())
}
