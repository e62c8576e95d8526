use std::{fs, path::Path};

use cve_image::{dtype::cast_sample, Image, ImageDtype};

use crate::error::IoError;

/// The Netpbm raster formats handled by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnmFormat {
    /// `P2`, grayscale with ASCII samples.
    PlainGray,
    /// `P3`, RGB with ASCII samples.
    PlainRgb,
    /// `P5`, grayscale with binary samples.
    RawGray,
    /// `P6`, RGB with binary samples.
    RawRgb,
}

impl PnmFormat {
    fn from_magic(digit: u8) -> Option<Self> {
        match digit {
            b'2' => Some(Self::PlainGray),
            b'3' => Some(Self::PlainRgb),
            b'5' => Some(Self::RawGray),
            b'6' => Some(Self::RawRgb),
            _ => None,
        }
    }

    /// The two byte magic number, e.g. `P5`.
    pub fn magic(&self) -> &'static str {
        match self {
            Self::PlainGray => "P2",
            Self::PlainRgb => "P3",
            Self::RawGray => "P5",
            Self::RawRgb => "P6",
        }
    }

    /// Samples per pixel.
    pub fn num_channels(&self) -> usize {
        match self {
            Self::PlainGray | Self::RawGray => 1,
            Self::PlainRgb | Self::RawRgb => 3,
        }
    }

    /// Whether the raster is stored as binary samples.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::RawGray | Self::RawRgb)
    }
}

/// A parsed PNM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PnmHeader {
    /// The raster format.
    pub format: PnmFormat,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// The maximum sample value, `1..=65535`.
    pub max_value: u32,
}

impl PnmHeader {
    /// Number of samples in the raster.
    pub fn num_samples(&self) -> Result<usize, IoError> {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(self.format.num_channels()))
            .ok_or(IoError::InvalidDimensions(self.width, self.height))
    }
}

// whitespace separated tokens with `#` comments running to the end of the line
struct Tokenizer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn skip_separators(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.bytes.get(self.pos) {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self, what: &'static str) -> Result<&'a [u8], IoError> {
        self.skip_separators();
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b'#' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(IoError::UnexpectedEof(what));
        }
        Ok(&self.bytes[start..self.pos])
    }

    fn next_number(&mut self, what: &'static str) -> Result<usize, IoError> {
        let token = self.next_token(what)?;
        std::str::from_utf8(token)
            .ok()
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| IoError::InvalidToken(what, String::from_utf8_lossy(token).into()))
    }
}

/// Parse the header of a PNM stream.
///
/// Returns the header and the offset of the first raster byte. For raw
/// formats the single whitespace byte after the maximum value is consumed,
/// for plain formats the offset points right after the maximum value token.
///
/// # Errors
///
/// * [`IoError::MissingSignature`] if the stream does not start with `P2`, `P3`, `P5` or `P6`.
/// * [`IoError::UnexpectedEof`] if the header is truncated.
/// * [`IoError::InvalidToken`] if a field is not a decimal number.
/// * [`IoError::InvalidDimensions`] if width or height is zero.
/// * [`IoError::InvalidMaxValue`] if the maximum value is outside `1..=65535`.
pub fn decode_header(bytes: &[u8]) -> Result<(PnmHeader, usize), IoError> {
    let format = match bytes {
        [b'P', digit, ..] => PnmFormat::from_magic(*digit),
        _ => None,
    }
    .ok_or(IoError::MissingSignature("P2, P3, P5, P6"))?;

    let mut tokens = Tokenizer::new(bytes, 2);
    let width = tokens.next_number("width")?;
    let height = tokens.next_number("height")?;
    let max_value = tokens.next_number("max value")?;

    if width == 0 || height == 0 {
        return Err(IoError::InvalidDimensions(width, height));
    }

    if max_value == 0 || max_value > u16::MAX as usize {
        return Err(IoError::InvalidMaxValue(max_value));
    }

    let mut offset = tokens.pos;
    if format.is_raw() {
        match bytes.get(offset) {
            Some(b) if b.is_ascii_whitespace() => offset += 1,
            Some(_) => {
                return Err(IoError::InvalidToken(
                    "max value",
                    String::from_utf8_lossy(&bytes[offset..offset + 1]).into(),
                ))
            }
            None => return Err(IoError::UnexpectedEof("raster")),
        }
    }

    let header = PnmHeader {
        format,
        width,
        height,
        max_value: max_value as u32,
    };

    Ok((header, offset))
}

fn rescale(value: usize, max_value: u32) -> Result<u8, IoError> {
    if value > max_value as usize {
        return Err(IoError::InvalidSample(value, max_value));
    }
    Ok((value as u32 * 255 / max_value) as u8)
}

/// Decode a whole PNM stream into samples rescaled to `0..=255`.
///
/// Each sample becomes `value * 255 / max_value` with integer division. Raw
/// rasters with a maximum value above 255 hold two big-endian bytes per sample.
/// Bytes after the raster are ignored.
pub fn decode_pnm(bytes: &[u8]) -> Result<(PnmHeader, Vec<u8>), IoError> {
    let (header, offset) = decode_header(bytes)?;
    let num_samples = header.num_samples()?;
    let max_value = header.max_value;

    let samples = if header.format.is_raw() {
        let bytes_per_sample = if max_value > 255 { 2 } else { 1 };
        let raster = num_samples
            .checked_mul(bytes_per_sample)
            .and_then(|len| bytes.get(offset..).and_then(|data| data.get(..len)))
            .ok_or(IoError::UnexpectedEof("raster"))?;

        if bytes_per_sample == 1 {
            raster
                .iter()
                .map(|&v| rescale(v as usize, max_value))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            raster
                .chunks_exact(2)
                .map(|v| rescale(u16::from_be_bytes([v[0], v[1]]) as usize, max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    } else {
        let mut tokens = Tokenizer::new(bytes, offset);
        // every plain sample takes at least a separator and a digit
        let available = bytes.len().saturating_sub(offset) / 2 + 1;
        let mut samples = Vec::with_capacity(num_samples.min(available));
        for _ in 0..num_samples {
            let value = tokens.next_number("sample")?;
            samples.push(rescale(value, max_value)?);
        }
        samples
    };

    log::debug!(
        "decoded {} image {}x{} with max value {}",
        header.format.magic(),
        header.width,
        header.height,
        header.max_value
    );

    Ok((header, samples))
}

/// Encode the first `format.num_channels()` channels of an image as a raw PNM stream.
///
/// Samples are cast to `u8` with [`ImageDtype::from_f64`], the maximum value is 255.
pub(crate) fn encode_raw<T: ImageDtype, const C: usize>(
    image: &Image<T, C>,
    format: PnmFormat,
) -> Result<Vec<u8>, IoError> {
    let channels = format.num_channels();
    if C < channels {
        return Err(IoError::NotEnoughChannels(C, channels));
    }

    let header = format!("{}\n{} {}\n255\n", format.magic(), image.cols(), image.rows());

    let mut buf = Vec::with_capacity(header.len() + image.cols() * image.rows() * channels);
    buf.extend_from_slice(header.as_bytes());
    for pixel in image.as_slice().chunks_exact(C) {
        buf.extend(pixel[..channels].iter().map(|&v| cast_sample::<T, u8>(v)));
    }

    Ok(buf)
}

/// Read only the header of a `pgm`, `ppm` or `pnm` file.
///
/// Used to pick the gray or color reader for a `pnm` file from its magic number.
///
/// # Arguments
///
/// * `file_path` - The path to the PNM file.
pub fn read_header(file_path: impl AsRef<Path>) -> Result<PnmHeader, IoError> {
    let file_path = file_path.as_ref();
    check_read_path(file_path, &["pgm", "ppm", "pnm"])?;
    let (header, _) = decode_header(&fs::read(file_path)?)?;
    Ok(header)
}

// verify the file exists and has one of the accepted extensions
pub(crate) fn check_read_path(file_path: &Path, extensions: &[&str]) -> Result<(), IoError> {
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    check_extension(file_path, extensions)
}

pub(crate) fn check_extension(file_path: &Path, extensions: &[&str]) -> Result<(), IoError> {
    match file_path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) => Ok(()),
        _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }
}
