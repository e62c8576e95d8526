/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open, read or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] cve_image::ImageError),

    /// The stream does not start with the expected magic number.
    #[error("Missing PNM signature, expected one of {0}")]
    MissingSignature(&'static str),

    /// The stream ended inside the header or the raster.
    #[error("Unexpected end of stream while reading {0}")]
    UnexpectedEof(&'static str),

    /// A header field or an ASCII sample is not a decimal number.
    #[error("Invalid token for {0}: {1:?}")]
    InvalidToken(&'static str, String),

    /// Width or height is zero or the raster size overflows.
    #[error("Invalid image dimensions {0}x{1}")]
    InvalidDimensions(usize, usize),

    /// The maximum sample value is outside `1..=65535`.
    #[error("Invalid maximum sample value {0}, expected 1..=65535")]
    InvalidMaxValue(usize),

    /// A raster sample is greater than the maximum sample value.
    #[error("Sample value {0} exceeds the maximum sample value {1}")]
    InvalidSample(usize, u32),

    /// The image has fewer channels than the format stores.
    #[error("Image has {0} channels, the format needs at least {1}")]
    NotEnoughChannels(usize, usize),
}
