/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must match in size do not.
    #[error("Image size mismatch: ({0}x{1}) vs ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when an operation is given an image without pixels.
    #[error("Image has no pixels ({0}x{1})")]
    EmptyImage(usize, usize),

    /// Error when the pixel coordinates are out of bounds.
    #[error("Pixel index ({0}, {1}) out of bounds ({2}x{3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the kernel coefficients do not describe a rows x cols matrix.
    #[error("Invalid kernel shape: {0} coefficients for a {1}x{2} kernel")]
    InvalidKernelShape(usize, usize, usize),

    /// Error when a filter parameter is rejected at configuration time.
    #[error("Invalid parameter `{0}`: {1}")]
    InvalidParameter(&'static str, String),
}
