use crate::dtype::ImageDtype;
use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use cve_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an image with pixel data.
///
/// The samples are stored row-major with shape (H, W, C): the channels of a
/// pixel are contiguous, followed by the next pixel of the same row.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const C: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const C: usize> Image<T, C>
where
    T: ImageDtype,
{
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use cve_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.area() * C {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.area() * C,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and every sample set to `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cve_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val([10, 20].into(), 0u8).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError> {
        Image::new(size, vec![val; size.area() * C])
    }

    /// Create a new image evaluating `f(row, col, channel)` for every sample.
    pub fn from_size_fn(
        size: ImageSize,
        f: impl Fn(usize, usize, usize) -> T,
    ) -> Result<Self, ImageError> {
        let mut data = Vec::with_capacity(size.area() * C);
        for r in 0..size.height {
            for c in 0..size.width {
                for ch in 0..C {
                    data.push(f(r, c, ch));
                }
            }
        }
        Image::new(size, data)
    }

    /// Cast the pixel data of the image to a different type.
    ///
    /// Uses [`ImageDtype::from_f64`], so integer targets truncate and wrap.
    ///
    /// # Examples
    ///
    /// ```
    /// use cve_image::{Image, ImageSize};
    ///
    /// let image = Image::<f32, 1>::new([2, 1].into(), vec![1.9, 256.0]).unwrap();
    /// let image_u8 = image.cast::<u8>();
    ///
    /// assert_eq!(image_u8.as_slice(), &[1, 0]);
    /// ```
    pub fn cast<U: ImageDtype>(&self) -> Image<U, C> {
        Image {
            size: self.size,
            data: self
                .data
                .iter()
                .map(|&x| U::from_f64(x.as_f64()))
                .collect(),
        }
    }

    /// Get a channel of the image.
    ///
    /// # Errors
    ///
    /// If the channel index is out of bounds, an error is returned.
    pub fn channel(&self, channel: usize) -> Result<Image<T, 1>, ImageError> {
        if channel >= C {
            return Err(ImageError::ChannelIndexOutOfBounds(channel, C));
        }

        let channel_data = self
            .data
            .chunks_exact(C)
            .map(|pixel| pixel[channel])
            .collect();

        Image::new(self.size, channel_data)
    }

    /// Split the image into its channels.
    pub fn split_channels(&self) -> Result<Vec<Image<T, 1>>, ImageError> {
        (0..C).map(|i| self.channel(i)).collect()
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        C
    }

    /// Whether the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the samples as a row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the samples as a mutable row-major slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its samples.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize, ch: usize) -> usize {
        (row * self.size.width + col) * C + ch
    }

    /// Get a reference to the sample at `[row, col, channel]`.
    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        let [row, col, ch] = index;
        if row >= self.height() || col >= self.width() || ch >= C {
            return None;
        }
        self.data.get(self.offset(row, col, ch))
    }

    /// Get a mutable reference to the sample at `[row, col, channel]`.
    pub fn get_mut(&mut self, index: [usize; 3]) -> Option<&mut T> {
        let [row, col, ch] = index;
        if row >= self.height() || col >= self.width() || ch >= C {
            return None;
        }
        let offset = self.offset(row, col, ch);
        self.data.get_mut(offset)
    }

    /// Get the sample at pixel `(x, y)` and channel `ch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel or the channel is out of bounds.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<T, ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        if ch >= C {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, C));
        }

        Ok(self.data[self.offset(y, x, ch)])
    }

    /// Set the sample at pixel `(x, y)` and channel `ch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel or the channel is out of bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, ch: usize, val: T) -> Result<(), ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        if ch >= C {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, C));
        }

        let offset = self.offset(y, x, ch);
        self.data[offset] = val;
        Ok(())
    }
}
