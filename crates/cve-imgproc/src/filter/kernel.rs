use cve_image::{ImageDtype, ImageError};
use num_traits::Float;

/// Scalar type used to store kernel coefficients and to accumulate convolutions.
pub trait KernelScalar: ImageDtype + Float {}

impl<T: ImageDtype + Float> KernelScalar for T {}

/// Convert a literal coefficient into the kernel scalar type.
#[inline]
pub(crate) fn scalar<K: KernelScalar>(x: f64) -> K {
    K::from_f64(x)
}

/// An immutable convolution kernel of `rows x cols` coefficients.
///
/// The coefficients are stored row-major. The anchor (the tap aligned with the
/// output pixel) is at `(rows / 2, cols / 2)`, so odd sized kernels are centered.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel<K> {
    data: Vec<K>,
    rows: usize,
    cols: usize,
}

impl<K: KernelScalar> Kernel<K> {
    /// Create a 2D kernel from row-major coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidKernelShape`] if the kernel is empty or if
    /// `data.len() != rows * cols`.
    pub fn new(data: Vec<K>, rows: usize, cols: usize) -> Result<Self, ImageError> {
        if rows == 0 || cols == 0 || data.len() != rows * cols {
            return Err(ImageError::InvalidKernelShape(data.len(), rows, cols));
        }
        Ok(Self { data, rows, cols })
    }

    /// Create a `1 x N` kernel applied along the image rows (horizontal pass).
    pub fn row(coefficients: &[K]) -> Result<Self, ImageError> {
        Self::new(coefficients.to_vec(), 1, coefficients.len())
    }

    /// Create a `N x 1` kernel applied along the image columns (vertical pass).
    pub fn column(coefficients: &[K]) -> Result<Self, ImageError> {
        Self::new(coefficients.to_vec(), coefficients.len(), 1)
    }

    /// Create the separable 2D kernel `column * row^T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cve_imgproc::filter::Kernel;
    ///
    /// let k = Kernel::outer(&[1.0f32, 2.0, 1.0], &[-1.0, 0.0, 1.0]).unwrap();
    /// assert_eq!(k.rows(), 3);
    /// assert_eq!(k.cols(), 3);
    /// assert_eq!(k.at(1, 0), Some(-2.0));
    /// ```
    pub fn outer(column: &[K], row: &[K]) -> Result<Self, ImageError> {
        let data = column
            .iter()
            .flat_map(|&c| row.iter().map(move |&r| c * r))
            .collect();
        Self::new(data, column.len(), row.len())
    }

    /// Number of kernel rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of kernel columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The row-major coefficients.
    pub fn as_slice(&self) -> &[K] {
        &self.data
    }

    /// The coefficient at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> Option<K> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// The anchor position `(row, col)`.
    pub fn anchor(&self) -> (usize, usize) {
        (self.rows / 2, self.cols / 2)
    }

    /// Taps as `(row_offset, col_offset, coefficient)` relative to the anchor.
    pub(crate) fn taps(&self) -> Vec<(isize, isize, K)> {
        let (ar, ac) = self.anchor();
        self.data
            .iter()
            .enumerate()
            .map(|(i, &k)| {
                let dr = (i / self.cols) as isize - ar as isize;
                let dc = (i % self.cols) as isize - ac as isize;
                (dr, dc, k)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_shapes() -> Result<(), ImageError> {
        let row = Kernel::row(&[1.0f32, 2.0, 3.0])?;
        assert_eq!((row.rows(), row.cols()), (1, 3));
        assert_eq!(row.anchor(), (0, 1));

        let col = Kernel::column(&[1.0f64, 2.0, 3.0, 4.0, 5.0])?;
        assert_eq!((col.rows(), col.cols()), (5, 1));
        assert_eq!(col.anchor(), (2, 0));

        Ok(())
    }

    #[test]
    fn test_kernel_invalid() {
        assert_eq!(
            Kernel::<f32>::row(&[]),
            Err(ImageError::InvalidKernelShape(0, 1, 0))
        );
        assert_eq!(
            Kernel::new(vec![1.0f32; 5], 2, 3),
            Err(ImageError::InvalidKernelShape(5, 2, 3))
        );
    }

    #[test]
    fn test_kernel_outer() -> Result<(), ImageError> {
        let k = Kernel::outer(&[1.0f32, 2.0, 1.0], &[-1.0, 0.0, 1.0])?;
        #[rustfmt::skip]
        assert_eq!(
            k.as_slice(),
            &[
                -1.0, 0.0, 1.0,
                -2.0, 0.0, 2.0,
                -1.0, 0.0, 1.0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_kernel_taps() -> Result<(), ImageError> {
        let k = Kernel::row(&[-1.0f32, 0.0, 1.0])?;
        assert_eq!(k.taps(), vec![(0, -1, -1.0), (0, 0, 0.0), (0, 1, 1.0)]);

        let k = Kernel::new(vec![1.0f32, 2.0, 3.0, 4.0], 2, 2)?;
        assert_eq!(
            k.taps(),
            vec![(-1, -1, 1.0), (-1, 0, 2.0), (0, -1, 3.0), (0, 0, 4.0)]
        );
        Ok(())
    }
}
