use std::marker::PhantomData;

use cve_image::{ops, Image, ImageDtype, ImageError};

use super::{filter2d, kernels, BorderMode, Kernel, KernelScalar};

/// Common interface of the directional derivative filters.
///
/// `x` is the horizontal axis (along a row, increasing column index) and `y`
/// the vertical axis (along a column, increasing row index). Both passes use
/// the same [`BorderMode`].
pub trait GradientFilter: Clone + Send + Sync {
    /// Scalar type of the kernel coefficients and of the accumulation.
    type Scalar: KernelScalar;

    /// The border handling applied by both axis passes.
    fn border_mode(&self) -> BorderMode;

    /// Compute the derivative along the `x` axis.
    fn apply_x<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype;

    /// Compute the derivative along the `y` axis.
    fn apply_y<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype;

    /// Compute both derivatives.
    fn apply_xy<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        gx: &mut Image<U, C>,
        gy: &mut Image<U, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype,
    {
        self.apply_x(src, gx)?;
        self.apply_y(src, gy)
    }

    /// Compute the gradient magnitude `sqrt(gx^2 + gy^2)`.
    ///
    /// The gradients and the magnitude are evaluated in [`GradientFilter::Scalar`]
    /// and cast into `U` at the end.
    fn apply_magnitude<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype,
    {
        let zero = <Self::Scalar as num_traits::Zero>::zero();
        let mut gx = Image::<Self::Scalar, C>::from_size_val(src.size(), zero)?;
        let mut gy = Image::<Self::Scalar, C>::from_size_val(src.size(), zero)?;
        self.apply_xy(src, &mut gx, &mut gy)?;

        let mut mag = Image::<Self::Scalar, C>::from_size_val(src.size(), zero)?;
        ops::magnitude(&gx, &gy, &mut mag)?;
        ops::cast_into(&mag, dst)
    }
}

/// The finite difference scheme of a [`DifferenceFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifferenceScheme {
    /// `u[x + 1] - u[x]`
    Forward,
    /// `u[x] - u[x - 1]`
    Backward,
    /// `u[x + 1] - u[x - 1]`
    #[default]
    Central,
}

impl DifferenceScheme {
    fn coefficients<K: KernelScalar>(self) -> [K; 3] {
        match self {
            DifferenceScheme::Forward => kernels::forward_difference_kernel_1d(),
            DifferenceScheme::Backward => kernels::backward_difference_kernel_1d(),
            DifferenceScheme::Central => kernels::central_difference_kernel_1d(),
        }
    }
}

/// Gradient filter based on a single 3-tap finite difference per axis.
///
/// [`DifferenceFilter::forward`], [`DifferenceFilter::backward`] and
/// [`DifferenceFilter::central`] select the scheme.
///
/// # Example
///
/// ```
/// use cve_image::Image;
/// use cve_imgproc::filter::{CentralDifferences, GradientFilter};
///
/// let src = Image::<u8, 1>::new([3, 1].into(), vec![10, 20, 40]).unwrap();
/// let mut gx = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// CentralDifferences::<f32>::new().apply_x(&src, &mut gx).unwrap();
///
/// // reflect border: 20 | 10 20 40 | 20
/// assert_eq!(gx.as_slice(), &[0.0, 30.0, 0.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceFilter<K = f32> {
    scheme: DifferenceScheme,
    border: BorderMode,
    _scalar: PhantomData<K>,
}

/// Central differences `u[x + 1] - u[x - 1]`.
pub type CentralDifferences<K = f32> = DifferenceFilter<K>;
/// The plain derivative filter, central differences with reflected borders.
pub type DerivativeFilter<K = f32> = DifferenceFilter<K>;

impl<K: KernelScalar> DifferenceFilter<K> {
    /// Central differences with [`BorderMode::Reflect`].
    pub fn new() -> Self {
        Self::with_scheme(DifferenceScheme::Central)
    }

    /// Forward differences with [`BorderMode::Reflect`].
    pub fn forward() -> Self {
        Self::with_scheme(DifferenceScheme::Forward)
    }

    /// Backward differences with [`BorderMode::Reflect`].
    pub fn backward() -> Self {
        Self::with_scheme(DifferenceScheme::Backward)
    }

    /// Central differences with [`BorderMode::Reflect`].
    pub fn central() -> Self {
        Self::with_scheme(DifferenceScheme::Central)
    }

    /// A filter using `scheme` with [`BorderMode::Reflect`].
    pub fn with_scheme(scheme: DifferenceScheme) -> Self {
        Self {
            scheme,
            border: BorderMode::default(),
            _scalar: PhantomData,
        }
    }

    /// Set the border mode, builder style.
    pub fn with_border_mode(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    /// Set the border mode.
    pub fn set_border_mode(&mut self, border: BorderMode) {
        self.border = border;
    }

    /// The finite difference scheme.
    pub fn scheme(&self) -> DifferenceScheme {
        self.scheme
    }
}

impl<K: KernelScalar> Default for DifferenceFilter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KernelScalar> GradientFilter for DifferenceFilter<K> {
    type Scalar = K;

    fn border_mode(&self) -> BorderMode {
        self.border
    }

    fn apply_x<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype,
    {
        let kernel = Kernel::row(&self.scheme.coefficients::<K>())?;
        filter2d(src, dst, &kernel, self.border)
    }

    fn apply_y<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype,
    {
        let kernel = Kernel::column(&self.scheme.coefficients::<K>())?;
        filter2d(src, dst, &kernel, self.border)
    }
}

/// Sobel gradient filter.
///
/// Each axis runs two 1D passes: the smoothing kernel `[1, 2, 1]` across the
/// axis, then the central difference `[-1, 0, 1]` along it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SobelFilter<K = f32> {
    border: BorderMode,
    _scalar: PhantomData<K>,
}

impl<K: KernelScalar> SobelFilter<K> {
    /// A Sobel filter with [`BorderMode::Reflect`].
    pub fn new() -> Self {
        Self {
            border: BorderMode::default(),
            _scalar: PhantomData,
        }
    }

    /// Set the border mode, builder style.
    pub fn with_border_mode(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    /// Set the border mode.
    pub fn set_border_mode(&mut self, border: BorderMode) {
        self.border = border;
    }

    fn smooth_then_differentiate<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
        smooth: &Kernel<K>,
        diff: &Kernel<K>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype,
    {
        let mut smoothed = Image::<K, C>::from_size_val(src.size(), K::zero())?;
        filter2d(src, &mut smoothed, smooth, self.border)?;
        filter2d(&smoothed, dst, diff, self.border)
    }
}

impl<K: KernelScalar> Default for SobelFilter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KernelScalar> GradientFilter for SobelFilter<K> {
    type Scalar = K;

    fn border_mode(&self) -> BorderMode {
        self.border
    }

    fn apply_x<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype,
    {
        let smooth = Kernel::column(&kernels::sobel_smoothing_kernel_1d::<K>())?;
        let diff = Kernel::row(&kernels::central_difference_kernel_1d::<K>())?;
        self.smooth_then_differentiate(src, dst, &smooth, &diff)
    }

    fn apply_y<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
        U: ImageDtype,
    {
        let smooth = Kernel::row(&kernels::sobel_smoothing_kernel_1d::<K>())?;
        let diff = Kernel::column(&kernels::central_difference_kernel_1d::<K>())?;
        self.smooth_then_differentiate(src, dst, &smooth, &diff)
    }
}
