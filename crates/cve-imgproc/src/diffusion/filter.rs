use std::marker::PhantomData;

use cve_image::{ops, Image, ImageDtype, ImageError};

use super::{Diffusivity, GaussianDiffusivity};
use crate::filter::{GradientFilter, KernelScalar, SobelFilter};

/// Default number of iterations of a [`DiffusionFilter`].
pub const DEFAULT_ITERATIONS: usize = 10;

/// Default flow factor (explicit time step) of a [`DiffusionFilter`].
pub const DEFAULT_FLOW_FACTOR: f64 = 0.05;

fn check_flow_factor<K: KernelScalar>(flow_factor: K) -> Result<K, ImageError> {
    if !(flow_factor > K::zero()) || !flow_factor.is_finite() {
        return Err(ImageError::InvalidParameter(
            "flow_factor",
            format!("{flow_factor:?}, expected a positive finite value"),
        ));
    }
    Ok(flow_factor)
}

/// Nonlinear diffusion filter.
///
/// Runs a fixed number of explicit Euler steps of `du/dt = div(g(|grad u|^2) grad u)`:
///
/// 1. `(ux, uy)` are the gradients of the current state `u`,
/// 2. `g = diffusivity(ux^2 + uy^2)`,
/// 3. `u += flow_factor * (d/dx (g ux) + d/dy (g uy))`, differentiating the
///    fluxes with the same gradient filter.
///
/// The state is held in the working scalar `K` (a float) regardless of the
/// source and destination sample types. There is no convergence check and no
/// stability check: a flow factor that is too large for the chosen gradient
/// filter makes the result diverge.
///
/// # Example
///
/// ```
/// use cve_image::Image;
/// use cve_imgproc::diffusion::DiffusionFilter;
///
/// let mut src = Image::<u8, 1>::from_size_val([5, 5].into(), 10).unwrap();
/// src.set_pixel(2, 2, 0, 60).unwrap();
///
/// let filter = DiffusionFilter::<f32>::default();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
/// filter.apply(&src, &mut dst).unwrap();
///
/// assert!(*dst.get([2, 2, 0]).unwrap() < 60.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionFilter<K = f32, D = GaussianDiffusivity<K>, G = SobelFilter<K>> {
    iterations: usize,
    flow_factor: K,
    diffusivity: D,
    gradient_filter: G,
    _scalar: PhantomData<K>,
}

impl<K, D, G> DiffusionFilter<K, D, G>
where
    K: KernelScalar,
    D: Diffusivity<K>,
    G: GradientFilter<Scalar = K>,
{
    /// Create a filter with default diffusivity and gradient filter.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] if `flow_factor` is not positive and finite.
    pub fn new(iterations: usize, flow_factor: K) -> Result<Self, ImageError>
    where
        D: Default,
        G: Default,
    {
        Self::from_parts(iterations, flow_factor, D::default(), G::default())
    }

    /// Create a filter from all of its parts.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] if `flow_factor` is not positive and finite.
    pub fn from_parts(
        iterations: usize,
        flow_factor: K,
        diffusivity: D,
        gradient_filter: G,
    ) -> Result<Self, ImageError> {
        Ok(Self {
            iterations,
            flow_factor: check_flow_factor(flow_factor)?,
            diffusivity,
            gradient_filter,
            _scalar: PhantomData,
        })
    }

    /// The number of iterations.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The flow factor.
    pub fn flow_factor(&self) -> K {
        self.flow_factor
    }

    /// The diffusivity function.
    pub fn diffusivity(&self) -> &D {
        &self.diffusivity
    }

    /// The gradient filter.
    pub fn gradient_filter(&self) -> &G {
        &self.gradient_filter
    }

    /// Set the number of iterations.
    pub fn set_iterations(&mut self, iterations: usize) {
        self.iterations = iterations;
    }

    /// Set the flow factor.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] if `flow_factor` is not positive
    /// and finite, the filter keeps its previous value.
    pub fn set_flow_factor(&mut self, flow_factor: K) -> Result<(), ImageError> {
        self.flow_factor = check_flow_factor(flow_factor)?;
        Ok(())
    }

    /// Set the diffusivity function.
    pub fn set_diffusivity(&mut self, diffusivity: D) {
        self.diffusivity = diffusivity;
    }

    /// Set the gradient filter.
    pub fn set_gradient_filter(&mut self, gradient_filter: G) {
        self.gradient_filter = gradient_filter;
    }

    /// Set the number of iterations, builder style.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the flow factor, builder style.
    pub fn with_flow_factor(mut self, flow_factor: K) -> Result<Self, ImageError> {
        self.set_flow_factor(flow_factor)?;
        Ok(self)
    }

    /// Replace the diffusivity function, possibly with another policy type.
    pub fn with_diffusivity<D2: Diffusivity<K>>(
        self,
        diffusivity: D2,
    ) -> DiffusionFilter<K, D2, G> {
        DiffusionFilter {
            iterations: self.iterations,
            flow_factor: self.flow_factor,
            diffusivity,
            gradient_filter: self.gradient_filter,
            _scalar: PhantomData,
        }
    }

    /// Replace the gradient filter, possibly with another filter type.
    pub fn with_gradient_filter<G2: GradientFilter<Scalar = K>>(
        self,
        gradient_filter: G2,
    ) -> DiffusionFilter<K, D, G2> {
        DiffusionFilter {
            iterations: self.iterations,
            flow_factor: self.flow_factor,
            diffusivity: self.diffusivity,
            gradient_filter,
            _scalar: PhantomData,
        }
    }

    /// Diffuse `src` into `dst`.
    ///
    /// # Arguments
    ///
    /// * `src` - The source image with shape (H, W, C).
    /// * `dst` - The destination image with shape (H, W, C), written with
    ///   [`ImageDtype::from_f64`] from the working state.
    ///
    /// # Errors
    ///
    /// Returns an error if `src` and `dst` differ in size or have no pixels.
    pub fn apply<T, U, const C: usize>(
        &self,
        src: &Image<T, C>,
        dst: &mut Image<U, C>,
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

        if src.is_empty() {
            return Err(ImageError::EmptyImage(src.cols(), src.rows()));
        }

        log::debug!(
            "diffusion of {}x{}x{} image: {} iterations, flow factor {:?}, diffusivity {}, gradients {}",
            src.cols(),
            src.rows(),
            C,
            self.iterations,
            self.flow_factor,
            std::any::type_name::<D>(),
            std::any::type_name::<G>(),
        );

        let size = src.size();
        let zero = K::zero();
        let mut u: Image<K, C> = src.cast();
        let num_samples = u.as_slice().len() as f64;

        // working buffers reused by every iteration
        let mut ux = Image::<K, C>::from_size_val(size, zero)?;
        let mut uy = Image::<K, C>::from_size_val(size, zero)?;
        let mut mag_sq = Image::<K, C>::from_size_val(size, zero)?;
        let mut g = Image::<K, C>::from_size_val(size, zero)?;
        let mut gux = Image::<K, C>::from_size_val(size, zero)?;
        let mut guy = Image::<K, C>::from_size_val(size, zero)?;
        let mut guxx = Image::<K, C>::from_size_val(size, zero)?;
        let mut guyy = Image::<K, C>::from_size_val(size, zero)?;

        for it in 0..self.iterations {
            self.gradient_filter.apply_xy(&u, &mut ux, &mut uy)?;

            ops::magnitude_sq(&ux, &uy, &mut mag_sq)?;
            self.diffusivity.apply(&mag_sq, &mut g)?;

            ops::mul(&g, &ux, &mut gux)?;
            ops::mul(&g, &uy, &mut guy)?;

            self.gradient_filter.apply_x(&gux, &mut guxx)?;
            self.gradient_filter.apply_y(&guy, &mut guyy)?;

            // u += flow * (d/dx (g ux) + d/dy (g uy))
            ops::scaled_add(&mut guxx, &guyy, K::one())?;
            ops::scaled_add(&mut u, &guxx, self.flow_factor)?;

            if log::log_enabled!(log::Level::Trace) {
                let abs_update = guxx
                    .as_slice()
                    .iter()
                    .map(|&v| (self.flow_factor * v).abs().as_f64())
                    .sum::<f64>();
                log::trace!(
                    "diffusion iteration {}/{}: mean absolute update {:.6}",
                    it + 1,
                    self.iterations,
                    abs_update / num_samples
                );
            }
        }

        ops::cast_into(&u, dst)
    }

    /// Diffuse an image in place.
    ///
    /// The result is computed from a copy of the input and cast back into `T`.
    pub fn apply_inplace<T, const C: usize>(
        &self,
        image: &mut Image<T, C>,
    ) -> Result<(), ImageError>
    where
        T: ImageDtype,
    {
        let src = image.clone();
        self.apply(&src, image)
    }
}

impl<K: KernelScalar> Default for DiffusionFilter<K> {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            flow_factor: K::from_f64(DEFAULT_FLOW_FACTOR),
            diffusivity: GaussianDiffusivity::default(),
            gradient_filter: SobelFilter::default(),
            _scalar: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::TotalVariationDiffusivity;
    use crate::filter::{BorderMode, CentralDifferences};

    #[test]
    fn test_default_configuration() {
        let filter = DiffusionFilter::<f64>::default();
        assert_eq!(filter.iterations(), 10);
        assert_eq!(filter.flow_factor(), 0.05);
        assert_eq!(filter.diffusivity().lambda(), 30.0);
        assert_eq!(filter.gradient_filter().border_mode(), BorderMode::Reflect);
    }

    #[test]
    fn test_invalid_flow_factor() -> Result<(), ImageError> {
        for flow in [0.0f32, -0.1, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                DiffusionFilter::<f32>::new(10, flow),
                Err(ImageError::InvalidParameter("flow_factor", _))
            ));
        }

        let mut filter = DiffusionFilter::<f32>::new(3, 0.1)?;
        assert!(filter.set_flow_factor(-1.0).is_err());
        assert_eq!(filter.flow_factor(), 0.1);
        Ok(())
    }

    #[test]
    fn test_setters_and_builders() -> Result<(), ImageError> {
        let mut filter = DiffusionFilter::<f32>::default()
            .with_iterations(3)
            .with_flow_factor(0.01)?;
        assert_eq!(filter.iterations(), 3);
        assert_eq!(filter.flow_factor(), 0.01);

        filter.set_iterations(7);
        filter.set_diffusivity(GaussianDiffusivity::new(5.0)?);
        filter.set_gradient_filter(SobelFilter::new().with_border_mode(BorderMode::Wrap));
        assert_eq!(filter.iterations(), 7);
        assert_eq!(filter.diffusivity().lambda(), 5.0);
        assert_eq!(filter.gradient_filter().border_mode(), BorderMode::Wrap);

        let filter = filter
            .with_diffusivity(TotalVariationDiffusivity::<f32>::new())
            .with_gradient_filter(CentralDifferences::<f32>::new());
        assert_eq!(filter.iterations(), 7);
        assert_eq!(filter.gradient_filter().border_mode(), BorderMode::Reflect);
        Ok(())
    }

    #[test]
    fn test_constant_image_is_fixed_point() -> Result<(), ImageError> {
        let src = Image::<f32, 3>::from_size_val([6, 4].into(), 42.0)?;
        let mut dst = Image::<f32, 3>::from_size_val(src.size(), 0.0)?;
        DiffusionFilter::<f32>::default().apply(&src, &mut dst)?;
        assert_eq!(src, dst);
        Ok(())
    }

    #[test]
    fn test_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val([4, 5].into(), 0)?;
        assert_eq!(
            DiffusionFilter::<f32>::default().apply(&src, &mut dst),
            Err(ImageError::InvalidImageSize(4, 4, 4, 5))
        );
        Ok(())
    }
}
