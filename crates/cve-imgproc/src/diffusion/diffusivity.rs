use cve_image::{Image, ImageError};

use crate::filter::KernelScalar;

/// Maps a squared gradient magnitude to a local smoothing weight.
///
/// Implementations are stateless apart from their parameters; the weight of a
/// pixel only depends on its own squared gradient magnitude.
pub trait Diffusivity<K: KernelScalar>: Clone + Send + Sync {
    /// The weight for a single squared gradient magnitude.
    fn weight(&self, magnitude_sq: K) -> K;

    /// Compute the weights of a whole squared gradient magnitude image.
    fn apply<const C: usize>(
        &self,
        src: &Image<K, C>,
        dst: &mut Image<K, C>,
    ) -> Result<(), ImageError> {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst.cols(),
                dst.rows(),
            ));
        }

        dst.as_slice_mut()
            .iter_mut()
            .zip(src.as_slice())
            .for_each(|(out, &m)| *out = self.weight(m));

        Ok(())
    }
}

fn check_lambda<K: KernelScalar>(lambda: K) -> Result<K, ImageError> {
    if !(lambda > K::zero()) || !lambda.is_finite() {
        return Err(ImageError::InvalidParameter(
            "lambda",
            format!("{lambda:?}, expected a positive finite value"),
        ));
    }
    Ok(lambda)
}

/// Gaussian-type diffusivity `exp(-|grad u|^2 / lambda^2)`.
///
/// Weights lie in `(0, 1]` and equal `1` for a zero gradient. A larger `lambda`
/// smooths more uniformly, approaching linear diffusion as `lambda` grows.
/// Very large gradients underflow to a weight of exactly zero.
///
/// # Example
///
/// ```
/// use cve_imgproc::diffusion::{Diffusivity, GaussianDiffusivity};
///
/// let g = GaussianDiffusivity::<f64>::default();
/// assert_eq!(g.lambda(), 30.0);
/// assert_eq!(g.weight(0.0), 1.0);
/// assert!((g.weight(900.0) - (-1.0f64).exp()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianDiffusivity<K = f32> {
    lambda: K,
}

impl<K: KernelScalar> GaussianDiffusivity<K> {
    /// Default smoothing scale.
    pub const DEFAULT_LAMBDA: f64 = 30.0;

    /// Create the diffusivity with smoothing scale `lambda`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] if `lambda` is not positive and finite.
    pub fn new(lambda: K) -> Result<Self, ImageError> {
        Ok(Self {
            lambda: check_lambda(lambda)?,
        })
    }

    /// The smoothing scale.
    pub fn lambda(&self) -> K {
        self.lambda
    }
}

impl<K: KernelScalar> Default for GaussianDiffusivity<K> {
    fn default() -> Self {
        Self {
            lambda: K::from_f64(Self::DEFAULT_LAMBDA),
        }
    }
}

impl<K: KernelScalar> Diffusivity<K> for GaussianDiffusivity<K> {
    #[inline]
    fn weight(&self, magnitude_sq: K) -> K {
        (-magnitude_sq / (self.lambda * self.lambda)).exp()
    }
}

/// Total-variation-type diffusivity `1 / sqrt(max(|grad u|^2, epsilon))`.
///
/// The law is singular for a zero gradient. `epsilon` is a floor applied to the
/// squared magnitude:
///
/// - [`TotalVariationDiffusivity::new`] uses [`TotalVariationDiffusivity::DEFAULT_EPSILON`],
///   so a flat region gets the finite weight `1 / sqrt(epsilon)`.
/// - [`TotalVariationDiffusivity::unregularized`] uses no floor and returns
///   `+inf` for a zero gradient, following IEEE division by zero. A diffusion
///   run with it turns flat regions into `NaN` (`inf * 0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalVariationDiffusivity<K = f32> {
    epsilon: K,
}

impl<K: KernelScalar> TotalVariationDiffusivity<K> {
    /// Default floor of the squared gradient magnitude.
    pub const DEFAULT_EPSILON: f64 = 1e-8;

    /// Total variation diffusivity with the default floor.
    pub fn new() -> Self {
        Self {
            epsilon: K::from_f64(Self::DEFAULT_EPSILON),
        }
    }

    /// Total variation diffusivity without floor.
    pub fn unregularized() -> Self {
        Self { epsilon: K::zero() }
    }

    /// Total variation diffusivity with a custom floor.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] if `epsilon` is negative or not finite.
    pub fn with_epsilon(epsilon: K) -> Result<Self, ImageError> {
        if epsilon < K::zero() || !epsilon.is_finite() {
            return Err(ImageError::InvalidParameter(
                "epsilon",
                format!("{epsilon:?}, expected a non-negative finite value"),
            ));
        }
        Ok(Self { epsilon })
    }

    /// The floor of the squared gradient magnitude.
    pub fn epsilon(&self) -> K {
        self.epsilon
    }
}

impl<K: KernelScalar> Default for TotalVariationDiffusivity<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KernelScalar> Diffusivity<K> for TotalVariationDiffusivity<K> {
    #[inline]
    fn weight(&self, magnitude_sq: K) -> K {
        K::one() / magnitude_sq.max(self.epsilon).sqrt()
    }
}

/// Perona-Malik diffusivity `1 / (1 + |grad u|^2 / lambda^2)`.
///
/// Decays polynomially instead of exponentially, so strong edges still diffuse
/// slightly. Weights lie in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeronaMalikDiffusivity<K = f32> {
    lambda: K,
}

impl<K: KernelScalar> PeronaMalikDiffusivity<K> {
    /// Create the diffusivity with contrast parameter `lambda`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] if `lambda` is not positive and finite.
    pub fn new(lambda: K) -> Result<Self, ImageError> {
        Ok(Self {
            lambda: check_lambda(lambda)?,
        })
    }

    /// The contrast parameter.
    pub fn lambda(&self) -> K {
        self.lambda
    }
}

impl<K: KernelScalar> Default for PeronaMalikDiffusivity<K> {
    fn default() -> Self {
        Self {
            lambda: K::from_f64(GaussianDiffusivity::<K>::DEFAULT_LAMBDA),
        }
    }
}

impl<K: KernelScalar> Diffusivity<K> for PeronaMalikDiffusivity<K> {
    #[inline]
    fn weight(&self, magnitude_sq: K) -> K {
        K::one() / (K::one() + magnitude_sq / (self.lambda * self.lambda))
    }
}
