use cve_image::ImageError;

use super::kernel::{scalar, Kernel, KernelScalar};

/// Central differences `[-1, 0, 1]`: `u[x + 1] - u[x - 1]`.
pub fn central_difference_kernel_1d<K: KernelScalar>() -> [K; 3] {
    [scalar(-1.0), scalar(0.0), scalar(1.0)]
}

/// Forward differences `[0, -1, 1]`: `u[x + 1] - u[x]`.
pub fn forward_difference_kernel_1d<K: KernelScalar>() -> [K; 3] {
    [scalar(0.0), scalar(-1.0), scalar(1.0)]
}

/// Backward differences `[-1, 1, 0]`: `u[x] - u[x - 1]`.
pub fn backward_difference_kernel_1d<K: KernelScalar>() -> [K; 3] {
    [scalar(-1.0), scalar(1.0), scalar(0.0)]
}

/// Sobel smoothing kernel `[1, 2, 1]`, applied across the derivative axis.
pub fn sobel_smoothing_kernel_1d<K: KernelScalar>() -> [K; 3] {
    [scalar(1.0), scalar(2.0), scalar(1.0)]
}

/// The full 3x3 Sobel kernels `(x, y)` as outer products of the 1D kernels.
///
/// The gradient filters never use these, they run two 1D passes instead.
pub fn sobel_kernel_2d<K: KernelScalar>() -> Result<(Kernel<K>, Kernel<K>), ImageError> {
    let smooth = sobel_smoothing_kernel_1d::<K>();
    let diff = central_difference_kernel_1d::<K>();
    Ok((Kernel::outer(&smooth, &diff)?, Kernel::outer(&diff, &smooth)?))
}
