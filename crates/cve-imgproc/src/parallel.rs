use rayon::prelude::*;

/// Buffers with at least this many samples run in parallel under [`ExecutionStrategy::Auto`].
pub const AUTO_PARALLEL_MIN_SAMPLES: usize = 100_000;

/// Controls how row-wise filter operations are executed.
///
/// Every strategy produces bit-identical results: each output row only reads
/// the source image and writes its own slice of the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    Parallel,

    /// Parallel for buffers with at least [`AUTO_PARALLEL_MIN_SAMPLES`] samples, serial otherwise.
    Auto,
}

impl ExecutionStrategy {
    /// Whether a buffer with `num_samples` samples is processed in parallel.
    pub fn is_parallel(&self, num_samples: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => num_samples >= AUTO_PARALLEL_MIN_SAMPLES,
        }
    }
}

/// Apply `f(row_index, row)` to every chunk of `row_stride` elements of `dst`.
pub fn for_each_row<T: Send>(
    dst: &mut [T],
    row_stride: usize,
    strategy: ExecutionStrategy,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) {
    if row_stride == 0 {
        return;
    }

    let num_samples = dst.len();
    if strategy.is_parallel(num_samples) {
        dst.par_chunks_exact_mut(row_stride)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    } else {
        dst.chunks_exact_mut(row_stride)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    }
}
