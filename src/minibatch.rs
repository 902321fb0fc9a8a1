//! Stochastic mini-batch refinement.
//!
//! Instead of sweeping all N points per round, each iteration samples a
//! small batch, assigns it against the current centers, and blends every
//! touched center toward its batch mean. The blend weight uses a running
//! per-cluster observation count `n`:
//!
//! ```text
//! center = center * n / (n + b)  +  batch_mean * b / (n + b)
//! n += b
//! ```
//!
//! which makes the center an online mean over every point the cluster has
//! absorbed so far, rather than an exact full-batch recomputation.

use crate::distance::DistanceProvider;
use crate::lloyd::nearest_center;
use crate::points::PointSet;
use log::debug;
use ndarray::Array2;
use rand::prelude::*;

/// Batch sampling policy.
///
/// Batches are redrawn fresh every iteration under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSampling {
    /// Independent uniform draws; a point may appear twice in one batch.
    WithReplacement,
    /// Distinct indices per batch (batch size capped at N).
    WithoutReplacement,
}

fn draw_batch(
    n: usize,
    batch_size: usize,
    sampling: BatchSampling,
    rng: &mut impl Rng,
) -> Vec<usize> {
    match sampling {
        BatchSampling::WithReplacement => {
            (0..batch_size).map(|_| rng.random_range(0..n)).collect()
        }
        BatchSampling::WithoutReplacement => {
            rand::seq::index::sample(rng, n, batch_size.min(n)).into_vec()
        }
    }
}

/// Run mini-batch iterations on `centers` in place.
pub(crate) fn refine<P, D>(
    points: &P,
    distance: &mut D,
    centers: &mut Array2<f64>,
    batch_size: usize,
    iterations: usize,
    sampling: BatchSampling,
    rng: &mut impl Rng,
) where
    P: PointSet + ?Sized,
    D: DistanceProvider + ?Sized,
{
    let n = points.num_points();
    let dim = points.dimensionality();
    let k = centers.nrows();

    distance.precompute();

    // Running observation count per cluster, across all batches.
    let mut seen = vec![0.0f64; k];

    for _iter in 0..iterations {
        let batch = draw_batch(n, batch_size, sampling, rng);

        let mut sums = Array2::<f64>::zeros((k, dim));
        let mut counts = vec![0usize; k];

        for &i in &batch {
            let c = nearest_center(&*distance, i, centers);
            let v = points.vector(i);
            for j in 0..dim {
                sums[[c, j]] += v[j];
            }
            counts[c] += 1;
        }

        for c in 0..k {
            if counts[c] == 0 {
                continue;
            }
            let b = counts[c] as f64;
            let total = seen[c] + b;
            for j in 0..dim {
                let batch_mean = sums[[c, j]] / b;
                centers[[c, j]] = centers[[c, j]] * (seen[c] / total) + batch_mean * (b / total);
            }
            seen[c] = total;
        }
    }
    debug!("mini-batch: {iterations} iterations of size {batch_size} over {n} points");

    distance.reset();
}
