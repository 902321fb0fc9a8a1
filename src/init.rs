//! Initial center selection.
//!
//! Three strategies, in precedence order: validated user-supplied centers,
//! greedy k-means++ seeding, uniform random sampling without replacement.
//!
//! # Greedy k-means++
//!
//! Naive k-means++ draws each new center once, proportional to D² (squared
//! distance to the nearest already-chosen center). A single unlucky draw can
//! still seed badly. The greedy variant draws `2 + floor(ln k)` candidates
//! per slot and commits the one whose hypothetical updated D² total is
//! smallest, trading a few extra distance passes for lower seeding variance.

use crate::distance::DistanceProvider;
use crate::error::{Error, Result};
use crate::points::PointSet;
use log::debug;
use ndarray::Array2;
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Check user-supplied centers against the configured k and the data
/// dimensionality.
pub(crate) fn validate_user_centers(centers: &Array2<f64>, k: usize, dim: usize) -> Result<()> {
    if centers.nrows() != k || centers.ncols() != dim {
        return Err(Error::ShapeMismatch {
            expected: format!("({k}, {dim})"),
            actual: format!("({}, {})", centers.nrows(), centers.ncols()),
        });
    }
    Ok(())
}

/// Pick k distinct points uniformly at random as initial centers.
///
/// Draws a random permutation of indices and takes the first k, so centers
/// are duplicate-free whenever N >= k.
pub(crate) fn random_centers<P: PointSet + ?Sized>(
    points: &P,
    k: usize,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let n = points.num_points();
    let dim = points.dimensionality();

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let mut centers = Array2::zeros((k, dim));
    for (slot, &i) in indices.iter().take(k).enumerate() {
        centers.row_mut(slot).assign(&points.vector(i));
    }
    centers
}

/// Squared distances to `center`, folded into the running minimum `current`
/// when present. One parallel elementwise pass; summation stays sequential
/// so the total does not depend on thread scheduling.
fn updated_sq_dists<D: DistanceProvider + ?Sized>(
    distance: &D,
    n: usize,
    center: usize,
    current: Option<&[f64]>,
) -> Vec<f64> {
    let eval = |j: usize| {
        let d = distance.distance(j, center);
        let sq = d * d;
        match current {
            Some(min_dist) => sq.min(min_dist[j]),
            None => sq,
        }
    };

    #[cfg(feature = "parallel")]
    {
        (0..n).into_par_iter().map(eval).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(eval).collect()
    }
}

/// Inverse-CDF draw: first index whose prefix sum reaches `u`.
fn sample_by_weight(weights: &[f64], u: f64) -> usize {
    let mut cumsum = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumsum += w;
        if u <= cumsum {
            return i;
        }
    }
    weights.len() - 1
}

/// Greedy k-means++ seeding.
///
/// Maintains `min_dist[i]` (squared distance from point i to the nearest
/// chosen center) and its sum. Each remaining slot runs several local
/// trials and keeps the candidate minimizing the updated sum.
/// `precompute`/`reset` bracket the whole seeding phase.
pub(crate) fn kmeanspp_centers<P, D>(
    points: &P,
    distance: &mut D,
    k: usize,
    rng: &mut impl Rng,
) -> Array2<f64>
where
    P: PointSet + ?Sized,
    D: DistanceProvider + ?Sized,
{
    let n = points.num_points();
    let dim = points.dimensionality();
    let mut centers = Array2::zeros((k, dim));

    // First center: uniform draw.
    let first = rng.random_range(0..n);
    centers.row_mut(0).assign(&points.vector(first));

    distance.precompute();

    let mut min_dist = updated_sq_dists(&*distance, n, first, None);
    let mut sum: f64 = min_dist.iter().sum();

    let n_trials = 2 + (k as f64).ln().floor() as usize;

    for slot in 1..k {
        let mut best_center = 0usize;
        let mut best_sum = f64::INFINITY;
        let mut best_min_dist = Vec::new();

        for _ in 0..n_trials {
            let candidate = if sum > 0.0 {
                sample_by_weight(&min_dist, rng.random::<f64>() * sum)
            } else {
                // All remaining mass is zero (duplicate points); any pick works.
                rng.random_range(0..n)
            };

            let trial_min_dist = updated_sq_dists(&*distance, n, candidate, Some(&min_dist));
            let trial_sum: f64 = trial_min_dist.iter().sum();

            if trial_sum < best_sum {
                best_sum = trial_sum;
                best_min_dist = trial_min_dist;
                best_center = candidate;
            }
        }

        centers.row_mut(slot).assign(&points.vector(best_center));
        min_dist = best_min_dist;
        sum = best_sum;
    }
    debug!("k-means++ seeded {k} centers over {n} points ({n_trials} trials per slot)");

    distance.reset();
    centers
}
