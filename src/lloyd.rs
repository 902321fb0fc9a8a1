//! Full-batch Lloyd refinement.
//!
//! Each round assigns every point to its nearest center (parallel, centers
//! read-only), then recomputes each center as the per-dimension mean of its
//! assigned points (sequential, one owner per cluster). A cluster that loses
//! all points keeps its previous center. Iteration stops when the assignment
//! repeats (when `stop_on_stable` is set) or at the `max_iter` cap.
//!
//! Complexity: O(rounds × N × k × D) distance work in the assignment step.

use crate::distance::DistanceProvider;
use crate::points::PointSet;
use log::debug;
use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Index of the center nearest to training point `i`. Ties break toward the
/// lowest center index.
pub(crate) fn nearest_center<D: DistanceProvider + ?Sized>(
    distance: &D,
    i: usize,
    centers: &Array2<f64>,
) -> usize {
    let mut best_cluster = 0;
    let mut best_dist = f64::INFINITY;

    for (c, center) in centers.outer_iter().enumerate() {
        let dist = distance.distance_to(i, center);
        if dist < best_dist {
            best_dist = dist;
            best_cluster = c;
        }
    }
    best_cluster
}

/// Assign every point to its nearest center.
pub(crate) fn assign_all<D: DistanceProvider + ?Sized>(
    distance: &D,
    n: usize,
    centers: &Array2<f64>,
) -> Vec<usize> {
    #[cfg(feature = "parallel")]
    {
        (0..n)
            .into_par_iter()
            .map(|i| nearest_center(distance, i, centers))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(|i| nearest_center(distance, i, centers)).collect()
    }
}

/// Run Lloyd iterations on `centers` in place.
///
/// With `fixed_centers` the update step is skipped entirely and the loop
/// degenerates to an assignment/evaluation pass over the input centers.
pub(crate) fn refine<P, D>(
    points: &P,
    distance: &mut D,
    centers: &mut Array2<f64>,
    max_iter: usize,
    fixed_centers: bool,
    stop_on_stable: bool,
) where
    P: PointSet + ?Sized,
    D: DistanceProvider + ?Sized,
{
    let n = points.num_points();
    let dim = points.dimensionality();
    let k = centers.nrows();

    distance.precompute();

    let mut prev: Option<Vec<usize>> = None;
    for iter in 0..max_iter {
        let labels = assign_all(&*distance, n, centers);

        if stop_on_stable && prev.as_ref() == Some(&labels) {
            debug!("lloyd: assignment stable after {iter} rounds");
            break;
        }

        if fixed_centers {
            prev = Some(labels);
            continue;
        }

        // Update step: per-cluster mean, accumulated sequentially so the
        // result is independent of thread scheduling.
        let mut sums = Array2::<f64>::zeros((k, dim));
        let mut counts = vec![0usize; k];

        for (i, &c) in labels.iter().enumerate() {
            let v = points.vector(i);
            for j in 0..dim {
                sums[[c, j]] += v[j];
            }
            counts[c] += 1;
        }

        for c in 0..k {
            // Empty cluster keeps its previous center.
            if counts[c] > 0 {
                for j in 0..dim {
                    centers[[c, j]] = sums[[c, j]] / counts[c] as f64;
                }
            }
        }

        prev = Some(labels);
    }

    distance.reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;
    use ndarray::array;

    #[test]
    fn test_nearest_center_tie_breaks_low_index() {
        let points = array![[1.0, 0.0]];
        let centers = array![[0.0, 0.0], [2.0, 0.0]];
        let dist = Euclidean::new(&points);
        // Equidistant from both centers.
        assert_eq!(nearest_center(&dist, 0, &centers), 0);
    }

    #[test]
    fn test_refine_converges_on_separated_blobs() {
        let points = array![
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 0.0],
            [10.0, 10.0],
            [10.0, 11.0],
            [11.0, 10.0]
        ];
        let mut dist = Euclidean::new(&points);
        // One seed per blob.
        let mut centers = array![[0.0, 0.0], [10.0, 10.0]];

        refine(&points, &mut dist, &mut centers, 100, false, true);

        let third = 1.0 / 3.0;
        assert!((centers[[0, 0]] - third).abs() < 1e-9);
        assert!((centers[[0, 1]] - third).abs() < 1e-9);
        assert!((centers[[1, 0]] - (31.0 / 3.0)).abs() < 1e-9);
        assert!((centers[[1, 1]] - (31.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_refine_fixed_centers_untouched() {
        let points = array![[0.0, 0.0], [1.0, 1.0], [9.0, 9.0]];
        let mut dist = Euclidean::new(&points);
        let initial = array![[0.25, 0.25], [8.0, 8.0]];
        let mut centers = initial.clone();

        refine(&points, &mut dist, &mut centers, 50, true, true);

        assert_eq!(centers, initial);
    }

    #[test]
    fn test_refine_empty_cluster_keeps_center() {
        // Both points land on center 0; center 1 must survive unchanged.
        let points = array![[0.0, 0.0], [1.0, 0.0]];
        let mut dist = Euclidean::new(&points);
        let mut centers = array![[0.5, 0.0], [100.0, 100.0]];

        refine(&points, &mut dist, &mut centers, 10, false, true);

        assert!((centers[[0, 0]] - 0.5).abs() < 1e-12);
        assert_eq!(centers[[1, 0]], 100.0);
        assert_eq!(centers[[1, 1]], 100.0);
        assert!(centers.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_refine_respects_iteration_cap() {
        // stop_on_stable off: the loop must still terminate at max_iter and
        // land on the same fixed point.
        let points = array![[0.0, 0.0], [0.0, 2.0], [10.0, 0.0], [10.0, 2.0]];
        let mut dist = Euclidean::new(&points);
        let mut centers = array![[0.0, 0.0], [10.0, 0.0]];

        refine(&points, &mut dist, &mut centers, 5, false, false);

        assert!((centers[[0, 0]] - 0.0).abs() < 1e-12);
        assert!((centers[[0, 1]] - 1.0).abs() < 1e-12);
        assert!((centers[[1, 0]] - 10.0).abs() < 1e-12);
        assert!((centers[[1, 1]] - 1.0).abs() < 1e-12);
    }
}
