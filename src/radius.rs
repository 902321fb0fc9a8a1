//! Per-cluster radius estimation.
//!
//! The radius here is a **separation heuristic**, not an intra-cluster
//! spread measure: for each center it blends the distances to the nearest
//! and second-nearest other centers,
//!
//! ```text
//! radius[i] = 0.7 * sqrt(rmin1) + 0.3 * sqrt(rmin2)
//! ```
//!
//! where `rmin1 <= rmin2` are the two smallest squared inter-center
//! distances. With a single other center both terms collapse onto it; with
//! k == 1 there is no other center and the radius is defined as 0.

use ndarray::{Array1, Array2};

fn squared_row_distance(centers: &Array2<f64>, i: usize, j: usize) -> f64 {
    centers
        .row(i)
        .iter()
        .zip(centers.row(j).iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum()
}

/// Compute the radius vector for a frozen centers matrix.
///
/// Always uses squared Euclidean distance between center rows, independent
/// of the distance provider the centers were trained under.
pub(crate) fn cluster_radii(centers: &Array2<f64>) -> Array1<f64> {
    let k = centers.nrows();
    let mut radii = Array1::zeros(k);
    if k < 2 {
        return radii;
    }

    for i in 0..k {
        let mut rmin1 = 0.0;
        let mut rmin2 = 0.0;
        let mut first_round = true;

        for j in 0..k {
            if j == i {
                continue;
            }
            let dist = squared_row_distance(centers, i, j);

            if first_round {
                rmin1 = dist;
                rmin2 = dist;
                first_round = false;
            } else if dist < rmin1 {
                rmin2 = rmin1;
                rmin1 = dist;
            } else if dist < rmin2 {
                rmin2 = dist;
            }
        }

        radii[i] = 0.7 * rmin1.sqrt() + 0.3 * rmin2.sqrt();
    }
    radii
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_single_cluster_radius_is_zero() {
        let centers = array![[3.0, -1.0, 2.5]];
        let radii = cluster_radii(&centers);
        assert_eq!(radii.len(), 1);
        assert_eq!(radii[0], 0.0);
    }

    #[test]
    fn test_two_clusters_blend_collapses() {
        // One other center: rmin1 == rmin2, so the radius is just the
        // inter-center distance.
        let centers = array![[0.0, 0.0], [3.0, 4.0]];
        let radii = cluster_radii(&centers);
        assert!((radii[0] - 5.0).abs() < 1e-12);
        assert!((radii[1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_clusters_manual_blend() {
        // Pairwise squared distances: d01 = 9, d02 = 16, d12 = 25.
        let centers = array![[0.0, 0.0], [3.0, 0.0], [0.0, 4.0]];
        let radii = cluster_radii(&centers);

        assert!((radii[0] - (0.7 * 3.0 + 0.3 * 4.0)).abs() < 1e-12);
        assert!((radii[1] - (0.7 * 3.0 + 0.3 * 5.0)).abs() < 1e-12);
        assert!((radii[2] - (0.7 * 4.0 + 0.3 * 5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_radii_non_negative() {
        let centers = array![[0.0, 0.0], [0.0, 0.0], [1.0, 1.0], [-5.0, 2.0]];
        let radii = cluster_radii(&centers);
        assert!(radii.iter().all(|&r| r >= 0.0));
    }
}
