//! Distance capabilities consumed by the clustering engine.
//!
//! The engine is metric-agnostic: it only ever asks a [`DistanceProvider`]
//! for distances, never for coordinates (except when recomputing centers as
//! per-dimension means, which goes through [`crate::points::PointSet`]
//! directly). This keeps kernel-induced metrics and plain Euclidean distance
//! behind one seam.
//!
//! # Lifecycle Hooks
//!
//! Bulk distance phases (k-means++ seeding, a full assignment pass) are
//! bracketed by [`DistanceProvider::precompute`] and
//! [`DistanceProvider::reset`]. Providers use these to cache expensive
//! per-point quantities — both providers here cache squared norms so an
//! index-pair distance becomes `n_i + n_j - 2 <x_i, x_j>`. Between the two
//! hooks a provider is only invoked read-only and must be safe to share
//! across worker threads.

use crate::error::{Error, Result};
use crate::points::PointSet;
use ndarray::ArrayView1;

/// Pairwise distance over a fixed point set.
///
/// `distance` must be symmetric and defined for all valid index pairs.
/// Implementations must be `Sync`: assignment and seeding passes invoke the
/// provider concurrently from multiple threads.
pub trait DistanceProvider: Sync {
    /// Distance between training points `i` and `j`.
    fn distance(&self, i: usize, j: usize) -> f64;

    /// Distance between training point `i` and an arbitrary D-length vector.
    fn distance_to(&self, i: usize, v: ArrayView1<'_, f64>) -> f64;

    /// Distance between two arbitrary D-length vectors under the same metric.
    fn between(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64;

    /// Invoked once before a bulk distance phase.
    fn precompute(&mut self) {}

    /// Invoked once after a bulk distance phase.
    fn reset(&mut self) {}
}

#[inline]
fn squared_euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn squared_norms<P: PointSet + ?Sized>(points: &P) -> Vec<f64> {
    (0..points.num_points())
        .map(|i| {
            let v = points.vector(i);
            v.iter().map(|x| x * x).sum()
        })
        .collect()
}

/// Euclidean distance over a borrowed point set.
///
/// `precompute` caches per-point squared norms so index-pair distances use
/// the dot-product identity instead of re-walking both vectors.
pub struct Euclidean<'a, P: PointSet + ?Sized> {
    points: &'a P,
    /// Cached squared norms, present between `precompute` and `reset`.
    norms: Option<Vec<f64>>,
}

impl<'a, P: PointSet + ?Sized> Euclidean<'a, P> {
    /// Create a Euclidean provider over `points`.
    pub fn new(points: &'a P) -> Self {
        Self {
            points,
            norms: None,
        }
    }

    fn squared(&self, i: usize, j: usize) -> f64 {
        match &self.norms {
            Some(norms) => {
                let dot: f64 = self
                    .points
                    .vector(i)
                    .iter()
                    .zip(self.points.vector(j).iter())
                    .map(|(x, y)| x * y)
                    .sum();
                // Clamp: the identity can go slightly negative for i == j.
                (norms[i] + norms[j] - 2.0 * dot).max(0.0)
            }
            None => squared_euclidean(self.points.vector(i), self.points.vector(j)),
        }
    }
}

impl<P: PointSet + ?Sized> DistanceProvider for Euclidean<'_, P> {
    fn distance(&self, i: usize, j: usize) -> f64 {
        self.squared(i, j).sqrt()
    }

    fn distance_to(&self, i: usize, v: ArrayView1<'_, f64>) -> f64 {
        self.between(self.points.vector(i), v)
    }

    fn between(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        squared_euclidean(a, b).sqrt()
    }

    fn precompute(&mut self) {
        self.norms = Some(squared_norms(self.points));
    }

    fn reset(&mut self) {
        self.norms = None;
    }
}

/// Distance induced by a Gaussian kernel.
///
/// With `k(x, y) = exp(-||x - y||² / width)` the induced metric is
/// `d(x, y) = sqrt(k(x,x) + k(y,y) - 2 k(x,y)) = sqrt(2 - 2 k(x,y))`.
/// Monotone in Euclidean distance, so nearest-center assignments agree with
/// [`Euclidean`]; the numeric distances differ.
pub struct GaussianKernelDistance<'a, P: PointSet + ?Sized> {
    points: &'a P,
    width: f64,
    norms: Option<Vec<f64>>,
}

impl<'a, P: PointSet + ?Sized> GaussianKernelDistance<'a, P> {
    /// Create a Gaussian-kernel provider with the given kernel width.
    pub fn new(points: &'a P, width: f64) -> Result<Self> {
        if width <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "width",
                message: "kernel width must be > 0",
            });
        }
        Ok(Self {
            points,
            width,
            norms: None,
        })
    }

    #[inline]
    fn induced(&self, squared_dist: f64) -> f64 {
        let kernel = (-squared_dist / self.width).exp();
        (2.0 - 2.0 * kernel).max(0.0).sqrt()
    }
}

impl<P: PointSet + ?Sized> DistanceProvider for GaussianKernelDistance<'_, P> {
    fn distance(&self, i: usize, j: usize) -> f64 {
        let sq = match &self.norms {
            Some(norms) => {
                let dot: f64 = self
                    .points
                    .vector(i)
                    .iter()
                    .zip(self.points.vector(j).iter())
                    .map(|(x, y)| x * y)
                    .sum();
                (norms[i] + norms[j] - 2.0 * dot).max(0.0)
            }
            None => squared_euclidean(self.points.vector(i), self.points.vector(j)),
        };
        self.induced(sq)
    }

    fn distance_to(&self, i: usize, v: ArrayView1<'_, f64>) -> f64 {
        self.between(self.points.vector(i), v)
    }

    fn between(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        self.induced(squared_euclidean(a, b))
    }

    fn precompute(&mut self) {
        self.norms = Some(squared_norms(self.points));
    }

    fn reset(&mut self) {
        self.norms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_points() -> ndarray::Array2<f64> {
        array![[0.0, 0.0], [3.0, 4.0], [1.0, 1.0], [-2.0, 0.5]]
    }

    #[test]
    fn test_euclidean_known_distance() {
        let points = sample_points();
        let dist = Euclidean::new(&points);
        assert!((dist.distance(0, 1) - 5.0).abs() < 1e-12);
        assert!(dist.distance(2, 2).abs() < 1e-12);
    }

    #[test]
    fn test_euclidean_symmetric() {
        let points = sample_points();
        let dist = Euclidean::new(&points);
        for i in 0..4 {
            for j in 0..4 {
                assert!((dist.distance(i, j) - dist.distance(j, i)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_euclidean_precompute_consistent() {
        let points = sample_points();
        let mut dist = Euclidean::new(&points);

        let plain: Vec<f64> = (0..4)
            .flat_map(|i| (0..4).map(move |j| (i, j)))
            .map(|(i, j)| dist.distance(i, j))
            .collect();

        dist.precompute();
        let cached: Vec<f64> = (0..4)
            .flat_map(|i| (0..4).map(move |j| (i, j)))
            .map(|(i, j)| dist.distance(i, j))
            .collect();
        dist.reset();

        for (a, b) in plain.iter().zip(cached.iter()) {
            assert!((a - b).abs() < 1e-9, "cached {b} differs from plain {a}");
        }
    }

    #[test]
    fn test_euclidean_distance_to_matches_pairwise() {
        let points = sample_points();
        let dist = Euclidean::new(&points);
        let target = points.row(1);
        assert!((dist.distance_to(0, target) - dist.distance(0, 1)).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_kernel_identity_and_range() {
        let points = sample_points();
        let dist = GaussianKernelDistance::new(&points, 2.0).unwrap();
        // d(x, x) = 0; d bounded by sqrt(2) as the kernel decays to zero.
        assert!(dist.distance(1, 1).abs() < 1e-12);
        for i in 0..4 {
            for j in 0..4 {
                let d = dist.distance(i, j);
                assert!((0.0..=2.0f64.sqrt() + 1e-12).contains(&d));
            }
        }
    }

    #[test]
    fn test_gaussian_kernel_monotone_in_euclidean() {
        let points = sample_points();
        let euc = Euclidean::new(&points);
        let gauss = GaussianKernelDistance::new(&points, 5.0).unwrap();
        // (0,0) is closer to (1,1) than to (3,4) under both metrics.
        assert!(euc.distance(0, 2) < euc.distance(0, 1));
        assert!(gauss.distance(0, 2) < gauss.distance(0, 1));
    }

    #[test]
    fn test_gaussian_kernel_rejects_bad_width() {
        let points = sample_points();
        assert!(GaussianKernelDistance::new(&points, 0.0).is_err());
        assert!(GaussianKernelDistance::new(&points, -1.0).is_err());
    }
}
