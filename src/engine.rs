//! K-means engine: configuration, training orchestration, trained model.
//!
//! # Pipeline
//!
//! 1. **Validate** the configuration against the point set, before any
//!    allocation or mutation.
//! 2. **Initialize** centers: user-supplied > k-means++ > random sampling.
//! 3. **Refine**: full-batch Lloyd or stochastic mini-batch.
//! 4. **Estimate radii** from the frozen centers.
//!
//! Training is a single synchronous call. The engine borrows the point set
//! and the distance provider; it never takes ownership and never writes into
//! caller data. Retraining builds a fresh [`KMeansModel`] from scratch —
//! there is no partially-trained state.

use crate::distance::DistanceProvider;
use crate::error::{Error, Result};
use crate::init;
use crate::lloyd;
use crate::minibatch::{self, BatchSampling};
use crate::points::PointSet;
use crate::radius;
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;

/// Refinement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainMethod {
    /// Full-batch Lloyd iterations.
    Lloyd,
    /// Stochastic mini-batch updates.
    MiniBatch,
}

/// K-means clustering engine.
///
/// Builder-style configuration; all parameters are checked at the start of
/// [`KMeans::fit`] and an invalid configuration never touches any state.
#[derive(Debug, Clone)]
pub struct KMeans {
    /// Number of clusters.
    k: usize,
    /// Maximum Lloyd iterations.
    max_iter: usize,
    /// Refinement strategy.
    method: TrainMethod,
    /// Use greedy k-means++ seeding when no centers are supplied.
    use_kmeanspp: bool,
    /// Keep supplied centers untouched (Lloyd becomes assignment-only).
    fixed_centers: bool,
    /// Stop Lloyd early once the assignment repeats.
    stop_on_stable: bool,
    /// Points per mini-batch.
    batch_size: usize,
    /// Number of mini-batch iterations.
    minibatch_iterations: usize,
    /// Mini-batch sampling policy.
    sampling: BatchSampling,
    /// User-supplied initial centers, shape (k, d).
    initial_centers: Option<Array2<f64>>,
    /// Random seed for reproducibility.
    seed: Option<u64>,
}

impl KMeans {
    /// Create an engine for `k` clusters with Lloyd refinement.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            method: TrainMethod::Lloyd,
            use_kmeanspp: false,
            fixed_centers: false,
            stop_on_stable: true,
            batch_size: 0,
            minibatch_iterations: 0,
            sampling: BatchSampling::WithReplacement,
            initial_centers: None,
            seed: None,
        }
    }

    /// Set the refinement strategy.
    pub fn with_method(mut self, method: TrainMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the maximum number of Lloyd iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Enable or disable k-means++ seeding.
    pub fn with_kmeanspp(mut self, use_kmeanspp: bool) -> Self {
        self.use_kmeanspp = use_kmeanspp;
        self
    }

    /// Freeze the centers: Lloyd only assigns, never updates. Ignored by
    /// mini-batch refinement.
    pub fn with_fixed_centers(mut self, fixed: bool) -> Self {
        self.fixed_centers = fixed;
        self
    }

    /// Control early stopping of Lloyd on a repeated assignment. When
    /// disabled the loop always runs `max_iter` rounds.
    pub fn with_stop_on_stable(mut self, stop: bool) -> Self {
        self.stop_on_stable = stop;
        self
    }

    /// Set the mini-batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the number of mini-batch iterations.
    pub fn with_minibatch_iterations(mut self, iterations: usize) -> Self {
        self.minibatch_iterations = iterations;
        self
    }

    /// Set both mini-batch parameters at once.
    pub fn with_minibatch_parameters(mut self, batch_size: usize, iterations: usize) -> Self {
        self.batch_size = batch_size;
        self.minibatch_iterations = iterations;
        self
    }

    /// Set the mini-batch sampling policy.
    pub fn with_batch_sampling(mut self, sampling: BatchSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Supply initial centers, shape `(k, d)`. Takes precedence over both
    /// k-means++ and random seeding.
    pub fn with_initial_centers(mut self, centers: Array2<f64>) -> Self {
        self.initial_centers = Some(centers);
        self
    }

    /// Set a random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate<P: PointSet + ?Sized>(&self, points: &P) -> Result<()> {
        let n = points.num_points();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if points.dimensionality() == 0 {
            return Err(Error::InvalidParameter {
                name: "dimensionality",
                message: "points must have at least one feature",
            });
        }
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "number of clusters must be > 0",
            });
        }
        if self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "maximum number of iterations must be > 0",
            });
        }
        if self.method == TrainMethod::MiniBatch {
            if self.batch_size == 0 {
                return Err(Error::InvalidParameter {
                    name: "batch_size",
                    message: "batch size must be > 0 for mini-batch training",
                });
            }
            if self.minibatch_iterations == 0 {
                return Err(Error::InvalidParameter {
                    name: "minibatch_iterations",
                    message: "iteration count must be > 0 for mini-batch training",
                });
            }
        }
        if let Some(centers) = &self.initial_centers {
            init::validate_user_centers(centers, self.k, points.dimensionality())?;
        }
        Ok(())
    }

    /// Train on `points` under `distance` and return the frozen model.
    ///
    /// The distance provider is taken mutably for its `precompute`/`reset`
    /// lifecycle; between the hooks it is only invoked read-only. The
    /// returned model borrows the provider for on-demand assignment.
    pub fn fit<'a, P, D>(&self, points: &P, distance: &'a mut D) -> Result<KMeansModel<'a, D>>
    where
        P: PointSet + ?Sized,
        D: DistanceProvider + ?Sized,
    {
        self.validate(points)?;

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut centers = if let Some(centers) = &self.initial_centers {
            centers.clone()
        } else if self.use_kmeanspp {
            init::kmeanspp_centers(points, &mut *distance, self.k, &mut rng)
        } else {
            init::random_centers(points, self.k, &mut rng)
        };

        match self.method {
            TrainMethod::Lloyd => lloyd::refine(
                points,
                &mut *distance,
                &mut centers,
                self.max_iter,
                self.fixed_centers,
                self.stop_on_stable,
            ),
            TrainMethod::MiniBatch => minibatch::refine(
                points,
                &mut *distance,
                &mut centers,
                self.batch_size,
                self.minibatch_iterations,
                self.sampling,
                &mut rng,
            ),
        }

        let radii = radius::cluster_radii(&centers);

        Ok(KMeansModel {
            centers,
            radii,
            distance,
        })
    }
}

/// A trained model: frozen centers, per-cluster radii, and on-demand
/// nearest-center assignment through the distance provider it was trained
/// with.
pub struct KMeansModel<'a, D: DistanceProvider + ?Sized> {
    centers: Array2<f64>,
    radii: Array1<f64>,
    distance: &'a D,
}

impl<D: DistanceProvider + ?Sized> KMeansModel<'_, D> {
    /// The (k, d) centers matrix.
    pub fn centers(&self) -> &Array2<f64> {
        &self.centers
    }

    /// The length-k radius vector.
    pub fn radii(&self) -> &Array1<f64> {
        &self.radii
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centers.nrows()
    }

    /// Dimensionality of the centers.
    pub fn dimensions(&self) -> usize {
        self.centers.ncols()
    }

    /// Nearest-center index for an arbitrary D-length vector.
    pub fn assign(&self, point: ArrayView1<'_, f64>) -> Result<usize> {
        if point.len() != self.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                found: point.len(),
            });
        }

        let mut best_cluster = 0;
        let mut best_dist = f64::INFINITY;
        for (c, center) in self.centers.outer_iter().enumerate() {
            let dist = self.distance.between(point, center);
            if dist < best_dist {
                best_dist = dist;
                best_cluster = c;
            }
        }
        Ok(best_cluster)
    }

    /// Nearest-center index for training point `i`.
    pub fn assign_index(&self, i: usize) -> usize {
        let mut best_cluster = 0;
        let mut best_dist = f64::INFINITY;
        for (c, center) in self.centers.outer_iter().enumerate() {
            let dist = self.distance.distance_to(i, center);
            if dist < best_dist {
                best_dist = dist;
                best_cluster = c;
            }
        }
        best_cluster
    }
}
