//! # kmeans
//!
//! K-means clustering engine over a borrowed point set and a pluggable
//! distance capability.
//!
//! The engine produces K cluster centers plus a per-cluster **radius**, a
//! separation heuristic blending the distances to the two nearest other
//! centers. Initialization is user-supplied centers, uniform random
//! sampling, or greedy k-means++ seeding; refinement is full-batch Lloyd
//! iterations or stochastic mini-batch updates.
//!
//! ```rust
//! use kmeans::{Euclidean, KMeans};
//! use ndarray::array;
//!
//! let points = array![
//!     [0.0, 0.0],
//!     [0.1, 0.1],
//!     [10.0, 10.0],
//!     [10.1, 10.1],
//! ];
//!
//! let mut distance = Euclidean::new(&points);
//! let model = KMeans::new(2)
//!     .with_kmeanspp(true)
//!     .with_seed(42)
//!     .fit(&points, &mut distance)
//!     .unwrap();
//!
//! assert_eq!(model.centers().shape(), &[2, 2]);
//! assert_eq!(model.assign_index(0), model.assign_index(1));
//! assert_ne!(model.assign_index(0), model.assign_index(2));
//! ```
//!
//! Distance providers and point sets are **borrowed, never owned**: the
//! caller keeps both alive for the training call, and the trained model
//! borrows the provider for on-demand assignment. With the default
//! `parallel` feature, assignment and seeding passes fan out across a
//! thread pool; results are identical with the feature disabled.

pub mod distance;
pub mod engine;
pub mod error;
mod init;
mod lloyd;
mod minibatch;
pub mod points;
mod radius;

pub use distance::{DistanceProvider, Euclidean, GaussianKernelDistance};
pub use engine::{KMeans, KMeansModel, TrainMethod};
pub use error::{Error, Result};
pub use minibatch::BatchSampling;
pub use points::PointSet;
