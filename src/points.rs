//! Read-only access to the point set being clustered.
//!
//! The engine never owns the data. Callers keep the points alive for the
//! duration of a training call and hand the engine a borrowed view through
//! the [`PointSet`] trait. Implementations must be rectangular: every
//! `vector(i)` has length `dimensionality()`.

use ndarray::{Array2, ArrayView1};

/// Borrowed, immutable view of N points of dimensionality D.
pub trait PointSet: Sync {
    /// Number of points N.
    fn num_points(&self) -> usize;

    /// Dimensionality D of each point.
    fn dimensionality(&self) -> usize;

    /// The i-th point as a D-length view.
    fn vector(&self, i: usize) -> ArrayView1<'_, f64>;
}

/// Row-major matrix of points: one point per row.
impl PointSet for Array2<f64> {
    fn num_points(&self) -> usize {
        self.nrows()
    }

    fn dimensionality(&self) -> usize {
        self.ncols()
    }

    fn vector(&self, i: usize) -> ArrayView1<'_, f64> {
        self.row(i)
    }
}

/// One `Vec` per point. All rows must share the same length.
impl PointSet for [Vec<f64>] {
    fn num_points(&self) -> usize {
        self.len()
    }

    fn dimensionality(&self) -> usize {
        self.first().map_or(0, Vec::len)
    }

    fn vector(&self, i: usize) -> ArrayView1<'_, f64> {
        ArrayView1::from(self[i].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_array2_point_set() {
        let data = array![[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]];
        assert_eq!(data.num_points(), 3);
        assert_eq!(data.dimensionality(), 2);
        assert_eq!(data.vector(1)[0], 2.0);
        assert_eq!(data.vector(2)[1], 5.0);
    }

    #[test]
    fn test_vec_point_set() {
        let data = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let points: &[Vec<f64>] = &data;
        assert_eq!(points.num_points(), 2);
        assert_eq!(points.dimensionality(), 3);
        assert_eq!(points.vector(1)[2], 6.0);
    }

    #[test]
    fn test_empty_vec_point_set() {
        let data: Vec<Vec<f64>> = vec![];
        let points: &[Vec<f64>] = &data;
        assert_eq!(points.num_points(), 0);
        assert_eq!(points.dimensionality(), 0);
    }
}
