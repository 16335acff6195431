use std::f64::consts::PI;
use std::ops::{Index, IndexMut};
use std::os::raw::c_int;

use rand::distributions::{IndependentSample, Sample};
use rand::Rng;
use rblas::attribute::Order;
use rblas::Matrix;
use serde_derive::{Deserialize, Serialize};

/// A dense 2-D weight matrix.
///
/// Entry `(i, j)` is the weight from unit `i` of the source layer to unit
/// `j` of the destination layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mat {
    rows: usize,
    cols: usize,
    data: Vec<f64>, // row-major array
}

impl Mat {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Mat {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix with every entry sampled independently from
    /// `distribution`.
    pub fn random<D>(distribution: D, rows: usize, cols: usize) -> Self
    where
        D: IndependentSample<f64>,
    {
        let mut rng = rand::thread_rng();
        let mut data = Vec::with_capacity(rows * cols);
        for _ in 0..(rows * cols) {
            data.push(distribution.ind_sample(&mut rng));
        }
        Mat { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns row `i` as a slice of `cols` entries.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

impl Index<(usize, usize)> for Mat {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(i < self.rows && j < self.cols, "matrix index out of range");
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Mat {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        assert!(i < self.rows && j < self.cols, "matrix index out of range");
        &mut self.data[i * self.cols + j]
    }
}

impl Matrix<f64> for Mat {
    fn rows(&self) -> c_int {
        self.rows as c_int
    }

    fn cols(&self) -> c_int {
        self.cols as c_int
    }

    fn as_ptr(&self) -> *const f64 {
        self.data.as_ptr()
    }

    fn as_mut_ptr(&mut self) -> *mut f64 {
        self.data.as_mut_ptr()
    }

    fn order(&self) -> Order {
        Order::RowMajor
    }
}

/// The weight initializer: evaluates the Gaussian probability density at a
/// single uniformly drawn point in `[0, 1)`.
///
/// This is a density evaluation, not a Gaussian sample. Every draw lands
/// in a narrow positive band rather than a zero-centered spread.
#[derive(Copy, Clone, Debug)]
pub struct GaussDensity {
    mean: f64,
    stddev: f64,
}

impl GaussDensity {
    pub fn new(mean: f64, stddev: f64) -> Self {
        assert!(stddev > 0.0, "standard deviation must be positive");
        GaussDensity { mean, stddev }
    }
}

impl Sample<f64> for GaussDensity {
    fn sample<R: Rng>(&mut self, rng: &mut R) -> f64 {
        self.ind_sample(rng)
    }
}

impl IndependentSample<f64> for GaussDensity {
    fn ind_sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let x = rng.next_f64();
        let norm = 1.0 / ((2.0 * PI).sqrt() * self.stddev);
        norm * (-(x - self.mean).powi(2) / (2.0 * self.stddev * self.stddev)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_shape_and_indexing() {
        let mut m = Mat::zeros(2, 3);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.row(1), &[0.0, 0.0, 0.0]);

        m[(1, 2)] = 5.0;
        assert_eq!(m[(1, 2)], 5.0);
        assert_eq!(m[(0, 2)], 0.0);
        assert_eq!(m.row(1), &[0.0, 0.0, 5.0]);
    }

    #[test]
    fn gauss_density_initializes_in_a_narrow_positive_band() {
        // The pdf of N(0, 0.25) over [0, 1) peaks at 1/(sqrt(2*pi)*0.25)
        // and bottoms out just above that peak times e^-8.
        let peak = 1.0 / ((2.0 * PI).sqrt() * 0.25);
        let m = Mat::random(GaussDensity::new(0.0, 0.25), 8, 8);
        for i in 0..m.rows() {
            for &w in m.row(i) {
                assert!(w > peak * (-8.0f64).exp() * 0.999);
                assert!(w <= peak);
            }
        }
    }
}
