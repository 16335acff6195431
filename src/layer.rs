//! The layer primitive: a fixed-width vector of activations plus a role
//! tag, with the vector arithmetic both passes are built from.

use rblas::attribute::Transpose;
use rblas::matrix_vector::ops::Gemv;
use serde_derive::{Deserialize, Serialize};

use crate::activator::Activator;
use crate::matrix::Mat;

/// The role a layer plays in the network sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// Holds pre-activation sums produced by a weight-matrix product.
    Linear,
    /// Holds the elementwise nonlinearity of the preceding linear layer.
    Activation,
}

/// A single layer of the network.
///
/// `size` is fixed at creation; `values` is the only mutable state. It is
/// replaced wholesale by [`Layer::input`] and mutated elementwise by the
/// accumulator operations. The replacement buffer may have a different
/// length than the nominal size; error propagation relies on this.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layer {
    size: usize,
    kind: LayerKind,
    values: Vec<f64>,
}

impl Layer {
    pub fn new(size: usize, kind: LayerKind) -> Self {
        assert!(size > 0, "layer size must be positive");
        Layer {
            size,
            kind,
            values: vec![0.0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Replaces the value buffer with a copy of `v`.
    ///
    /// The new buffer's length may differ from the layer's nominal size.
    pub fn input(&mut self, v: &[f64]) {
        self.values = v.to_vec();
    }

    /// Returns a copy of the value buffer.
    pub fn output(&self) -> Vec<f64> {
        self.values.clone()
    }

    /// Multiplies the matrix against the values from the left:
    /// `out[i] = sum_j m[i][j] * values[j]`.
    ///
    /// Treating the values as an error signal and `m` as the forward weight
    /// matrix, this yields the upstream error.
    pub fn left_product(&self, m: &Mat) -> Vec<f64> {
        assert_eq!(
            self.values.len(),
            m.cols(),
            "left product needs as many values as matrix columns"
        );
        let mut out = vec![0.0; m.rows()];
        f64::gemv(
            Transpose::NoTrans,
            &1.0,
            m,
            &self.values[..],
            &1.0,
            &mut out[..],
        );
        out
    }

    /// Multiplies the values against the matrix from the left:
    /// `out[j] = sum_i values[i] * m[i][j]`.
    ///
    /// This is the forward direction: the result is the next layer's
    /// pre-activation input.
    pub fn right_product(&self, m: &Mat) -> Vec<f64> {
        assert_eq!(
            self.values.len(),
            m.rows(),
            "right product needs as many values as matrix rows"
        );
        let mut out = vec![0.0; m.cols()];
        f64::gemv(
            Transpose::Trans,
            &1.0,
            m,
            &self.values[..],
            &1.0,
            &mut out[..],
        );
        out
    }

    /// Applies the named activation elementwise, returning a new vector.
    ///
    /// An unrecognized name yields an all-zero vector rather than an error.
    pub fn activate(&self, kind: &str) -> Vec<f64> {
        match Activator::from_name(kind) {
            Some(a) => self.values.iter().map(|&x| a.f(x)).collect(),
            None => vec![0.0; self.values.len()],
        }
    }

    /// Applies the named activation's derivative elementwise, treating the
    /// current values as already-activated outputs.
    ///
    /// An unrecognized name yields an all-zero vector rather than an error.
    pub fn deactivate(&self, kind: &str) -> Vec<f64> {
        match Activator::from_name(kind) {
            Some(a) => self.values.iter().map(|&y| a.fprime(y)).collect(),
            None => vec![0.0; self.values.len()],
        }
    }

    /// Adds `v` elementwise into the value buffer.
    pub fn plus(&mut self, v: &[f64]) {
        assert_eq!(
            v.len(),
            self.values.len(),
            "cannot accumulate a vector of mismatched length"
        );
        for (value, x) in self.values.iter_mut().zip(v) {
            *value += x;
        }
    }

    /// Divides every value by `denominator`.
    pub fn divide(&mut self, denominator: f64) {
        assert!(denominator != 0.0, "cannot divide a layer by zero");
        for value in &mut self.values {
            *value /= denominator;
        }
    }

    /// Zeroes the value buffer.
    pub fn reset(&mut self) {
        for value in &mut self.values {
            *value = 0.0;
        }
    }

    /// Elementwise squared difference against `target`, for loss reporting.
    pub fn variance(&self, target: &[f64]) -> Vec<f64> {
        assert_eq!(
            target.len(),
            self.values.len(),
            "variance target must match the value buffer"
        );
        self.values
            .iter()
            .zip(target)
            .map(|(v, t)| (v - t) * (v - t))
            .collect()
    }
}
