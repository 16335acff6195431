//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network).
//!
//! The network is built from a list of layer widths and trained with plain
//! gradient descent. A forward pass consumes a whole batch and returns a
//! [`ForwardPass`] holding the per-example outputs and the batch-averaged
//! pre-activation sums. The backward pass takes that signal as an explicit
//! parameter and applies one gradient-descent step to the weights.
//!
//! # Example
//!
//! ```
//! use nnw::feed_forward::Network;
//!
//! let mut network = Network::new(&[2, 3, 1], 0.5).unwrap();
//!
//! // One forward pass over a batch of two inputs...
//! let batch = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
//! let pass = network.forward_spread(&batch);
//! assert_eq!(pass.outputs.len(), 2);
//! assert_eq!(pass.outputs[0].len(), 1);
//!
//! // ...then one gradient-descent step against a batch error.
//! let err = vec![(pass.outputs[0][0] + pass.outputs[1][0]) / 2.0 - 1.0];
//! network.back_propagation(&pass, &err);
//! ```
//!
//! Contract violations panic with a descriptive message: an empty batch,
//! an input vector that does not match the input layer, or an error vector
//! that does not match the output layer. Construction and persistence
//! problems are reported as [`crate::Error`] values.

use std::fs::File;
use std::path::Path;

use itertools::Itertools;
use rblas::matrix_vector::ops::Ger;

use crate::error::{Error, Result};
use crate::layer::{Layer, LayerKind};
use crate::matrix::{GaussDensity, Mat};

/// The fixed file name used by [`Network::save_weights`] and
/// [`Network::load_weights`].
pub const WEIGHTS_FILE: &str = "w.json";

/// The result of one batched forward pass.
///
/// Holds one output vector per input, in input order, and one accumulator
/// layer per linear layer carrying the batch-mean pre-activation sums.
/// The backward pass reads the accumulators; they are rebuilt from zero on
/// every forward pass.
#[derive(Clone, Debug)]
pub struct ForwardPass {
    /// One output vector per input, in the same order as the inputs.
    pub outputs: Vec<Vec<f64>>,
    accumulators: Vec<Layer>,
}

impl ForwardPass {
    /// Returns the batch-mean pre-activation sums for linear layer `k`.
    pub fn batch_mean(&self, k: usize) -> Vec<f64> {
        self.accumulators[k].output()
    }
}

/// A feedforward neural network.
#[derive(Clone, Debug)]
pub struct Network {
    layer_sizes: Vec<usize>,
    learning_rate: f64,
    layers: Vec<Layer>,
    weights: Vec<Mat>,
}

impl Network {
    /// Creates a new, untrained network.
    ///
    /// Arguments:
    ///  * `layer_sizes` - the width of each layer, input through output.
    ///  * `learning_rate` - the gradient descent step size.
    ///
    /// For sizes `[s0, .., sn]` this builds the layer sequence
    /// `linear(s0), linear(s1), activation(s1), .., linear(sn)`: every
    /// hidden linear layer is followed by its own activation layer, and the
    /// output layer is squashed explicitly during the forward pass instead.
    /// One weight matrix of shape `s(i-1) x si` connects each pair of
    /// consecutive linear layers.
    pub fn new(layer_sizes: &[usize], learning_rate: f64) -> Result<Network> {
        if layer_sizes.len() < 2 {
            return Err(Error::TooFewLayers(layer_sizes.len()));
        }
        for (i, &size) in layer_sizes.iter().enumerate() {
            if size == 0 {
                return Err(Error::EmptyLayer(i));
            }
        }
        if learning_rate <= 0.0 {
            return Err(Error::InvalidLearningRate(learning_rate));
        }

        let mut layers = Vec::new();
        let mut weights = Vec::new();
        for (i, &size) in layer_sizes.iter().enumerate() {
            layers.push(Layer::new(size, LayerKind::Linear));
            if i > 0 {
                weights.push(Mat::random(
                    GaussDensity::new(0.0, 0.25),
                    layer_sizes[i - 1],
                    size,
                ));
                if i < layer_sizes.len() - 1 {
                    layers.push(Layer::new(size, LayerKind::Activation));
                }
            }
        }
        Ok(Network {
            layer_sizes: layer_sizes.to_vec(),
            learning_rate,
            layers,
            weights,
        })
    }

    /// Returns the width of the input layer.
    pub fn input_len(&self) -> usize {
        self.layer_sizes[0]
    }

    /// Returns the width of the output layer.
    pub fn output_len(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Returns the weight matrices, ordered input to output.
    pub fn weights(&self) -> &[Mat] {
        &self.weights
    }

    /// Feeds a batch of inputs through the network.
    ///
    /// Returns one output vector per input plus the batch-averaged
    /// pre-activation sums consumed by [`Network::back_propagation`].
    ///
    /// Panics on an empty batch or on an input whose length does not match
    /// the input layer.
    pub fn forward_spread(&mut self, inputs: &[Vec<f64>]) -> ForwardPass {
        assert!(!inputs.is_empty(), "forward pass needs at least one input");

        let mut accumulators: Vec<Layer> = self
            .layer_sizes
            .iter()
            .map(|&size| Layer::new(size, LayerKind::Linear))
            .collect();
        let mut outputs = Vec::with_capacity(inputs.len());

        for input in inputs {
            assert_eq!(
                input.len(),
                self.input_len(),
                "input length must match the input layer"
            );
            self.layers[0].input(input);
            // The input accumulator is loaded by replacement, so after
            // averaging it holds the last input over the batch size.
            accumulators[0].input(input);

            let mut weight_index = 0;
            let mut accumulator_index = 0;
            for i in 0..self.layers.len() - 1 {
                match self.layers[i].kind() {
                    LayerKind::Linear => {
                        let sum = self.layers[i].right_product(&self.weights[weight_index]);
                        self.layers[i + 1].input(&sum);
                        accumulators[accumulator_index + 1].plus(&sum);
                        weight_index += 1;
                        accumulator_index += 1;
                    }
                    LayerKind::Activation => {
                        // The activation layer right before the output acts
                        // as the terminal squashing step.
                        let kind = if i == self.layers.len() - 2 {
                            "Sigmoid"
                        } else {
                            "ReLU"
                        };
                        let activated = self.layers[i].activate(kind);
                        self.layers[i + 1].input(&activated);
                    }
                }
            }
            outputs.push(self.layers[self.layers.len() - 1].output());
        }

        for accumulator in &mut accumulators {
            accumulator.divide(inputs.len() as f64);
        }
        ForwardPass {
            outputs,
            accumulators,
        }
    }

    /// Applies one gradient-descent step against a batch error vector.
    ///
    /// `err` is caller-supplied (for example, output minus target averaged
    /// over the batch) and is applied against the batch-averaged signal in
    /// `pass`, so training error is consumed once per batch. Walks the
    /// accumulators from last to first, pushing the error backward through
    /// each weight matrix and updating that matrix in place; stops at the
    /// input layer, which no matrix feeds.
    ///
    /// Panics if `err` does not match the output layer.
    pub fn back_propagation(&mut self, pass: &ForwardPass, err: &[f64]) {
        assert_eq!(
            err.len(),
            self.output_len(),
            "error vector must match the output layer"
        );

        let last = pass.accumulators.len() - 1;
        let mut cur_err = err.to_vec();
        preprocess_sigmoid(&mut cur_err, &pass.accumulators[last].output());

        // Carries the current error so the layer product can push it
        // backward; re-input resizes it at every hop.
        let mut signal = Layer::new(err.len(), LayerKind::Linear);
        signal.input(&cur_err);

        let mut k = last;
        while k > 0 {
            let next_err = signal.left_product(&self.weights[k - 1]);
            let previous = pass.accumulators[k - 1].output();
            // Rank-1 update: weights[k-1][i][j] -= rate * previous[i] * err[j].
            f64::ger(
                &-self.learning_rate,
                &previous[..],
                &cur_err[..],
                &mut self.weights[k - 1],
            );
            cur_err = next_err;
            signal.input(&cur_err);
            k -= 1;
        }
    }

    /// Serializes the weight matrices to [`WEIGHTS_FILE`] as JSON.
    pub fn save_weights(&self) -> Result<()> {
        self.save_weights_to(WEIGHTS_FILE)
    }

    /// Serializes the weight matrices to `path` as JSON.
    pub fn save_weights_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(file, &self.weights)?;
        Ok(())
    }

    /// Restores the weight matrices from [`WEIGHTS_FILE`].
    pub fn load_weights(&mut self) -> Result<()> {
        self.load_weights_from(WEIGHTS_FILE)
    }

    /// Restores the weight matrices from `path`.
    ///
    /// The stored matrices must match this network's topology exactly;
    /// a mismatch leaves the current weights untouched.
    pub fn load_weights_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path)?;
        let weights: Vec<Mat> = serde_json::from_reader(file)?;
        let matches = weights.len() == self.weights.len()
            && weights
                .iter()
                .zip(&self.weights)
                .all(|(new, old)| new.rows() == old.rows() && new.cols() == old.cols());
        if !matches {
            return Err(Error::WeightShapeMismatch);
        }
        self.weights = weights;
        Ok(())
    }
}

/// Scales each error component by the product of the accumulator value at
/// its own index and the value one position to the left. The first
/// component has no left neighbor and is scaled by its own value squared.
fn preprocess_sigmoid(err: &mut [f64], values: &[f64]) {
    assert!(
        values.len() >= err.len(),
        "preprocessing needs an accumulator at least as long as the error"
    );
    if let Some(first) = err.first_mut() {
        *first *= values[0] * values[0];
    }
    for (e, (left, v)) in err[1..].iter_mut().zip(values.iter().tuple_windows::<(_, _)>()) {
        *e *= v * left;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed(mut network: Network) -> Network {
        network.weights = network
            .weights
            .iter()
            .map(|w| Mat::zeros(w.rows(), w.cols()))
            .collect();
        network
    }

    #[test]
    fn construction_is_validated() {
        assert!(Network::new(&[], 0.1).is_err());
        assert!(Network::new(&[3], 0.1).is_err());
        assert!(Network::new(&[2, 0, 1], 0.1).is_err());
        assert!(Network::new(&[2, 1], 0.0).is_err());
        assert!(Network::new(&[2, 1], -1.0).is_err());
        assert!(Network::new(&[2, 1], 0.1).is_ok());
    }

    #[test]
    fn topology_alternates_linear_and_activation() {
        let network = Network::new(&[2, 3, 1], 0.1).unwrap();

        let shape: Vec<(LayerKind, usize)> = network
            .layers
            .iter()
            .map(|l| (l.kind(), l.size()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (LayerKind::Linear, 2),
                (LayerKind::Linear, 3),
                (LayerKind::Activation, 3),
                (LayerKind::Linear, 1),
            ]
        );

        assert_eq!(network.weights.len(), 2);
        assert_eq!((network.weights[0].rows(), network.weights[0].cols()), (2, 3));
        assert_eq!((network.weights[1].rows(), network.weights[1].cols()), (3, 1));
    }

    #[test]
    fn zero_weights_leave_all_sums_zero() {
        let mut network = zeroed(Network::new(&[2, 3, 1], 0.1).unwrap());
        let pass = network.forward_spread(&[vec![1.0, -1.0]]);

        // Every pre-activation sum past the input is zero...
        assert_eq!(pass.batch_mean(1), vec![0.0, 0.0, 0.0]);
        assert_eq!(pass.batch_mean(2), vec![0.0]);
        // ...and the output is the terminal squash of zero.
        assert_eq!(pass.outputs, vec![vec![0.25]]);
    }

    #[test]
    fn zero_weights_without_hidden_layers_output_zero() {
        // A two-layer network has no activation layer, so nothing squashes
        // the zero sums.
        let mut network = zeroed(Network::new(&[2, 1], 0.1).unwrap());
        let pass = network.forward_spread(&[vec![1.0, 2.0]]);
        assert_eq!(pass.outputs, vec![vec![0.0]]);
    }

    #[test]
    fn forward_is_deterministic() {
        let mut network = Network::new(&[2, 4, 4, 2], 0.1).unwrap();
        let batch = vec![vec![0.3, -0.7], vec![1.0, 1.0]];
        let first = network.forward_spread(&batch);
        let second = network.forward_spread(&batch);
        assert_eq!(first.outputs, second.outputs);
        for k in 0..4 {
            assert_eq!(first.batch_mean(k), second.batch_mean(k));
        }
    }

    #[test]
    fn accumulators_hold_the_batch_mean() {
        let mut network = Network::new(&[2, 3, 1], 0.1).unwrap();
        let batch = vec![vec![2.0, 0.0], vec![0.0, 2.0]];
        let pass = network.forward_spread(&batch);

        // Hidden sums: mean over the batch of input * W0, per column.
        let w = &network.weights[0];
        let expected: Vec<f64> =
            (0..3).map(|j| (2.0 * w[(0, j)] + 2.0 * w[(1, j)]) / 2.0).collect();
        for (actual, expected) in pass.batch_mean(1).iter().zip(&expected) {
            assert!((actual - expected).abs() < 1e-12);
        }

        // The input accumulator holds the last input over the batch size.
        assert_eq!(pass.batch_mean(0), vec![0.0, 1.0]);
    }

    #[test]
    fn back_propagation_updates_the_weights() {
        let mut network = Network::new(&[2, 3, 1], 0.5).unwrap();
        let before = network.weights.clone();

        let pass = network.forward_spread(&[vec![1.0, 0.5]]);
        network.back_propagation(&pass, &[1.0]);

        assert_eq!(network.weights.len(), before.len());
        assert_ne!(network.weights[1], before[1]);
        assert_ne!(network.weights[0], before[0]);
    }

    #[test]
    fn single_weight_update_by_hand() {
        // One weight w=0.5, input x=1, error e=1, learning rate 0.1:
        // the batch mean is m = x*w = 0.5, preprocessing squares it into
        // e' = e * m * m = 0.25, and the update is w -= 0.1 * x * e'.
        let mut network = zeroed(Network::new(&[1, 1], 0.1).unwrap());
        network.weights[0][(0, 0)] = 0.5;

        let pass = network.forward_spread(&[vec![1.0]]);
        network.back_propagation(&pass, &[1.0]);

        assert!((network.weights[0][(0, 0)] - 0.475).abs() < 1e-12);
    }

    #[test]
    fn weight_update_is_the_scaled_outer_product() {
        // W = [[1 0 0], [0 1 0]], input [1 2]: the hidden sums are [1 2 0].
        // Preprocessing shifts the derivative read, so err [1 1 1] becomes
        // [1*1*1, 1*2*1, 1*0*2] = [1 2 0], and each weight entry moves by
        // -0.1 * input[i] * err[j].
        let mut network = zeroed(Network::new(&[2, 3], 0.1).unwrap());
        network.weights[0][(0, 0)] = 1.0;
        network.weights[0][(1, 1)] = 1.0;

        let pass = network.forward_spread(&[vec![1.0, 2.0]]);
        network.back_propagation(&pass, &[1.0, 1.0, 1.0]);

        let expected = [[0.9, -0.2, 0.0], [-0.2, 0.6, 0.0]];
        for i in 0..2 {
            for j in 0..3 {
                assert!(
                    (network.weights[0][(i, j)] - expected[i][j]).abs() < 1e-12,
                    "weight ({}, {})",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn weights_roundtrip_through_disk() {
        let path = std::env::temp_dir().join("nnw_weights_roundtrip.json");
        let network = Network::new(&[2, 3, 1], 0.1).unwrap();
        network.save_weights_to(&path).unwrap();

        let mut restored = Network::new(&[2, 3, 1], 0.1).unwrap();
        restored.load_weights_from(&path).unwrap();
        assert_eq!(restored.weights, network.weights);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn loading_mismatched_weights_fails() {
        let path = std::env::temp_dir().join("nnw_weights_mismatch.json");
        let network = Network::new(&[2, 3, 1], 0.1).unwrap();
        network.save_weights_to(&path).unwrap();

        let mut other = Network::new(&[2, 2, 1], 0.1).unwrap();
        let before = other.weights.clone();
        match other.load_weights_from(&path) {
            Err(Error::WeightShapeMismatch) => {}
            other => panic!("expected a shape mismatch, got {:?}", other),
        }
        assert_eq!(other.weights, before);

        std::fs::remove_file(&path).unwrap();
    }
}
