//! A minimal feedforward neural network engine.
//!
//! Builds a multilayer perceptron from a list of layer widths, runs batched
//! forward inference, and trains the weight matrices with backpropagation
//! and plain gradient descent. Intended for small research and educational
//! use, not production serving.
//!
//! The pieces, bottom up:
//!
//! - [`activator`] - the activation functions and their derivatives.
//! - [`matrix`] - the weight matrix type and its random initializer.
//! - [`layer`] - a vector of activations plus the elementwise and
//!   matrix-vector operations both passes are built from.
//! - [`feed_forward`] - the network: topology construction, the batched
//!   forward pass, backpropagation, and weight persistence.
//! - [`trainer`] - a builder that drives training from labelled examples.

pub mod activator;
pub mod error;
pub mod feed_forward;
pub mod layer;
pub mod matrix;
pub mod trainer;

pub use crate::error::{Error, Result};
