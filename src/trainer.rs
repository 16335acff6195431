//! Builds and trains networks from labelled example data.
//!
//! The trainer batches inputs and runs the forward pass over each batch.
//! Outputs and targets are reduced to a single error vector per batch,
//! which is then fed back through the network. Training error is computed
//! once per batch, matching how the backward pass consumes the
//! batch-averaged signal.

use itertools::multizip;

use crate::error::{Error, Result};
use crate::feed_forward::Network;
use crate::layer::{Layer, LayerKind};

/// The learning mode to use for training
#[derive(Copy, Clone, Debug)]
pub enum LearningMode {
    /// Apply weight updates after every training example
    Stochastic,
    /// Apply weight updates in batches of the provided size
    ///
    /// Must be nonzero and no larger than the total number of training
    /// instances.
    Batch(usize),
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug)]
pub enum Logging {
    /// No logs will be printed
    Silent,
    /// A summary will be printed at completion
    Completion,
    /// A summary will be printed after every `n` training iterations
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the current `iteration` of training.
    fn iteration(&self, iteration: usize, training_error: f64) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && iteration % freq == 0 {
                println!("Iteration {}:\tMSE={}", iteration, training_error);
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, iterations: usize, training_error: f64) {
        if let Logging::Silent = self {
            return;
        }
        println!("Training completed after {} iterations.", iterations);
        println!("Final MSE: {}", training_error);
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug)]
pub enum StopCondition {
    /// Stops after the provided number of training iterations
    Iterations(usize),
    /// Stops when the training error drops below the provided threshold
    ErrorThreshold(f64),
}

impl StopCondition {
    /// Returns true if training is complete.
    fn should_stop(&self, iteration: usize, training_error: f64) -> bool {
        match *self {
            StopCondition::Iterations(iterations) => iteration >= iterations,
            StopCondition::ErrorThreshold(threshold) => training_error < threshold,
        }
    }
}

/// Trains a new `Network` object
#[derive(Debug)]
pub struct Trainer {
    layer_sizes: Vec<usize>,
    learning_mode: LearningMode,
    learning_rate: f64,
    logging: Logging,
    stop_condition: StopCondition,
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// Arguments:
    ///  * `layers` - the number of neurons to use at each layer. Must
    ///               contain at least an input and an output layer.
    ///
    /// The trainer is initialized with some default values. These defaults
    /// are:
    ///
    /// * A stochastic learning mode.
    /// * A learning rate of 0.1.
    /// * Stops after 1000 training iterations.
    /// * Logs on training completion.
    pub fn new(layers: &[usize]) -> Self {
        Trainer {
            layer_sizes: layers.into(),
            learning_mode: LearningMode::Stochastic,
            learning_rate: 0.1,
            logging: Logging::Completion,
            stop_condition: StopCondition::Iterations(1000),
        }
    }

    /// Sets the `LearningMode` to use for training.
    pub fn learning_mode(mut self, mode: LearningMode) -> Self {
        self.learning_mode = mode;
        self
    }

    /// Sets the learning rate to use during gradient descent.
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish training.
    pub fn stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }

    /// Trains a network using the provided labelled data.
    ///
    /// The provided `examples` should be a list of labelled data, where
    /// each element takes the form `(network input, expected output)`.
    ///
    /// Returns:
    ///   A trained neural network, or an error if invalid training
    ///   parameters were provided.
    pub fn train<I, O>(self, examples: &[(I, O)]) -> Result<Network>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        let mut network = Network::new(&self.layer_sizes, self.learning_rate)?;
        let batch_size = match self.learning_mode {
            LearningMode::Stochastic => 1,
            LearningMode::Batch(size) => size,
        };
        self.validate(examples, batch_size)?;

        let mut probe = Layer::new(network.output_len(), LayerKind::Linear);
        let mut iteration = 0;
        let mut training_error;
        loop {
            training_error = 0.0;
            for chunk in examples.chunks(batch_size) {
                let inputs: Vec<Vec<f64>> = chunk
                    .iter()
                    .map(|&(ref input, _)| input.as_ref().to_vec())
                    .collect();
                let pass = network.forward_spread(&inputs);

                // One error vector per batch: output minus target, averaged
                // over the chunk.
                let mut err = vec![0.0; network.output_len()];
                for (output, &(_, ref expected)) in pass.outputs.iter().zip(chunk) {
                    for (e, o, t) in
                        multizip((err.iter_mut(), output.iter(), expected.as_ref().iter()))
                    {
                        *e += o - t;
                    }
                    probe.input(output);
                    training_error += probe.variance(expected.as_ref()).iter().sum::<f64>()
                        / output.len() as f64;
                }
                for e in &mut err {
                    *e /= chunk.len() as f64;
                }

                network.back_propagation(&pass, &err);
            }
            training_error /= 2.0 * examples.len() as f64;
            iteration += 1;

            self.logging.iteration(iteration, training_error);
            if self.stop_condition.should_stop(iteration, training_error) {
                break;
            }
        }
        self.logging.completion(iteration, training_error);
        Ok(network)
    }

    /// Verifies that the provided examples fit the network, returning an
    /// error if something is wrong.
    fn validate<I, O>(&self, examples: &[(I, O)], batch_size: usize) -> Result<()>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        if batch_size == 0 || batch_size > examples.len() {
            return Err(Error::BadBatchSize);
        }
        let input_len = self.layer_sizes[0];
        let output_len = self.layer_sizes[self.layer_sizes.len() - 1];
        for (index, &(ref input, ref output)) in examples.iter().enumerate() {
            if input.as_ref().len() != input_len || output.as_ref().len() != output_len {
                return Err(Error::BadExample {
                    index,
                    input: input.as_ref().len(),
                    output: output.as_ref().len(),
                });
            }
        }
        Ok(())
    }
}
