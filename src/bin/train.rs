use rand::distributions::{IndependentSample, Normal, Range};

use nnw::feed_forward::Network;
use nnw::trainer::{LearningMode, Logging, StopCondition, Trainer};

type Input = Vec<f64>;
type Output = Vec<f64>;

/// Noisy points on the unit circle, labelled by quadrant sign.
fn generate_data(num_samples: usize) -> Vec<(Input, Output)> {
    let mut rng = rand::thread_rng();
    let radians = Range::new(0.0, 2.0 * std::f64::consts::PI);
    let noise = Normal::new(0.0, 0.1);

    let mut data = Vec::new();
    for _ in 0..num_samples {
        let theta = radians.ind_sample(&mut rng);
        let dx = noise.ind_sample(&mut rng);
        let dy = noise.ind_sample(&mut rng);
        let point = vec![theta.cos() + dx, theta.sin() + dy];
        let class = if point[0] * point[1] > 0.0 {
            vec![1.0, 0.0]
        } else {
            vec![0.0, 1.0]
        };
        data.push((point, class));
    }
    data
}

fn score(set_name: &str, network: &mut Network, test_data: &[(Input, Output)]) {
    let mut num_correct = 0;
    for &(ref input, ref expected) in test_data {
        let pass = network.forward_spread(&[input.clone()]);
        let output = &pass.outputs[0];
        let class = if output[0] > output[1] { 0 } else { 1 };
        if expected[class] == 1.0 {
            num_correct += 1;
        }
    }
    println!(
        "{} set results: {} of {} correct",
        set_name,
        num_correct,
        test_data.len()
    );
}

fn main() {
    let training_data = generate_data(2_000);
    let mut network = Trainer::new(&[2, 5, 5, 2])
        .learning_mode(LearningMode::Batch(10))
        .learning_rate(0.05)
        .stop_condition(StopCondition::Iterations(200))
        .logging(Logging::Iterations(20))
        .train(&training_data)
        .unwrap();

    println!();
    score("Training", &mut network, &training_data);
    score("Test", &mut network, &generate_data(500));
}
