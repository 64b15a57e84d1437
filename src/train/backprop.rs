use crate::activation::sigmoid_derivative_from_output;
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::gradients::GradientBuffers;
use crate::train::report::TrainingReport;
use crate::train::train_config::TrainConfig;

/// Full-batch backpropagation with gradient descent.
///
/// Every epoch accumulates the gradient of every training sample into
/// preallocated buffers, averages them over the sample count, and applies one
/// descent step per layer through `optimizer`. At every logging checkpoint
/// (`config.log_interval`, plus the first and last epoch) the full-dataset
/// cost is recomputed, emitted on the optional progress channel, and checked
/// against the convergence threshold for an early exit.
///
/// Returns a [`TrainingReport`]; running out of epochs without converging is
/// an ordinary outcome, not an error.
///
/// # Panics
/// Panics if the dataset is empty, if `inputs` and `expected_outputs` have
/// different row counts, or if their widths do not match the network's input
/// and output sizes.
pub fn train_backprop(
    network: &mut Network,
    inputs: &Matrix,
    expected_outputs: &Matrix,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> TrainingReport {
    assert!(inputs.rows() > 0, "training set must not be empty");
    assert!(
        inputs.rows() == expected_outputs.rows(),
        "train: {} input rows but {} expected output rows",
        inputs.rows(),
        expected_outputs.rows()
    );
    assert!(
        inputs.cols() == network.input_size(),
        "train: network takes {} inputs, dataset rows have {}",
        network.input_size(),
        inputs.cols()
    );
    assert!(
        expected_outputs.cols() == network.output_size(),
        "train: network produces {} outputs, dataset rows have {}",
        network.output_size(),
        expected_outputs.cols()
    );

    let sample_count = inputs.rows();
    let mut grads = GradientBuffers::for_network(network);

    let mut epochs_run = 0;
    let mut converged = false;
    let mut last_cost = None;

    'training: for epoch in 1..=config.epochs {
        grads.zero();

        // Full batch: every sample contributes before any weight moves.
        for sample in 0..sample_count {
            let input = inputs.sub_matrix(sample, 0, 1, inputs.cols());
            network.forward(&input);
            accumulate_sample(network, &input, expected_outputs.row(sample), &mut grads);
        }

        grads.average(sample_count);

        for (index, layer) in network.hidden.iter_mut().enumerate() {
            optimizer.step(layer, &grads.hidden_weights[index], &grads.hidden_biases[index]);
        }
        optimizer.step(&mut network.output, &grads.output_weights, &grads.output_biases);

        epochs_run = epoch;

        let checkpoint = config.log_interval != 0
            && (epoch % config.log_interval == 0 || epoch == 1 || epoch == config.epochs);
        if checkpoint {
            let cost = network.calculate_cost(inputs, expected_outputs);
            last_cost = Some(cost);

            if let Some(tx) = &config.progress_tx {
                let stats = EpochStats {
                    epoch,
                    total_epochs: config.epochs,
                    cost,
                };
                // A dropped receiver means nobody is watching; stop cleanly.
                if tx.send(stats).is_err() {
                    break 'training;
                }
            }

            if cost < config.convergence_threshold {
                converged = true;
                break 'training;
            }
        }
    }

    let final_cost = match last_cost {
        Some(cost) => cost,
        None => network.calculate_cost(inputs, expected_outputs),
    };

    TrainingReport {
        epochs_run,
        final_cost,
        converged,
    }
}

/// Adds one sample's gradient contribution to the accumulators.
///
/// Expects `network.forward(input)` to have just run, so every layer holds
/// this sample's activations.
fn accumulate_sample(
    network: &Network,
    input: &Matrix,
    expected_row: &[f64],
    grads: &mut GradientBuffers,
) {
    // Output delta: dMSE/da composed with the sigmoid derivative a(1-a).
    let predicted = network.output.activations().row(0);
    let loss_derivative = MseLoss::derivative(predicted, expected_row);
    for (col, d) in loss_derivative.iter().enumerate() {
        *grads.output_delta.at_mut(0, col) = d * sigmoid_derivative_from_output(predicted[col]);
    }

    // Output layer gradients, fed by the last hidden activation (or the raw
    // input when there are no hidden layers).
    let previous = match network.hidden.last() {
        Some(layer) => layer.activations().row(0),
        None => input.row(0),
    };
    for row in 0..grads.output_weights.rows() {
        let previous_activation = previous[row];
        for col in 0..grads.output_weights.cols() {
            *grads.output_weights.at_mut(row, col) +=
                previous_activation * grads.output_delta.at(0, col);
        }
    }
    for col in 0..grads.output_biases.cols() {
        *grads.output_biases.at_mut(0, col) += grads.output_delta.at(0, col);
    }

    // Hidden layers, last to first. Each delta folds the following layer's
    // delta back through that layer's weights.
    for l in (0..network.hidden.len()).rev() {
        let (deltas_up_to_l, deltas_after_l) = grads.hidden_deltas.split_at_mut(l + 1);
        let current_delta = &mut deltas_up_to_l[l];
        let (next_delta, next_weights): (&Matrix, &Matrix) = if l + 1 == network.hidden.len() {
            (&grads.output_delta, network.output.weights())
        } else {
            (&deltas_after_l[0], network.hidden[l + 1].weights())
        };

        let activations = network.hidden[l].activations().row(0);
        for neuron in 0..activations.len() {
            let mut weighted = 0.0;
            for next_neuron in 0..next_delta.cols() {
                weighted += next_delta.at(0, next_neuron) * next_weights.at(neuron, next_neuron);
            }
            *current_delta.at_mut(0, neuron) =
                weighted * sigmoid_derivative_from_output(activations[neuron]);
        }

        let previous = if l == 0 {
            input.row(0)
        } else {
            network.hidden[l - 1].activations().row(0)
        };
        let w_grad = &mut grads.hidden_weights[l];
        for row in 0..w_grad.rows() {
            let previous_activation = previous[row];
            for col in 0..w_grad.cols() {
                *w_grad.at_mut(row, col) += previous_activation * current_delta.at(0, col);
            }
        }
        let b_grad = &mut grads.hidden_biases[l];
        for col in 0..b_grad.cols() {
            *b_grad.at_mut(0, col) += current_delta.at(0, col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::architecture::Architecture;

    /// Runs one averaged full-batch accumulation pass without updating weights.
    fn accumulate_batch(
        network: &mut Network,
        inputs: &Matrix,
        expected: &Matrix,
    ) -> GradientBuffers {
        let mut grads = GradientBuffers::for_network(network);
        grads.zero();
        for sample in 0..inputs.rows() {
            let input = inputs.sub_matrix(sample, 0, 1, inputs.cols());
            network.forward(&input);
            accumulate_sample(network, &input, expected.row(sample), &mut grads);
        }
        grads.average(inputs.rows());
        grads
    }

    fn assert_gradient_close(analytic: f64, numeric: f64, what: &str) {
        let tolerance = 1e-6 + 1e-3 * numeric.abs();
        assert!(
            (analytic - numeric).abs() <= tolerance,
            "{what}: analytic {analytic} vs finite difference {numeric}"
        );
    }

    /// Central finite differences over every parameter in the network must
    /// agree with the analytic backprop gradients.
    #[test]
    fn gradient_check_against_central_finite_differences() {
        let arch = Architecture::new(2, vec![3], 2);
        let mut net = Network::new(&arch, true);

        let inputs = Matrix::from_rows(vec![
            vec![0.1, 0.9],
            vec![0.8, 0.2],
            vec![0.5, 0.5],
            vec![0.0, 1.0],
        ])
        .unwrap();
        let expected = Matrix::from_rows(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.5, 0.5],
            vec![1.0, 1.0],
        ])
        .unwrap();

        let grads = accumulate_batch(&mut net, &inputs, &expected);
        let eps = 1e-5;

        // Hidden layer weights and biases.
        for l in 0..net.hidden.len() {
            for row in 0..net.hidden[l].weights.rows() {
                for col in 0..net.hidden[l].weights.cols() {
                    *net.hidden[l].weights.at_mut(row, col) += eps;
                    let cost_plus = net.calculate_cost(&inputs, &expected);
                    *net.hidden[l].weights.at_mut(row, col) -= 2.0 * eps;
                    let cost_minus = net.calculate_cost(&inputs, &expected);
                    *net.hidden[l].weights.at_mut(row, col) += eps;

                    let numeric = (cost_plus - cost_minus) / (2.0 * eps);
                    assert_gradient_close(
                        grads.hidden_weights[l].at(row, col),
                        numeric,
                        "hidden weight",
                    );
                }
            }
            for col in 0..net.hidden[l].biases.cols() {
                *net.hidden[l].biases.at_mut(0, col) += eps;
                let cost_plus = net.calculate_cost(&inputs, &expected);
                *net.hidden[l].biases.at_mut(0, col) -= 2.0 * eps;
                let cost_minus = net.calculate_cost(&inputs, &expected);
                *net.hidden[l].biases.at_mut(0, col) += eps;

                let numeric = (cost_plus - cost_minus) / (2.0 * eps);
                assert_gradient_close(grads.hidden_biases[l].at(0, col), numeric, "hidden bias");
            }
        }

        // Output layer weights and biases.
        for row in 0..net.output.weights.rows() {
            for col in 0..net.output.weights.cols() {
                *net.output.weights.at_mut(row, col) += eps;
                let cost_plus = net.calculate_cost(&inputs, &expected);
                *net.output.weights.at_mut(row, col) -= 2.0 * eps;
                let cost_minus = net.calculate_cost(&inputs, &expected);
                *net.output.weights.at_mut(row, col) += eps;

                let numeric = (cost_plus - cost_minus) / (2.0 * eps);
                assert_gradient_close(grads.output_weights.at(row, col), numeric, "output weight");
            }
        }
        for col in 0..net.output.biases.cols() {
            *net.output.biases.at_mut(0, col) += eps;
            let cost_plus = net.calculate_cost(&inputs, &expected);
            *net.output.biases.at_mut(0, col) -= 2.0 * eps;
            let cost_minus = net.calculate_cost(&inputs, &expected);
            *net.output.biases.at_mut(0, col) += eps;

            let numeric = (cost_plus - cost_minus) / (2.0 * eps);
            assert_gradient_close(grads.output_biases.at(0, col), numeric, "output bias");
        }
    }

    /// Gradient check for the degenerate depth: no hidden layers at all.
    #[test]
    fn gradient_check_with_no_hidden_layers() {
        let arch = Architecture::new(3, vec![], 2);
        let mut net = Network::new(&arch, true);

        let inputs = Matrix::from_rows(vec![vec![0.2, 0.4, 0.6], vec![0.9, 0.1, 0.5]]).unwrap();
        let expected = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();

        let grads = accumulate_batch(&mut net, &inputs, &expected);
        let eps = 1e-5;

        for row in 0..net.output.weights.rows() {
            for col in 0..net.output.weights.cols() {
                *net.output.weights.at_mut(row, col) += eps;
                let cost_plus = net.calculate_cost(&inputs, &expected);
                *net.output.weights.at_mut(row, col) -= 2.0 * eps;
                let cost_minus = net.calculate_cost(&inputs, &expected);
                *net.output.weights.at_mut(row, col) += eps;

                let numeric = (cost_plus - cost_minus) / (2.0 * eps);
                assert_gradient_close(grads.output_weights.at(row, col), numeric, "weight");
            }
        }
    }

    #[test]
    fn training_reduces_the_cost() {
        let arch = Architecture::new(2, vec![4], 1);
        let mut net = Network::new(&arch, true);
        let inputs = Matrix::from_rows(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ])
        .unwrap();
        let expected =
            Matrix::from_rows(vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]]).unwrap();

        let before = net.calculate_cost(&inputs, &expected);
        let report = train_backprop(
            &mut net,
            &inputs,
            &expected,
            &Sgd::new(2.0),
            &TrainConfig::new(500, 100),
        );
        assert!(report.final_cost < before);
        assert!(report.epochs_run >= 1 && report.epochs_run <= 500);
    }

    #[test]
    fn already_perfect_model_converges_at_the_first_checkpoint() {
        // Zero weights and biases output exactly 0.5; target 0.5 gives zero
        // cost, so the first checkpoint triggers the early exit.
        let arch = Architecture::new(1, vec![], 1);
        let mut net = Network::new(&arch, false);
        let inputs = Matrix::from_rows(vec![vec![0.0]]).unwrap();
        let expected = Matrix::from_rows(vec![vec![0.5]]).unwrap();

        let report = train_backprop(
            &mut net,
            &inputs,
            &expected,
            &Sgd::new(0.1),
            &TrainConfig::new(1000, 10),
        );
        assert!(report.converged);
        assert_eq!(report.epochs_run, 1);
        assert!(report.final_cost < 1e-6);
    }

    #[test]
    fn exhausting_the_epoch_budget_is_not_an_error() {
        let arch = Architecture::new(1, vec![], 1);
        let mut net = Network::new(&arch, false);
        let inputs = Matrix::from_rows(vec![vec![0.0]]).unwrap();
        // Unreachable target keeps the cost well above the threshold.
        let expected = Matrix::from_rows(vec![vec![0.0]]).unwrap();

        let report = train_backprop(
            &mut net,
            &inputs,
            &expected,
            &Sgd::new(0.1),
            &TrainConfig::new(3, 1),
        );
        assert!(!report.converged);
        assert_eq!(report.epochs_run, 3);
        assert!(report.final_cost > 0.0);
    }

    #[test]
    fn progress_channel_receives_checkpoint_stats() {
        let arch = Architecture::new(2, vec![2], 1);
        let mut net = Network::new(&arch, true);
        let inputs = Matrix::from_rows(vec![vec![0.0, 1.0]]).unwrap();
        let expected = Matrix::from_rows(vec![vec![1.0]]).unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        let mut config = TrainConfig::new(4, 2);
        config.progress_tx = Some(tx);

        train_backprop(&mut net, &inputs, &expected, &Sgd::new(0.5), &config);
        drop(config);

        let stats: Vec<EpochStats> = rx.iter().collect();
        // Checkpoints at epochs 1 (first), 2, 4 (interval + last).
        assert_eq!(
            stats.iter().map(|s| s.epoch).collect::<Vec<_>>(),
            vec![1, 2, 4]
        );
        assert!(stats.iter().all(|s| s.total_epochs == 4));
    }

    #[test]
    #[should_panic(expected = "train")]
    fn mismatched_sample_counts_fail_fast() {
        let arch = Architecture::new(2, vec![], 1);
        let mut net = Network::new(&arch, false);
        let inputs = Matrix::zeros(4, 2);
        let expected = Matrix::zeros(3, 1);
        train_backprop(
            &mut net,
            &inputs,
            &expected,
            &Sgd::new(0.1),
            &TrainConfig::new(1, 1),
        );
    }
}
