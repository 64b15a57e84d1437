//! Trains a {9, [32, 16], 5} network on the full 4-bit adder-with-carry
//! truth table: two 4-bit operands plus a carry-in bit map to a 4-bit sum
//! plus a carry-out bit. 16 * 16 * 2 = 512 samples.

use hematite_nn::{train_backprop, Architecture, EpochStats, Matrix, Network, Sgd, TrainConfig};

/// Builds the complete 512-row dataset, one bit per column, LSB first.
fn adder_dataset() -> (Matrix, Matrix) {
    let mut inputs = Matrix::zeros(512, 9);
    let mut outputs = Matrix::zeros(512, 5);
    let mut row = 0;

    for a in 0..16u32 {
        for b in 0..16u32 {
            for carry_in in 0..=1u32 {
                for bit in 0..4 {
                    *inputs.at_mut(row, bit) = f64::from((a >> bit) & 1);
                    *inputs.at_mut(row, 4 + bit) = f64::from((b >> bit) & 1);
                }
                *inputs.at_mut(row, 8) = f64::from(carry_in);

                let total = a + b + carry_in;
                for bit in 0..4 {
                    *outputs.at_mut(row, bit) = f64::from((total >> bit) & 1);
                }
                *outputs.at_mut(row, 4) = f64::from((total >> 4) & 1);

                row += 1;
            }
        }
    }

    (inputs, outputs)
}

fn main() {
    let architecture = Architecture::new(9, vec![32, 16], 5);
    let mut network = Network::new(&architecture, true);
    let (inputs, outputs) = adder_dataset();

    println!("Training the 4-bit full adder on {} samples\n", inputs.rows());

    let (tx, rx) = std::sync::mpsc::channel::<EpochStats>();
    let printer = std::thread::spawn(move || {
        for stats in rx {
            println!(
                "Epoch {}/{} - cost: {:.6}",
                stats.epoch, stats.total_epochs, stats.cost
            );
        }
    });

    let mut config = TrainConfig::new(50_000, 500);
    config.convergence_threshold = 1e-4;
    config.progress_tx = Some(tx);

    let report = train_backprop(&mut network, &inputs, &outputs, &Sgd::new(1.0), &config);
    // Drop the sender so the printer thread sees the channel close.
    drop(config);
    printer.join().expect("printer thread");

    println!(
        "\nFinished after {} epochs (cost {:.6}, converged: {})\n",
        report.epochs_run, report.final_cost, report.converged
    );

    // Bit-exact accuracy: all 5 output bits correct, thresholded at 0.5.
    let mut correct = 0;
    for sample in 0..inputs.rows() {
        let row = inputs.sub_matrix(sample, 0, 1, inputs.cols());
        let prediction = network.forward(&row);
        let exact = (0..5).all(|bit| (prediction.at(0, bit) > 0.5) == (outputs.at(sample, bit) > 0.5));
        if exact {
            correct += 1;
        }
    }
    println!(
        "Bit-exact rows: {correct}/{} ({:.1}%)",
        inputs.rows(),
        100.0 * correct as f64 / inputs.rows() as f64
    );
}
