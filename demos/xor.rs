use hematite_nn::{train_backprop, Architecture, EpochStats, Matrix, Network, Sgd, TrainConfig};

fn main() {
    let architecture = Architecture::new(2, vec![2], 1);
    let mut network = Network::new(&architecture, true);

    let inputs = Matrix::from_rows(vec![
        vec![0.0, 0.0],
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 1.0],
    ])
    .expect("rectangular literal");
    let expected = Matrix::from_rows(vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]])
        .expect("rectangular literal");

    let (tx, rx) = std::sync::mpsc::channel::<EpochStats>();
    let printer = std::thread::spawn(move || {
        for stats in rx {
            println!(
                "Epoch {}/{} - cost: {:.6}",
                stats.epoch, stats.total_epochs, stats.cost
            );
        }
    });

    let mut config = TrainConfig::new(100_000, 1000);
    config.convergence_threshold = 1e-3;
    config.progress_tx = Some(tx);

    let report = train_backprop(&mut network, &inputs, &expected, &Sgd::new(1.0), &config);
    // Drop the sender so the printer thread sees the channel close.
    drop(config);
    printer.join().expect("printer thread");

    println!(
        "\nFinished after {} epochs (cost {:.6}, converged: {})\n",
        report.epochs_run, report.final_cost, report.converged
    );

    for sample in 0..inputs.rows() {
        let row = inputs.sub_matrix(sample, 0, 1, inputs.cols());
        let output = network.forward(&row).at(0, 0);
        println!(
            "{:.0} XOR {:.0} -> {:.4} (classified {})",
            row.at(0, 0),
            row.at(0, 1),
            output,
            u8::from(output > 0.5)
        );
    }
}
