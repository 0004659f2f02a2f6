use std::process;

use holdout::{
    summary,
    sweep::{self, SweepConfig},
};

fn main() {
    let config = SweepConfig {
        spreads: vec![0.1, 0.4, 0.7, 1.0],
        dataset_size: 200,
        train_ratio: 0.8,
        n_splits: 10,
        n_inits: 2,
        n_neurons: 8,
        learning_rate: 0.02,
        momentum: 0.9,
        epochs: 100,
    };

    let mut rng = rand::thread_rng();
    let result = sweep::run(&config, &mut rng, |report| {
        if report.split_index == 0 && report.init_index == 0 {
            println!("spread {:.2}", report.spread);
        }
        let last = report.trace.test.len() - 1;
        println!(
            "  split {:2}, init {}: train mse {:.4}, test mse {:.4}",
            report.split_index, report.init_index, report.trace.train[last], report.trace.test[last],
        );
    });
    let tensor = match result {
        Ok(tensor) => tensor,
        Err(err) => {
            eprintln!("sweep failed: {}", err);
            process::exit(1);
        }
    };
    let summaries = match summary::summarize(&tensor) {
        Ok(summaries) => summaries,
        Err(err) => {
            eprintln!("summarizing failed: {}", err);
            process::exit(1);
        }
    };

    println!();
    println!(
        "final test error across {} trials per spread",
        config.trials()
    );
    println!(
        "{:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "spread", "min", "q1", "median", "q3", "max"
    );
    for (spread, s) in config.spreads.iter().zip(&summaries) {
        println!(
            "{:>8.2} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
            spread, s.min, s.lower_quartile, s.median, s.upper_quartile, s.max
        );
    }
}
