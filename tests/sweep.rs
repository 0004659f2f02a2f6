use holdout::{
    summary,
    sweep::{self, SweepConfig},
    Error,
};
use rand::{rngs::StdRng, SeedableRng};

fn small_config() -> SweepConfig {
    SweepConfig {
        spreads: vec![0.2, 0.4, 0.6, 0.8],
        dataset_size: 40,
        train_ratio: 0.8,
        n_splits: 10,
        n_inits: 2,
        n_neurons: 3,
        learning_rate: 0.05,
        momentum: 0.9,
        epochs: 5,
    }
}

#[test]
fn tensor_has_declared_shape_and_no_gaps() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(0);
    let tensor = sweep::run(&config, &mut rng, |_| {}).unwrap();
    assert_eq!(tensor.shape(), (4, 20, 5));
    for param in 0..4 {
        for trial in 0..20 {
            let curve = tensor.curve(param, trial);
            assert_eq!(curve.len(), 5);
            assert!(curve.iter().all(|e| e.is_finite() && *e >= 0.0));
        }
    }
}

#[test]
fn trials_enumerate_split_major_init_minor() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(1);
    let mut seen = Vec::new();
    sweep::run(&config, &mut rng, |report| {
        seen.push((report.param_index, report.split_index, report.init_index));
    })
    .unwrap();

    let mut expected = Vec::new();
    for param in 0..config.spreads.len() {
        for split in 0..config.n_splits {
            for init in 0..config.n_inits {
                expected.push((param, split, init));
            }
        }
    }
    assert_eq!(seen, expected);
}

#[test]
fn reported_curves_are_stored() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(2);
    let mut reported = Vec::new();
    let tensor = sweep::run(&config, &mut rng, |report| {
        assert_eq!(report.trace.train.len(), config.epochs);
        assert_eq!(report.trace.test.len(), config.epochs);
        reported.push((
            report.param_index,
            report.split_index * config.n_inits + report.init_index,
            report.trace.test.clone(),
        ));
    })
    .unwrap();

    assert_eq!(reported.len(), config.spreads.len() * config.trials());
    for (param, trial, test_curve) in reported {
        assert_eq!(tensor.curve(param, trial), test_curve.as_slice());
    }
}

#[test]
fn final_errors_match_last_epoch_column() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(3);
    let tensor = sweep::run(&config, &mut rng, |_| {}).unwrap();
    for param in 0..config.spreads.len() {
        let finals = tensor.final_errors(param);
        assert_eq!(finals.len(), config.trials());
        for (trial, error) in finals.iter().enumerate() {
            assert_eq!(*error, tensor.curve(param, trial)[config.epochs - 1]);
        }
    }
}

#[test]
fn summaries_follow_the_tensor() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(4);
    let tensor = sweep::run(&config, &mut rng, |_| {}).unwrap();
    let summaries = summary::summarize(&tensor).unwrap();
    assert_eq!(summaries.len(), config.spreads.len());
    for s in summaries {
        assert!(s.min <= s.lower_quartile);
        assert!(s.lower_quartile <= s.median);
        assert!(s.median <= s.upper_quartile);
        assert!(s.upper_quartile <= s.max);
    }
}

#[test]
fn invalid_configurations_are_rejected_eagerly() {
    let mut rng = StdRng::seed_from_u64(5);
    let variants: Vec<SweepConfig> = vec![
        SweepConfig {
            spreads: vec![],
            ..small_config()
        },
        SweepConfig {
            spreads: vec![0.2, -0.4],
            ..small_config()
        },
        SweepConfig {
            train_ratio: 1.0,
            ..small_config()
        },
        SweepConfig {
            n_splits: 0,
            ..small_config()
        },
        SweepConfig {
            epochs: 0,
            ..small_config()
        },
        SweepConfig {
            learning_rate: 0.0,
            ..small_config()
        },
    ];
    for config in variants {
        let result = sweep::run(&config, &mut rng, |_| {});
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
