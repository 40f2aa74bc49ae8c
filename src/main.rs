use std::{env, fs, process};

use anyhow::{Context, Result};
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use backprop::{
    arch::{Network, Split},
    config::TrainingConfig,
    dataset::{Dataset, MinMaxScaler},
    initialization::RandWeightGen,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <config.json> [history.json]", args[0]);
        process::exit(1);
    }

    let config = TrainingConfig::load(&args[1])
        .with_context(|| format!("failed to load config from {}", args[1]))?;

    let data_config = &config.dataset;
    let dataset = Dataset::from_csv(&data_config.path, data_config.x_size, data_config.has_header)
        .with_context(|| format!("failed to read dataset {}", data_config.path.display()))?;
    info!("read {} rows from {}", dataset.len(), data_config.path.display());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let split = config.split;
    let mut splits = dataset
        .split(split.validation, split.test, split.shuffle, &mut rng)
        .context("failed to split dataset")?;

    if config.scale_features {
        MinMaxScaler::fit_splits(&mut splits);
    }

    info!(
        "split into {} training, {} validation and {} test rows",
        splits.train.len(),
        splits.validation.len(),
        splits.test.len()
    );

    let inputs = splits.as_ref().map(|_, d| d.x().clone());
    let mut weight_gen = RandWeightGen::normal(
        StdRng::seed_from_u64(config.seed),
        config.init.mean,
        config.init.std_dev,
    )?;

    let mut network = Network::builder(inputs)
        .layers(config.layer_widths())
        .learning_rate(config.learning_rate)
        .early_stopping(config.early_stopping)
        .build(&mut weight_gen)?;

    let report = network.learn(
        config.epochs,
        splits.train.y().view(),
        splits.validation.y().view(),
        splits.test.y().view(),
    )?;

    for split in Split::ALL {
        if let Some(err) = network.history()[split].last() {
            info!("final {split:?} rmse: {err}");
        }
    }
    info!("ran {} epochs, state {:?}", report.epochs, report.state);

    let history =
        serde_json::to_string_pretty(network.history()).context("failed to encode history")?;
    match args.get(2) {
        Some(path) => {
            fs::write(path, history).with_context(|| format!("failed to write {path}"))?;
            info!("wrote error history to {path}");
        }
        None => println!("{history}"),
    }

    Ok(())
}
