use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_rnn::{
    config::ExperimentConfig,
    data::{load_data, BatchLoader, WindowedDataset},
    model::build_model,
    plot::plot_test_prediction,
    predict::predict,
    train::train,
    TrainBackend,
};

const DATA_PATH: &str = "aritificial_timeseries_data.npz";
const CONFIG_PATH: &str = "experiment.json";
const PLOT_PATH: &str = "test_prediction.png";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = if Path::new(CONFIG_PATH).exists() {
        ExperimentConfig::from_file(CONFIG_PATH)?
    } else {
        ExperimentConfig::new()
    };
    config.validate()?;

    let device = Default::default();
    let split = load_data(DATA_PATH, config.train_fraction)?;
    let train_set = WindowedDataset::<TrainBackend>::new(&split.train, &device)?;
    let test_set = WindowedDataset::<TrainBackend>::new(&split.test, &device)?;

    let training = &config.training;
    let mut loader = BatchLoader::new(&train_set, training.loader_config())?;
    let model = build_model::<TrainBackend>(&config.model, &device);
    let (model, _) = train(model, &mut loader, training, |report| println!("{}", report))?;

    // only the test chart is drawn; the train fit is logged
    let fit = predict(&model, &train_set, training.batch_size)?;
    let test = predict(&model, &test_set, training.batch_size)?;
    info!(train_mse = fit.mse(), test_mse = test.mse(), "evaluated");
    plot_test_prediction(PLOT_PATH, &test)?;
    Ok(())
}
