use std::fmt;

use burn::{
    config::Config,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use tracing::{debug, info, warn};

use crate::{
    data::{BatchLoader, LoaderConfig},
    model::Regressor,
    Error,
};

#[derive(Config)]
pub struct TrainingConfig {
    #[config(default = 30)]
    pub epochs: usize,
    #[config(default = 32)]
    pub batch_size: usize,
    #[config(default = 0.01)]
    pub learning_rate: f64,
    /// Shuffle seed; a fresh one per run when absent.
    pub seed: Option<u64>,
    /// Epsilon 1e-8 rather than burn's 1e-5.
    #[config(default = "AdamConfig::new().with_epsilon(1e-8)")]
    pub optimizer: AdamConfig,
}

impl TrainingConfig {
    /// Shuffled batches of `batch_size`, seeded with `seed`.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::new(self.batch_size)
            .shuffle(true)
            .seed(self.seed)
    }
}

/// Average per-batch loss of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-indexed
    pub epoch: usize,
    pub epochs: usize,
    pub loss: f64,
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch {}/{}, Loss: {:.4}", self.epoch, self.epochs, self.loss)
    }
}

/// Runs `config.epochs` full passes of `loader`, one Adam step per batch.
///
/// `on_epoch` sees each report as soon as its epoch ends; the same reports
/// are returned along with the trained model.
pub fn train<B, F>(
    model: Regressor<B>,
    loader: &mut BatchLoader<B>,
    config: &TrainingConfig,
    mut on_epoch: F,
) -> crate::Result<(Regressor<B>, Vec<EpochReport>)>
where
    B: AutodiffBackend,
    F: FnMut(&EpochReport),
{
    if loader.batch_size() != config.batch_size {
        return Err(Error::Config(format!(
            "loader batches {} examples but batch_size is {}",
            loader.batch_size(),
            config.batch_size
        )));
    }
    if loader.num_batches() == 0 {
        return Err(Error::Training("training set has no batches".to_string()));
    }

    let mut model = model;
    let mut optimizer = config.optimizer.init::<B, Regressor<B>>();
    let loss_fn = MseLoss::new();
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let mut total_loss = 0.0;
        let mut batches = 0;
        for batch in loader.iter() {
            let output = model.forward(batch.inputs);
            let loss = loss_fn.forward(output, batch.targets, Reduction::Mean);
            let value = loss.clone().into_scalar().elem::<f64>();
            debug!(epoch, batch = batches, loss = value);

            // gradients are consumed by the step
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);

            total_loss += value;
            batches += 1;
        }

        let report = EpochReport {
            epoch,
            epochs: config.epochs,
            loss: total_loss / batches as f64,
        };
        if report.loss.is_finite() {
            info!(epoch, loss = report.loss, "epoch finished");
        } else {
            warn!(epoch, loss = report.loss, "loss is not finite");
        }
        on_epoch(&report);
        history.push(report);
    }

    Ok((model, history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{SeriesPair, WindowedDataset},
        model::RegressorConfig,
        Float, TrainBackend,
    };
    use ndarray::Array;

    type B = TrainBackend;

    fn dataset(n: usize) -> WindowedDataset<B> {
        let x = Array::from_shape_fn((n, 5), |(i, j)| ((i + j) % 7) as Float / 7.0);
        let y = Array::from_shape_fn(n, |i| ((i + 5) % 7) as Float / 7.0);
        WindowedDataset::new(&SeriesPair::new(x, y).unwrap(), &Default::default()).unwrap()
    }

    #[test]
    fn defaults() {
        let config = TrainingConfig::new();
        assert_eq!(config.epochs, 30);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.learning_rate, 0.01);
        assert_eq!(config.seed, None);
        assert_eq!(
            config.optimizer.to_string(),
            AdamConfig::new().with_epsilon(1e-8).to_string()
        );
        assert_ne!(config.optimizer.to_string(), AdamConfig::new().to_string());
    }

    #[test]
    fn loader_follows_config() {
        let config = TrainingConfig::new().with_batch_size(5).with_seed(Some(9));
        assert_eq!(config.loader_config(), LoaderConfig::new(5).shuffle(true).seed(Some(9)));
    }

    #[test]
    fn mismatched_loader() {
        let dataset = dataset(20);
        let config = TrainingConfig::new().with_epochs(1).with_batch_size(4);
        let mut loader = BatchLoader::new(&dataset, LoaderConfig::new(8)).unwrap();
        let model = RegressorConfig::new().with_hidden_size(4).init::<B>(&Default::default());
        let result = train(model, &mut loader, &config, |_| {});
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn one_epoch() {
        let dataset = dataset(20);
        let config = TrainingConfig::new().with_epochs(1).with_seed(Some(1));
        let mut loader = BatchLoader::new(&dataset, config.loader_config()).unwrap();
        let model = RegressorConfig::new().with_hidden_size(8).init::<B>(&Default::default());

        let mut lines = Vec::new();
        let (_, history) = train(model, &mut loader, &config, |r| lines.push(r.to_string())).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].epoch, 1);
        assert!(history[0].loss.is_finite());
        assert!(history[0].loss >= 0.0);
        assert!(lines[0].starts_with("Epoch 1/1, Loss: "));
    }

    #[test]
    fn reports_every_epoch() {
        let dataset = dataset(40);
        let config = TrainingConfig::new().with_epochs(3).with_batch_size(16);
        let mut loader = BatchLoader::new(&dataset, config.loader_config()).unwrap();
        let model = RegressorConfig::new().with_hidden_size(4).init::<B>(&Default::default());

        let mut seen = 0;
        let (_, history) = train(model, &mut loader, &config, |_| seen += 1).unwrap();
        assert_eq!(seen, 3);
        let epochs: Vec<usize> = history.iter().map(|r| r.epoch).collect();
        assert_eq!(epochs, vec![1, 2, 3]);
        assert!(history.iter().all(|r| r.epochs == 3 && r.loss.is_finite()));
    }

    #[test]
    fn updates_parameters() {
        let dataset = dataset(8);
        let config = TrainingConfig::new().with_epochs(1).with_batch_size(8);
        let mut loader = BatchLoader::new(&dataset, LoaderConfig::new(8)).unwrap();
        let model = RegressorConfig::new().with_hidden_size(4).init::<B>(&Default::default());
        let batch = dataset.batch(&[0, 1, 2]);
        let before = model.forward(batch.inputs.clone()).into_data().to_vec::<Float>().unwrap();

        let (model, _) = train(model, &mut loader, &config, |_| {}).unwrap();
        let after = model.forward(batch.inputs).into_data().to_vec::<Float>().unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn no_batches() {
        let dataset = dataset(0);
        let mut loader = BatchLoader::new(&dataset, LoaderConfig::default()).unwrap();
        let model = RegressorConfig::new().with_hidden_size(4).init::<B>(&Default::default());
        let result = train(model, &mut loader, &TrainingConfig::new(), |_| {});
        assert!(matches!(result, Err(Error::Training(_))));
    }

    #[test]
    fn report_format() {
        let report = EpochReport {
            epoch: 3,
            epochs: 30,
            loss: 0.012345,
        };
        assert_eq!(report.to_string(), "Epoch 3/30, Loss: 0.0123");
    }
}
