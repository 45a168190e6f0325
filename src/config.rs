use std::path::Path;

use burn::config::Config;

use crate::{model::RegressorConfig, train::TrainingConfig, Error};

/// Everything the experiment binary needs besides file paths.
#[derive(Config)]
pub struct ExperimentConfig {
    /// Leading share of the series used for training.
    #[config(default = 0.8)]
    pub train_fraction: f64,
    #[config(default = "RegressorConfig::new()")]
    pub model: RegressorConfig,
    #[config(default = "TrainingConfig::new()")]
    pub training: TrainingConfig,
}

impl ExperimentConfig {
    /// Reads a JSON file written by [`Config::save`] and validates it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<ExperimentConfig> {
        let path = path.as_ref();
        let config = ExperimentConfig::load(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        let check = |ok: bool, message: &str| {
            if ok {
                Ok(())
            } else {
                Err(Error::Config(message.to_string()))
            }
        };
        check(
            (0.0..=1.0).contains(&self.train_fraction),
            "train_fraction must be within [0, 1]",
        )?;
        check(self.model.input_size > 0, "input_size must be positive")?;
        check(self.model.hidden_size > 0, "hidden_size must be positive")?;
        check(self.model.num_layers > 0, "num_layers must be positive")?;
        check(self.training.batch_size > 0, "batch_size must be positive")?;
        check(
            self.training.learning_rate > 0.0,
            "learning_rate must be positive",
        )
    }
}
