use burn::{
    module::AutodiffModule,
    tensor::{
        backend::{AutodiffBackend, Backend},
        Tensor,
    },
};
use ndarray::{Array2, Zip};
use rand_pcg::Mcg128Xsl64;
use tracing::info;

use crate::{
    data::{Batch, BatchLoader, LoaderConfig, WindowedDataset},
    model::Regressor,
    Error, Float, Result,
};

/// Model outputs next to the ground truth, both `(n, 1)` in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub predictions: Array2<Float>,
    pub targets: Array2<Float>,
}

impl Prediction {
    pub fn len(&self) -> usize {
        self.targets.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mean squared error; NaN when empty.
    pub fn mse(&self) -> f64 {
        let mut sum = 0.0;
        Zip::from(&self.predictions)
            .and(&self.targets)
            .for_each(|&p, &t| {
                let d = (p - t) as f64;
                sum += d * d;
            });
        sum / self.len() as f64
    }
}

/// Runs `model` over `dataset` in order without tracking gradients.
pub fn predict<B: AutodiffBackend>(
    model: &Regressor<B>,
    dataset: &WindowedDataset<B>,
    batch_size: usize,
) -> Result<Prediction> {
    // inference copy; the autodiff graph is not touched
    let model = model.valid();
    let mut loader = in_order(dataset, batch_size)?;
    let batches = loader.iter().map(|batch| Batch {
        inputs: batch.inputs.inner(),
        targets: batch.targets.inner(),
    });
    let prediction = collect(&model, batches)?;
    info!(examples = prediction.len(), mse = prediction.mse(), "predicted");
    Ok(prediction)
}

/// Same as [`predict`] for a model that already lives on an inference backend.
pub fn predict_with<B: Backend>(
    model: &Regressor<B>,
    dataset: &WindowedDataset<B>,
    batch_size: usize,
) -> Result<Prediction> {
    let mut loader = in_order(dataset, batch_size)?;
    collect(model, loader.iter())
}

// never shuffles, so the generator is never drawn from
fn in_order<B: Backend>(
    dataset: &WindowedDataset<B>,
    batch_size: usize,
) -> Result<BatchLoader<'_, B>> {
    BatchLoader::with_random(dataset, LoaderConfig::new(batch_size), Mcg128Xsl64::new(1))
}

fn collect<B, I>(model: &Regressor<B>, batches: I) -> Result<Prediction>
where
    B: Backend,
    I: Iterator<Item = Batch<B>>,
{
    let mut predictions = Vec::new();
    let mut targets = Vec::new();
    for batch in batches {
        let output = model.forward(batch.inputs);
        predictions.extend(to_vec(output)?);
        targets.extend(to_vec(batch.targets)?);
    }

    Ok(Prediction {
        predictions: to_column(predictions)?,
        targets: to_column(targets)?,
    })
}

fn to_vec<B: Backend>(tensor: Tensor<B, 2>) -> Result<Vec<Float>> {
    tensor
        .into_data()
        .convert::<Float>()
        .to_vec::<Float>()
        .map_err(|e| Error::Conversion(format!("{:?}", e)))
}

fn to_column(values: Vec<Float>) -> Result<Array2<Float>> {
    let n = values.len();
    Array2::from_shape_vec((n, 1), values).map_err(|e| Error::Conversion(e.to_string()))
}
