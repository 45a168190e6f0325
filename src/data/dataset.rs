use burn::tensor::{backend::Backend, Int, Tensor, TensorData};

use super::SeriesPair;
use crate::{Error, Float, Result};

/// One example: the input sequence `[sequence_length, 1]` and its target `[1]`.
#[derive(Debug, Clone)]
pub struct Entry<B: Backend> {
    pub input: Tensor<B, 2>,
    pub target: Tensor<B, 1>,
}

/// Stacked entries: inputs `[batch, sequence_length, 1]`, targets `[batch, 1]`.
#[derive(Debug, Clone)]
pub struct Batch<B: Backend> {
    pub inputs: Tensor<B, 3>,
    pub targets: Tensor<B, 2>,
}

impl<B: Backend> Batch<B> {
    pub fn len(&self) -> usize {
        self.targets.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`SeriesPair`] converted once into tensors on one device.
#[derive(Debug, Clone)]
pub struct WindowedDataset<B: Backend> {
    inputs: Tensor<B, 3>,
    targets: Tensor<B, 2>,
    len: usize,
    sequence_length: usize,
}

impl<B: Backend> WindowedDataset<B> {
    pub fn new(pair: &SeriesPair, device: &B::Device) -> Result<WindowedDataset<B>> {
        let len = pair.len();
        let sequence_length = pair.sequence_length();
        if len > 0 && sequence_length == 0 {
            return Err(Error::DataLoad("input sequences are empty".to_string()));
        }

        let x: Vec<Float> = pair.x().iter().cloned().collect();
        let y: Vec<Float> = pair.y().iter().cloned().collect();
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(Error::Conversion(format!(
                "X[{}][{}] is not a number",
                i / sequence_length,
                i % sequence_length
            )));
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(Error::Conversion(format!("y[{}] is not a number", i)));
        }

        // trailing feature axis of size 1
        let inputs = TensorData::new(x, [len, sequence_length, 1]).convert::<B::FloatElem>();
        let targets = TensorData::new(y, [len, 1]).convert::<B::FloatElem>();
        Ok(WindowedDataset {
            inputs: Tensor::from_data(inputs, device),
            targets: Tensor::from_data(targets, device),
            len,
            sequence_length,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn device(&self) -> B::Device {
        self.inputs.device()
    }

    pub fn get(&self, index: usize) -> Option<Entry<B>> {
        if index >= self.len {
            return None;
        }
        let l = self.sequence_length;
        Some(Entry {
            input: self
                .inputs
                .clone()
                .slice([index..index + 1, 0..l, 0..1])
                .reshape([l, 1]),
            target: self
                .targets
                .clone()
                .slice([index..index + 1, 0..1])
                .reshape([1]),
        })
    }

    /// Gathers the entries at `indices`, in that order.
    ///
    /// # Panics
    /// If an index is out of range.
    pub fn batch(&self, indices: &[usize]) -> Batch<B> {
        assert!(
            indices.iter().all(|&i| i < self.len),
            "batch index out of range: len={} indices={:?}",
            self.len,
            indices
        );
        let ids: Vec<i64> = indices.iter().map(|&i| i as i64).collect();
        let ids = Tensor::<B, 1, Int>::from_data(
            TensorData::new(ids, [indices.len()]).convert::<B::IntElem>(),
            &self.device(),
        );
        Batch {
            inputs: self.inputs.clone().select(0, ids.clone()),
            targets: self.targets.clone().select(0, ids),
        }
    }
}
