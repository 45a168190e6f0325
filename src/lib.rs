pub mod config;
pub mod data;
mod error;
pub mod model;
pub mod plot;
pub mod predict;
pub mod train;

use burn::backend::{Autodiff, NdArray};

pub use error::{Error, Result};

pub type Float = f32;

/// CPU backend used for inference.
pub type InferenceBackend = NdArray<Float>;

/// CPU backend with gradient tracking, used for training.
pub type TrainBackend = Autodiff<InferenceBackend>;
