use std::f64::consts::PI;

use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::SeriesPair;
use crate::{Error, Float, Result};

/// Noisy seasonal curve with a slow drift, scaled to `[0, 1]` and cut into
/// next-value windows.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSeries {
    samples: usize,
    sequence_length: usize,
    period: f64,
    drift: f64,
    noise: f64,
}

impl SyntheticSeries {
    pub fn new(samples: usize, sequence_length: usize) -> SyntheticSeries {
        SyntheticSeries {
            samples,
            sequence_length,
            period: 50.0,
            drift: 0.3,
            noise: 0.05,
        }
    }

    pub fn period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    pub fn drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Raw points before windowing, already scaled.
    pub fn curve<R: Rng>(&self, random: &mut R) -> Result<Array1<Float>> {
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(Error::Config(format!("noise must be finite and non-negative, got {}", self.noise)));
        }
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(Error::Config(format!("period must be positive, got {}", self.period)));
        }
        let normal = Normal::new(0.0, self.noise)
            .map_err(|e| Error::Config(format!("noise {}: {}", self.noise, e)))?;
        let len = self.samples + self.sequence_length;
        let raw = Array1::from_shape_fn(len, |t| {
            let t = t as f64;
            (2.0 * PI * t / self.period).sin() + self.drift * t / len as f64
                + normal.sample(random)
        });

        let min = raw.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let scale = if max > min { max - min } else { 1.0 };
        Ok(raw.mapv(|v| ((v - min) / scale) as Float))
    }

    /// `X[i] = s[i..i + L]`, `y[i] = s[i + L]`.
    pub fn generate<R: Rng>(&self, random: &mut R) -> Result<SeriesPair> {
        let curve = self.curve(random)?;
        let l = self.sequence_length;
        let x = Array2::from_shape_fn((self.samples, l), |(i, j)| curve[i + j]);
        let y = Array1::from_shape_fn(self.samples, |i| curve[i + l]);
        SeriesPair::new(x, y)
    }
}

impl Default for SyntheticSeries {
    fn default() -> Self {
        SyntheticSeries::new(500, 10)
    }
}
