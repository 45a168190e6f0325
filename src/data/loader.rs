use burn::tensor::backend::Backend;
use rand::{seq::SliceRandom, SeedableRng};
use rand_pcg::Mcg128Xsl64;

use super::{Batch, WindowedDataset};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    batch_size: usize,
    shuffle: bool,
    seed: Option<u64>,
}

impl LoaderConfig {
    pub fn new(batch_size: usize) -> LoaderConfig {
        LoaderConfig {
            batch_size,
            shuffle: false,
            seed: None,
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Reshuffle on every pass.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> LoaderConfig {
        LoaderConfig::new(32)
    }
}

/// Batches over a borrowed dataset. Every call to [`BatchLoader::iter`] is a
/// new pass.
#[derive(Debug)]
pub struct BatchLoader<'a, B: Backend> {
    dataset: &'a WindowedDataset<B>,
    config: LoaderConfig,
    random: Mcg128Xsl64,
}

impl<'a, B: Backend> BatchLoader<'a, B> {
    pub fn with_random(
        dataset: &'a WindowedDataset<B>,
        config: LoaderConfig,
        random: Mcg128Xsl64,
    ) -> Result<BatchLoader<'a, B>> {
        if config.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".to_string()));
        }
        Ok(BatchLoader {
            dataset,
            config,
            random,
        })
    }

    pub fn new(dataset: &'a WindowedDataset<B>, config: LoaderConfig) -> Result<BatchLoader<'a, B>> {
        let random = match config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self::with_random(dataset, config, random)
    }

    pub fn dataset(&self) -> &'a WindowedDataset<B> {
        self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn num_batches(&self) -> usize {
        (self.dataset.len() + self.config.batch_size - 1) / self.config.batch_size
    }

    pub fn iter(&mut self) -> Batches<'a, B> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.config.shuffle {
            order.shuffle(&mut self.random);
        }
        Batches {
            dataset: self.dataset,
            order,
            batch_size: self.config.batch_size,
            cursor: 0,
        }
    }
}

impl<'l, 'a, B: Backend> IntoIterator for &'l mut BatchLoader<'a, B> {
    type Item = Batch<B>;
    type IntoIter = Batches<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 1 パス分のバッチ列。最後のバッチは余りを持つ
#[derive(Debug)]
pub struct Batches<'a, B: Backend> {
    dataset: &'a WindowedDataset<B>,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl<'a, B: Backend> Batches<'a, B> {
    /// Dataset indices of this pass in visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

impl<'a, B: Backend> Iterator for Batches<'a, B> {
    type Item = Batch<B>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let batch = self.dataset.batch(&self.order[self.cursor..end]);
        self.cursor = end;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.order.len() - self.cursor;
        let n = (rest + self.batch_size - 1) / self.batch_size;
        (n, Some(n))
    }
}

impl<'a, B: Backend> ExactSizeIterator for Batches<'a, B> {}
