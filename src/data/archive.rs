use std::{fs::File, io, path::Path};

use ndarray::{s, Array1, Array2, ArrayD, Axis, Dimension, Ix1, Ix2, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter, ReadNpyError, ReadNpzError};
use tracing::info;

use crate::{Error, Float, Result};

/// `X`: one input sequence per row, `y`: one target per row.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPair {
    x: Array2<Float>,
    y: Array1<Float>,
}

/// Chronological train/test partition of a [`SeriesPair`].
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: SeriesPair,
    pub test: SeriesPair,
}

impl SeriesPair {
    pub fn new(x: Array2<Float>, y: Array1<Float>) -> Result<SeriesPair> {
        if x.nrows() != y.len() {
            return Err(Error::DataLoad(format!(
                "X has {} examples but y has {}",
                x.nrows(),
                y.len()
            )));
        }
        Ok(SeriesPair { x, y })
    }

    /// Reads the arrays named `X` and `y` from a `.npz` archive.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SeriesPair> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::DataLoad(format!("cannot open {}: {}", path.display(), e)))?;
        let mut npz = NpzReader::new(file)
            .map_err(|e| Error::DataLoad(format!("{} is not an npz archive: {}", path.display(), e)))?;
        let names = npz
            .names()
            .map_err(|e| Error::DataLoad(format!("cannot list {}: {}", path.display(), e)))?;

        let x = read_array(&mut npz, &names, "X")?;
        let y = read_array(&mut npz, &names, "y")?;
        let x = squeeze_trailing::<Ix2>(x, "X")?;
        let y = squeeze_trailing::<Ix1>(y, "y")?;
        SeriesPair::new(x, y)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut npz = NpzWriter::new_compressed(file);
        npz.add_array("X.npy", &self.x).map_err(write_error)?;
        npz.add_array("y.npy", &self.y).map_err(write_error)?;
        npz.finish().map_err(write_error)?;
        Ok(())
    }

    pub fn x(&self) -> &Array2<Float> {
        &self.x
    }

    pub fn y(&self) -> &Array1<Float> {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sequence_length(&self) -> usize {
        self.x.ncols()
    }

    /// The first `floor(train_fraction * len)` examples train, the rest test.
    /// Order is kept as is.
    pub fn split(&self, train_fraction: f64) -> Split {
        let k = (self.len() as f64 * train_fraction).floor() as usize;
        let k = k.min(self.len());
        Split {
            train: self.range(0, k),
            test: self.range(k, self.len()),
        }
    }

    fn range(&self, start: usize, end: usize) -> SeriesPair {
        SeriesPair {
            x: self.x.slice(s![start..end, ..]).to_owned(),
            y: self.y.slice(s![start..end]).to_owned(),
        }
    }
}

/// Loads the archive at `path` and splits it chronologically.
pub fn load_data<P: AsRef<Path>>(path: P, train_fraction: f64) -> Result<Split> {
    let pair = SeriesPair::load(&path)?;
    info!(
        path = %path.as_ref().display(),
        examples = pair.len(),
        sequence_length = pair.sequence_length(),
        "loaded series"
    );
    let split = pair.split(train_fraction);
    info!(
        train = split.train.len(),
        test = split.test.len(),
        "split series"
    );
    Ok(split)
}

/// Tries each numeric element type in turn. Only a descriptor mismatch moves
/// on to the next one; any other read failure means the entry is malformed.
macro_rules! read_as {
    ($npz:expr, $entry:expr, $name:expr, $($elem:ty),+) => {
        $(
            match $npz.by_name::<OwnedRepr<$elem>, IxDyn>($entry) {
                Ok(array) => return Ok(array.mapv(|v| v as Float)),
                Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => {}
                Err(e) => {
                    return Err(Error::DataLoad(format!("cannot read array `{}`: {}", $name, e)))
                }
            }
        )+
    };
}

fn read_array(
    npz: &mut NpzReader<File>,
    names: &[String],
    name: &str,
) -> Result<ArrayD<Float>> {
    // numpy stores `X` as `X.npy`
    let entry = names
        .iter()
        .find(|n| n.trim_end_matches(".npy") == name)
        .ok_or_else(|| Error::DataLoad(format!("archive has no array named `{}`", name)))?;

    read_as!(npz, entry, name, f64, f32, i64, i32, i16, i8, u64, u32, u16, u8);
    Err(Error::Conversion(format!("array `{}` is not numeric", name)))
}

/// Accepts `D` directly, or `D` plus a trailing axis of length 1.
fn squeeze_trailing<D: Dimension>(array: ArrayD<Float>, name: &str) -> Result<ndarray::Array<Float, D>> {
    let expected = D::NDIM.unwrap_or(0);
    let array = if array.ndim() == expected + 1 && array.shape()[expected] == 1 {
        array.index_axis_move(Axis(expected), 0)
    } else {
        array
    };
    let shape = array.shape().to_vec();
    array.into_dimensionality::<D>().map_err(|_| {
        Error::DataLoad(format!(
            "array `{}` should have {} dimensions, got shape {:?}",
            name, expected, shape
        ))
    })
}

fn write_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::Other, e.to_string()))
}
