use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Archive missing or malformed, or `X`/`y` disagree in length.
    #[error("failed to load data: {0}")]
    DataLoad(String),

    /// An array holds something that is not a number.
    #[error("failed to convert data: {0}")]
    Conversion(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("training failed: {0}")]
    Training(String),

    #[error("failed to plot: {0}")]
    Plot(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
