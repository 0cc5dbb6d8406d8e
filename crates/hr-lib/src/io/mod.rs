pub mod csv;

use thiserror::Error;

/// Failures while turning external data into a [`crate::signal::Recording`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV must contain 'time' and 'ecg' columns (missing '{0}')")]
    MissingColumn(&'static str),
    #[error("line {line}: {column} value {value:?} is not a number")]
    Parse {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("no samples found")]
    Empty,
    #[error("time has {time} samples but ecg has {ecg}")]
    LengthMismatch { time: usize, ecg: usize },
    #[error(transparent)]
    Csv(#[from] ::csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
