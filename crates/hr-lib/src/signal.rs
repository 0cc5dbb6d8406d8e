use crate::io::LoadError;
use serde::{Deserialize, Serialize};

/// Single-lead recording: timestamps (seconds) paired one-to-one with samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Non-decreasing timestamps in seconds
    pub time: Vec<f64>,
    /// Samples, arbitrary amplitude units
    pub ecg: Vec<f64>,
}

impl Recording {
    pub fn new(time: Vec<f64>, ecg: Vec<f64>) -> Result<Self, LoadError> {
        if time.len() != ecg.len() {
            return Err(LoadError::LengthMismatch {
                time: time.len(),
                ecg: ecg.len(),
            });
        }
        Ok(Self { time, ecg })
    }

    pub fn len(&self) -> usize {
        self.ecg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ecg.is_empty()
    }

    /// Span of the timebase, `time[last] - time[first]`. Zero for fewer than two samples.
    pub fn duration(&self) -> f64 {
        match (self.time.first(), self.time.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// Point events on a timeline (R-peak sample indices).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Events {
    pub indices: Vec<usize>,
}

impl Events {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
