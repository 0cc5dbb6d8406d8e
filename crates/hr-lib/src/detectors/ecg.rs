use crate::signal::Events;
use log::debug;
use serde::{Deserialize, Serialize};

/// Thresholds for the amplitude/refractory R-peak picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Number of standard deviations above the mean a peak must exceed.
    pub threshold_factor: f64,
    /// Minimum R-R distance / refractory period (milliseconds).
    pub min_distance_ms: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            threshold_factor: 0.5,
            min_distance_ms: 300.0,
        }
    }
}

/// Detect R-peaks as strict local maxima above a global `mean + k * std` threshold,
/// enforcing a refractory window between accepted peaks.
///
/// Only interior samples (`1..=len - 2`) are considered. Inputs shorter than three
/// samples, flat signals and degenerate statistics yield an empty set.
pub fn detect_r_peaks(data: &[f64], fs: f64, cfg: &ThresholdConfig) -> Events {
    if data.len() < 3 {
        return Events::default();
    }

    let threshold = detection_threshold(data, cfg.threshold_factor);
    let min_samples = refractory_samples(fs, cfg.min_distance_ms) as isize;
    debug!(
        "r-peak scan: n={} threshold={:.4} refractory={} samples",
        data.len(),
        threshold,
        min_samples
    );

    let mut peaks = Vec::new();
    let mut last_peak = -min_samples;
    for i in 1..data.len() - 1 {
        if (i as isize) - last_peak < min_samples {
            continue;
        }
        let y = data[i];
        if y > threshold && y > data[i - 1] && y > data[i + 1] {
            peaks.push(i);
            last_peak = i as isize;
        }
    }

    debug!("r-peak scan accepted {} peaks", peaks.len());
    Events::from_indices(peaks)
}

/// Global amplitude threshold `mean + threshold_factor * std` (population statistics).
pub fn detection_threshold(data: &[f64], threshold_factor: f64) -> f64 {
    let (mean, std) = mean_std(data);
    mean + threshold_factor * std
}

/// Refractory window in samples, `floor(min_distance_ms / 1000 * fs)`.
pub fn refractory_samples(fs: f64, min_distance_ms: f64) -> usize {
    let window = (min_distance_ms / 1000.0) * fs;
    if window.is_finite() && window > 0.0 {
        window.floor() as usize
    } else {
        0
    }
}

fn mean_std(data: &[f64]) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let var = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
