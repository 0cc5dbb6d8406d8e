//! Synthetic ECG-like recordings with known beat timing.
//!
//! The waveform is Gaussian noise with a three-sample pulse added at every
//! nominal beat instant. It is meant to exercise the detector end to end and
//! makes no attempt at physiological morphology.

use crate::signal::Recording;
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Nominal beat spacing of the demo recording (~72 BPM).
pub const DEMO_RR_INTERVAL_S: f64 = 0.83;
/// Standard deviation of the demo background noise.
pub const DEMO_NOISE_STD: f64 = 0.05;

const PULSE_PEAK: f64 = 1.0;
const PULSE_SHOULDER: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Recording length (seconds).
    pub duration_s: f64,
    /// Sampling frequency (Hz).
    pub fs: f64,
    /// Spacing between nominal beats (seconds).
    pub rr_interval_s: f64,
    /// Background noise standard deviation; zero disables noise.
    pub noise_std: f64,
    /// Seed for the noise generator; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            duration_s: 10.0,
            fs: 250.0,
            rr_interval_s: DEMO_RR_INTERVAL_S,
            noise_std: DEMO_NOISE_STD,
            seed: None,
        }
    }
}

impl DemoConfig {
    pub fn noiseless(mut self) -> Self {
        self.noise_std = 0.0;
        self
    }

    /// Number of samples produced, `floor(duration_s * fs)`.
    pub fn sample_count(&self) -> usize {
        let n = self.duration_s * self.fs;
        if n.is_finite() && n > 0.0 {
            n.floor() as usize
        } else {
            0
        }
    }
}

/// Generate a demo recording, seeding the noise from `cfg.seed` (or entropy).
pub fn generate_demo_ecg(cfg: &DemoConfig) -> Recording {
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_demo_ecg_with_rng(cfg, &mut rng)
}

/// Generate a demo recording drawing noise from the supplied generator.
pub fn generate_demo_ecg_with_rng<R: Rng + ?Sized>(cfg: &DemoConfig, rng: &mut R) -> Recording {
    let n = cfg.sample_count();
    let time = linspace(0.0, cfg.duration_s, n);

    let mut ecg: Vec<f64> = match noise_distribution(cfg.noise_std) {
        Some(dist) => (0..n).map(|_| dist.sample(&mut *rng)).collect(),
        None => vec![0.0; n],
    };

    let beats = nominal_beat_indices(&time, cfg.duration_s, cfg.rr_interval_s);
    for &idx in &beats {
        ecg[idx] += PULSE_PEAK;
        ecg[idx - 1] += PULSE_SHOULDER;
        ecg[idx + 1] += PULSE_SHOULDER;
    }
    debug!(
        "demo ecg: {} samples, {} pulses, noise std {}",
        n,
        beats.len(),
        cfg.noise_std
    );

    Recording { time, ecg }
}

/// Sample indices of the pulses the generator places for this timebase.
///
/// Beats fall at `k * rr_interval_s` for every `k` with an instant below
/// `duration_s`; each snaps to the closest timestamp and is dropped when it
/// lands within one sample of either end of the recording.
pub fn nominal_beat_indices(time: &[f64], duration_s: f64, rr_interval_s: f64) -> Vec<usize> {
    if !(rr_interval_s.is_finite() && rr_interval_s > 0.0 && duration_s.is_finite()) {
        return Vec::new();
    }
    let n = time.len();
    let count = (duration_s / rr_interval_s).ceil().max(0.0) as usize;
    (0..count)
        .map(|k| k as f64 * rr_interval_s)
        .filter_map(|beat| closest_index(time, beat))
        .filter(|&idx| idx > 1 && idx + 2 < n)
        .collect()
}

/// `n` evenly spaced values from `start` to `stop`, both ends included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            out[n - 1] = stop;
            out
        }
    }
}

fn noise_distribution(std: f64) -> Option<Normal<f64>> {
    if std.is_finite() && std > 0.0 {
        Normal::new(0.0, std).ok()
    } else {
        None
    }
}

/// Index of the timestamp nearest to `target`; the earlier one wins ties.
fn closest_index(time: &[f64], target: f64) -> Option<usize> {
    if time.is_empty() {
        return None;
    }
    let upper = time.partition_point(|&t| t < target);
    if upper == 0 {
        return Some(0);
    }
    if upper == time.len() {
        return Some(time.len() - 1);
    }
    let below = target - time[upper - 1];
    let above = time[upper] - target;
    if above < below {
        Some(upper)
    } else {
        Some(upper - 1)
    }
}
