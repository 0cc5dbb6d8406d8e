use crate::{
    detectors::ecg::{detect_r_peaks, detection_threshold, refractory_samples, ThresholdConfig},
    metrics::rate::compute_hr,
    signal::{Events, Recording},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Combined result of R-peak detection and heart-rate estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub fs: f64,
    pub sample_count: usize,
    /// Span of the timebase (seconds) the rate is computed over.
    pub duration_s: f64,
    pub threshold: f64,
    pub refractory_samples: usize,
    pub events: Events,
    /// `None` when fewer than two peaks were found.
    pub heart_rate_bpm: Option<f64>,
}

impl AnalysisResult {
    pub fn peak_times(&self, recording: &Recording) -> Vec<f64> {
        self.events
            .indices
            .iter()
            .filter_map(|&i| recording.time.get(i).copied())
            .collect()
    }
}

/// Detect R-peaks in `recording` and estimate the mean heart rate over its timebase span.
pub fn analyze(recording: &Recording, fs: f64, cfg: &ThresholdConfig) -> AnalysisResult {
    let events = detect_r_peaks(&recording.ecg, fs, cfg);
    let duration_s = recording.duration();
    let heart_rate_bpm = compute_hr(&events, duration_s);
    match heart_rate_bpm {
        Some(bpm) => info!(
            "{} R-peaks over {:.3} s -> {:.1} BPM",
            events.len(),
            duration_s,
            bpm
        ),
        None => warn!(
            "not enough peaks detected to compute heart rate ({} found)",
            events.len()
        ),
    }
    AnalysisResult {
        fs,
        sample_count: recording.len(),
        duration_s,
        threshold: if recording.is_empty() {
            0.0
        } else {
            detection_threshold(&recording.ecg, cfg.threshold_factor)
        },
        refractory_samples: refractory_samples(fs, cfg.min_distance_ms),
        events,
        heart_rate_bpm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{generate_demo_ecg, nominal_beat_indices, DemoConfig};

    #[test]
    fn noiseless_demo_yields_twelve_beats_at_72_bpm() {
        let demo = DemoConfig::default().noiseless();
        let rec = generate_demo_ecg(&demo);
        let result = analyze(&rec, 250.0, &ThresholdConfig::default());
        assert_eq!(result.events.len(), 12);
        assert_eq!(result.duration_s, 10.0);
        assert_eq!(result.heart_rate_bpm, Some(72.0));
        assert_eq!(compute_hr(&result.events, 10.0), Some(72.0));
        assert_eq!(result.refractory_samples, 75);
        assert_eq!(
            result.events.indices,
            nominal_beat_indices(&rec.time, demo.duration_s, demo.rr_interval_s)
        );
    }

    #[test]
    fn noisy_demo_peaks_stay_within_a_sample_of_nominal_beats() {
        let demo = DemoConfig {
            seed: Some(2024),
            ..DemoConfig::default()
        };
        let rec = generate_demo_ecg(&demo);
        let cfg = ThresholdConfig {
            threshold_factor: 3.0,
            ..ThresholdConfig::default()
        };
        let result = analyze(&rec, demo.fs, &cfg);
        let nominal = nominal_beat_indices(&rec.time, demo.duration_s, demo.rr_interval_s);
        assert_eq!(result.events.len(), nominal.len());
        for (&found, &expected) in result.events.indices.iter().zip(&nominal) {
            assert!(found.abs_diff(expected) <= 1, "{found} vs {expected}");
        }
        assert_eq!(result.heart_rate_bpm, Some(72.0));
    }

    #[test]
    fn flat_recording_reports_undefined_rate() {
        let rec = Recording::new((0..500).map(|i| i as f64 / 250.0).collect(), vec![0.0; 500])
            .unwrap();
        let result = analyze(&rec, 250.0, &ThresholdConfig::default());
        assert!(result.events.is_empty());
        assert_eq!(result.heart_rate_bpm, None);
        assert_eq!(result.threshold, 0.0);
    }

    #[test]
    fn empty_recording_does_not_fail() {
        let rec = Recording::new(Vec::new(), Vec::new()).unwrap();
        let result = analyze(&rec, 250.0, &ThresholdConfig::default());
        assert_eq!(result.sample_count, 0);
        assert_eq!(result.heart_rate_bpm, None);
    }

    #[test]
    fn serializes_missing_rate_as_null() {
        let rec = Recording::new(vec![0.0, 0.004, 0.008], vec![0.0, 1.0, 0.0]).unwrap();
        let result = analyze(&rec, 250.0, &ThresholdConfig::default());
        assert_eq!(result.events.indices, vec![1]);
        assert_eq!(result.peak_times(&rec), vec![0.004]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["heart_rate_bpm"].is_null());
        assert_eq!(json["events"]["indices"], serde_json::json!([1]));
    }
}
