pub mod ecg;

pub use ecg::{detect_r_peaks, detection_threshold, refractory_samples, ThresholdConfig};
