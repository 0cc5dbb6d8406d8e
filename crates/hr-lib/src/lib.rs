pub mod config;
pub mod detectors;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod signal;
pub mod synth;

pub use detectors::*;
pub use metrics::*;
pub use pipeline::{analyze, AnalysisResult};
pub use signal::*;
