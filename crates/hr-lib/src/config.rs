use crate::{detectors::ThresholdConfig, synth::DemoConfig};
use log::warn;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_FS: f64 = 250.0;
pub const RECOMMENDED_FS: RangeInclusive<f64> = 50.0..=2000.0;
pub const RECOMMENDED_MIN_DISTANCE_MS: RangeInclusive<f64> = 200.0..=1000.0;
pub const RECOMMENDED_DURATION_S: RangeInclusive<f64> = 5.0..=20.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{name} must be {expected}, got {value}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// Operator-facing settings as read from a TOML file or command line flags.
/// Every key is optional; unset keys fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub analysis: AnalysisSection,
    pub demo: DemoSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisSection {
    pub fs: Option<f64>,
    pub min_distance_ms: Option<f64>,
    pub threshold_factor: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoSection {
    pub duration_s: Option<f64>,
    pub seed: Option<u64>,
    pub noise: Option<bool>,
}

/// Fully resolved parameters handed to the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub fs: f64,
    pub thresholds: ThresholdConfig,
    pub demo: DemoConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Layer `overrides` on top of `self`; keys set in `overrides` win.
    pub fn merge(self, overrides: AppConfig) -> AppConfig {
        AppConfig {
            analysis: AnalysisSection {
                fs: overrides.analysis.fs.or(self.analysis.fs),
                min_distance_ms: overrides
                    .analysis
                    .min_distance_ms
                    .or(self.analysis.min_distance_ms),
                threshold_factor: overrides
                    .analysis
                    .threshold_factor
                    .or(self.analysis.threshold_factor),
            },
            demo: DemoSection {
                duration_s: overrides.demo.duration_s.or(self.demo.duration_s),
                seed: overrides.demo.seed.or(self.demo.seed),
                noise: overrides.demo.noise.or(self.demo.noise),
            },
        }
    }

    /// Apply defaults and validate. Values outside the recommended operator
    /// ranges are accepted with a warning.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let thresholds_default = ThresholdConfig::default();
        let demo_default = DemoConfig::default();

        let fs = self.analysis.fs.unwrap_or(DEFAULT_FS);
        let min_distance_ms = self
            .analysis
            .min_distance_ms
            .unwrap_or(thresholds_default.min_distance_ms);
        let threshold_factor = self
            .analysis
            .threshold_factor
            .unwrap_or(thresholds_default.threshold_factor);
        let duration_s = self.demo.duration_s.unwrap_or(demo_default.duration_s);

        require_positive("fs", fs)?;
        require_positive("min_distance_ms", min_distance_ms)?;
        require_positive("duration_s", duration_s)?;
        if !(threshold_factor.is_finite() && threshold_factor >= 0.0) {
            return Err(ConfigError::Invalid {
                name: "threshold_factor",
                expected: "a finite number >= 0",
                value: threshold_factor,
            });
        }

        warn_outside("fs", fs, &RECOMMENDED_FS);
        warn_outside("min_distance_ms", min_distance_ms, &RECOMMENDED_MIN_DISTANCE_MS);
        warn_outside("duration_s", duration_s, &RECOMMENDED_DURATION_S);

        let noise_std = if self.demo.noise.unwrap_or(true) {
            demo_default.noise_std
        } else {
            0.0
        };

        Ok(Settings {
            fs,
            thresholds: ThresholdConfig {
                threshold_factor,
                min_distance_ms,
            },
            demo: DemoConfig {
                duration_s,
                fs,
                noise_std,
                seed: self.demo.seed,
                ..demo_default
            },
        })
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            expected: "a finite number > 0",
            value,
        })
    }
}

fn warn_outside(name: &str, value: f64, range: &RangeInclusive<f64>) {
    if !range.contains(&value) {
        warn!(
            "{} = {} is outside the recommended range {}..={}",
            name,
            value,
            range.start(),
            range.end()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let settings = AppConfig::default().settings().unwrap();
        assert_eq!(settings.fs, 250.0);
        assert_eq!(settings.thresholds, ThresholdConfig::default());
        assert_eq!(settings.demo.duration_s, 10.0);
        assert_eq!(settings.demo.fs, 250.0);
        assert_eq!(settings.demo.noise_std, 0.05);
        assert_eq!(settings.demo.seed, None);
    }

    #[test]
    fn parses_toml_sections() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [analysis]
            fs = 360.0
            min_distance_ms = 250.0

            [demo]
            seed = 7
            noise = false
            "#,
        )
        .unwrap();
        let settings = cfg.settings().unwrap();
        assert_eq!(settings.fs, 360.0);
        assert_eq!(settings.thresholds.min_distance_ms, 250.0);
        assert_eq!(settings.thresholds.threshold_factor, 0.5);
        assert_eq!(settings.demo.fs, 360.0);
        assert_eq!(settings.demo.seed, Some(7));
        assert_eq!(settings.demo.noise_std, 0.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AppConfig::from_toml_str("[analysis]\nsampling = 250.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let file = AppConfig::from_toml_str("[analysis]\nfs = 500.0\nthreshold_factor = 1.0\n")
            .unwrap();
        let flags = AppConfig {
            analysis: AnalysisSection {
                fs: Some(125.0),
                ..AnalysisSection::default()
            },
            ..AppConfig::default()
        };
        let merged = file.merge(flags);
        assert_eq!(merged.analysis.fs, Some(125.0));
        assert_eq!(merged.analysis.threshold_factor, Some(1.0));
    }

    #[test]
    fn rejects_non_positive_values() {
        for text in [
            "[analysis]\nfs = 0.0\n",
            "[analysis]\nmin_distance_ms = -1.0\n",
            "[analysis]\nthreshold_factor = -0.5\n",
            "[demo]\nduration_s = 0.0\n",
        ] {
            let cfg = AppConfig::from_toml_str(text).unwrap();
            assert!(
                matches!(cfg.settings(), Err(ConfigError::Invalid { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn out_of_range_values_are_only_warnings() {
        let cfg = AppConfig::from_toml_str("[analysis]\nfs = 4000.0\nmin_distance_ms = 50.0\n")
            .unwrap();
        let settings = cfg.settings().unwrap();
        assert_eq!(settings.fs, 4000.0);
        assert_eq!(settings.thresholds.min_distance_ms, 50.0);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[demo]\nduration_s = 12.5").unwrap();
        let cfg = AppConfig::load(file.path()).unwrap();
        assert_eq!(cfg.demo.duration_s, Some(12.5));

        let missing = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
