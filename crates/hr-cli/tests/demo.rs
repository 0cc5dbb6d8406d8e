use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::{error::Error, fs};
use tempfile::tempdir;

fn run_json(args: &[&str]) -> Result<Value, Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("hr");
    cmd.args(args);
    let output = cmd.assert().success().get_output().stdout.clone();
    Ok(serde_json::from_slice(&output)?)
}

fn peak_count(result: &Value) -> usize {
    result["events"]["indices"]
        .as_array()
        .map(|a| a.len())
        .unwrap_or_default()
}

#[test]
fn noiseless_demo_finds_twelve_beats_at_72_bpm() -> Result<(), Box<dyn Error>> {
    let result = run_json(&["demo", "--no-noise"])?;
    assert_eq!(result["sample_count"], 2500);
    assert_eq!(result["duration_s"], 10.0);
    assert_eq!(peak_count(&result), 12);
    assert_eq!(result["heart_rate_bpm"], 72.0);
    Ok(())
}

#[test]
fn seeded_demo_is_reproducible() -> Result<(), Box<dyn Error>> {
    let args = ["demo", "--seed", "7", "--threshold-factor", "3"];
    let first = run_json(&args)?;
    let second = run_json(&args)?;
    assert_eq!(first, second);
    assert_eq!(peak_count(&first), 12);
    assert_eq!(first["heart_rate_bpm"], 72.0);
    Ok(())
}

#[test]
fn config_file_supplies_defaults_and_flags_override() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("hr.toml");
    fs::write(
        &config,
        "[analysis]\nfs = 500.0\nmin_distance_ms = 400.0\n\n[demo]\nduration_s = 20.0\nnoise = false\n",
    )?;
    let config = config.to_string_lossy().to_string();

    let result = run_json(&["demo", "--config", &config])?;
    assert_eq!(result["fs"], 500.0);
    assert_eq!(result["sample_count"], 10000);
    assert_eq!(result["refractory_samples"], 200);
    // Beats at k * 0.83 s below 20 s, minus the one at t = 0.
    assert_eq!(peak_count(&result), 24);
    assert_eq!(result["heart_rate_bpm"], 72.0);

    let result = run_json(&["demo", "--config", &config, "--duration-s", "5"])?;
    assert_eq!(result["sample_count"], 2500);
    assert_eq!(peak_count(&result), 6);
    assert_eq!(result["heart_rate_bpm"], 72.0);
    Ok(())
}

#[test]
fn generated_csv_analyzes_like_the_demo() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let out = dir.path().join("demo.csv");
    let out_str = out.to_string_lossy().to_string();

    cargo_bin_cmd!("hr")
        .args(["generate", "--no-noise", "--duration-s", "8", "--out", &out_str])
        .assert()
        .success();
    let text = fs::read_to_string(&out)?;
    assert!(text.starts_with("time,ecg\n"));
    assert_eq!(text.lines().count(), 2001);

    let result = run_json(&["analyze", "--input", &out_str])?;
    assert_eq!(result["sample_count"], 2000);
    assert_eq!(peak_count(&result), 9);
    assert_eq!(result["heart_rate_bpm"], 67.5);
    Ok(())
}

#[test]
fn unknown_config_key_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[analysis]\nsampling_rate = 250\n")?;

    let assert = cargo_bin_cmd!("hr")
        .args(["demo", "--config", config.to_string_lossy().as_ref()])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("parsing config"), "unexpected stderr: {stderr}");
    Ok(())
}
