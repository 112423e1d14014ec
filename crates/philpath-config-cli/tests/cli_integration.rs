//! Integration tests for the philpath-config CLI.
//!
//! Run with: `cargo test --package philpath-config-cli --test cli_integration`

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

/// Helper to run the CLI in a directory with an isolated environment.
fn run_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_philpath-config"))
        .current_dir(dir)
        .args(args)
        .env("PHILPATH_CONFIG", dir.join("no-such-config.json"))
        .env_remove("PHILPATH_CLASS_TYPE")
        .env_remove("PHILPATH_OUTPUT")
        .output()
        .expect("Failed to execute philpath-config")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn write_descriptor(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("algorithm.json");
    fs::write(
        &path,
        r#"{
  "resolution": "0.25mpp",
  "classes": {"names": ["Tumour region", "Non-tumour", "Boundary", "Background"]}
}"#,
    )
    .unwrap();
    path
}

// =============================================================================
// Input resolution
// =============================================================================

#[test]
fn test_num_classes_writes_default_output() {
    let temp = TempDir::new().unwrap();

    let output = run_in_dir(temp.path(), &["--num-classes", "3"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value = read_json(&temp.path().join("channels.json"));
    assert_eq!(value["pixelSizeMicrons"], Value::Null);
    let names: Vec<_> = value["channels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Name_0", "Name_1", "Name_2"]);
    assert_eq!(value["channels"][0]["rgba"], json!([255, 0, 0]));
    assert_eq!(value["channels"][0]["type"], json!("STRUCTURE"));
}

#[test]
fn test_descriptor_to_explicit_output() {
    let temp = TempDir::new().unwrap();
    let input = write_descriptor(temp.path());
    let out = temp.path().join("out/config.json");

    let output = run_in_dir(
        temp.path(),
        &[input.to_str().unwrap(), out.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value = read_json(&out);
    assert_eq!(value["pixelSizeMicrons"], json!(0.25));
    assert_eq!(
        value["channels"],
        json!([
            {"name": "Tumour region", "rgba": [255, 0, 0], "type": "STRUCTURE"},
            {"name": "Non-tumour", "rgba": [0, 255, 0], "type": "STRUCTURE"},
            {"name": "Boundary", "rgba": [20, 20, 20], "type": "BOUNDARY"},
            {"name": "Background", "rgba": [255, 255, 255, -255], "type": "BACKGROUND"}
        ])
    );

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.find("pixelSizeMicrons").unwrap() < text.find("channels").unwrap());
}

#[test]
fn test_class_type_flag_and_stdout() {
    let temp = TempDir::new().unwrap();

    let output = run_in_dir(
        temp.path(),
        &["--num-classes", "1", "--class-type", "background", "--stdout"],
    );
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["channels"][0]["type"], json!("BACKGROUND"));
    assert!(!temp.path().join("channels.json").exists());
}

#[test]
fn test_output_flag_with_num_classes() {
    let temp = TempDir::new().unwrap();

    let output = run_in_dir(temp.path(), &["-n", "2", "-o", "custom.json"]);
    assert!(output.status.success());

    let value = read_json(&temp.path().join("custom.json"));
    assert_eq!(value["channels"].as_array().unwrap().len(), 2);
}

#[test]
fn test_class_type_from_environment() {
    let temp = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_philpath-config"))
        .current_dir(temp.path())
        .args(["-n", "1", "--stdout"])
        .env("PHILPATH_CONFIG", temp.path().join("no-such-config.json"))
        .env("PHILPATH_CLASS_TYPE", "BOUNDARY")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["channels"][0]["type"], json!("BOUNDARY"));
}

#[test]
fn test_class_type_flag_overrides_invalid_environment() {
    let temp = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_philpath-config"))
        .current_dir(temp.path())
        .args(["-n", "1", "--class-type", "BOUNDARY", "--stdout"])
        .env("PHILPATH_CONFIG", temp.path().join("no-such-config.json"))
        .env("PHILPATH_CLASS_TYPE", "TISSUE")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["channels"][0]["type"], json!("BOUNDARY"));
}

#[test]
fn test_invalid_environment_class_type_fails_without_flag() {
    let temp = TempDir::new().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_philpath-config"))
        .current_dir(temp.path())
        .args(["-n", "1"])
        .env("PHILPATH_CONFIG", temp.path().join("no-such-config.json"))
        .env("PHILPATH_CLASS_TYPE", "TISSUE")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PHILPATH_CLASS_TYPE"));
    assert!(!temp.path().join("channels.json").exists());
}

// =============================================================================
// Failures leave no output behind
// =============================================================================

#[test]
fn test_no_input_fails_without_output() {
    let temp = TempDir::new().unwrap();

    let output = run_in_dir(temp.path(), &[]);
    assert!(!output.status.success());
    assert!(!temp.path().join("channels.json").exists());
}

#[test]
fn test_unsupported_format_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("model.onnx"), b"onnx").unwrap();

    let output = run_in_dir(temp.path(), &["model.onnx"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported input format"));
    assert!(!temp.path().join("channels.json").exists());
}

#[test]
fn test_malformed_descriptor_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("algo.json"), r#"{"resolution": "1mpp"}"#).unwrap();

    let output = run_in_dir(temp.path(), &["algo.json"]);
    assert!(!output.status.success());
    assert!(!temp.path().join("channels.json").exists());
}

#[test]
fn test_zero_classes_fails() {
    let temp = TempDir::new().unwrap();

    let output = run_in_dir(temp.path(), &["--num-classes", "0"]);
    assert!(!output.status.success());
    assert!(!temp.path().join("channels.json").exists());
}

#[test]
fn test_invalid_class_type_is_rejected() {
    let temp = TempDir::new().unwrap();

    let output = run_in_dir(temp.path(), &["-n", "2", "--class-type", "tissue"]);
    assert!(!output.status.success());
    assert!(!temp.path().join("channels.json").exists());
}
