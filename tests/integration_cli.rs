// Drives the compiled binary in --headless mode, which needs no terminal.

use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

const QUICK_CONFIG: &str = r#"{
    "hold_secs": 0.2,
    "time_limit_secs": 5.0,
    "instruction_delay_secs": 0.2,
    "result_show_delay_secs": 0.2,
    "auto_transition_delay_secs": 0.2,
    "auto_reset_delay_secs": 0.2,
    "video_secs": 0.5
}"#;

fn stdout_of(args: &[&str]) -> String {
    let output = Command::cargo_bin("dalgona")
        .unwrap()
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "dalgona {args:?} failed");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn headless_run_succeeds_with_a_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, QUICK_CONFIG).unwrap();
    let path = path.to_str().unwrap();

    let out = stdout_of(&["--headless", "--config", path, "--variant", "3"]);

    assert!(out.contains("selected #3 (square)"), "{out}");
    assert!(out.contains("P35 completed"), "{out}");
    assert!(out.contains("ResettingDelay -> Intro"), "{out}");
    assert!(out.trim_end().ends_with("outcome: Success"), "{out}");
}

#[test]
fn headless_fail_times_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, QUICK_CONFIG).unwrap();
    let path = path.to_str().unwrap();

    let out = stdout_of(&["--headless", "--fail", "--config", path, "-t", "1"]);

    assert!(!out.contains("completed"), "{out}");
    assert!(out.trim_end().ends_with("outcome: Failure"), "{out}");
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");

    Command::cargo_bin("dalgona")
        .unwrap()
        .args(["--headless", "--config", path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn save_config_writes_the_effective_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let path_str = path.to_str().unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, QUICK_CONFIG).unwrap();

    stdout_of(&[
        "--headless",
        "--config",
        path_str,
        "--hold-secs",
        "0.3",
        "--save-config",
    ]);

    let saved: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved["hold_secs"], 0.3);
    assert_eq!(saved["variants"].as_array().map(Vec::len), Some(4));
}

#[test]
fn tui_refuses_without_a_tty() {
    Command::cargo_bin("dalgona")
        .unwrap()
        .write_stdin("")
        .assert()
        .failure();
}
