use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str, ext: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    path.push(format!("{}_{}_{}.{}", name, std::process::id(), nonce, ext));
    path
}

fn run_demo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_object_statics_demo"))
        .args(args)
        .output()
        .expect("demo binary should run")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be utf-8")
}

#[test]
fn no_arguments_prints_full_demo() {
    let output = run_demo(&[]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("=== OBJECT STATIC METHODS DEMONSTRATION ==="));
    assert!(stdout.contains("--- assign - Copy properties from source records to target ---"));
    assert!(stdout.contains("--- values - Get array of property values ---"));
    assert!(stdout.trim_end().ends_with("=== END STATIC DEMO ==="));
    assert!(output.stderr.is_empty());
}

#[test]
fn json_flag_emits_report() {
    let output = run_demo(&["--json", "--block", "freeze"]);
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["blocks"].as_array().unwrap().len(), 1);
    assert_eq!(report["blocks"][0]["name"], "freeze");
    assert!(
        report["transcript"]
            .as_str()
            .unwrap()
            .contains("Is frozen: true")
    );
}

#[test]
fn events_flag_appends_json_lines() {
    let output = run_demo(&["--events", "--block", "keys"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).expect("event line should be JSON"))
        .collect();
    assert_eq!(events.len(), 3);
    assert_eq!(events[1]["event"], "block.keys");
}

#[test]
fn config_file_is_loaded_and_flags_override() {
    let path = temp_path("object_statics_demo_config", "json");
    fs::write(
        &path,
        r#"{"trace_id":"cli-config","format":"text","blocks":["seal"]}"#,
    )
    .expect("config should be written");

    let output = run_demo(&["--config", path.to_str().unwrap(), "--json"]);
    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["trace_id"], "cli-config");
    assert_eq!(report["blocks"][0]["name"], "seal");

    let _ = fs::remove_file(path);
}

#[test]
fn help_prints_usage() {
    let output = run_demo(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("object_statics_demo usage:"));
    assert!(stdout.contains("get_own_property_symbols"));
}

#[test]
fn argument_errors_exit_two() {
    for args in [
        vec!["--bogus"],
        vec!["--block"],
        vec!["--block", "nope"],
        vec!["--config", "/definitely/not/here.json"],
    ] {
        let output = run_demo(&args);
        assert_eq!(output.status.code(), Some(2), "args: {args:?}");
        assert!(!output.stderr.is_empty(), "args: {args:?}");
        assert!(output.stdout.is_empty(), "args: {args:?}");
    }
}
