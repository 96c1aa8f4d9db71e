use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "budgetcut-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_strategies_writes_output() {
    let exe = env!("CARGO_BIN_EXE_budgetcut-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-strategies", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available strategies"));
    assert!(content.contains("override"));
}

#[test]
fn cli_runs_strategies_and_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_budgetcut-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--strategies",
            "override,greedy",
            "--iterations",
            "2",
            "--seeds",
            "1,2",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Budget Cut Automated Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let results: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = results.as_array().expect("results array");
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r["passed"] == true));
    assert_eq!(results[0]["strategy"], "override");
    assert_eq!(results[0]["victories"], 2);
    assert_eq!(results[2]["strategy"], "greedy");
    assert_eq!(results[2]["timeouts"], 2);
}

#[test]
fn cli_rejects_unknown_strategy() {
    let exe = env!("CARGO_BIN_EXE_budgetcut-tester");
    let output = Command::new(exe)
        .args(["--strategies", "reckless", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown strategy `reckless`"));
}

#[test]
fn cli_loads_custom_config() {
    let exe = env!("CARGO_BIN_EXE_budgetcut-tester");
    let config_path = temp_path("config");
    std::fs::write(
        &config_path,
        r#"{
            "target_cuts": 10.0,
            "roster": [
                {"id": "medicaid", "name": "Medicaid", "budget": 561.0, "protected": true},
                {"id": "chip", "name": "CHIP", "budget": 17.0}
            ]
        }"#,
    )
    .expect("write config");
    let output = Command::new(exe)
        .args(["--strategies", "greedy", "--iterations", "1", "--report", "json", "--config"])
        .arg(&config_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let results: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json on stdout");
    assert_eq!(results[0]["victories"], 1);
    assert_eq!(results[0]["average_cuts"], 10.0);
}
