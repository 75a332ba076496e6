use assert_cmd::Command;

#[test]
fn read_mode_converts_csv_to_ndjson() {
    Command::cargo_bin("jn-fmt-csv")
        .unwrap()
        .args(["--mode", "read"])
        .write_stdin("name,age\nalice,30\nbob,40\n")
        .assert()
        .success()
        .stdout("{\"age\":\"30\",\"name\":\"alice\"}\n{\"age\":\"40\",\"name\":\"bob\"}\n");
}

#[test]
fn write_mode_converts_ndjson_to_csv() {
    Command::cargo_bin("jn-fmt-csv")
        .unwrap()
        .args(["--mode", "write"])
        .write_stdin("{\"name\":\"alice\",\"age\":\"30\"}\n")
        .assert()
        .success()
        .stdout("age,name\n30,alice\n");
}

#[test]
fn inspect_mode_emits_one_metadata_record() {
    let output = Command::cargo_bin("jn-fmt-csv")
        .unwrap()
        .args(["--mode", "inspect"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    let record: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(record["name"], "csv");
    assert_eq!(record["role"], "format");
    assert!(record["modes"].as_array().unwrap().contains(&serde_json::json!("read")));
}

#[test]
fn unknown_mode_exits_with_usage_error() {
    Command::cargo_bin("jn-fmt-csv")
        .unwrap()
        .args(["--mode", "bogus"])
        .assert()
        .code(2);
}

#[test]
fn unrecognized_flags_from_the_orchestrator_are_tolerated() {
    Command::cargo_bin("jn-fmt-csv")
        .unwrap()
        .args(["--mode", "read", "--some-other-plugins-option", "value"])
        .write_stdin("a\n1\n")
        .assert()
        .success()
        .stdout("{\"a\":\"1\"}\n");
}
