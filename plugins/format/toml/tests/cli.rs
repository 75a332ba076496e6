use assert_cmd::Command;

#[test]
fn read_mode_converts_toml_to_one_ndjson_record() {
    Command::cargo_bin("jn-fmt-toml")
        .unwrap()
        .args(["--mode", "read"])
        .write_stdin("name = \"alice\"\nage = 30\n")
        .assert()
        .success()
        .stdout("{\"age\":30,\"name\":\"alice\"}\n");
}

#[test]
fn write_mode_converts_ndjson_to_toml() {
    Command::cargo_bin("jn-fmt-toml")
        .unwrap()
        .args(["--mode", "write"])
        .write_stdin("{\"name\":\"alice\"}\n")
        .assert()
        .success()
        .stdout("name = \"alice\"\n");
}

#[test]
fn inspect_mode_emits_one_metadata_record() {
    let output = Command::cargo_bin("jn-fmt-toml")
        .unwrap()
        .args(["--mode", "inspect"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    let record: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(record["name"], "toml");
    assert_eq!(record["role"], "format");
}

#[test]
fn malformed_toml_fails_with_nonzero_exit() {
    Command::cargo_bin("jn-fmt-toml")
        .unwrap()
        .args(["--mode", "read"])
        .write_stdin("a = \n")
        .assert()
        .failure();
}

#[test]
fn unknown_mode_exits_with_usage_error() {
    Command::cargo_bin("jn-fmt-toml")
        .unwrap()
        .args(["--mode", "bogus"])
        .assert()
        .code(2);
}
