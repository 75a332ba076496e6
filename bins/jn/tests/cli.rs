use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use assert_cmd::Command;

/// Lays out `<project>/.jn/plugins/<name>.jnplugin.toml` plus a sibling
/// shell script standing in for a real plugin executable: it takes the
/// last positional argument as a file path and either cats it (read) or
/// writes stdin to it (write), ignoring every `--mode`/config flag in
/// between — enough to drive `bins/jn`'s resolution and pipeline wiring
/// through the real on-disk discovery path without a compiled codec.
fn install_echo_plugin(project: &std::path::Path, matches: &str, body: &str) {
    let plugins_dir = project.join(".jn").join("plugins");
    std::fs::create_dir_all(&plugins_dir).unwrap();

    let manifest = plugins_dir.join("echo.jnplugin.toml");
    let mut f = std::fs::File::create(&manifest).unwrap();
    writeln!(
        f,
        r#"
name = "echo"
version = "1.0.0"
role = "format"
modes = ["read", "write"]
matches = ["{matches}"]
"#
    )
    .unwrap();

    let script = plugins_dir.join("echo");
    std::fs::write(&script, body).unwrap();
    #[cfg(unix)]
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
}

const READ_BODY: &str = "#!/bin/sh\nfor f in \"$@\"; do true; done\ncat \"$f\"\n";
const WRITE_BODY: &str = "#!/bin/sh\nfor f in \"$@\"; do true; done\ncat > \"$f\"\n";

fn jn_cmd(project: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("jn").unwrap();
    cmd.current_dir(project);
    // Keep discovery/caching off the real user home during tests.
    cmd.env("JN_HOME", project.join("jn-home"));
    cmd
}

#[test]
fn cat_reads_a_single_source_through_its_resolved_plugin() {
    let project = tempfile::tempdir().unwrap();
    install_echo_plugin(project.path(), r"^.*\.echo$", READ_BODY);
    std::fs::write(project.path().join("a.echo"), "{\"x\":1}\n{\"x\":2}\n").unwrap();

    jn_cmd(project.path())
        .args(["cat", "a.echo"])
        .assert()
        .success()
        .stdout("{\"x\":1}\n{\"x\":2}\n");
}

#[test]
fn cat_reads_multiple_sources_in_order() {
    let project = tempfile::tempdir().unwrap();
    install_echo_plugin(project.path(), r"^.*\.echo$", READ_BODY);
    std::fs::write(project.path().join("a.echo"), "{\"x\":1}\n").unwrap();
    std::fs::write(project.path().join("b.echo"), "{\"x\":2}\n").unwrap();

    jn_cmd(project.path())
        .args(["cat", "a.echo", "b.echo"])
        .assert()
        .success()
        .stdout("{\"x\":1}\n{\"x\":2}\n");
}

#[test]
fn put_writes_stdin_to_the_resolved_sink() {
    let project = tempfile::tempdir().unwrap();
    install_echo_plugin(project.path(), r"^.*\.echo$", WRITE_BODY);

    jn_cmd(project.path())
        .args(["put", "out.echo"])
        .write_stdin("{\"x\":1}\n")
        .assert()
        .success();

    let written = std::fs::read_to_string(project.path().join("out.echo")).unwrap();
    assert_eq!(written, "{\"x\":1}\n");
}

#[test]
fn merge_tags_every_record_with_source_and_label() {
    let project = tempfile::tempdir().unwrap();
    install_echo_plugin(project.path(), r"^.*\.echo$", READ_BODY);
    std::fs::write(project.path().join("a.echo"), "{\"x\":1}\n{\"x\":2}\n").unwrap();
    std::fs::write(project.path().join("b.echo"), "{\"y\":3}\n").unwrap();

    let output = jn_cmd(project.path())
        .args(["merge", "a.echo:label=A", "b.echo:label=B"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let records: Vec<serde_json::Value> =
        stdout.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["_source"], "a.echo");
    assert_eq!(records[0]["_label"], "A");
    assert_eq!(records[0]["x"], 1);
    assert_eq!(records[2]["_source"], "b.echo");
    assert_eq!(records[2]["_label"], "B");
    assert_eq!(records[2]["y"], 3);
}

#[test]
fn resolve_prints_the_resolved_address_without_spawning_anything() {
    let project = tempfile::tempdir().unwrap();
    install_echo_plugin(project.path(), r"^.*\.echo$", READ_BODY);

    let output = jn_cmd(project.path())
        .args(["resolve", "a.echo", "--mode", "read"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let record: serde_json::Value = serde_json::from_str(stdout.trim_end()).unwrap();
    assert_eq!(record["plugin"]["name"], "echo");
    assert_eq!(record["address"]["base"], "a.echo");
    assert_eq!(record["effective_target"], "a.echo");

    // No sibling file was ever created, so nothing was actually spawned.
    assert!(!project.path().join("a.echo").exists());
}

#[test]
fn resolve_with_an_unresolvable_address_exits_with_code_2() {
    let project = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(project.path().join(".jn").join("plugins")).unwrap();

    jn_cmd(project.path())
        .args(["resolve", "nothing.unknownformat"])
        .assert()
        .code(2);
}

#[test]
fn timeout_kills_a_pipeline_that_never_produces_eof() {
    let project = tempfile::tempdir().unwrap();
    install_echo_plugin(
        project.path(),
        r"^.*\.slow$",
        "#!/bin/sh\nfor f in \"$@\"; do true; done\nsleep 30\n",
    );
    std::fs::write(project.path().join("a.slow"), "").unwrap();

    jn_cmd(project.path())
        .args(["--timeout", "1", "cat", "a.slow"])
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .code(1);
}

#[test]
fn missing_plugin_for_an_address_exits_with_code_2() {
    let project = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(project.path().join(".jn").join("plugins")).unwrap();

    jn_cmd(project.path())
        .args(["cat", "nothing.unknownformat"])
        .assert()
        .code(2);
}
