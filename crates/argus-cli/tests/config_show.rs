use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn config_show_prints_effective_defaults() {
    let home = TempDir::new().unwrap();

    Command::cargo_bin("argus")
        .unwrap()
        .env("ARGUS_HOME", home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("listen_port = 4242"));
}

#[test]
fn config_show_honors_port_override() {
    let home = TempDir::new().unwrap();

    Command::cargo_bin("argus")
        .unwrap()
        .env("ARGUS_HOME", home.path())
        .args(["--port", "9999", "config", "show"])
        .assert()
        .success()
        .stdout(contains("listen_port = 9999"));
}
