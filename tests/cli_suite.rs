use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// Isolated command: no inherited PLEXUS_* settings, HOME inside the temp dir.
fn plexus(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_plexus"));
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("PLEXUS_API_ENDPOINT")
        .env_remove("PLEXUS_API_TOKEN")
        .env_remove("PLEXUS_GROUP")
        .env_remove("PLEXUS_LOG");
    cmd
}

#[test]
fn test_help_lists_command_groups() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command groups:"))
        .stdout(predicate::str::contains("jobs"))
        .stdout(predicate::str::contains("--endpoint"));
}

#[test]
fn test_no_arguments_prints_overview() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    let expected = format!("plexus {}", env!("CARGO_PKG_VERSION"));

    plexus(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_unknown_group_fails() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .args(["jbos", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command group 'jbos'"))
        .stderr(predicate::str::contains("Did you mean: jobs?"));
}

#[test]
fn test_group_help() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .args(["jobs", "-h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("(requires --yes)"));
}

#[test]
fn test_action_help() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .args(["jobs", "logs", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--tail"));
}

#[test]
fn test_unknown_action_shows_group_help() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .args(["jobs", "explode"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Actions:"))
        .stderr(predicate::str::contains("Unknown action 'explode'"));
}

#[test]
fn test_missing_action_fails() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .arg("groups")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing action"));
}

#[test]
fn test_config_show_reflects_flags() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("plexus.json");

    plexus(&home)
        .arg("--config")
        .arg(&config)
        .args(["--endpoint", "http://localhost:9/graphql", "--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""endpoint": "http://localhost:9/graphql""#));
}

#[test]
fn test_env_overrides_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("plexus.json");
    fs::write(&config, r#"{"endpoint": "http://from-file/graphql", "group": {"name": "ml"}}"#).unwrap();

    plexus(&home)
        .env("PLEXUS_API_ENDPOINT", "http://from-env/graphql")
        .arg("--config")
        .arg(&config)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""endpoint": "http://from-env/graphql""#))
        .stdout(predicate::str::contains(r#""name": "ml""#));
}

#[test]
fn test_set_endpoint_persists() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("nested/plexus.json");

    plexus(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set-endpoint", "http://localhost:9/graphql"])
        .assert()
        .success();

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains(r#""endpoint": "http://localhost:9/graphql""#), "{}", saved);
}

#[test]
fn test_default_config_location() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .args(["config", "set-token", "secret-token"])
        .assert()
        .success();

    let saved = fs::read_to_string(home.path().join(".plexus/config.json")).unwrap();
    assert!(saved.contains(r#""api-token": "secret-token""#), "{}", saved);
}

#[test]
fn test_delete_requires_confirmation() {
    let home = TempDir::new().unwrap();

    // Refused before any request is made, so no server is needed.
    plexus(&home)
        .args(["--endpoint", "http://127.0.0.1:9/graphql", "jobs", "delete", "old-job"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires confirmation"));
}

#[test]
fn test_unknown_option_is_a_usage_error() {
    let home = TempDir::new().unwrap();

    plexus(&home)
        .args(["groups", "list", "--colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown option '--colour'"));
}

#[test]
fn test_invalid_payload_is_rejected_before_submit() {
    let home = TempDir::new().unwrap();
    let payload = home.path().join("job.json");
    fs::write(&payload, r#"{"name": "Bad_Name", "image": "repo/img:1"}"#).unwrap();

    plexus(&home)
        .args(["--group", "ml", "jobs", "create", "--file"])
        .arg(&payload)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'name' must be lowercase"))
        .stderr(predicate::str::contains("Example payload:"));
}

#[test]
fn test_malformed_stored_endpoint_can_be_repaired() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("plexus.json");
    fs::write(&config, r#"{"endpoint":"not a url"}"#).unwrap();

    plexus(&home)
        .arg("--config")
        .arg(&config)
        .arg("--help")
        .assert()
        .success();

    plexus(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success();

    plexus(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set-endpoint", "still not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API endpoint"));

    plexus(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set-endpoint", "https://ok.example/graphql"])
        .assert()
        .success();

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains(r#""endpoint": "https://ok.example/graphql""#), "{}", saved);
}
