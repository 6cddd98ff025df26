#![cfg(unix)]

#[path = "common/mod.rs"]
mod common;

use common::Project;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn start_without_services_targets_all() {
    let project = Project::new();

    project.supman().arg("start").assert().success();

    assert_eq!(
        project.calls(),
        ["supervisorctl -c $CONF status", "supervisorctl -c $CONF start all"]
    );
}

#[test]
fn named_services_are_passed_through() {
    let project = Project::new();

    project
        .supman()
        .args(["restart", "api", "worker"])
        .assert()
        .success();

    assert_eq!(
        project.calls().last().map(String::as_str),
        Some("supervisorctl -c $CONF restart api worker")
    );
}

#[test]
fn mutating_command_launches_stopped_daemon_first() {
    for verb in ["start", "stop", "restart"] {
        let project = Project::new();
        project.mark_daemon_down();

        project.supman().arg(verb).assert().success();

        assert_eq!(
            project.calls(),
            [
                "supervisorctl -c $CONF status".to_string(),
                "supervisord -c $CONF".to_string(),
                format!("supervisorctl -c $CONF {verb} all"),
            ]
        );
    }
}

#[test]
fn status_without_services_sends_no_targets() {
    let project = Project::new();

    project
        .supman()
        .arg("status")
        .assert()
        .success()
        .stdout(contains("RUNNING"));

    assert_eq!(
        project.calls(),
        ["supervisorctl -c $CONF status", "supervisorctl -c $CONF status"]
    );
}

#[test]
fn status_of_stopped_daemon_exits_one_without_launching() {
    let project = Project::new();
    project.mark_daemon_down();

    project
        .supman()
        .args(["status", "api"])
        .assert()
        .code(1)
        .stdout(contains("Services not started"));

    assert_eq!(project.calls(), ["supervisorctl -c $CONF status"]);
}

#[test]
fn fail_open_probe_never_launches_the_daemon() {
    let project = Project::new();
    project.mark_daemon_down();

    project
        .supman()
        .args(["--probe", "fail-open", "start", "api"])
        .assert()
        .success();

    assert_eq!(
        project.calls(),
        ["supervisorctl -c $CONF status", "supervisorctl -c $CONF start api"]
    );
}

#[test]
fn fail_open_status_forwards_to_unreachable_daemon() {
    let project = Project::new();
    project.mark_daemon_down();

    project
        .supman()
        .arg("status")
        .env("SUPMAN_PROBE", "fail-open")
        .assert()
        .failure()
        .stdout(contains("Services not started").not())
        .stderr(contains("no such file"));
}

#[test]
fn shutdown_skips_the_probe() {
    let project = Project::new();
    project.mark_daemon_down();

    project.supman().arg("shutdown").assert().success();

    assert_eq!(project.calls(), ["supervisorctl -c $CONF shutdown"]);
}

#[test]
fn failed_control_command_surfaces_captured_output() {
    let project = Project::new();

    project
        .supman()
        .args(["stop", "broken"])
        .assert()
        .failure()
        .stderr(contains("exit code 7").and(contains("broken: ERROR (no such process)")));
}

#[test]
fn missing_client_is_reported() {
    let project = Project::new();

    project
        .supman()
        .arg("shutdown")
        .env("SUPMAN_SUPERVISORCTL", project.path().join("bin/absent"))
        .assert()
        .failure()
        .stderr(contains("Executable not found"));
}
