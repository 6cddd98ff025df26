#![cfg(unix)]

#[path = "common/mod.rs"]
mod common;

use std::fs;

use common::{Project, TEMPLATE};
use predicates::str::contains;

#[test]
fn init_compiles_manifest_into_config() {
    let project = Project::new();
    project.write("supervisord_template.conf", TEMPLATE);
    project.write(
        "manifest.toml",
        r#"
[services.api]
command = "run-api"

[services.worker]
command = "run-worker"
numprocs = 2
autorestart = true
"#,
    );

    project.supman().arg("init").assert().success();

    let written = fs::read_to_string(project.config_path()).expect("config not written");
    let expected = format!(
        "{TEMPLATE}[program:api]\ncommand = run-api\n\n[program:worker]\ncommand = run-worker\nnumprocs = 2\nautorestart = true\n\n"
    );
    assert_eq!(written, expected);
    assert!(project.calls().is_empty(), "init must not touch supervisor");
}

#[test]
fn init_reads_manifest_from_flag() {
    let project = Project::new();
    project.write("supervisord_template.conf", TEMPLATE);
    project.write("deploy/services.toml", "[services.web]\ncommand = \"serve\"\n");

    project
        .supman()
        .args(["init", "--manifest", "deploy/services.toml"])
        .assert()
        .success();

    let written = fs::read_to_string(project.config_path()).unwrap();
    assert!(written.ends_with("[program:web]\ncommand = serve\n\n"));
}

#[test]
fn init_honours_config_and_template_overrides() {
    let project = Project::new();
    project.write("templates/base.conf", "[supervisord]\nnodaemon = true\n");
    project.write("manifest.toml", "[services.api]\ncommand = \"run-api\"\n");
    fs::create_dir_all(project.path().join("out")).unwrap();

    project
        .supman()
        .args(["init", "--template", "templates/base.conf", "-c", "out/sv.conf"])
        .env("SUPMAN_CONFIG", "ignored.conf")
        .assert()
        .success();

    let written = fs::read_to_string(project.path().join("out/sv.conf")).unwrap();
    assert_eq!(
        written,
        "[supervisord]\nnodaemon = true\n\n[program:api]\ncommand = run-api\n\n"
    );
    assert!(!project.path().join("ignored.conf").exists());
}

#[test]
fn init_with_empty_services_copies_template() {
    let project = Project::new();
    project.write("supervisord_template.conf", TEMPLATE);
    project.write("manifest.toml", "[services]\n");

    project.supman().arg("init").assert().success();

    assert_eq!(fs::read_to_string(project.config_path()).unwrap(), TEMPLATE);
}

#[test]
fn init_without_services_fails_without_writing() {
    let project = Project::new();
    project.write("supervisord_template.conf", TEMPLATE);
    project.write("manifest.toml", "name = \"demo\"\n");

    project
        .supman()
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("missing required key 'services'"));

    assert!(!project.config_path().exists());
}

#[test]
fn init_without_manifest_fails() {
    let project = Project::new();
    project.write("supervisord_template.conf", TEMPLATE);

    project
        .supman()
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("Manifest not found"));
}

#[test]
fn init_rejects_manifest_directory() {
    let project = Project::new();
    project.write("supervisord_template.conf", TEMPLATE);
    fs::create_dir_all(project.path().join("manifest.toml")).unwrap();

    project
        .supman()
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("path is a directory"));
}

#[test]
fn init_reports_malformed_template() {
    let project = Project::new();
    project.write("supervisord_template.conf", "logfile = /tmp/x.log\n");
    project.write("manifest.toml", "[services]\n");

    project
        .supman()
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("option appears before any section header"));

    assert!(!project.config_path().exists());
}
