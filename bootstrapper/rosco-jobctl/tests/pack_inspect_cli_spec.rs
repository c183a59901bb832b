use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn jobctl() -> Command {
    let mut cmd = Command::cargo_bin("rosco-jobctl").unwrap();
    cmd.env_remove("ROSCO_JOB_CONTEXT_FILE")
        .env_remove("ROSCO_JOB_SCRIPT_PATH")
        .env_remove("ROSCO_JOB_WORKING_DIR");
    cmd
}

#[test]
fn pack_then_unpack_reproduces_config_tree() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("source");
    fs::create_dir_all(source.join("scripts")).unwrap();
    fs::write(source.join("rosco.yml"), "defaultCloudProviderType: aws\n").unwrap();
    fs::write(source.join("scripts/install.sh"), "#!/bin/sh\necho ok\n").unwrap();

    let job_dir = tmp.path().join("job");
    fs::create_dir_all(&job_dir).unwrap();

    jobctl()
        .arg("pack")
        .arg("--output")
        .arg(job_dir.join("job-context.json"))
        .arg("--config-source")
        .arg(&source)
        .args(["--config-dir", "rosco-config", "--timeout", "45m"])
        .args(["--credential", "AWS_ACCESS_KEY_ID=AKIAEXAMPLE"])
        .args(["--credential", "AWS_DEFAULT_REGION=us-west-2"])
        .args(["--", "packer", "build", "-color=false", "template.json"])
        .assert()
        .success();

    jobctl()
        .current_dir(&job_dir)
        .arg("unpack")
        .assert()
        .success();

    let config_dir = job_dir.join("rosco-config");
    assert_eq!(
        fs::read_to_string(config_dir.join("rosco.yml")).unwrap(),
        "defaultCloudProviderType: aws\n"
    );
    assert_eq!(
        fs::read_to_string(config_dir.join("install.sh")).unwrap(),
        "#!/bin/sh\necho ok\n"
    );

    let script = fs::read_to_string(job_dir.join("execute-rosco-job.sh")).unwrap();
    assert!(script.contains("export AWS_ACCESS_KEY_ID=AKIAEXAMPLE"));
    assert!(script.contains("export AWS_DEFAULT_REGION=us-west-2"));
    assert!(script.contains("timeout \"45m\" packer build -color=false template.json"));
}

#[test]
fn pack_without_config_source_uses_empty_map_and_default_timeout() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("job-context.json");

    jobctl()
        .arg("pack")
        .arg("--output")
        .arg(&output)
        .args(["--config-dir", "/opt/rosco/config", "--", "true"])
        .assert()
        .success();

    jobctl()
        .arg("inspect")
        .arg("--context-file")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"commandTimeout\": \"30m\""))
        .stdout(predicate::str::contains("\"configMap\": {}"));
}

#[test]
fn pack_rejects_bad_timeout_and_credential() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("job-context.json");

    jobctl()
        .arg("pack")
        .arg("--output")
        .arg(&output)
        .args(["--config-dir", "cfg", "--timeout", "soon", "--", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid command timeout"));

    jobctl()
        .arg("pack")
        .arg("--output")
        .arg(&output)
        .args(["--config-dir", "cfg", "--credential", "NOVALUE", "--", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));

    assert!(!output.exists());
}

#[test]
fn inspect_redacts_credentials_unless_raw() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("job-context.json");

    jobctl()
        .arg("pack")
        .arg("--output")
        .arg(&output)
        .args(["--config-dir", "cfg"])
        .args(["--credential", "AWS_SECRET_ACCESS_KEY=topsecret"])
        .args(["--", "echo", "hi"])
        .assert()
        .success();

    let redacted = jobctl()
        .arg("inspect")
        .arg("--context-file")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("topsecret").not())
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&redacted).unwrap();
    assert_eq!(value["awsCredentials"]["AWS_SECRET_ACCESS_KEY"], "***");
    assert_eq!(value["jobCommand"], "echo hi");

    jobctl()
        .arg("inspect")
        .arg("--raw")
        .arg("--context-file")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("topsecret"));

    jobctl()
        .arg("inspect")
        .arg("--script")
        .arg("--context-file")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("export AWS_SECRET_ACCESS_KEY='***'"))
        .stdout(predicate::str::contains("timeout \"30m\" echo hi"));

    assert!(!tmp.path().join("execute-rosco-job.sh").exists());
}
