mod common;

use common::{config, request, StubFarm, LAUNCHED};
use std::{fs, path::PathBuf, process::Command};
use uuid::Uuid;

fn scratch() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cuesubmit-cli-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cuesubmit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuesubmit"));
    cmd.env("RUST_LOG", "off").env_remove("CUEBOT_HOSTS");
    cmd
}

#[test]
fn compile_prints_job_document() {
    let dir = scratch();
    let config_path = dir.join("FarmConfig.json");
    config("localhost:8443").save_to(&config_path).unwrap();
    let request_path = dir.join("job.json");
    fs::write(&request_path, serde_json::to_string(&request()).unwrap()).unwrap();

    let output = cuesubmit()
        .arg("compile")
        .arg(&request_path)
        .arg("--config")
        .arg(&config_path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<?xml version=\"1.0\"?>"));
    assert!(stdout.contains("-r arnold -s #FRAME_START# -e #FRAME_END#"));
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn compile_and_preview_work_without_an_endpoint() {
    let dir = scratch();
    let config_path = dir.join("FarmConfig.json");
    config("").save_to(&config_path).unwrap();
    let request_path = dir.join("job.json");
    fs::write(&request_path, serde_json::to_string(&request()).unwrap()).unwrap();

    for subcommand in ["compile", "preview"] {
        let output = cuesubmit()
            .arg(subcommand)
            .arg(&request_path)
            .arg("--config")
            .arg(&config_path)
            .output()
            .unwrap();

        assert!(output.status.success(), "{subcommand} failed");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("\"//server/share/show/scene.ma\""));
    }
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn invalid_submit_lists_errors_and_exits_2() {
    let dir = scratch();
    let config_path = dir.join("FarmConfig.json");
    config("localhost:8443").save_to(&config_path).unwrap();

    let output = cuesubmit()
        .args(["submit", "--scene", "S:/show/scene.ma", "--name", "ab"])
        .args(["--start", "10", "--end", "1"])
        .arg("--config")
        .arg(&config_path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must have more than 3 characters"));
    assert!(stderr.contains("start frame 10 must be less than or equal to end frame 1"));
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn worker_reports_created_job_and_removes_file() {
    let farm = StubFarm::start(|_| (200, LAUNCHED.to_owned()));
    let dir = scratch();
    let config_path = dir.join("FarmConfig.json");
    config("localhost:1").save_to(&config_path).unwrap();
    let handoff = dir.join("handoff.json");
    fs::write(&handoff, serde_json::to_string(&request()).unwrap()).unwrap();

    let output = cuesubmit()
        .arg("worker")
        .arg(&handoff)
        .arg(farm.endpoint())
        .arg("--config")
        .arg(&config_path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Job Name: demo-shot01-artist_maya-shotA-v001"));
    assert!(stdout.contains("Job ID: 6a1f0e52-4b1c-4e2f-9a8d-1c3b5e7f9a01"));
    assert!(stdout.contains("Log Path: "));
    assert!(!handoff.exists());
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn out_of_process_submit_relays_rejection() {
    let farm = StubFarm::start(|_| (409, "job already exists".to_owned()));
    let dir = scratch();
    let config_path = dir.join("FarmConfig.json");
    config(&farm.endpoint()).save_to(&config_path).unwrap();

    let output = cuesubmit()
        .args(["submit", "--scene", "S:/show/scene.ma", "--show", "demo"])
        .args(["--user", "artist", "--out-of-process"])
        .arg("--config")
        .arg(&config_path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Submission error: job already exists"));
    assert_eq!(farm.requests().len(), 1);
    fs::remove_dir_all(dir).unwrap();
}
