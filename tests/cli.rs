//! Binary-level tests for the feedloop CLI

mod common;

use assert_cmd::Command;
use common::{completion_body, temp_file, FORM_YAML};
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn feedloop() -> Command {
    let mut cmd = Command::cargo_bin("feedloop").unwrap();
    for var in [
        "FEEDLOOP_PROVIDER",
        "FEEDLOOP_MODEL",
        "FEEDLOOP_API_BASE",
        "FEEDLOOP_EXPORT_THRESHOLD",
        "FEEDLOOP_EXPORT_FILE",
        "OPENROUTER_API_KEY",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_commands() {
    feedloop()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("review"));
}

#[test]
fn test_review_with_missing_form_fails() {
    let (dir, _) = temp_file("placeholder.txt", "");
    feedloop()
        .current_dir(dir.path())
        .args(["review", "--form", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read form file"));
}

#[test]
fn test_review_with_incomplete_form_fails() {
    let yaml = FORM_YAML.replace(
        "problem: Students cannot charge tablets used for homework",
        "problem: \"\"",
    );
    let (dir, form) = temp_file("form.yaml", &yaml);

    feedloop()
        .current_dir(dir.path())
        .args(["review", "--form"])
        .arg(&form)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incomplete form: missing Problem"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let (dir, config) = temp_file(
        "config.yaml",
        "provider:\n  type: openrouter\nsession:\n  export_threshold: 0\n",
    );
    let form = dir.path().join("form.yaml");
    std::fs::write(&form, FORM_YAML).unwrap();

    feedloop()
        .arg("--config")
        .arg(&config)
        .args(["review", "--form"])
        .arg(&form)
        .assert()
        .failure()
        .stderr(predicate::str::contains("export_threshold"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_review_end_to_end_with_export() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Solid plan.")))
        .expect(3)
        .mount(&server)
        .await;

    let (dir, form) = temp_file("form.yaml", FORM_YAML);
    let report = dir.path().join("report.pdf");

    feedloop()
        .current_dir(dir.path())
        .env("OPENROUTER_API_KEY", "sk-test")
        .env("FEEDLOOP_API_BASE", format!("{}/api/v1", server.uri()))
        .env("FEEDLOOP_EXPORT_THRESHOLD", "2")
        .args(["review", "--form"])
        .arg(&form)
        .args(["-m", "How do I fund it?", "-m", "Who maintains it?", "--export"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Solid plan."))
        .stdout(predicate::str::contains("Report saved to"));

    let bytes = std::fs::read(&report).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_review_export_before_threshold_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Noted.")))
        .mount(&server)
        .await;

    let (dir, form) = temp_file("form.yaml", FORM_YAML);

    feedloop()
        .current_dir(dir.path())
        .env("OPENROUTER_API_KEY", "sk-test")
        .env("FEEDLOOP_API_BASE", format!("{}/api/v1", server.uri()))
        .args(["review", "--form"])
        .arg(&form)
        .args(["-m", "One question", "--export", "early.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 3 exchanges"));

    assert!(!dir.path().join("early.pdf").exists());
}
