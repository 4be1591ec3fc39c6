use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::process::Output;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREDENTIAL_VARS: &[&str] = &[
    "AYRSHARE_API_KEY",
    "BUFFER_API_KEY",
    "INSTAGRAM_ACCESS_TOKEN",
    "LATE_API_KEY",
    "LATE_ACCOUNT_ID",
];

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("write config");
    path
}

fn result_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("instapost");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("min_spacing_ms = 6100"));
    assert!(content.contains("[zapier]"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir, "# mine\n");

    let mut cmd = cargo_bin_cmd!("instapost");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine\n");
}

#[test]
fn config_show_applies_env_overrides() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir, "[buffer]\nmin_spacing_ms = 7000\n");

    let mut cmd = cargo_bin_cmd!("instapost");
    cmd.env("INSTAPOST__ZAPIER__WEBHOOK_URL", "https://hooks.example.com/catch/1")
        .args(["config", "show", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("min_spacing_ms = 7000"))
        .stdout(predicate::str::contains("https://hooks.example.com/catch/1"));
}

#[test]
fn overlong_caption_is_a_validation_error() {
    let caption = "x".repeat(2201);

    let mut cmd = cargo_bin_cmd!("instapost");
    let output = cmd
        .env("AYRSHARE_API_KEY", "test_key")
        .args(["ayrshare", "--text", &caption])
        .output()
        .expect("run ayrshare");

    assert!(!output.status.success());

    let value = result_json(&output);
    assert_eq!(value["outcome"], "error");
    assert_eq!(value["provider"], "ayrshare");
    assert_eq!(value["error"]["kind"], "validation");
    assert!(value["message"].as_str().unwrap().contains("2200"));
}

#[test]
fn non_http_media_url_is_rejected() {
    let mut cmd = cargo_bin_cmd!("instapost");
    let output = cmd
        .args([
            "late",
            "--content",
            "Hello",
            "--media-url",
            "ftp://files.example.com/a.jpg",
        ])
        .output()
        .expect("run late");

    assert!(!output.status.success());

    let value = result_json(&output);
    assert_eq!(value["error"]["kind"], "validation");
    assert!(
        value["message"]
            .as_str()
            .unwrap()
            .contains("invalid URL scheme")
    );
}

#[test]
fn missing_credential_names_the_variable() {
    let mut cmd = cargo_bin_cmd!("instapost");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    let output = cmd
        .args(["buffer", "--profile-id", "prof_1", "--text", "Hello"])
        .output()
        .expect("run buffer");

    assert!(!output.status.success());

    let value = result_json(&output);
    assert_eq!(value["error"]["kind"], "validation");
    assert!(value["message"].as_str().unwrap().contains("BUFFER_API_KEY"));
}

#[test]
fn doctor_flags_invalid_webhook_url() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir, "[zapier]\nwebhook_url = \"ftp://hooks.example.com\"\n");

    let mut cmd = cargo_bin_cmd!("instapost");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    let output = cmd
        .args(["doctor", "--json", "--config"])
        .arg(&config_path)
        .output()
        .expect("run doctor");

    assert!(!output.status.success());

    let value = result_json(&output);
    assert_eq!(value["overall"], "error");
    assert_eq!(value["zapier"]["status"], "error");
    assert_eq!(value["ayrshare"]["status"], "warn");
}

#[tokio::test(flavor = "multi_thread")]
async fn zapier_report_against_mock_webhook() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/catch/1/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "zap_1",
            "status": "success"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let webhook_url = format!("{}/hooks/catch/1/abc", mock_server.uri());
    let output = tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("instapost")
            .env("INSTAPOST__ZAPIER__WEBHOOK_URL", webhook_url)
            .env("INSTAPOST__ZAPIER__ACCOUNT", "@brand")
            .args([
                "zapier",
                "--content",
                "New drop",
                "--time",
                "1:10 PM",
                "--timezone",
                "EST",
                "--hashtag",
                "style",
                "--report",
            ])
            .output()
            .expect("run zapier")
    })
    .await
    .expect("join");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("✅ SUCCESS"));
    assert!(stdout.contains("📱 Account: @brand"));
    assert!(stdout.contains("⏰ Posting time: 1:10 PM EST"));
    assert!(stdout.contains("🆔 Post ID: zap_1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn late_unauthorized_exits_with_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/posts"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "Invalid API key"})),
        )
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    let output = tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("instapost")
            .env("INSTAPOST__LATE__BASE_URL", base_url)
            .env("LATE_API_KEY", "late_test_key_123")
            .env("LATE_ACCOUNT_ID", "acc_1")
            .args(["late", "--content", "Hello"])
            .output()
            .expect("run late")
    })
    .await
    .expect("join");

    assert!(!output.status.success());

    let value = result_json(&output);
    assert_eq!(value["error"]["kind"], "auth");
    assert_eq!(value["error"]["status"], 401);
    assert_eq!(value["error"]["detail"], "Invalid API key");
}
