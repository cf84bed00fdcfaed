use std::path::Path;
use std::process::Output;

use serde_json::json;
use tokio::process::Command;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base URL of the mock API.
pub fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/api", server.address().port())
}

/// Run the CLI against `server` with an isolated data directory.
pub async fn run_cli(args: &[&str], data_dir: &Path, server: &MockServer) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shopfront"))
        .args(args)
        .env("SHOPFRONT_API_URL", api_url(server))
        .env("SHOPFRONT_DATA_DIR", data_dir)
        .env_remove("SHOPFRONT_PASSWORD")
        .env_remove("RUST_LOG")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub async fn run_cli_success(args: &[&str], data_dir: &Path, server: &MockServer) -> String {
    let output = run_cli(args, data_dir, server).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], data_dir: &Path, server: &MockServer) -> String {
    let output = run_cli(args, data_dir, server).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn profile_body() -> serde_json::Value {
    json!({
        "id": 1,
        "email": "a@b.com",
        "name": "A",
        "role": "customer",
        "avatar": "https://cdn.example/a.png",
        "creationAt": "2024-05-01T10:00:00.000Z"
    })
}

/// Mount login and profile endpoints for `a@b.com` / `secret1`.
pub async fn mount_account(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(wiremock::matchers::body_json(
            json!({"email": "a@b.com", "password": "secret1"}),
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "access_token": "AT1",
            "refresh_token": "RT1"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer AT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(server)
        .await;
}

/// Write a token file the way the CLI would.
pub fn seed_tokens(data_dir: &Path, access: &str, refresh: &str) {
    std::fs::create_dir_all(data_dir).unwrap();
    std::fs::write(
        data_dir.join("tokens.json"),
        json!({"access_token": access, "refresh_token": refresh}).to_string(),
    )
    .unwrap();
}
