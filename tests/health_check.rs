//! Integration tests for the liveness endpoint.

use calculator_service::config::CalculatorConfig;
use calculator_service::services::providers::mock::MockVisionProvider;
use calculator_service::startup::Application;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the application on a random port and return the port number.
async fn spawn_app() -> u16 {
    std::env::set_var("ENVIRONMENT", "test");
    std::env::set_var("APP__PORT", "0"); // Random port
    std::env::set_var("GOOGLE_API_KEY", "test-api-key");

    let config = CalculatorConfig::load().expect("Failed to load config");
    let provider = Arc::new(MockVisionProvider::with_reply(
        r#"[{"expr": "2+2", "result": 4}]"#,
    ));
    let app = Application::build_with_provider(config, provider)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    port
}

#[tokio::test]
async fn root_reports_server_is_running() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("http://localhost:{}/", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Server is running");
}

#[tokio::test]
async fn head_root_returns_ok() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .head(format!("http://localhost:{}/", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}
