//! Integration tests for the calculate endpoint, driven through a mock
//! vision provider.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use calculator_service::config::CalculatorConfig;
use calculator_service::services::providers::mock::MockVisionProvider;
use calculator_service::startup::Application;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use reqwest::Client;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the application with a canned model reply; returns the port and the
/// mock provider for prompt inspection.
async fn spawn_app(reply: &str) -> (u16, Arc<MockVisionProvider>) {
    std::env::set_var("ENVIRONMENT", "test");
    std::env::set_var("APP__PORT", "0"); // Random port
    std::env::set_var("GOOGLE_API_KEY", "test-api-key");

    let config = CalculatorConfig::load().expect("Failed to load config");
    let provider = Arc::new(MockVisionProvider::with_reply(reply));
    let app = Application::build_with_provider(config, provider.clone())
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    (port, provider)
}

fn data_uri(image: &DynamicImage) -> String {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    format!("data:image/png;base64,{}", BASE64.encode(&buf))
}

fn sample_image() -> String {
    data_uri(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
        8,
        8,
        Rgb([0, 0, 0]),
    )))
}

async fn post_calculate(port: u16, body: serde_json::Value) -> reqwest::Response {
    Client::new()
        .post(format!("http://localhost:{}/calculate", port))
        .json(&body)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn valid_image_returns_success_envelope() {
    let (port, _) = spawn_app(r#"[{"expr": "2+2", "result": 4}]"#).await;

    let response = post_calculate(
        port,
        json!({ "image": sample_image(), "dict_of_vars": {} }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Image processed");
    assert_eq!(body["data"][0]["expr"], "2+2");
    assert_eq!(body["data"][0]["result"], 4);
}

#[tokio::test]
async fn jpeg_image_returns_success_envelope() {
    let (port, _) = spawn_app(r#"[{"expr": "2+2", "result": 4}]"#).await;

    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([128, 128, 128])));
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .expect("Failed to encode JPEG");
    let payload = format!("data:image/jpeg;base64,{}", BASE64.encode(&buf));

    let response = post_calculate(port, json!({ "image": payload, "dict_of_vars": {} })).await;

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"][0]["result"], 4);
}

#[tokio::test]
async fn payload_without_comma_returns_500() {
    let (port, _) = spawn_app(r#"[{"expr": "2+2", "result": 4}]"#).await;

    let response = post_calculate(
        port,
        json!({ "image": "not-a-data-uri", "dict_of_vars": {} }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 500);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["detail"].as_str().unwrap().contains("comma"));
}

#[tokio::test]
async fn invalid_base64_returns_500() {
    let (port, _) = spawn_app(r#"[{"expr": "2+2", "result": 4}]"#).await;

    let response = post_calculate(
        port,
        json!({ "image": "data:image/png;base64,!!!", "dict_of_vars": {} }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn non_image_bytes_return_500() {
    let (port, _) = spawn_app(r#"[{"expr": "2+2", "result": 4}]"#).await;

    let payload = format!("data:image/png;base64,{}", BASE64.encode(b"not an image"));
    let response = post_calculate(port, json!({ "image": payload, "dict_of_vars": {} })).await;

    assert_eq!(response.status().as_u16(), 500);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn unbracketed_reply_degrades_to_fallback_record() {
    let (port, _) = spawn_app("I cannot help").await;

    let response = post_calculate(
        port,
        json!({ "image": sample_image(), "dict_of_vars": {} }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body["data"],
        json!([{ "expr": "Not a mathematical expression", "result": "Not Applicable" }])
    );
}

#[tokio::test]
async fn prompt_embeds_user_defined_variables() {
    let (port, provider) = spawn_app(r#"[{"expr": "x + 2", "result": 6}]"#).await;

    let response = post_calculate(
        port,
        json!({ "image": sample_image(), "dict_of_vars": { "x": 4 } }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 200);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(r#""x":4"#));
}

#[tokio::test]
async fn transparent_image_is_accepted() {
    let (port, _) = spawn_app(r#"[{"expr": "2+2", "result": 4}]"#).await;

    let mut rgba = RgbaImage::new(8, 8);
    for pixel in rgba.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
    let image = data_uri(&DynamicImage::ImageRgba8(rgba));

    let response = post_calculate(port, json!({ "image": image, "dict_of_vars": {} })).await;

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "success");
}
