//! Liveness probe.

use axum::Json;
use serde_json::{Value, json};

/// `GET /` and `HEAD /` liveness probe.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Server is running" }))
}
