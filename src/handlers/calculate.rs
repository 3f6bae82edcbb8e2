//! `POST /calculate`: decode the image payload, run the analyzer, and shape
//! the response envelope.

use axum::{Json, extract::State};

use crate::error::AppError;
use crate::models::{CalculateRequest, CalculateResponse};
use crate::services::imaging;
use crate::startup::AppState;

#[axum::debug_handler]
pub async fn calculate(
    State(state): State<AppState>,
    Json(req): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, AppError> {
    let image = imaging::decode_image_payload(&req.image)?;
    let image = imaging::flatten_alpha(image);
    let image_png = imaging::to_png_bytes(&image)?;

    let data = state.analyzer.analyze(&image_png, &req.dict_of_vars).await;

    tracing::info!(records = data.len(), "Image processed");

    Ok(Json(CalculateResponse {
        message: "Image processed".to_string(),
        data,
        status: "success".to_string(),
    }))
}
