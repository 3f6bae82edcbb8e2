use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel `expr` value for replies without mathematical content.
pub const NOT_MATH_EXPR: &str = "Not a mathematical expression";

/// Sentinel `result` paired with [`NOT_MATH_EXPR`] when the model itself
/// reports non-mathematical content.
pub const NOT_APPLICABLE: &str = "Not Applicable";

/// One interpreted expression/result pair from the model's reply.
///
/// `result` may be a number, a string (including the [`NOT_APPLICABLE`]
/// sentinel), or null. `assign` is present only for variable assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionResult {
    #[serde(default)]
    pub expr: String,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign: Option<bool>,
}

impl ExpressionResult {
    /// Fallback when the reply carries no bracketed array at all.
    pub fn not_applicable() -> Self {
        Self {
            expr: NOT_MATH_EXPR.to_string(),
            result: Value::String(NOT_APPLICABLE.to_string()),
            assign: None,
        }
    }

    /// Fallback when a candidate array exists but cannot be parsed into records.
    pub fn parse_failure() -> Self {
        Self {
            expr: NOT_MATH_EXPR.to_string(),
            result: Value::Null,
            assign: None,
        }
    }
}

/// Request body for `POST /calculate`.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    /// Data-URI-style string; only the segment after the first comma is decoded.
    pub image: String,
    /// User-defined variable bindings, embedded verbatim in the prompt.
    #[serde(default)]
    pub dict_of_vars: Map<String, Value>,
}

/// Success envelope for `POST /calculate`.
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub message: String,
    pub data: Vec<ExpressionResult>,
    pub status: String,
}
