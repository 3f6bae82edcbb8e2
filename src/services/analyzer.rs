//! Prompt construction and model reply parsing.
//!
//! The analyzer is fail-soft: provider failures and unparseable replies
//! degrade to a single fallback record, so callers always receive a
//! well-formed, non-empty list.

use crate::models::{ExpressionResult, NOT_MATH_EXPR};
use crate::services::providers::VisionProvider;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Interprets handwritten math images via an injected vision provider.
#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn VisionProvider>,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self { provider }
    }

    /// Interpret a flattened PNG image under the given variable bindings.
    ///
    /// Never fails; all failure modes collapse into a one-record fallback.
    pub async fn analyze(
        &self,
        image_png: &[u8],
        dict_of_vars: &Map<String, Value>,
    ) -> Vec<ExpressionResult> {
        let prompt = build_prompt(dict_of_vars);

        let reply = match self.provider.generate(&prompt, image_png).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Vision provider call failed");
                return vec![ExpressionResult::parse_failure()];
            }
        };

        tracing::debug!(reply = %reply, "Raw model reply");

        parse_reply(&reply)
    }
}

/// Build the fixed instruction prompt with the variable map interpolated.
pub fn build_prompt(dict_of_vars: &Map<String, Value>) -> String {
    let vars = serde_json::to_string(dict_of_vars).unwrap_or_else(|_| "{}".to_string());

    format!(
        "You are an AI calculator designed to interpret and solve mathematical expressions, \
         equations, and visual math problems directly. \
         Analyze the image and return answers only for mathematical expressions, calculations, \
         or equations. Interpret each problem as follows: \
         1. Simple expressions and calculations: evaluate expressions like 2 + 2, 3 * 4, or \
         5 / 6 and return a list of one object: [{{\"expr\": expression, \"result\": answer}}]. \
         2. Equations with variables: solve equations like x^2 + 2x + 1 = 0 or 3y + 4x = 0 for \
         each variable and return one object per solved variable: \
         [{{\"expr\": \"x\", \"result\": solution_x}}, {{\"expr\": \"y\", \"result\": solution_y}}]. \
         3. Assignment statements: for variable assignments like x = 4, return each assignment \
         with \"assign\" set to true: [{{\"expr\": \"x\", \"result\": 4, \"assign\": true}}]. \
         4. Graphical problems with mathematical context: analyze diagrams or visual problems \
         such as triangles for the Pythagorean theorem or bar charts for statistical values, \
         and return [{{\"expr\": expression, \"result\": calculated answer}}]. \
         5. Abstract concepts or non-mathematical drawings: respond with \
         [{{\"expr\": \"{not_math}\", \"result\": \"Not Applicable\"}}]. \
         Use the following dictionary of user-defined variables to interpret expressions \
         accurately: {vars}. \
         Respond ONLY with a JSON-parseable array of objects with keys \"expr\" and \"result\" \
         (and optionally \"assign\"). Do not include prose, markdown fencing, or HTML.",
        not_math = NOT_MATH_EXPR,
        vars = vars,
    )
}

/// Parse a raw model reply into records, repairing loose formatting first.
///
/// Kept separate from the provider call so it can be exercised against a
/// corpus of captured malformed replies without network access.
pub fn parse_reply(reply: &str) -> Vec<ExpressionResult> {
    let candidate = match sanitize_reply(reply) {
        Some(text) => text,
        None => return vec![ExpressionResult::not_applicable()],
    };

    let items: Vec<Value> = match serde_json::from_str(&candidate) {
        Ok(Value::Array(items)) => items,
        Ok(_) | Err(_) => {
            tracing::warn!(candidate = %candidate, "Model reply is not a JSON array");
            return vec![ExpressionResult::parse_failure()];
        }
    };

    // Every record must carry a `result` key; an empty array would violate
    // the non-empty response invariant.
    if items.is_empty() || !items.iter().all(|item| item.get("result").is_some()) {
        tracing::warn!("Model reply records are missing the result key");
        return vec![ExpressionResult::parse_failure()];
    }

    match serde_json::from_value(Value::Array(items)) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "Model reply records have an unexpected shape");
            vec![ExpressionResult::parse_failure()]
        }
    }
}

/// Best-effort repair of a model reply into a strict-JSON array string.
///
/// Returns `None` when no bracketed array can be found.
pub fn sanitize_reply(reply: &str) -> Option<String> {
    let text = strip_code_fences(reply.trim());

    // Blanket quote normalization. This corrupts legitimate apostrophes
    // inside textual fields; the original heuristic is kept as-is.
    let text = text.replace('\'', "\"");

    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }

    Some(text[start..=end].to_string())
}

fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest).trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}
