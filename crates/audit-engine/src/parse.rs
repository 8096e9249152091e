//! Model response normalization
//!
//! The model is instructed to answer with a bare JSON object, but real
//! responses arrive wrapped in code fences or surrounding prose. This module
//! locates the embedded payload, validates it against the result schema, and
//! clamps marker positions into the displayable range. It never panics on
//! any input.

use shared_types::AuditResult;
use thiserror::Error;

/// Failure to turn a model response into an [`AuditResult`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// No JSON object could be located in the response text.
    #[error("no structured payload found in model response")]
    UnparsableResponse,

    /// A payload was located but does not match the result schema.
    #[error("model response does not match the result schema: {0}")]
    MalformedResult(String),
}

/// Parse a raw model response into a validated [`AuditResult`].
///
/// An unrecognized severity is rejected rather than defaulted.
/// Out-of-range marker positions are clamped to [0, 100] so placement
/// degrades to an image edge instead of failing the whole audit.
pub fn parse_result(raw: &str) -> Result<AuditResult, ParseError> {
    let payload = extract_payload(raw).ok_or(ParseError::UnparsableResponse)?;

    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|_| ParseError::UnparsableResponse)?;

    let mut result: AuditResult =
        serde_json::from_value(value).map_err(|e| ParseError::MalformedResult(e.to_string()))?;

    for issue in &mut result.issues {
        if !issue.location_percent_x.is_finite() || !issue.location_percent_y.is_finite() {
            return Err(ParseError::MalformedResult(format!(
                "non-finite marker position for issue \"{}\"",
                issue.title
            )));
        }
        issue.location_percent_x = issue.location_percent_x.clamp(0.0, 100.0);
        issue.location_percent_y = issue.location_percent_y.clamp(0.0, 100.0);
    }

    Ok(result)
}

/// Locate the JSON object embedded in a model response.
///
/// Strips Markdown code fences (```` ``` ```` / ```` ```json ````), then
/// falls back to the outermost `{ ... }` span to shed any surrounding prose.
fn extract_payload(raw: &str) -> Option<&str> {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = rest.strip_suffix("```").unwrap_or(rest).trim();
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
