//! Decoding of raw HTTP responses.
//!
//! The server answers errors with `{"error": "..."}` most of the time, but a
//! proxy in front of it may return plain text or an empty body. Everything
//! funnels through [`parse_json_response`] so none of those shapes can panic
//! a caller.

use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiResult};

/// Decode a response body into `T`.
///
/// # Arguments
/// * `status` - HTTP status code of the response
/// * `body` - Raw response body
///
/// # Returns
/// * `Ok(T)` - 2xx with a decodable body; an empty body is read as `{}`
/// * `Err(ApiError::Server)` - Non-2xx status, with the best message available
/// * `Err(ApiError::Decode)` - 2xx with a body that is not valid for `T`
pub fn parse_json_response<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    decode(status, body, "{}")
}

/// Decode a response body into a list.
///
/// Collection endpoints answer `null` (or nothing) when there are no rows;
/// both read as an empty list.
pub fn parse_json_list<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<Vec<T>> {
    let items: Option<Vec<T>> = decode(status, body, "[]")?;
    Ok(items.unwrap_or_default())
}

fn decode<T: DeserializeOwned>(status: u16, body: &str, empty: &str) -> ApiResult<T> {
    if !(200..300).contains(&status) {
        return Err(ApiError::server(status, error_message(body)));
    }

    let trimmed = body.trim();
    let text = if trimmed.is_empty() { empty } else { trimmed };
    serde_json::from_str(text).map_err(|e| {
        tracing::debug!(status, error = %e, "Response body did not match the expected shape");
        ApiError::decode(e.to_string())
    })
}

/// Best human-readable message of an error body.
///
/// Prefers the `error` field of a JSON object, then `message`, then the raw
/// text. Returns an empty string for an empty body.
pub fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["error", "message"] {
            if let Some(serde_json::Value::String(text)) = map.get(key) {
                return text.clone();
            }
        }
    }
    trimmed.to_string()
}
