use http::StatusCode;
use serde_json::Value;

use crate::error::ClientError;

/// Turns an error response body into something a user can read.
///
/// The services answer failures with `{"message": "..."}` or
/// `{"error": "..."}`; anything else is passed through as text.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(Value::String(msg)) = map.get(key) {
                if !msg.is_empty() {
                    return msg.clone();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        sanitize(trimmed)
    }
}

/// Builds the `Api` error for a non-success response.
pub fn api_error(status: StatusCode, body: &str) -> ClientError {
    ClientError::Api {
        status,
        message: error_message(status, body),
    }
}

// Bodies end up in terminal output and logs; keep them on one line.
fn sanitize(s: &str) -> String {
    const MAX_LEN: usize = 512;
    s.chars()
        .filter(|c| !c.is_control())
        .take(MAX_LEN)
        .collect()
}
