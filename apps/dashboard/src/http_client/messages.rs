//! Pulls a user-facing message out of the backend's error bodies.

use serde_json::Value;

pub const UNAUTHORIZED_FALLBACK: &str = "Your session has expired. Please log in again.";
pub const FORBIDDEN_FALLBACK: &str = "You do not have permission to perform this action.";
pub const BAD_REQUEST_FALLBACK: &str = "The request was invalid. Please check your input.";
pub const NETWORK_FALLBACK: &str =
    "Unable to reach the server. Please check your internet connection.";
pub const GENERIC_FALLBACK: &str = "Something went wrong. Please try again.";

/// Server messages are used verbatim; field error arrays are joined with ", ".
pub fn extract_message(payload: &Value) -> Option<String> {
    match payload {
        Value::String(s) => non_empty(s.trim()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(extract_message).collect();
            non_empty(&parts.join(", "))
        }
        Value::Object(map) => ["message", "error", "errors", "msg"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(extract_message),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
