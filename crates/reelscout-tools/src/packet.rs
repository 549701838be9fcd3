//! Error-packet helper (spec §4.6): validation and dispatch failures never
//! propagate as `Err` from the router — they come back as a JSON packet the
//! LLM can read and self-correct from.

use serde_json::json;

/// Build a `{"error": kind, "message": message}` packet as a JSON string.
#[must_use]
pub fn error_packet(kind: &str, message: &str) -> String {
    json!({"error": kind, "message": message}).to_string()
}

/// Validate that `len` falls within `[min, max]`, returning a ready-made
/// error packet string when it doesn't.
pub fn validate_len(field: &str, len: usize, min: usize, max: usize) -> Result<(), String> {
    if len < min || len > max {
        Err(error_packet(
            "invalid_arguments",
            &format!("'{field}' must contain between {min} and {max} entries, got {len}"),
        ))
    } else {
        Ok(())
    }
}
