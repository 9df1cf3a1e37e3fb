use base64::{Engine as _, engine::general_purpose};
use serde_json::Value as JsonValue;

/// True when `value` is a string holding canonical standard-alphabet base64.
/// Decoding then re-encoding must reproduce the input exactly, which rejects
/// stray whitespace, missing or surplus padding, and non-canonical trailing
/// bits that a lenient decoder would still accept.
pub fn is_valid_base64(value: &JsonValue) -> bool {
    let Some(text) = value.as_str() else {
        return false;
    };
    match general_purpose::STANDARD.decode(text) {
        Ok(bytes) => general_purpose::STANDARD.encode(bytes) == text,
        Err(_) => false,
    }
}

/// True when `value` is a string that parses as a bare JSON object.
/// Primitives, arrays and the `null` literal all fail.
pub fn is_valid_json_object(value: &JsonValue) -> bool {
    let Some(text) = value.as_str() else {
        return false;
    };
    matches!(
        serde_json::from_str::<JsonValue>(text),
        Ok(JsonValue::Object(_))
    )
}

/// True when `text` is unchanged by uppercasing and changed by lowercasing.
/// Strings with no case-bearing characters (digits-only, punctuation, the
/// empty string) are simultaneously "already uppercase" and "already
/// lowercase" and fail the second check.
pub fn is_uppercase_identifier(text: &str) -> bool {
    text == text.to_uppercase() && text != text.to_lowercase()
}
