use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::backup_api::{BackupError, BackupErrorCode};

/// The reserved key holding general (non-cartridge) configuration.
pub const SETTINGS_KEY: &str = "settings";

/// Suffix marking a key as real-time-clock companion data. Any key ending in
/// this literal is excluded from standalone consideration, not only keys
/// built by [`rtc_companion_key`].
pub const RTC_SUFFIX: &str = "rtc";

const RTC_COMPANION_SUFFIX: &str = "-rtc";

/// The full flat key/value backup document under inspection. Keys and values
/// are untrusted input; document order is preserved exactly as parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: JsonMap<String, JsonValue>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse backup text into a snapshot. Only a top-level JSON object is
    /// accepted; any other document shape is a parse error at this boundary,
    /// before classification ever runs.
    pub fn from_json_text(text: &str) -> Result<Self, BackupError> {
        let document: JsonValue = serde_json::from_str(text).map_err(|e| {
            BackupError::new(
                BackupErrorCode::Parse,
                format!("backup document is not valid JSON: {e}"),
            )
        })?;

        match document {
            JsonValue::Object(entries) => Ok(Self { entries }),
            other => Err(BackupError::new(
                BackupErrorCode::Parse,
                format!(
                    "backup document must be a JSON object, found {}",
                    json_type_name(&other)
                ),
            )),
        }
    }

    pub fn from_entries(entries: JsonMap<String, JsonValue>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.entries.iter()
    }
}

/// The companion key carrying real-time-clock data for a cartridge key.
pub fn rtc_companion_key(key: &str) -> String {
    format!("{key}{RTC_COMPANION_SUFFIX}")
}

/// Whether a key is reserved for companion data and never stands alone.
pub fn is_rtc_key(key: &str) -> bool {
    key.ends_with(RTC_SUFFIX)
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
