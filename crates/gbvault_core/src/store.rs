use std::collections::BTreeMap;

use serde_json::{Map as JsonMap, Value as JsonValue};

/// The persistence medium the emulator keeps per-title data in (browser
/// local storage or an equivalent key/value medium). Implementations own
/// durability and enumeration order; the engine only reads, writes and
/// enumerates through this seam.
pub trait SaveStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);

    /// Every stored pair, in the medium's own order.
    fn entries(&self) -> Vec<(String, String)>;

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Consumer of parsed general settings. Merge/overwrite semantics belong to
/// the implementation, not the engine.
pub trait SettingsSink {
    fn store_settings(&mut self, settings: JsonMap<String, JsonValue>);
}

/// In-memory medium used by tests and by frontends that proxy a real store.
/// Enumeration order is sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Settings sink that keeps the most recently stored settings object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySettings {
    pub settings: Option<JsonMap<String, JsonValue>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsSink for MemorySettings {
    fn store_settings(&mut self, settings: JsonMap<String, JsonValue>) {
        self.settings = Some(settings);
    }
}
