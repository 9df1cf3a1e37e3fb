use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use crate::snapshot::{self, SETTINGS_KEY, Snapshot};
use crate::store::{SaveStore, SettingsSink};
use crate::validate::{is_uppercase_identifier, is_valid_base64, is_valid_json_object};

use super::error::{BackupError, BackupErrorCode};
use super::types::{ApplyEntry, ApplyOutcome, ApplyReport, Classification, ImportOption};

pub const GENERAL_SETTINGS_LABEL: &str = "General Settings (Controls/Cheats)";

/// The backup reconciliation engine: pure, synchronous classification of an
/// untrusted snapshot into an ordered import checklist, plus the apply and
/// export steps that run against injected collaborators.
#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Classify one snapshot entry against the full snapshot.
    ///
    /// The rules are ordered: keys carrying the rtc suffix never stand
    /// alone, the reserved `settings` key is checked before the cartridge
    /// rule, and anything that matches neither convention is dropped
    /// without being an error.
    pub fn classify(&self, key: &str, value: &JsonValue, snapshot: &Snapshot) -> Classification {
        if snapshot::is_rtc_key(key) {
            return Classification::Unclassified;
        }

        if key == SETTINGS_KEY {
            if is_valid_json_object(value) {
                return Classification::GeneralSettings;
            }
            return Classification::Unclassified;
        }

        if is_uppercase_identifier(key) && is_valid_base64(value) {
            let companion = snapshot::rtc_companion_key(key);
            let has_rtc = snapshot
                .get(&companion)
                .is_some_and(is_valid_json_object);
            return Classification::CartridgeData { has_rtc };
        }

        Classification::Unclassified
    }

    /// Build the deduplicated, ordered import checklist for a snapshot.
    ///
    /// Two passes: the first collects every rtc-suffixed key so companion
    /// probes are O(1), the second classifies each remaining key exactly
    /// once. The result is a pure function of the snapshot contents; keys in
    /// the output always exist in the input and appear at most once.
    pub fn import_options(&self, snapshot: &Snapshot) -> Vec<ImportOption> {
        let companion_keys: BTreeSet<&str> = snapshot
            .keys()
            .map(String::as_str)
            .filter(|key| snapshot::is_rtc_key(key))
            .collect();

        let mut options = Vec::new();
        for (key, value) in snapshot.iter() {
            if snapshot::is_rtc_key(key) {
                continue;
            }

            match self.classify_with_companions(key, value, snapshot, &companion_keys) {
                Classification::GeneralSettings => options.push(ImportOption {
                    key: key.clone(),
                    label: GENERAL_SETTINGS_LABEL.to_string(),
                }),
                Classification::CartridgeData { has_rtc } => options.push(ImportOption {
                    key: key.clone(),
                    label: cartridge_label(key, has_rtc),
                }),
                Classification::Unclassified => {}
            }
        }

        sort_options(&mut options);
        options
    }

    /// Apply the selected keys from a snapshot into the collaborators.
    /// Failures are isolated per key; one bad entry never aborts the rest.
    pub fn apply(
        &self,
        snapshot: &Snapshot,
        selected: &[&str],
        settings: &mut dyn SettingsSink,
        store: &mut dyn SaveStore,
    ) -> ApplyReport {
        let mut entries = Vec::with_capacity(selected.len());
        for &key in selected {
            let outcome = if key == SETTINGS_KEY {
                apply_settings(snapshot, settings)
            } else {
                apply_cartridge(snapshot, key, store)
            };
            entries.push(ApplyEntry {
                key: key.to_string(),
                outcome,
            });
        }
        ApplyReport { entries }
    }

    /// Dump every pair currently in the persistence medium into a single
    /// JSON document, unfiltered. An empty medium is a reportable condition,
    /// not an empty export.
    pub fn export(&self, store: &dyn SaveStore) -> Result<JsonValue, BackupError> {
        let entries = store.entries();
        if entries.is_empty() {
            return Err(BackupError::new(
                BackupErrorCode::EmptyStore,
                "the store holds no data to export",
            ));
        }

        let mut document = serde_json::Map::new();
        for (key, value) in entries {
            document.insert(key, JsonValue::String(value));
        }
        Ok(JsonValue::Object(document))
    }

    fn classify_with_companions(
        &self,
        key: &str,
        value: &JsonValue,
        snapshot: &Snapshot,
        companion_keys: &BTreeSet<&str>,
    ) -> Classification {
        if key == SETTINGS_KEY {
            if is_valid_json_object(value) {
                return Classification::GeneralSettings;
            }
            return Classification::Unclassified;
        }

        if is_uppercase_identifier(key) && is_valid_base64(value) {
            let companion = snapshot::rtc_companion_key(key);
            let has_rtc = companion_keys.contains(companion.as_str())
                && snapshot
                    .get(&companion)
                    .is_some_and(is_valid_json_object);
            return Classification::CartridgeData { has_rtc };
        }

        Classification::Unclassified
    }
}

fn cartridge_label(key: &str, has_rtc: bool) -> String {
    if has_rtc {
        format!("{key} Cartridge RAM/RTC settings")
    } else {
        format!("{key} Cartridge RAM")
    }
}

/// General settings first when present, everything else ascending by key.
/// `sort_by` is stable, so the order never depends on snapshot iteration
/// order.
fn sort_options(options: &mut Vec<ImportOption>) {
    options.sort_by(|a, b| a.key.cmp(&b.key));
    if let Some(position) = options.iter().position(|option| option.key == SETTINGS_KEY) {
        let settings = options.remove(position);
        options.insert(0, settings);
    }
}

fn apply_settings(snapshot: &Snapshot, sink: &mut dyn SettingsSink) -> ApplyOutcome {
    let Some(value) = snapshot.get(SETTINGS_KEY) else {
        return ApplyOutcome::SkippedMissing;
    };

    // The settings value is parsed again here: classification may have run
    // against an earlier copy of the snapshot.
    let Some(text) = value.as_str() else {
        return ApplyOutcome::SkippedInvalidSettings;
    };
    let Ok(JsonValue::Object(parsed)) = serde_json::from_str::<JsonValue>(text) else {
        return ApplyOutcome::SkippedInvalidSettings;
    };

    sink.store_settings(parsed);
    ApplyOutcome::Applied
}

fn apply_cartridge(snapshot: &Snapshot, key: &str, store: &mut dyn SaveStore) -> ApplyOutcome {
    let Some(value) = snapshot.get(key) else {
        return ApplyOutcome::SkippedMissing;
    };

    // Cartridge payloads are written verbatim, with no base64 re-check.
    store.set(key, &raw_text(value));

    let companion = snapshot::rtc_companion_key(key);
    if let Some(rtc_value) = snapshot.get(&companion) {
        store.set(&companion, &raw_text(rtc_value));
    }

    ApplyOutcome::Applied
}

fn raw_text(value: &JsonValue) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}
