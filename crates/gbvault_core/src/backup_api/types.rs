use serde::{Deserialize, Serialize};

/// How a single snapshot entry is understood. Derived during reconciliation,
/// never stored. The variants are mutually exclusive by construction: the
/// reserved `settings` key never reaches the cartridge rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    GeneralSettings,
    CartridgeData { has_rtc: bool },
    Unclassified,
}

/// One user-selectable entry of the import checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportOption {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    Applied,
    /// The selected key is no longer present in the snapshot.
    SkippedMissing,
    /// The settings value no longer parses as a JSON object.
    SkippedInvalidSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplyEntry {
    pub key: String,
    pub outcome: ApplyOutcome,
}

/// Per-key results of one selective-apply run. A failed key never aborts the
/// remaining keys, so the report always covers every selected key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplyReport {
    pub entries: Vec<ApplyEntry>,
}

impl ApplyReport {
    pub fn applied_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == ApplyOutcome::Applied)
            .count()
    }

    pub fn all_applied(&self) -> bool {
        self.applied_count() == self.entries.len()
    }
}
