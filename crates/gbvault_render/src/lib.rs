use std::fmt::Write as _;

use gbvault_core::backup_api::{ApplyOutcome, ApplyReport, ImportOption};
use serde_json::Value as JsonValue;

const CHECKLIST_KEY_WIDTH: usize = 14;

pub const EMPTY_CHECKLIST_MESSAGE: &str = "Nothing valid to import.";

/// Render the import checklist as human-readable text, one selectable entry
/// per line. Order is the engine's and is preserved as-is.
pub fn render_checklist_text(options: &[ImportOption]) -> String {
    if options.is_empty() {
        return format!("{EMPTY_CHECKLIST_MESSAGE}\n");
    }

    let mut out = String::new();
    out.push_str("Importable entries:\n\n");
    for option in options {
        let _ = writeln!(
            out,
            "  {:<width$} {}",
            option.key,
            option.label,
            width = CHECKLIST_KEY_WIDTH
        );
    }
    out
}

/// Render the import checklist as an ordered array of `[key, label]` pairs,
/// the shape list consumers select from.
pub fn render_checklist_json(options: &[ImportOption]) -> JsonValue {
    JsonValue::Array(
        options
            .iter()
            .map(|option| {
                JsonValue::Array(vec![
                    JsonValue::String(option.key.clone()),
                    JsonValue::String(option.label.clone()),
                ])
            })
            .collect(),
    )
}

/// Render an apply run as per-key lines plus a one-line summary.
pub fn render_apply_report_text(report: &ApplyReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        match entry.outcome {
            ApplyOutcome::Applied => {
                let _ = writeln!(out, "imported {}", entry.key);
            }
            ApplyOutcome::SkippedMissing => {
                let _ = writeln!(out, "skipped {} (not present in the backup)", entry.key);
            }
            ApplyOutcome::SkippedInvalidSettings => {
                let _ = writeln!(
                    out,
                    "skipped {} (settings value is not a JSON object)",
                    entry.key
                );
            }
        }
    }

    if report.entries.is_empty() {
        out.push_str("Nothing selected to import.\n");
    } else if report.all_applied() {
        out.push_str("All selected settings imported successfully.\n");
    } else {
        let _ = writeln!(
            out,
            "{} of {} selected entries imported.",
            report.applied_count(),
            report.entries.len()
        );
    }
    out
}
