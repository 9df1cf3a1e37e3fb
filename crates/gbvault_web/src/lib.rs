use gbvault_core::backup_api::{ApplyReport, Engine, ImportOption};
use gbvault_core::snapshot::{SETTINGS_KEY, Snapshot};
use gbvault_core::store::{MemorySettings, MemoryStore, SaveStore};
use gbvault_render::render_checklist_json;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use wasm_bindgen::prelude::*;

/// Everything the browser must do to realize one selective import. The JS
/// side owns the real storage: `writes` go to local storage verbatim,
/// `settings` goes to the settings store as an already-parsed object.
#[derive(Debug, Clone, Serialize)]
pub struct ImportPlan {
    pub writes: Vec<(String, String)>,
    pub settings: Option<JsonValue>,
    pub report: ApplyReport,
}

#[derive(Debug, Clone)]
struct WebError {
    code: &'static str,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct WebErrorPayload {
    code: String,
    message: String,
}

impl WebError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_js_value(&self) -> JsValue {
        let payload = WebErrorPayload {
            code: self.code.to_string(),
            message: self.message.clone(),
        };
        serde_wasm_bindgen::to_value(&payload).unwrap_or_else(|_| {
            JsValue::from_str(&format!("{}: {}", payload.code, payload.message))
        })
    }
}

/// Build the import checklist for an uploaded backup document. Returns an
/// ordered array of `[key, label]` pairs for direct rendering.
#[wasm_bindgen]
pub fn build_import_options(backup_text: &str) -> Result<JsValue, JsValue> {
    let options = build_import_options_impl(backup_text).map_err(|err| err.to_js_value())?;
    let value = render_checklist_json(&options);
    serde_wasm_bindgen::to_value(&value)
        .map_err(|err| WebError::new("render_failed", err.to_string()).to_js_value())
}

/// Plan a selective import for the given keys (`null`/`undefined` selects
/// every importable entry).
#[wasm_bindgen]
pub fn plan_import(backup_text: &str, selected_keys: JsValue) -> Result<JsValue, JsValue> {
    let selected = parse_selected_keys(selected_keys).map_err(|err| err.to_js_value())?;
    let plan = plan_import_impl(backup_text, selected).map_err(|err| err.to_js_value())?;
    plan.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| WebError::new("render_failed", err.to_string()).to_js_value())
}

/// Render a full dump of the persistence medium (one JS object of string
/// values) as the downloadable backup document.
#[wasm_bindgen]
pub fn render_export_document(store_entries: JsValue) -> Result<String, JsValue> {
    let entries: JsonMap<String, JsonValue> = serde_wasm_bindgen::from_value(store_entries)
        .map_err(|err| {
            WebError::new(
                "invalid_options",
                format!("Failed to parse store entries: {err}"),
            )
            .to_js_value()
        })?;
    render_export_document_impl(&entries).map_err(|err| err.to_js_value())
}

fn build_import_options_impl(backup_text: &str) -> Result<Vec<ImportOption>, WebError> {
    let snapshot = parse_snapshot(backup_text)?;
    Ok(Engine::new().import_options(&snapshot))
}

fn plan_import_impl(
    backup_text: &str,
    selected: Option<Vec<String>>,
) -> Result<ImportPlan, WebError> {
    let engine = Engine::new();
    let snapshot = parse_snapshot(backup_text)?;
    let options = engine.import_options(&snapshot);

    let selected = match selected {
        Some(keys) => {
            for key in &keys {
                if !options.iter().any(|option| option.key == *key) {
                    return Err(WebError::new(
                        "invalid_options",
                        format!("'{key}' is not an importable entry of this backup"),
                    ));
                }
            }
            keys
        }
        None => options.iter().map(|option| option.key.clone()).collect(),
    };
    let selected: Vec<&str> = selected.iter().map(String::as_str).collect();

    let mut sink = MemorySettings::new();
    let mut store = MemoryStore::new();
    let report = engine.apply(&snapshot, &selected, &mut sink, &mut store);

    Ok(ImportPlan {
        writes: store.entries(),
        settings: sink.settings.take().map(JsonValue::Object),
        report,
    })
}

fn render_export_document_impl(entries: &JsonMap<String, JsonValue>) -> Result<String, WebError> {
    let mut store = MemoryStore::new();
    for (key, value) in entries {
        let Some(text) = value.as_str() else {
            return Err(WebError::new(
                "invalid_options",
                format!("store value under '{key}' is not a string"),
            ));
        };
        store.set(key, text);
    }

    let document = Engine::new()
        .export(&store)
        .map_err(|err| WebError::new("empty_store", err.message))?;
    serde_json::to_string_pretty(&document).map_err(|err| {
        WebError::new(
            "render_failed",
            format!("failed to serialize the backup document: {err}"),
        )
    })
}

fn parse_snapshot(backup_text: &str) -> Result<Snapshot, WebError> {
    Snapshot::from_json_text(backup_text)
        .map_err(|err| WebError::new("parse_failed", err.message))
}

fn parse_selected_keys(selected_keys: JsValue) -> Result<Option<Vec<String>>, WebError> {
    if selected_keys.is_null() || selected_keys.is_undefined() {
        return Ok(None);
    }

    serde_wasm_bindgen::from_value(selected_keys)
        .map(Some)
        .map_err(|err| {
            WebError::new(
                "invalid_options",
                format!("Failed to parse selected keys: {err}"),
            )
        })
}

// Keeps the reserved key in one place for JS callers that special-case the
// settings write.
#[wasm_bindgen]
pub fn settings_key() -> String {
    SETTINGS_KEY.to_string()
}
