use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use gbvault_core::backup_api::Engine;
use gbvault_core::snapshot::{SETTINGS_KEY, Snapshot};
use gbvault_core::store::{MemorySettings, MemoryStore, SaveStore};
use gbvault_render::{render_apply_report_text, render_checklist_json, render_checklist_text};
use serde_json::Value as JsonValue;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the importable entries of a backup file
    Inspect {
        #[arg(value_name = "BACKUP.json")]
        backup: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Import selected backup entries into a store file
    Import {
        #[arg(value_name = "BACKUP.json")]
        backup: PathBuf,
        #[arg(long, value_name = "STORE.json")]
        store: PathBuf,
        /// Importable entry to apply; repeat for several. Defaults to every
        /// importable entry of the backup.
        #[arg(long = "key", value_name = "KEY")]
        keys: Vec<String>,
    },
    /// Export the full contents of a store file as one backup document
    Export {
        #[arg(long, value_name = "STORE.json")]
        store: PathBuf,
        #[arg(long, value_name = "BACKUP.json")]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { backup, json } => run_inspect(&backup, json),
        Command::Import {
            backup,
            store,
            keys,
        } => run_import(&backup, &store, &keys),
        Command::Export { store, output } => run_export(&store, output.as_deref()),
    }
}

fn run_inspect(backup_path: &Path, json: bool) {
    let snapshot = load_snapshot(backup_path);
    let options = Engine::new().import_options(&snapshot);

    if json {
        let value = render_checklist_json(&options);
        let rendered = serde_json::to_string_pretty(&value).unwrap_or_else(|e| {
            eprintln!("Error rendering checklist JSON: {e}");
            process::exit(1);
        });
        println!("{rendered}");
    } else {
        print!("{}", render_checklist_text(&options));
    }
}

fn run_import(backup_path: &Path, store_path: &Path, keys: &[String]) {
    let engine = Engine::new();
    let snapshot = load_snapshot(backup_path);
    let options = engine.import_options(&snapshot);

    for key in keys {
        if !options.iter().any(|option| option.key == *key) {
            eprintln!("--key '{key}' is not an importable entry of this backup");
            process::exit(2);
        }
    }

    if options.is_empty() {
        eprintln!("Nothing valid to import from {}", backup_path.display());
        process::exit(1);
    }

    let selected: Vec<&str> = if keys.is_empty() {
        options.iter().map(|option| option.key.as_str()).collect()
    } else {
        keys.iter().map(String::as_str).collect()
    };

    let mut store = load_store(store_path);
    let mut sink = MemorySettings::new();
    let report = engine.apply(&snapshot, &selected, &mut sink, &mut store);

    // The CLI's settings store persists inside the same store file, under
    // the reserved key, as compact JSON text.
    if let Some(settings) = sink.settings.take() {
        store.set(SETTINGS_KEY, &JsonValue::Object(settings).to_string());
    }

    save_store(store_path, &store);
    print!("{}", render_apply_report_text(&report));

    if !report.all_applied() {
        process::exit(1);
    }
}

fn run_export(store_path: &Path, output: Option<&Path>) {
    let store = load_store(store_path);
    let document = Engine::new().export(&store).unwrap_or_else(|e| {
        eprintln!("Error exporting {}: {}", store_path.display(), e.message);
        process::exit(1);
    });

    let rendered = serde_json::to_string_pretty(&document).unwrap_or_else(|e| {
        eprintln!("Error rendering backup document: {e}");
        process::exit(1);
    });

    match output {
        Some(output_path) => {
            fs::write(output_path, format!("{rendered}\n")).unwrap_or_else(|e| {
                eprintln!("Error writing {}: {e}", output_path.display());
                process::exit(1);
            });
            println!("Wrote backup to {}", output_path.display());
        }
        None => println!("{rendered}"),
    }
}

fn load_snapshot(path: &Path) -> Snapshot {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });

    Snapshot::from_json_text(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing backup file {}:", path.display());
        eprintln!("  {}", e.message);
        process::exit(1);
    })
}

/// A store file is a JSON object of string values, the file-backed stand-in
/// for browser local storage. A missing file is an empty store.
fn load_store(path: &Path) -> MemoryStore {
    let mut store = MemoryStore::new();
    if !path.exists() {
        return store;
    }

    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    let document: JsonValue = serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing store file {}: {e}", path.display());
        process::exit(1);
    });
    let Some(entries) = document.as_object() else {
        eprintln!(
            "Error parsing store file {}: expected a JSON object of string values",
            path.display()
        );
        process::exit(1);
    };

    for (key, value) in entries {
        let Some(text) = value.as_str() else {
            eprintln!(
                "Error parsing store file {}: value under '{key}' is not a string",
                path.display()
            );
            process::exit(1);
        };
        store.set(key, text);
    }
    store
}

fn save_store(path: &Path, store: &MemoryStore) {
    let mut document = serde_json::Map::new();
    for (key, value) in store.entries() {
        document.insert(key, JsonValue::String(value));
    }

    let rendered =
        serde_json::to_string_pretty(&JsonValue::Object(document)).unwrap_or_else(|e| {
            eprintln!("Error rendering store file: {e}");
            process::exit(1);
        });
    fs::write(path, format!("{rendered}\n")).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", path.display());
        process::exit(1);
    });
}
