use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn backup_example_path(name: &str) -> PathBuf {
    workspace_root().join(format!("tests/backup_examples/{name}"))
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_gbvault"))
        .args(args)
        .output()
        .expect("failed to run gbvault CLI")
}

fn temp_store_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.json", std::process::id(), nanos))
}

fn read_store(path: &PathBuf) -> Value {
    let text = fs::read_to_string(path).expect("store file should exist after import");
    serde_json::from_str(&text).expect("store file should hold JSON")
}

#[test]
fn import_everything_writes_all_selected_entries_into_the_store() {
    let backup = backup_example_path("full_backup.json");
    let backup = backup.to_string_lossy().to_string();
    let store_path = temp_store_path("gbvault_import_all");
    let store_arg = store_path.to_string_lossy().to_string();

    let output = run_cli(&["import", &backup, "--store", &store_arg]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("imported settings"));
    assert!(stdout.contains("imported POKEMON"));
    assert!(stdout.contains("imported ZELDA"));
    assert!(stdout.contains("All selected settings imported successfully."));

    let store = read_store(&store_path);
    assert_eq!(store["POKEMON"], "dGVzdCBjYXJ0cmlkZ2UgZGF0YQ==");
    assert_eq!(store["POKEMON-rtc"], "{\"rtcData\":\"some rtc data\"}");
    assert_eq!(store["ZELDA"], "emVsZGEgc2F2ZSByYW0=");
    assert_eq!(store["settings"], "{\"controls\":\"gamepad\",\"cheats\":true}");
    assert!(store.get("lowercase").is_none());
    assert!(store.get("INVALID").is_none());

    let _ = fs::remove_file(&store_path);
}

#[test]
fn import_with_explicit_keys_applies_only_those_entries() {
    let backup = backup_example_path("full_backup.json");
    let backup = backup.to_string_lossy().to_string();
    let store_path = temp_store_path("gbvault_import_one");
    let store_arg = store_path.to_string_lossy().to_string();

    let output = run_cli(&["import", &backup, "--store", &store_arg, "--key", "POKEMON"]);
    assert!(output.status.success());

    let store = read_store(&store_path);
    let entries = store.as_object().expect("store file should be an object");
    assert_eq!(entries.len(), 2);
    assert_eq!(store["POKEMON"], "dGVzdCBjYXJ0cmlkZ2UgZGF0YQ==");
    assert_eq!(store["POKEMON-rtc"], "{\"rtcData\":\"some rtc data\"}");

    let _ = fs::remove_file(&store_path);
}

#[test]
fn import_rejects_a_key_that_is_not_an_importable_entry() {
    let backup = backup_example_path("full_backup.json");
    let backup = backup.to_string_lossy().to_string();
    let store_path = temp_store_path("gbvault_import_bad_key");
    let store_arg = store_path.to_string_lossy().to_string();

    let output = run_cli(&["import", &backup, "--store", &store_arg, "--key", "lowercase"]);
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not an importable entry"));
    assert!(!store_path.exists());
}

#[test]
fn import_preserves_unrelated_entries_already_in_the_store() {
    let backup = backup_example_path("settings_only.json");
    let backup = backup.to_string_lossy().to_string();
    let store_path = temp_store_path("gbvault_import_existing");
    let store_arg = store_path.to_string_lossy().to_string();
    fs::write(&store_path, "{\"MARIO\":\"bWFyaW8gc2F2ZSByYW0=\"}\n")
        .expect("seed store should be writable");

    let output = run_cli(&["import", &backup, "--store", &store_arg]);
    assert!(output.status.success());

    let store = read_store(&store_path);
    assert_eq!(store["MARIO"], "bWFyaW8gc2F2ZSByYW0=");
    assert_eq!(store["settings"], "{\"controls\":\"keyboard\"}");

    let _ = fs::remove_file(&store_path);
}

#[test]
fn export_prints_the_full_store_as_one_document() {
    let backup = backup_example_path("full_backup.json");
    let backup = backup.to_string_lossy().to_string();
    let store_path = temp_store_path("gbvault_export_stdout");
    let store_arg = store_path.to_string_lossy().to_string();

    let import = run_cli(&["import", &backup, "--store", &store_arg]);
    assert!(import.status.success());

    let output = run_cli(&["export", "--store", &store_arg]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let document: Value = serde_json::from_str(&stdout).expect("export should emit JSON");
    let entries = document.as_object().expect("export should be an object");
    assert_eq!(entries.len(), 4);
    assert_eq!(document["POKEMON"], "dGVzdCBjYXJ0cmlkZ2UgZGF0YQ==");
    assert_eq!(document["POKEMON-rtc"], "{\"rtcData\":\"some rtc data\"}");
    assert_eq!(document["ZELDA"], "emVsZGEgc2F2ZSByYW0=");
    assert_eq!(document["settings"], "{\"controls\":\"gamepad\",\"cheats\":true}");

    let _ = fs::remove_file(&store_path);
}

#[test]
fn export_to_a_file_writes_a_reimportable_backup() {
    let backup = backup_example_path("full_backup.json");
    let backup = backup.to_string_lossy().to_string();
    let store_path = temp_store_path("gbvault_export_file");
    let store_arg = store_path.to_string_lossy().to_string();
    let exported_path = temp_store_path("gbvault_exported_backup");
    let exported_arg = exported_path.to_string_lossy().to_string();

    let import = run_cli(&["import", &backup, "--store", &store_arg]);
    assert!(import.status.success());

    let output = run_cli(&["export", "--store", &store_arg, "--output", &exported_arg]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wrote backup to"));

    let exported = exported_path.to_string_lossy().to_string();
    let inspect = run_cli(&["inspect", &exported]);
    assert!(inspect.status.success());
    let inspect_stdout = String::from_utf8_lossy(&inspect.stdout);
    assert!(inspect_stdout.contains("settings"));
    assert!(inspect_stdout.contains("POKEMON Cartridge RAM/RTC settings"));
    assert!(inspect_stdout.contains("ZELDA Cartridge RAM"));

    let _ = fs::remove_file(&store_path);
    let _ = fs::remove_file(&exported_path);
}

#[test]
fn import_with_nothing_importable_leaves_the_store_untouched() {
    let backup = backup_example_path("unrelated_only.json");
    let backup = backup.to_string_lossy().to_string();
    let store_path = temp_store_path("gbvault_import_nothing");
    let store_arg = store_path.to_string_lossy().to_string();

    let output = run_cli(&["import", &backup, "--store", &store_arg]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nothing valid to import"));
    assert!(!store_path.exists());
}

#[test]
fn export_of_an_empty_store_is_an_error_not_an_empty_document() {
    let store_path = temp_store_path("gbvault_export_empty");
    let store_arg = store_path.to_string_lossy().to_string();

    let output = run_cli(&["export", "--store", &store_arg]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no data to export"));
    assert!(output.stdout.is_empty());
}
