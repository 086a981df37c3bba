//! End-to-end command flows against real preset files.
//!
//! Each test writes a preset into a temp directory, drives it through an
//! [`EditorWorkspace`], and checks both the outbound messages and the file
//! on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use preset_editor::navigation::{NavKind, PromptState};
use preset_editor::prelude::*;
use preset_editor::scratch::extract_content;
use serde_json::{Value, json};

const PRESET: &str = r#"{
    "temperature": 1,
    "impersonation_prompt": "[Write your next reply]",
    "wrap_in_quotes": false,
    "some_future_field": {
        "kept": true
    },
    "prompts": [
        {
            "identifier": "main",
            "name": "Main Prompt",
            "system_prompt": true,
            "role": "system",
            "content": "Write the next reply.",
            "injection_trigger": []
        },
        {
            "identifier": "chatHistory",
            "name": "Chat History",
            "system_prompt": true,
            "marker": true
        },
        {
            "identifier": "x",
            "name": "Greeting",
            "system_prompt": false,
            "role": "assistant",
            "content": "Hi"
        }
    ],
    "prompt_order": [
        {
            "character_id": 100000,
            "order": [
                {
                    "identifier": "main",
                    "enabled": true
                }
            ]
        },
        {
            "character_id": 100001,
            "order": [
                {
                    "identifier": "main",
                    "enabled": true
                },
                {
                    "identifier": "chatHistory",
                    "enabled": false
                }
            ]
        }
    ]
}"#;

fn setup() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my-preset.json");
    std::fs::write(&path, PRESET).unwrap();
    (dir, path)
}

fn on_disk(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn authoritative_order(doc: &Value) -> Value {
    doc["prompt_order"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["character_id"] == 100001)
        .map(|g| g["order"].clone())
        .unwrap()
}

fn scratch_path(out: &Outbound) -> PathBuf {
    match out.detail() {
        Some(CommandDetail::ScratchOpened { scratch }) => scratch.clone(),
        other => panic!("expected ScratchOpened, got {other:?}"),
    }
}

fn id(s: &str) -> String {
    s.to_string()
}

// ── Order bookkeeping ───────────────────────────────────────────────

#[test]
fn insert_enable_remove_round_trip() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.open(&path).unwrap();

    ws.handle(&path, Command::Insert { identifier: id("x") })
        .unwrap();
    assert_eq!(
        authoritative_order(&on_disk(&path))[0],
        json!({"identifier": "x", "enabled": false})
    );

    ws.handle(
        &path,
        Command::SetEnabled {
            identifier: id("x"),
            enabled: true,
        },
    )
    .unwrap();
    assert_eq!(
        authoritative_order(&on_disk(&path))[0],
        json!({"identifier": "x", "enabled": true})
    );

    ws.handle(&path, Command::Remove { identifier: id("x") })
        .unwrap();
    let doc = on_disk(&path);
    assert_eq!(authoritative_order(&doc).as_array().unwrap().len(), 2);
    assert!(
        doc["prompts"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["identifier"] == "x")
    );
}

#[test]
fn move_reorders_and_keeps_other_groups() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.handle(&path, Command::Insert { identifier: id("x") })
        .unwrap();
    // Order is now [x, main, chatHistory].
    ws.handle(
        &path,
        Command::Move {
            identifier: id("x"),
            before: Some(id("chatHistory")),
        },
    )
    .unwrap();

    let doc = on_disk(&path);
    let order = authoritative_order(&doc);
    let ids: Vec<&str> = order
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["main", "x", "chatHistory"]);
    assert_eq!(
        doc["prompt_order"][0],
        json!({"character_id": 100000, "order": [{"identifier": "main", "enabled": true}]})
    );
}

#[test]
fn move_of_uninserted_prompt_is_reported_and_harmless() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.open(&path).unwrap();

    let out = ws.dispatch(
        &path,
        Command::Move {
            identifier: id("x"),
            before: None,
        },
    );
    match out {
        Outbound::Error { code, .. } => assert_eq!(code, ErrorCode::OrderEntryMissing),
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&path).unwrap(), PRESET);
}

#[test]
fn add_then_delete_prompt() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.open(&path).unwrap();

    let out = ws.handle(&path, Command::AddPrompt).unwrap();
    let new_id = match out.detail() {
        Some(CommandDetail::PromptAdded { identifier }) => identifier.clone(),
        other => panic!("expected PromptAdded, got {other:?}"),
    };
    let doc = on_disk(&path);
    let added = doc["prompts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["identifier"] == new_id.as_str())
        .unwrap()
        .clone();
    assert_eq!(added["name"], "New Prompt");
    assert_eq!(added["role"], "system");
    assert_eq!(added["injection_depth"], 4);
    assert_eq!(added["injection_order"], 100);

    ws.handle(
        &path,
        Command::Insert {
            identifier: new_id.clone(),
        },
    )
    .unwrap();
    ws.handle(
        &path,
        Command::DeletePrompt {
            identifier: new_id.clone(),
        },
    )
    .unwrap();
    let preset = ws.session(&path).unwrap().preset();
    assert!(preset.prompt(&new_id).is_none());
    assert!(!preset.is_inserted(&new_id));
}

// ── Persistence ─────────────────────────────────────────────────────

#[test]
fn save_keeps_unknown_fields_and_four_space_indent() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.handle(
        &path,
        Command::SetSetting {
            key: id("temperature"),
            value: json!(0.5),
        },
    )
    .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n    \"temperature\": 0.5,\n"));
    let doc = on_disk(&path);
    assert_eq!(doc["some_future_field"], json!({"kept": true}));
    assert_eq!(doc["prompts"][0]["injection_trigger"], json!([]));
    assert!(doc["prompts"][1].get("content").is_none());
}

#[test]
fn setting_back_to_original_value_restores_file() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.handle(
        &path,
        Command::SetSetting {
            key: id("wrap_in_quotes"),
            value: json!(true),
        },
    )
    .unwrap();
    ws.handle(
        &path,
        Command::SetSetting {
            key: id("wrap_in_quotes"),
            value: json!(false),
        },
    )
    .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), PRESET);
}

#[test]
fn missing_and_malformed_documents() {
    let dir = tempfile::tempdir().unwrap();
    let mut ws = EditorWorkspace::new(dir.path());

    let err = ws.open(dir.path().join("gone.json")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DocumentNotFound);

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ \"prompts\": [").unwrap();
    let out = ws.dispatch(&bad, Command::Load);
    assert!(matches!(
        out,
        Outbound::Error {
            code: ErrorCode::DocumentParseError,
            ..
        }
    ));
}

#[test]
fn externally_deleted_document_blocks_commit_into_open_session() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.open(&path).unwrap();
    let out = ws
        .handle(&path, Command::OpenScratch { identifier: id("x") })
        .unwrap();
    let scratch = scratch_path(&out);

    std::fs::remove_file(&path).unwrap();
    let err = ws
        .commit_scratch(&scratch, Some("# Greeting\n\nHello".into()))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DocumentNotFound);
    assert!(!path.exists());

    let err = ws
        .handle(&path, Command::Insert { identifier: id("x") })
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DocumentNotFound);
    assert!(!path.exists());
}

#[test]
fn externally_deleted_document_blocks_commit_after_close() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.open(&path).unwrap();
    let out = ws
        .handle(&path, Command::OpenScratch { identifier: id("x") })
        .unwrap();
    let scratch = scratch_path(&out);

    std::fs::remove_file(&path).unwrap();
    ws.close(&path);
    let err = ws
        .commit_scratch(&scratch, Some("# Greeting\n\nHello".into()))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DocumentNotFound);
    assert!(!path.exists());
}

// ── Scratch documents ───────────────────────────────────────────────

#[test]
fn scratch_open_edit_commit_close() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.open(&path).unwrap();

    let out = ws
        .handle(&path, Command::OpenScratch { identifier: id("x") })
        .unwrap();
    let scratch = scratch_path(&out);
    assert_eq!(std::fs::read_to_string(&scratch).unwrap(), "# Greeting\n\nHi");
    assert!(
        std::fs::read_to_string(dir.path().join(".gitignore"))
            .unwrap()
            .lines()
            .any(|l| l == "temp/")
    );

    // Unchanged text commits back to the same content.
    let raw = std::fs::read_to_string(&scratch).unwrap();
    assert_eq!(extract_content(&raw), "Hi");

    std::fs::write(&scratch, "# Greeting\n\nHello there\nSecond line\n\n").unwrap();
    let out = ws.commit_scratch(&scratch, None).unwrap();
    assert!(matches!(
        out.detail(),
        Some(CommandDetail::ScratchCommitted { content, .. }) if content == "Hello there\nSecond line"
    ));
    let preset = ws.session(&path).unwrap().preset();
    assert_eq!(preset.prompt("x").unwrap().content(), "Hello there\nSecond line");

    // The association survives a commit.
    assert!(ws.scratch().link(&scratch).is_some());
    ws.commit_scratch(&scratch, Some("# Greeting\n\nThird".into()))
        .unwrap();
    assert_eq!(on_disk(&path)["prompts"][2]["content"], "Third");

    let link = ws.close_scratch(&scratch).unwrap();
    assert_eq!(link.identifier, "x");
    assert!(!scratch.exists());
    let err = ws.commit_scratch(&scratch, None).unwrap_err();
    assert!(matches!(err, EditorError::ScratchNotTracked { .. }));
}

#[test]
fn commit_after_reorder_targets_the_right_prompt() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.open(&path).unwrap();
    let scratch = scratch_path(
        &ws.handle(&path, Command::OpenScratch { identifier: id("x") })
            .unwrap(),
    );

    // Deleting an earlier prompt shifts storage indices.
    ws.handle(
        &path,
        Command::DeletePrompt {
            identifier: id("main"),
        },
    )
    .unwrap();
    ws.commit_scratch(&scratch, Some("# Greeting\n\nStill x".into()))
        .unwrap();
    let preset = ws.session(&path).unwrap().preset();
    assert_eq!(preset.prompt("x").unwrap().content(), "Still x");
    assert_eq!(preset.prompt("chatHistory").unwrap().content, None);
}

#[test]
fn commit_to_deleted_prompt_mutates_nothing() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    ws.open(&path).unwrap();
    let scratch = scratch_path(
        &ws.handle(&path, Command::OpenScratch { identifier: id("x") })
            .unwrap(),
    );

    // The prompt disappears behind the editor's back.
    let mut doc = on_disk(&path);
    doc["prompts"].as_array_mut().unwrap().retain(|p| p["identifier"] != "x");
    std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    ws.handle(&path, Command::Load).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let err = ws
        .commit_scratch(&scratch, Some("# Greeting\n\nlost".into()))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PromptNotFound);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn marker_prompts_cannot_be_edited_as_text() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    let out = ws.dispatch(
        &path,
        Command::OpenScratch {
            identifier: id("chatHistory"),
        },
    );
    assert!(matches!(
        out,
        Outbound::Error {
            code: ErrorCode::InvalidCommand,
            ..
        }
    ));
    assert!(ws.scratch().is_empty());
}

#[test]
fn sweep_spares_documents_the_host_has_open() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    let open = scratch_path(
        &ws.handle(&path, Command::OpenScratch { identifier: id("x") })
            .unwrap(),
    );
    let closed = scratch_path(
        &ws.handle(
            &path,
            Command::OpenScratch {
                identifier: id("main"),
            },
        )
        .unwrap(),
    );

    let later = SystemTime::now() + Duration::from_secs(31 * 60);
    let host_open = HashSet::from([open.clone()]);
    let report = ws.sweep_scratch_at(later, &host_open);
    assert_eq!(report.removed, vec![closed.clone()]);
    assert!(open.exists());
    assert!(!closed.exists());
    assert!(ws.scratch().link(&open).is_some());
}

// ── Navigation and events ───────────────────────────────────────────

#[test]
fn refresh_carries_navigation() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    let out = ws.handle(&path, Command::Load).unwrap();
    let Outbound::Refresh { navigation, .. } = out else {
        panic!("expected refresh");
    };
    let prompts: Vec<(&str, PromptState)> = navigation
        .iter()
        .filter(|i| i.kind == NavKind::Prompt)
        .map(|i| (i.identifier.as_deref().unwrap(), i.state.unwrap()))
        .collect();
    assert_eq!(
        prompts,
        vec![
            ("main", PromptState::Enabled),
            ("chatHistory", PromptState::Disabled),
            ("x", PromptState::Uninserted),
        ]
    );
    assert!(navigation.iter().any(|i| i.kind == NavKind::Separator));
}

#[test]
fn refresh_serializes_as_tagged_json() {
    let (dir, path) = setup();
    let mut ws = EditorWorkspace::new(dir.path());
    let out = ws.handle(&path, Command::AddPrompt).unwrap();
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["type"], "refresh");
    assert_eq!(value["detail"]["kind"], "prompt_added");
    assert_eq!(value["preset"]["prompts"].as_array().unwrap().len(), 4);
    assert_eq!(value["navigation"][0]["section_id"], "basic-config");
}

/// Records one tag per event.
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl EventHandler for Recorder {
    fn on_event(&self, event: &EditorEvent<'_>) {
        LoggingHandler.on_event(event);
        let tag = match event {
            EditorEvent::Loaded { .. } => "loaded",
            EditorEvent::Focused { .. } => "focused",
            EditorEvent::Persisted { command, .. } => *command,
            EditorEvent::CommandFailed { .. } => "failed",
            _ => "other",
        };
        self.0.lock().unwrap().push(tag.to_string());
    }
}

#[test]
fn events_report_persist_and_failure() {
    let (dir, path) = setup();
    let recorder = Recorder::default();
    let seen = recorder.0.clone();
    let mut ws = EditorWorkspace::new(dir.path()).with_event_handler(recorder);

    ws.open(&path).unwrap();
    ws.open(&path).unwrap();
    ws.handle(&path, Command::Insert { identifier: id("x") })
        .unwrap();
    let _ = ws.handle(
        &path,
        Command::Insert {
            identifier: id("ghost"),
        },
    );
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["loaded", "focused", "insert", "failed"]
    );
}
