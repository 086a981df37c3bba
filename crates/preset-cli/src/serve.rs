//! JSON-lines host loop.
//!
//! Each stdin line is one [`Request`]; each answer is one stdout line. Editor
//! commands answer with the outbound message itself, other requests with a
//! [`Status`]. The scratch sweeper runs in the background for the lifetime
//! of the loop.
//!
//! ```text
//! {"request": "open", "path": "my-preset.json"}
//! {"request": "command", "path": "my-preset.json", "command": {"type": "insert", "identifier": "main"}}
//! {"request": "host_documents", "open": ["temp/my-preset-Main Prompt-1718000000000.md"]}
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use preset_editor::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Deserialize, Debug)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
    Open {
        path: PathBuf,
    },
    Close {
        path: PathBuf,
    },
    Command {
        path: PathBuf,
        command: Command,
    },
    /// The set of documents the host currently has open.
    HostDocuments {
        open: Vec<PathBuf>,
    },
    /// The host closed a document; schedules an extra sweep.
    DocumentClosed {
        path: PathBuf,
    },
    Sweep,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Status {
    Opened { path: PathBuf },
    Focused { path: PathBuf },
    Closed { path: PathBuf, was_open: bool },
    Ack,
    Swept { report: SweepReport },
    Error { code: ErrorCode, message: String },
    BadRequest { message: String },
}

/// Which documents the host has open. Until the host reports, every tracked
/// scratch document counts as open.
type HostView = Arc<Mutex<Option<HashSet<PathBuf>>>>;

pub async fn run(ws: EditorWorkspace) -> anyhow::Result<()> {
    let ws = Arc::new(Mutex::new(ws));
    let host: HostView = Arc::new(Mutex::new(None));

    let sweeper = {
        let ws = ws.clone();
        let host = host.clone();
        spawn_sweeper(ws.clone(), move || host_open(&ws, &host))
    };
    info!("Serving JSON-line requests on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle(&ws, &host, &sweeper, request)?,
            Err(e) => {
                warn!("Ignoring malformed request: {e}");
                serde_json::to_string(&Status::BadRequest {
                    message: e.to_string(),
                })?
            }
        };
        println!("{reply}");
    }

    sweeper.abort();
    info!("stdin closed, shutting down");
    Ok(())
}

fn host_open(
    ws: &Mutex<EditorWorkspace>,
    host: &Mutex<Option<HashSet<PathBuf>>>,
) -> HashSet<PathBuf> {
    if let Some(open) = host.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
        return open.clone();
    }
    ws.lock()
        .unwrap_or_else(|e| e.into_inner())
        .scratch()
        .tracked_paths()
}

/// Answer one request as a JSON line.
fn handle(
    ws: &Mutex<EditorWorkspace>,
    host: &Mutex<Option<HashSet<PathBuf>>>,
    sweeper: &SweeperHandle,
    request: Request,
) -> anyhow::Result<String> {
    let status = match request {
        Request::Command { path, command } => {
            let out = ws
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .dispatch(&path, command);
            return Ok(serde_json::to_string(&out)?);
        }
        Request::Open { path } => {
            let outcome = ws.lock().unwrap_or_else(|e| e.into_inner()).open(&path);
            match outcome {
                Ok(OpenOutcome::Opened) => Status::Opened { path },
                Ok(OpenOutcome::Focused) => Status::Focused { path },
                Err(e) => Status::Error {
                    code: e.code(),
                    message: e.to_string(),
                },
            }
        }
        Request::Close { path } => {
            let was_open = ws.lock().unwrap_or_else(|e| e.into_inner()).close(&path);
            Status::Closed { path, was_open }
        }
        Request::HostDocuments { open } => {
            *host.lock().unwrap_or_else(|e| e.into_inner()) = Some(open.into_iter().collect());
            Status::Ack
        }
        Request::DocumentClosed { path } => {
            if let Some(open) = host.lock().unwrap_or_else(|e| e.into_inner()).as_mut() {
                open.remove(&path);
            }
            sweeper.notify_closed();
            Status::Ack
        }
        Request::Sweep => {
            let open = host_open(ws, host);
            let report = ws
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .sweep_scratch(&open);
            Status::Swept { report }
        }
    };
    Ok(serde_json::to_string(&status)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn requests_parse() {
        let req: Request = serde_json::from_value(json!({
            "request": "command",
            "path": "p.json",
            "command": {"type": "set_enabled", "identifier": "a", "enabled": true}
        }))
        .unwrap();
        assert!(matches!(
            req,
            Request::Command {
                command: Command::SetEnabled { enabled: true, .. },
                ..
            }
        ));
        let req: Request = serde_json::from_value(json!({"request": "sweep"})).unwrap();
        assert!(matches!(req, Request::Sweep));
    }

    #[tokio::test]
    async fn handle_open_command_and_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(
            &path,
            r#"{"prompts": [{"identifier": "a", "name": "A", "content": "x"}]}"#,
        )
        .unwrap();
        let ws = Arc::new(Mutex::new(EditorWorkspace::new(dir.path())));
        let host: HostView = Arc::new(Mutex::new(None));
        let sweeper = spawn_sweeper(ws.clone(), HashSet::new);

        let reply = handle(&ws, &host, &sweeper, Request::Open { path: path.clone() }).unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply["type"], "opened");

        let reply = handle(
            &ws,
            &host,
            &sweeper,
            Request::Command {
                path: path.clone(),
                command: Command::Insert {
                    identifier: "a".into(),
                },
            },
        )
        .unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply["type"], "refresh");

        let reply = handle(
            &ws,
            &host,
            &sweeper,
            Request::Command {
                path: path.clone(),
                command: Command::Insert {
                    identifier: "ghost".into(),
                },
            },
        )
        .unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply["type"], "error");
        assert_eq!(reply["code"], "prompt_not_found");

        let reply = handle(&ws, &host, &sweeper, Request::Sweep).unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply["type"], "swept");
        sweeper.abort();
    }

    #[test]
    fn tracked_scratch_counts_as_open_until_host_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(
            &path,
            r#"{"prompts": [{"identifier": "a", "name": "A", "content": "x"}]}"#,
        )
        .unwrap();
        let ws = Mutex::new(EditorWorkspace::new(dir.path()));
        let out = ws.lock().unwrap().dispatch(
            &path,
            Command::OpenScratch {
                identifier: "a".into(),
            },
        );
        let Some(CommandDetail::ScratchOpened { scratch }) = out.detail().cloned() else {
            panic!("expected ScratchOpened");
        };

        let host = Mutex::new(None);
        assert!(host_open(&ws, &host).contains(&scratch));

        *host.lock().unwrap() = Some(HashSet::new());
        assert!(host_open(&ws, &host).is_empty());
    }
}
