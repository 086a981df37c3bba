//! The closed set of editing commands and the messages sent back.
//!
//! Every user action arrives as one [`Command`]. A successful command yields
//! one [`Outbound::Refresh`] with the re-read document and its navigation; a
//! failed one yields [`Outbound::Error`]. Both serialize as JSON objects
//! tagged by `type`:
//!
//! ```json
//! {"type": "move", "identifier": "main", "before": null}
//! {"type": "error", "code": "order_entry_missing", "message": "..."}
//! ```

use crate::error::{EditorError, ErrorCode};
use crate::navigation::NavItem;
use crate::preset::{Preset, PromptPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Inbound editing command for one preset document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Re-read the document from disk.
    Load,
    Insert {
        identifier: String,
    },
    Remove {
        identifier: String,
    },
    SetEnabled {
        identifier: String,
        enabled: bool,
    },
    /// Move before `before`, or to the front when `before` is `None`.
    Move {
        identifier: String,
        #[serde(default)]
        before: Option<String>,
    },
    AddPrompt,
    DeletePrompt {
        identifier: String,
    },
    UpdatePrompt {
        identifier: String,
        patch: PromptPatch,
    },
    SetSetting {
        key: String,
        value: Value,
    },
    OpenScratch {
        identifier: String,
    },
    /// Write scratch text back into its prompt. Without `text` the scratch
    /// file is read from disk.
    CommitScratch {
        scratch: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    CloseScratch {
        scratch: PathBuf,
    },
}

impl Command {
    /// Wire name of the command, for logs and events.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load => "load",
            Command::Insert { .. } => "insert",
            Command::Remove { .. } => "remove",
            Command::SetEnabled { .. } => "set_enabled",
            Command::Move { .. } => "move",
            Command::AddPrompt => "add_prompt",
            Command::DeletePrompt { .. } => "delete_prompt",
            Command::UpdatePrompt { .. } => "update_prompt",
            Command::SetSetting { .. } => "set_setting",
            Command::OpenScratch { .. } => "open_scratch",
            Command::CommitScratch { .. } => "commit_scratch",
            Command::CloseScratch { .. } => "close_scratch",
        }
    }

    /// Whether a successful run rewrites the preset file.
    pub fn persists(&self) -> bool {
        !matches!(
            self,
            Command::Load | Command::OpenScratch { .. } | Command::CloseScratch { .. }
        )
    }
}

/// Command-specific result carried on a refresh.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandDetail {
    PromptAdded { identifier: String },
    PromptDeleted { identifier: String },
    ScratchOpened { scratch: PathBuf },
    ScratchCommitted { scratch: PathBuf, content: String },
    ScratchClosed { scratch: PathBuf, tracked: bool },
}

/// Message sent back to the presentation layer.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Refresh {
        path: PathBuf,
        preset: Preset,
        navigation: Vec<NavItem>,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<CommandDetail>,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl Outbound {
    pub fn error(err: &EditorError) -> Self {
        Outbound::Error {
            code: err.code(),
            message: err.to_string(),
        }
    }

    pub fn detail(&self) -> Option<&CommandDetail> {
        match self {
            Outbound::Refresh { detail, .. } => detail.as_ref(),
            Outbound::Error { .. } => None,
        }
    }
}
