//! Error type shared by every editor operation.
//!
//! All variants are non-fatal from the host's point of view: a failed command
//! is reported to the user and the in-memory document is left as it was.
//! [`EditorError::code`] gives the stable, serializable [`ErrorCode`] that the
//! outbound protocol carries alongside the human-readable message.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Everything that can go wrong while editing a preset.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("preset document not found: {}", .path.display())]
    DocumentNotFound { path: PathBuf },

    #[error("failed to parse preset {}: {source}", .path.display())]
    DocumentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("prompt `{identifier}` is not in the prompt order")]
    OrderEntryMissing { identifier: String },

    #[error("prompt `{identifier}` not found")]
    PromptNotFound { identifier: String },

    #[error("prompt `{identifier}` is a marker; its content is filled in at runtime")]
    MarkerPrompt { identifier: String },

    #[error("unknown setting `{key}`")]
    UnknownSetting { key: String },

    #[error("setting `{key}` expects {expected}")]
    InvalidSetting { key: String, expected: &'static str },

    #[error("no open scratch document at {}", .path.display())]
    ScratchNotTracked { path: PathBuf },

    #[error("scratch document {}: {source}", .path.display())]
    ScratchIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Wire-level classification of an [`EditorError`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    DocumentNotFound,
    DocumentParseError,
    OrderEntryMissing,
    PromptNotFound,
    IoReadFailure,
    IoWriteFailure,
    InvalidCommand,
    ScratchFailure,
}

impl EditorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EditorError::DocumentNotFound { .. } => ErrorCode::DocumentNotFound,
            EditorError::DocumentParse { .. } => ErrorCode::DocumentParseError,
            EditorError::IoRead { .. } => ErrorCode::IoReadFailure,
            EditorError::IoWrite { .. } => ErrorCode::IoWriteFailure,
            EditorError::OrderEntryMissing { .. } => ErrorCode::OrderEntryMissing,
            EditorError::PromptNotFound { .. } => ErrorCode::PromptNotFound,
            EditorError::MarkerPrompt { .. }
            | EditorError::UnknownSetting { .. }
            | EditorError::InvalidSetting { .. } => ErrorCode::InvalidCommand,
            EditorError::ScratchNotTracked { .. } | EditorError::ScratchIo { .. } => {
                ErrorCode::ScratchFailure
            }
        }
    }

    pub(crate) fn prompt_not_found(identifier: &str) -> Self {
        EditorError::PromptNotFound {
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn order_entry_missing(identifier: &str) -> Self {
        EditorError::OrderEntryMissing {
            identifier: identifier.to_string(),
        }
    }
}
