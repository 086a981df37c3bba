//! Convenience re-exports for hosts.
//!
//! ```ignore
//! use preset_editor::prelude::*;
//! ```
//!
//! Covers opening presets, dispatching commands, observing events and
//! running the sweeper. Scratch text helpers and the settings table live in
//! their own modules.

// ── Commands and results ────────────────────────────────────────────
pub use crate::command::{Command, CommandDetail, Outbound};
pub use crate::error::{EditorError, ErrorCode};

// ── Hosting ─────────────────────────────────────────────────────────
pub use crate::config::{EditorConfig, SweepPolicy};
pub use crate::events::{EditorEvent, EventHandler, LoggingHandler, NoopHandler};
pub use crate::scratch::{SweepReport, SweeperHandle, spawn_sweeper};
pub use crate::storage::{JsonFileStorage, PresetStorage};
pub use crate::workspace::{EditorWorkspace, OpenOutcome};

// ── Document model ──────────────────────────────────────────────────
pub use crate::navigation::{NavItem, NavKind, PromptState};
pub use crate::preset::{EDITOR_CHARACTER_ID, Preset, Prompt, PromptPatch, Role};
