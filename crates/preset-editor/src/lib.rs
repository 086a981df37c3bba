//! Prompt-order bookkeeping and scratch-document sync for AI preset files.
//!
//! An AI preset is a JSON document holding generation settings, a list of
//! `prompts`, and a `prompt_order` list of `{identifier, enabled}` records
//! grouped by character id. This crate keeps the authoritative order group
//! consistent with the prompt list, persists every change back to the file,
//! and lets a single prompt's text be edited in a separate Markdown scratch
//! document that is synchronized back on commit.
//!
//! Rendering the form and wiring host UI events is left to the host; it
//! talks to the core through the closed [`Command`] set and receives one
//! [`Outbound`] message per command.
//!
//! # Getting started
//!
//! ```ignore
//! use preset_editor::prelude::*;
//!
//! let mut ws = EditorWorkspace::new("/project").with_event_handler(LoggingHandler);
//! let path = Path::new("/project/my-preset.json");
//! ws.open(path)?;
//!
//! ws.handle(path, Command::Insert { identifier: "main".into() })?;
//! ws.handle(path, Command::SetEnabled { identifier: "main".into(), enabled: true })?;
//!
//! let out = ws.handle(path, Command::OpenScratch { identifier: "main".into() })?;
//! // ...the user edits the scratch file in the host...
//! ws.commit_scratch(&scratch_path, None)?;
//! ```
//!
//! # Where to find things
//!
//! - **Document model:** [`Preset`], [`Prompt`], [`OrderGroup`] and the
//!   form-field table in [`preset::settings`].
//! - **Order reconciliation:** the `insert` / `remove` / `set_enabled` /
//!   `move_before` / `delete_prompt` methods on [`Preset`] ([`order`]).
//! - **Scratch documents:** [`scratch`] for the text format, the registry,
//!   and the background [`spawn_sweeper`](scratch::spawn_sweeper).
//! - **Navigation:** [`navigation::project`] and drag-and-drop resolution.
//! - **Hosting:** [`EditorWorkspace`] for sessions and command dispatch,
//!   [`EventHandler`] to observe what happened.

pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod navigation;
pub mod order;
pub mod prelude;
pub mod preset;
pub mod scratch;
pub mod session;
pub mod storage;
pub mod workspace;

pub use command::{Command, CommandDetail, Outbound};
pub use config::{EditorConfig, SweepPolicy};
pub use error::{EditorError, ErrorCode, Result};
pub use events::{EditorEvent, EventHandler, LoggingHandler};
pub use preset::{OrderEntry, OrderGroup, Preset, Prompt, PromptPatch, Role};
pub use storage::{JsonFileStorage, PresetStorage};
pub use workspace::{EditorWorkspace, OpenOutcome};
