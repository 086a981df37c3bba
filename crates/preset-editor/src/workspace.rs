//! Open sessions, the scratch registry, and command dispatch.
//!
//! An [`EditorWorkspace`] is rooted at a directory (the scratch directory and
//! `.gitignore` live under it) and maps preset paths to
//! [`EditorSession`]s. Opening a path that is already open focuses the
//! existing session instead of creating a second writer.
//!
//! # Examples
//!
//! ```ignore
//! let mut ws = EditorWorkspace::new("/project").with_event_handler(LoggingHandler);
//! ws.open("/project/preset.json")?;
//! let out = ws.dispatch(
//!     Path::new("/project/preset.json"),
//!     Command::Insert { identifier: "main".into() },
//! );
//! ```

use crate::command::{Command, CommandDetail, Outbound};
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::events::{EditorEvent, EventHandler, NoopHandler};
use crate::scratch::{ScratchLink, ScratchRegistry, SweepReport, extract_content};
use crate::session::EditorSession;
use crate::storage::{JsonFileStorage, PresetStorage};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Result of [`EditorWorkspace::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// The path was already open.
    Focused,
}

pub struct EditorWorkspace {
    root: PathBuf,
    config: EditorConfig,
    storage: Arc<dyn PresetStorage>,
    events: Arc<dyn EventHandler>,
    sessions: HashMap<PathBuf, EditorSession>,
    scratch: ScratchRegistry,
}

impl EditorWorkspace {
    /// Workspace with default config, JSON file storage, and no event handler.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config = EditorConfig::default();
        let scratch = ScratchRegistry::new(&root, &config);
        Self {
            root,
            config,
            storage: Arc::new(JsonFileStorage),
            events: Arc::new(NoopHandler),
            sessions: HashMap::new(),
            scratch,
        }
    }

    /// Replace the configuration. Resets the scratch registry.
    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.scratch = ScratchRegistry::new(&self.root, &config);
        self.config = config;
        self
    }

    pub fn with_storage(mut self, storage: impl PresetStorage + 'static) -> Self {
        self.storage = Arc::new(storage);
        self
    }

    pub fn with_event_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.events = Arc::new(handler);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scratch(&self) -> &ScratchRegistry {
        &self.scratch
    }

    pub fn session(&self, path: &Path) -> Option<&EditorSession> {
        self.sessions.get(path)
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.sessions.contains_key(path)
    }

    pub fn open_paths(&self) -> impl Iterator<Item = &Path> {
        self.sessions.keys().map(PathBuf::as_path)
    }

    // ── Sessions ───────────────────────────────────────────────────

    /// Open a preset, or focus it if it is already open.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<OpenOutcome> {
        let path = path.into();
        if self.sessions.contains_key(&path) {
            self.events.on_event(&EditorEvent::Focused { path: &path });
            return Ok(OpenOutcome::Focused);
        }
        let session = EditorSession::open(&path, self.storage.clone())?;
        self.events.on_event(&EditorEvent::Loaded {
            path: &path,
            prompts: session.preset().prompts.len(),
        });
        self.sessions.insert(path, session);
        Ok(OpenOutcome::Opened)
    }

    /// Close a session. Scratch documents stay tracked and committable.
    pub fn close(&mut self, path: &Path) -> bool {
        let closed = self.sessions.remove(path).is_some();
        if closed {
            self.events.on_event(&EditorEvent::Closed { path });
        }
        closed
    }

    // ── Commands ───────────────────────────────────────────────────

    /// Run `command` against the preset at `path`.
    ///
    /// If the preset is not open a transient session is loaded for the
    /// command and dropped afterwards.
    pub fn handle(&mut self, path: &Path, command: Command) -> Result<Outbound> {
        let name = command.name();
        let persists = command.persists();

        let mut transient;
        let session = match self.sessions.get_mut(path) {
            Some(session) => session,
            None => {
                transient = EditorSession::open(path, self.storage.clone())?;
                &mut transient
            }
        };

        let result = apply(session, &mut self.scratch, self.events.as_ref(), command);
        let detail = match result {
            Ok(detail) => detail,
            Err(error) => {
                self.events.on_event(&EditorEvent::CommandFailed {
                    path,
                    command: name,
                    error: &error,
                });
                return Err(error);
            }
        };
        if persists {
            self.events.on_event(&EditorEvent::Persisted {
                path,
                command: name,
            });
        }
        Ok(Outbound::Refresh {
            path: session.path().to_path_buf(),
            preset: session.preset().clone(),
            navigation: session.navigation(),
            detail,
        })
    }

    /// Like [`handle`](Self::handle), with errors folded into
    /// [`Outbound::Error`].
    pub fn dispatch(&mut self, path: &Path, command: Command) -> Outbound {
        self.handle(path, command)
            .unwrap_or_else(|e| Outbound::error(&e))
    }

    /// Commit a scratch document into the preset it was opened from.
    pub fn commit_scratch(&mut self, scratch: &Path, text: Option<String>) -> Result<Outbound> {
        let preset_path = self.scratch_link(scratch)?.preset_path.clone();
        self.handle(
            &preset_path,
            Command::CommitScratch {
                scratch: scratch.to_path_buf(),
                text,
            },
        )
    }

    /// Drop a scratch association and delete its file.
    pub fn close_scratch(&mut self, scratch: &Path) -> Option<ScratchLink> {
        let link = self.scratch.close(scratch)?;
        self.events.on_event(&EditorEvent::ScratchClosed { scratch });
        Some(link)
    }

    fn scratch_link(&self, scratch: &Path) -> Result<&ScratchLink> {
        self.scratch
            .link(scratch)
            .ok_or_else(|| EditorError::ScratchNotTracked {
                path: scratch.to_path_buf(),
            })
    }

    // ── Sweeping ───────────────────────────────────────────────────

    /// Reclaim stale scratch documents now. `host_open` lists the
    /// documents the host has open.
    pub fn sweep_scratch(&mut self, host_open: &HashSet<PathBuf>) -> SweepReport {
        self.sweep_scratch_at(SystemTime::now(), host_open)
    }

    pub fn sweep_scratch_at(
        &mut self,
        now: SystemTime,
        host_open: &HashSet<PathBuf>,
    ) -> SweepReport {
        let report = self.scratch.sweep(now, host_open, &self.config.sweep);
        self.events
            .on_event(&EditorEvent::SweepCompleted { report: &report });
        report
    }
}

/// Run one command against `session`. Nothing is changed on error.
fn apply(
    session: &mut EditorSession,
    scratch: &mut ScratchRegistry,
    events: &dyn EventHandler,
    command: Command,
) -> Result<Option<CommandDetail>> {
    match command {
        Command::Load => {
            session.reload()?;
            Ok(None)
        }
        Command::Insert { identifier } => {
            session.mutate(|p| p.insert(&identifier))?;
            Ok(None)
        }
        Command::Remove { identifier } => {
            session.mutate(|p| {
                p.remove(&identifier);
                Ok(())
            })?;
            Ok(None)
        }
        Command::SetEnabled {
            identifier,
            enabled,
        } => {
            session.mutate(|p| {
                if p.prompt(&identifier).is_none() {
                    return Err(EditorError::prompt_not_found(&identifier));
                }
                p.set_enabled(&identifier, enabled);
                Ok(())
            })?;
            Ok(None)
        }
        Command::Move { identifier, before } => {
            session.mutate(|p| p.move_before(&identifier, before.as_deref()))?;
            Ok(None)
        }
        Command::AddPrompt => {
            let identifier = session.mutate(|p| Ok(p.add_prompt()))?;
            Ok(Some(CommandDetail::PromptAdded { identifier }))
        }
        Command::DeletePrompt { identifier } => {
            session.mutate(|p| p.delete_prompt(&identifier))?;
            scratch.forget_prompt(session.path(), &identifier);
            Ok(Some(CommandDetail::PromptDeleted { identifier }))
        }
        Command::UpdatePrompt { identifier, patch } => {
            session.mutate(|p| p.update_prompt(&identifier, patch))?;
            Ok(None)
        }
        Command::SetSetting { key, value } => {
            session.mutate(|p| p.set_setting(&key, value))?;
            Ok(None)
        }
        Command::OpenScratch { identifier } => {
            let prompt = session
                .preset()
                .prompt(&identifier)
                .ok_or_else(|| EditorError::prompt_not_found(&identifier))?;
            let path = scratch.open(session.path(), prompt)?;
            events.on_event(&EditorEvent::ScratchOpened {
                scratch: &path,
                identifier: &identifier,
            });
            Ok(Some(CommandDetail::ScratchOpened { scratch: path }))
        }
        Command::CommitScratch {
            scratch: path,
            text,
        } => {
            let identifier = match scratch.link(&path) {
                Some(link) if link.preset_path == session.path() => link.identifier.clone(),
                _ => return Err(EditorError::ScratchNotTracked { path }),
            };
            let raw = match text {
                Some(text) => text,
                None => scratch.read(&path)?,
            };
            let content = extract_content(&raw);
            session.mutate(|p| p.set_prompt_content(&identifier, content.clone()))?;
            events.on_event(&EditorEvent::ScratchCommitted {
                scratch: &path,
                identifier: &identifier,
                chars: content.chars().count(),
            });
            Ok(Some(CommandDetail::ScratchCommitted {
                scratch: path,
                content,
            }))
        }
        Command::CloseScratch { scratch: path } => {
            let tracked = scratch.close(&path).is_some();
            if tracked {
                events.on_event(&EditorEvent::ScratchClosed { scratch: &path });
            }
            Ok(Some(CommandDetail::ScratchClosed {
                scratch: path,
                tracked,
            }))
        }
    }
}
