//! Editor events and the handlers that observe them.
//!
//! The workspace reports what it did through [`EditorEvent`] variants. Hosts
//! implement [`EventHandler`] to surface notifications, refresh views, or
//! collect metrics.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests and headless use |
//! | [`LoggingHandler`] | Structured logging via `tracing` |

use crate::error::EditorError;
use crate::scratch::SweepReport;
use std::path::Path;
use tracing::{debug, info, warn};

/// Events emitted by an [`EditorWorkspace`](crate::workspace::EditorWorkspace).
#[derive(Debug)]
pub enum EditorEvent<'a> {
    /// A preset was loaded into a new session.
    Loaded { path: &'a Path, prompts: usize },
    /// A repeat open of an already-open preset.
    Focused { path: &'a Path },
    /// A session was closed.
    Closed { path: &'a Path },
    /// A mutating command was saved to disk.
    Persisted { path: &'a Path, command: &'a str },
    /// A command failed; the document is unchanged.
    CommandFailed {
        path: &'a Path,
        command: &'a str,
        error: &'a EditorError,
    },
    ScratchOpened {
        scratch: &'a Path,
        identifier: &'a str,
    },
    /// Scratch text was written back into its prompt.
    ScratchCommitted {
        scratch: &'a Path,
        identifier: &'a str,
        chars: usize,
    },
    ScratchClosed { scratch: &'a Path },
    /// A sweep pass finished.
    SweepCompleted { report: &'a SweepReport },
}

/// Observer for editor events. The default implementation ignores them.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &EditorEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// Forwards events to `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &EditorEvent<'_>) {
        match event {
            EditorEvent::Loaded { path, prompts } => {
                info!("Opened {} ({prompts} prompts)", path.display());
            }
            EditorEvent::Focused { path } => {
                debug!("{} already open, focusing", path.display());
            }
            EditorEvent::Closed { path } => {
                debug!("Closed {}", path.display());
            }
            EditorEvent::Persisted { path, command } => {
                info!("Saved {} after {command}", path.display());
            }
            EditorEvent::CommandFailed {
                path,
                command,
                error,
            } => {
                warn!("{command} on {} failed: {error}", path.display());
            }
            EditorEvent::ScratchOpened {
                scratch,
                identifier,
            } => {
                debug!("Scratch {} opened for {identifier}", scratch.display());
            }
            EditorEvent::ScratchCommitted {
                scratch,
                identifier,
                chars,
            } => {
                info!(
                    "Committed {chars} chars from {} into {identifier}",
                    scratch.display()
                );
            }
            EditorEvent::ScratchClosed { scratch } => {
                debug!("Scratch {} closed", scratch.display());
            }
            EditorEvent::SweepCompleted { report } => {
                if report.failures > 0 {
                    warn!("Scratch sweep hit {} failure(s)", report.failures);
                } else {
                    debug!(
                        "Scratch sweep: {} removed, {} links dropped",
                        report.removed.len(),
                        report.dropped_links
                    );
                }
            }
        }
    }
}
