//! Background reclamation of scratch documents.
//!
//! [`spawn_sweeper`] starts a tokio task that sweeps the workspace's scratch
//! directory after [`SweepPolicy::initial_delay`](crate::config::SweepPolicy),
//! then every [`SweepPolicy::interval`](crate::config::SweepPolicy). Hosts
//! call [`SweeperHandle::notify_closed`] when a document closes to schedule
//! an extra pass shortly after.

use crate::workspace::EditorWorkspace;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Handle to a running sweeper task. Dropping it does not stop the task;
/// call [`abort`](Self::abort).
pub struct SweeperHandle {
    closed: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// A host document was closed; sweep again after the close delay.
    pub fn notify_closed(&self) {
        self.closed.notify_one();
    }

    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start the periodic sweeper.
///
/// `host_open` is called before each pass to learn which documents the host
/// has open; those are never deleted. The workspace lock is held only for
/// the duration of a pass.
pub fn spawn_sweeper<F>(workspace: Arc<Mutex<EditorWorkspace>>, host_open: F) -> SweeperHandle
where
    F: Fn() -> HashSet<PathBuf> + Send + 'static,
{
    let policy = workspace
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .config()
        .sweep;
    let closed = Arc::new(Notify::new());
    let notified = closed.clone();

    let task = tokio::spawn(async move {
        tokio::time::sleep(policy.initial_delay).await;
        let mut ticker = tokio::time::interval(policy.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = notified.notified() => {
                    tokio::time::sleep(policy.close_delay).await;
                }
            }
            let open = host_open();
            let report = {
                let mut ws = workspace.lock().unwrap_or_else(|e| e.into_inner());
                ws.sweep_scratch(&open)
            };
            debug!("Sweeper pass done ({} removed)", report.removed.len());
        }
    });

    SweeperHandle { closed, task }
}
