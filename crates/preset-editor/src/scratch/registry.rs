//! Session state for open scratch documents.
//!
//! [`ScratchRegistry`] owns the scratch directory and the association from
//! each scratch file to the prompt it mirrors. Associations are added by
//! [`open`](ScratchRegistry::open) and dropped by
//! [`close`](ScratchRegistry::close) or by a [`sweep`](ScratchRegistry::sweep)
//! that reclaims the file.
//!
//! Directory layout:
//! ```text
//! <root>/
//!   .gitignore          # lists "temp/"
//!   temp/
//!     my-preset-Main Prompt-1718000000000.md
//!     my-preset-Main Prompt-1718000004512.md
//! ```

use super::format::{backing_name, render};
use crate::config::{EditorConfig, SweepPolicy};
use crate::error::{EditorError, Result};
use crate::preset::Prompt;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// What a scratch document is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchLink {
    /// Preset file the prompt lives in.
    pub preset_path: PathBuf,
    /// Identifier of the mirrored prompt.
    pub identifier: String,
    pub opened_at: DateTime<Utc>,
}

/// Outcome of one [`ScratchRegistry::sweep`] pass.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct SweepReport {
    /// Scratch files deleted.
    pub removed: Vec<PathBuf>,
    /// Associations dropped because their file was already gone.
    pub dropped_links: usize,
    /// Files that could not be inspected or deleted. Logged, never fatal.
    pub failures: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.dropped_links == 0 && self.failures == 0
    }
}

/// Registry of scratch documents for one workspace.
pub struct ScratchRegistry {
    root: PathBuf,
    dir: PathBuf,
    gitignore_pattern: Option<String>,
    links: HashMap<PathBuf, ScratchLink>,
}

impl ScratchRegistry {
    pub fn new(root: impl Into<PathBuf>, config: &EditorConfig) -> Self {
        let root = root.into();
        let dir = root.join(&config.scratch_dir_name);
        Self {
            root,
            dir,
            gitignore_pattern: config
                .manage_gitignore
                .then(|| config.gitignore_pattern()),
            links: HashMap::new(),
        }
    }

    /// Directory holding the scratch files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn link(&self, scratch: &Path) -> Option<&ScratchLink> {
        self.links.get(scratch)
    }

    /// Paths of every tracked scratch document.
    pub fn tracked_paths(&self) -> HashSet<PathBuf> {
        self.links.keys().cloned().collect()
    }

    /// Scratch documents bound to prompts of `preset_path`.
    pub fn links_for<'a>(
        &'a self,
        preset_path: &'a Path,
    ) -> impl Iterator<Item = (&'a Path, &'a ScratchLink)> + 'a {
        self.links
            .iter()
            .filter(move |(_, link)| link.preset_path == preset_path)
            .map(|(path, link)| (path.as_path(), link))
    }

    /// Materialize a scratch document for `prompt` and track it.
    ///
    /// Any number of scratch documents may exist for the same prompt; each
    /// gets its own millisecond-stamped file.
    pub fn open(&mut self, preset_path: &Path, prompt: &Prompt) -> Result<PathBuf> {
        if prompt.is_marker() {
            return Err(EditorError::MarkerPrompt {
                identifier: prompt.identifier.clone(),
            });
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| EditorError::ScratchIo {
            path: self.dir.clone(),
            source,
        })?;

        let stem = preset_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "preset".to_string());
        let opened_at = Utc::now();
        let mut millis = opened_at.timestamp_millis();
        let path = loop {
            let candidate = self.dir.join(backing_name(&stem, &prompt.name, millis));
            if !candidate.exists() && !self.links.contains_key(&candidate) {
                break candidate;
            }
            millis += 1;
        };

        std::fs::write(&path, render(&prompt.name, prompt.content())).map_err(|source| {
            EditorError::ScratchIo {
                path: path.clone(),
                source,
            }
        })?;

        if let Some(pattern) = &self.gitignore_pattern
            && let Err(e) = ensure_gitignore(&self.root, pattern)
        {
            warn!("Could not update .gitignore in {}: {e}", self.root.display());
        }

        self.links.insert(
            path.clone(),
            ScratchLink {
                preset_path: preset_path.to_path_buf(),
                identifier: prompt.identifier.clone(),
                opened_at,
            },
        );
        debug!(
            "Opened scratch {} for prompt {} ({} tracked)",
            path.display(),
            prompt.identifier,
            self.links.len()
        );
        Ok(path)
    }

    /// Read the current text of a tracked scratch document.
    pub fn read(&self, scratch: &Path) -> Result<String> {
        if !self.links.contains_key(scratch) {
            return Err(EditorError::ScratchNotTracked {
                path: scratch.to_path_buf(),
            });
        }
        std::fs::read_to_string(scratch).map_err(|source| EditorError::ScratchIo {
            path: scratch.to_path_buf(),
            source,
        })
    }

    /// Drop the association and delete the backing file.
    ///
    /// Deletion failures are logged and swallowed. Returns the dropped link,
    /// or `None` if the path was not tracked.
    pub fn close(&mut self, scratch: &Path) -> Option<ScratchLink> {
        let link = self.links.remove(scratch)?;
        match std::fs::remove_file(scratch) {
            Ok(()) => debug!("Removed scratch {}", scratch.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => debug!("Failed to remove scratch {}: {e}", scratch.display()),
        }
        Some(link)
    }

    /// Drop the associations of one prompt without touching files.
    ///
    /// Used when the prompt is deleted; its scratch files become orphans and
    /// are left for the sweeper.
    pub fn forget_prompt(&mut self, preset_path: &Path, identifier: &str) -> usize {
        let before = self.links.len();
        self.links
            .retain(|_, link| link.preset_path != preset_path || link.identifier != identifier);
        before - self.links.len()
    }

    /// Reclaim stale and orphaned scratch files.
    ///
    /// `host_open` lists the documents the host currently has open; those are
    /// never deleted. Otherwise a tracked file older than
    /// [`SweepPolicy::stale_after`] or an untracked file older than
    /// [`SweepPolicy::orphan_after`] is removed. Associations whose file no
    /// longer exists are dropped. Individual failures are logged and counted
    /// but never stop the pass.
    pub fn sweep(
        &mut self,
        now: SystemTime,
        host_open: &HashSet<PathBuf>,
        policy: &SweepPolicy,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        match std::fs::read_dir(&self.dir) {
            Ok(entries) => {
                for entry in entries {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(e) => {
                            warn!("Skipping unreadable entry in {}: {e}", self.dir.display());
                            report.failures += 1;
                            continue;
                        }
                    };
                    self.sweep_entry(&entry, now, host_open, policy, &mut report);
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!("Failed to read scratch dir {}: {e}", self.dir.display());
                report.failures += 1;
            }
        }

        let before = self.links.len();
        self.links.retain(|path, _| path.exists());
        report.dropped_links = before - self.links.len();

        if !report.removed.is_empty() || report.dropped_links > 0 {
            info!(
                "Scratch sweep removed {} file(s), dropped {} link(s); {} tracked",
                report.removed.len(),
                report.dropped_links,
                self.links.len()
            );
        }
        report
    }

    fn sweep_entry(
        &mut self,
        entry: &std::fs::DirEntry,
        now: SystemTime,
        host_open: &HashSet<PathBuf>,
        policy: &SweepPolicy,
        report: &mut SweepReport,
    ) {
        let path = entry.path();
        let meta = match entry.metadata() {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return,
            Err(e) => {
                warn!("Failed to stat {}: {e}", path.display());
                report.failures += 1;
                return;
            }
        };
        if host_open.contains(&path) {
            return;
        }

        let age = meta
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or(Duration::ZERO);
        let tracked = self.links.contains_key(&path);
        let limit = if tracked {
            policy.stale_after
        } else {
            policy.orphan_after
        };
        if age <= limit {
            return;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                self.links.remove(&path);
                debug!(
                    "Reclaimed scratch {} (age {}m, tracked: {tracked})",
                    path.display(),
                    age.as_secs() / 60
                );
                report.removed.push(path);
            }
            Err(e) => {
                warn!("Failed to reclaim scratch {}: {e}", path.display());
                report.failures += 1;
            }
        }
    }
}

/// Make sure `<root>/.gitignore` has a line equal to `pattern`.
///
/// Returns `true` when the file was changed.
fn ensure_gitignore(root: &Path, pattern: &str) -> std::io::Result<bool> {
    let path = root.join(".gitignore");
    let mut content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    if content.lines().any(|line| line.trim() == pattern) {
        return Ok(false);
    }
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str("# preset editor scratch documents\n");
    content.push_str(pattern);
    content.push('\n');
    std::fs::write(&path, content)?;
    Ok(true)
}
