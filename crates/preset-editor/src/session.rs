//! One open preset document.
//!
//! An [`EditorSession`] holds the in-memory copy of a single preset file.
//! Mutations go through [`EditorSession::mutate`]: the change is applied to a
//! clone, the clone is saved, and only then does the session adopt the
//! re-read file. A failed step leaves the in-memory document as it was. A
//! document removed from storage behind the session's back is never
//! recreated.

use crate::error::{EditorError, Result};
use crate::navigation::{self, NavItem};
use crate::preset::Preset;
use crate::storage::PresetStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct EditorSession {
    path: PathBuf,
    preset: Preset,
    storage: Arc<dyn PresetStorage>,
}

impl EditorSession {
    /// Load `path` through `storage`.
    pub fn open(path: impl Into<PathBuf>, storage: Arc<dyn PresetStorage>) -> Result<Self> {
        let path = path.into();
        let preset = storage.load(&path)?;
        debug!(
            "Loaded {} ({} prompts, {} order groups)",
            path.display(),
            preset.prompts.len(),
            preset.prompt_order.len()
        );
        let dangling = preset.dangling_order_entries();
        if !dangling.is_empty() {
            warn!(
                "{} has order entries with no prompt: {}",
                path.display(),
                dangling.join(", ")
            );
        }
        Ok(Self {
            path,
            preset,
            storage,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Re-read the document from storage.
    pub fn reload(&mut self) -> Result<()> {
        self.preset = self.storage.load(&self.path)?;
        Ok(())
    }

    /// Apply `f` to a copy of the document and persist it.
    ///
    /// On success the session holds the file as re-read after the save. If
    /// that re-read fails the saved copy is kept instead. Fails with
    /// [`EditorError::DocumentNotFound`] once the document is gone.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut Preset) -> Result<T>) -> Result<T> {
        if !self.storage.exists(&self.path) {
            return Err(EditorError::DocumentNotFound {
                path: self.path.clone(),
            });
        }
        let mut draft = self.preset.clone();
        let out = f(&mut draft)?;
        self.storage.save(&self.path, &draft)?;
        self.preset = match self.storage.load(&self.path) {
            Ok(preset) => preset,
            Err(e) => {
                warn!("Saved {} but could not re-read it: {e}", self.path.display());
                draft
            }
        };
        Ok(out)
    }

    /// Navigation list for the current document.
    pub fn navigation(&self) -> Vec<NavItem> {
        navigation::project(&self.preset)
    }
}
