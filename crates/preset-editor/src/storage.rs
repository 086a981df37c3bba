//! Loading and saving preset documents.
//!
//! [`PresetStorage`] is the seam between the editor and wherever documents
//! live. [`JsonFileStorage`] reads and writes UTF-8 JSON files, always as a
//! full-document overwrite pretty-printed with four-space indentation. Writes
//! are atomic: the document goes to a sibling temp file which is then renamed
//! over the target.

use crate::error::{EditorError, Result};
use crate::preset::Preset;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Storage collaborator for preset documents.
pub trait PresetStorage: Send + Sync {
    fn load(&self, path: &Path) -> Result<Preset>;
    fn save(&self, path: &Path, preset: &Preset) -> Result<()>;
    /// Whether a document is still present at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// JSON files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileStorage;

impl PresetStorage for JsonFileStorage {
    fn load(&self, path: &Path) -> Result<Preset> {
        let json = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                EditorError::DocumentNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                EditorError::IoRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&json).map_err(|source| EditorError::DocumentParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save(&self, path: &Path, preset: &Preset) -> Result<()> {
        let json = to_pretty_json(preset).map_err(|e| EditorError::IoWrite {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        let tmp_path = temp_sibling(path);
        let write_err = |source: std::io::Error| EditorError::IoWrite {
            path: path.to_path_buf(),
            source,
        };
        std::fs::write(&tmp_path, json).map_err(write_err)?;
        if let Err(source) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(source));
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Serialize with four-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `dir/.name.tmp` next to `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "preset.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
