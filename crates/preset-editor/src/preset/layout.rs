//! Key order of JSON objects as they were read.
//!
//! The typed models serialize their fields in declaration order. A
//! [`KeyOrder`] remembers where each key sat in the source object so a save
//! can put it back there. Keys the source did not have go last, in the order
//! the model emits them.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub(crate) struct KeyOrder(Vec<String>);

/// Layout is presentation, not content: two documents with the same keys and
/// values compare equal whatever order they were read in.
impl PartialEq for KeyOrder {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl KeyOrder {
    pub(crate) fn of(object: &Map<String, Value>) -> Self {
        Self(object.keys().cloned().collect())
    }

    pub(crate) fn new(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| k.to_string()).collect())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    /// Reorder `object` to follow the recorded layout.
    pub(crate) fn arrange(&self, mut object: Map<String, Value>) -> Map<String, Value> {
        if self.0.is_empty() {
            return object;
        }
        let mut out = Map::new();
        for key in &self.0 {
            if let Some(value) = object.get_mut(key) {
                out.insert(key.clone(), value.take());
            }
        }
        for (key, value) in object {
            if !out.contains_key(&key) {
                out.insert(key, value);
            }
        }
        out
    }
}
