//! In-memory preset document.
//!
//! A [`Preset`] is open-ended: the editor types only `prompts` and
//! `prompt_order`, and keeps every other top-level key in
//! [`Preset::settings`] so a load/save cycle writes back what it read, with
//! top-level and per-prompt keys in their original order.
//! Scalar settings the editor exposes as form fields are described in
//! [`settings`]; order-list bookkeeping lives in [`crate::order`].

mod layout;
mod prompt;
pub mod settings;

pub use prompt::{
    DEFAULT_INJECTION_DEPTH, DEFAULT_INJECTION_ORDER, InjectionPosition, NEW_PROMPT_NAME,
    OrderEntry, OrderGroup, Prompt, PromptPatch, Role,
};

use crate::error::{EditorError, Result};
use layout::KeyOrder;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Character id of the order group the editor treats as authoritative.
/// Groups with any other id are carried through untouched.
pub const EDITOR_CHARACTER_ID: i64 = 100001;

/// The full configuration document being edited.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(try_from = "Map<String, Value>")]
pub struct Preset {
    /// Every top-level key other than `prompts` and `prompt_order`.
    pub settings: Map<String, Value>,
    pub prompts: Vec<Prompt>,
    pub prompt_order: Vec<OrderGroup>,
    layout: KeyOrder,
}

impl TryFrom<Map<String, Value>> for Preset {
    type Error = serde_json::Error;

    fn try_from(mut object: Map<String, Value>) -> serde_json::Result<Self> {
        let layout = KeyOrder::of(&object);
        let prompts = match object.remove("prompts") {
            Some(value) => Vec::<Value>::deserialize(value)?
                .into_iter()
                .map(Prompt::from_json)
                .collect::<serde_json::Result<_>>()?,
            None => Vec::new(),
        };
        let prompt_order = match object.remove("prompt_order") {
            Some(value) => Vec::<OrderGroup>::deserialize(value)?,
            None => Vec::new(),
        };
        Ok(Self {
            settings: object,
            prompts,
            prompt_order,
            layout,
        })
    }
}

impl Serialize for Preset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::Error;

        let mut object = self.settings.clone();
        // Lists absent from the source stay absent until they gain entries.
        let emit = |key: &str, empty: bool| {
            self.layout.is_empty() || self.layout.contains(key) || !empty
        };
        if emit("prompts", self.prompts.is_empty()) {
            let prompts = self
                .prompts
                .iter()
                .map(Prompt::to_json)
                .collect::<serde_json::Result<Vec<_>>>()
                .map_err(S::Error::custom)?;
            object.insert("prompts".into(), Value::Array(prompts));
        }
        if emit("prompt_order", self.prompt_order.is_empty()) {
            let order = serde_json::to_value(&self.prompt_order).map_err(S::Error::custom)?;
            object.insert("prompt_order".into(), order);
        }
        self.layout.arrange(object).serialize(serializer)
    }
}

impl Preset {
    pub fn prompt(&self, identifier: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.identifier == identifier)
    }

    pub fn prompt_index(&self, identifier: &str) -> Option<usize> {
        self.prompts.iter().position(|p| p.identifier == identifier)
    }

    pub(crate) fn prompt_mut(&mut self, identifier: &str) -> Result<&mut Prompt> {
        self.prompts
            .iter_mut()
            .find(|p| p.identifier == identifier)
            .ok_or_else(|| EditorError::prompt_not_found(identifier))
    }

    /// Append a fresh prompt and return its identifier.
    ///
    /// The new prompt is not inserted into the order list.
    pub fn add_prompt(&mut self) -> String {
        let prompt = Prompt::new_blank();
        let identifier = prompt.identifier.clone();
        self.prompts.push(prompt);
        identifier
    }

    /// Apply an edit to a prompt's editable fields.
    pub fn update_prompt(&mut self, identifier: &str, patch: PromptPatch) -> Result<()> {
        let prompt = self.prompt_mut(identifier)?;
        if patch.content.is_some() && prompt.is_marker() {
            return Err(EditorError::MarkerPrompt {
                identifier: identifier.to_string(),
            });
        }
        prompt.apply(patch);
        Ok(())
    }

    /// Overwrite a prompt's text. Used when a scratch document is committed.
    pub fn set_prompt_content(&mut self, identifier: &str, content: String) -> Result<()> {
        self.update_prompt(identifier, PromptPatch::default().with_content(content))
    }

    /// Current value of a top-level setting.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Validate and store one of the editor's known scalar settings.
    pub fn set_setting(&mut self, key: &str, value: Value) -> Result<()> {
        let spec = settings::lookup(key).ok_or_else(|| EditorError::UnknownSetting {
            key: key.to_string(),
        })?;
        let value = spec
            .kind
            .coerce(value)
            .ok_or_else(|| EditorError::InvalidSetting {
                key: key.to_string(),
                expected: spec.kind.expected(),
            })?;
        self.settings.insert(key.to_string(), value);
        Ok(())
    }
}
