//! Prompt entries and order groups.

use super::layout::KeyOrder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default `injection_depth` for newly created prompts.
pub const DEFAULT_INJECTION_DEPTH: u32 = 4;
/// Default `injection_order` for newly created prompts.
pub const DEFAULT_INJECTION_ORDER: u32 = 100;
/// Name given to newly created prompts.
pub const NEW_PROMPT_NAME: &str = "New Prompt";

/// Key layout of a prompt created by the editor.
const NEW_PROMPT_KEYS: &[&str] = &[
    "identifier",
    "system_prompt",
    "enabled",
    "marker",
    "name",
    "role",
    "content",
    "injection_position",
    "injection_depth",
    "injection_order",
    "forbid_overrides",
];

/// Chat role a prompt is sent as.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// Where a prompt is injected. Stored as `0` / `1` in the document.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum InjectionPosition {
    /// Placed relative to the other prompts in the order list.
    #[default]
    Relative,
    /// Injected into the chat history at `injection_depth`.
    InChat,
}

impl TryFrom<u8> for InjectionPosition {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(InjectionPosition::Relative),
            1 => Ok(InjectionPosition::InChat),
            other => Err(format!("invalid injection_position {other}")),
        }
    }
}

impl From<InjectionPosition> for u8 {
    fn from(position: InjectionPosition) -> Self {
        match position {
            InjectionPosition::Relative => 0,
            InjectionPosition::InChat => 1,
        }
    }
}

/// One named block of instructional text with placement metadata.
///
/// Fields the editor does not know about are kept in `extra` and written
/// back unchanged. Inside a [`Preset`](super::Preset) a prompt is written
/// with its keys in the order they were read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Prompt {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    /// Built-in prompt of the producing application. Read-only here.
    #[serde(default)]
    pub system_prompt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Legacy per-prompt flag. The order list is authoritative for enablement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Placeholder whose content is supplied at runtime. Read-only here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_position: Option<InjectionPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbid_overrides: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub(crate) layout: KeyOrder,
}

impl Prompt {
    /// A fresh user-created prompt with a random v4 identifier.
    pub fn new_blank() -> Self {
        Self {
            identifier: uuid::Uuid::new_v4().to_string(),
            name: NEW_PROMPT_NAME.to_string(),
            system_prompt: false,
            role: Some(Role::System),
            content: Some(String::new()),
            enabled: Some(false),
            marker: Some(false),
            injection_position: Some(InjectionPosition::Relative),
            injection_depth: Some(DEFAULT_INJECTION_DEPTH),
            injection_order: Some(DEFAULT_INJECTION_ORDER),
            forbid_overrides: Some(false),
            extra: Map::new(),
            layout: KeyOrder::new(NEW_PROMPT_KEYS),
        }
    }

    /// Parse one element of a document's `prompts` array, keeping its layout.
    pub(crate) fn from_json(value: Value) -> serde_json::Result<Self> {
        let layout = value.as_object().map(KeyOrder::of).unwrap_or_default();
        let mut prompt: Prompt = serde_json::from_value(value)?;
        prompt.layout = layout;
        Ok(prompt)
    }

    /// Serialize in the layout the prompt was read with.
    ///
    /// `name` and `system_prompt` are always present on the typed model; they
    /// are left out again when the source omitted them and they still hold
    /// their defaults.
    pub(crate) fn to_json(&self) -> serde_json::Result<Value> {
        let Value::Object(mut object) = serde_json::to_value(self)? else {
            return Err(serde::ser::Error::custom("prompt did not serialize to an object"));
        };
        if !self.layout.is_empty() {
            for (key, implied) in [("name", Value::from("")), ("system_prompt", Value::Bool(false))] {
                if !self.layout.contains(key) && object.get(key) == Some(&implied) {
                    object.remove(key);
                }
            }
        }
        Ok(Value::Object(self.layout.arrange(object)))
    }

    pub fn is_marker(&self) -> bool {
        self.marker == Some(true)
    }

    /// The prompt text, or `""` when the document omits it.
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Name for display, falling back when the document leaves it blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unnamed prompt"
        } else {
            &self.name
        }
    }

    /// Apply the editable fields of `patch`.
    ///
    /// `system_prompt` and `marker` are never changed. Callers must reject
    /// content edits on markers before calling this.
    pub(crate) fn apply(&mut self, patch: PromptPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = Some(role);
        }
        if let Some(content) = patch.content {
            self.content = Some(content);
        }
        if let Some(position) = patch.injection_position {
            self.injection_position = Some(position);
        }
        if let Some(depth) = patch.injection_depth {
            self.injection_depth = Some(depth);
        }
        if let Some(order) = patch.injection_order {
            self.injection_order = Some(order);
        }
        if let Some(forbid) = patch.forbid_overrides {
            self.forbid_overrides = Some(forbid);
        }
    }
}

/// Partial update of a prompt's editable fields.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PromptPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_position: Option<InjectionPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbid_overrides: Option<bool>,
}

impl PromptPatch {
    pub fn is_empty(&self) -> bool {
        *self == PromptPatch::default()
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One `{identifier, enabled}` record of an order list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    pub identifier: String,
    pub enabled: bool,
}

impl OrderEntry {
    pub fn new(identifier: impl Into<String>, enabled: bool) -> Self {
        Self {
            identifier: identifier.into(),
            enabled,
        }
    }
}

/// Ordered enable-list owned by one character id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderGroup {
    pub character_id: i64,
    #[serde(default)]
    pub order: Vec<OrderEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrderGroup {
    pub fn new(character_id: i64) -> Self {
        Self {
            character_id,
            order: Vec::new(),
            extra: Map::new(),
        }
    }

    pub(crate) fn position(&self, identifier: &str) -> Option<usize> {
        self.order.iter().position(|e| e.identifier == identifier)
    }
}
