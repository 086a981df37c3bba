//! The scalar settings the editor exposes as form fields.
//!
//! The table is closed: [`lookup`] answers `None` for anything else, and
//! those keys are left untouched in the document.

use serde::Serialize;
use serde_json::Value;

/// Form section a setting is rendered in.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormSection {
    Basic,
    Chat,
    Other,
}

impl FormSection {
    pub const ALL: [FormSection; 3] = [FormSection::Basic, FormSection::Chat, FormSection::Other];

    /// Anchor id used by navigation.
    pub fn section_id(self) -> &'static str {
        match self {
            FormSection::Basic => "basic-config",
            FormSection::Chat => "chat-config",
            FormSection::Other => "other-settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FormSection::Basic => "Basic settings",
            FormSection::Chat => "Chat settings",
            FormSection::Other => "Other settings",
        }
    }
}

/// JSON shape a setting accepts.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    Float,
    Integer,
    Bool,
    Text,
}

impl SettingKind {
    /// Human description used in validation errors.
    pub fn expected(self) -> &'static str {
        match self {
            SettingKind::Float => "a number",
            SettingKind::Integer => "an integer",
            SettingKind::Bool => "true or false",
            SettingKind::Text => "a string",
        }
    }

    /// Validate `value`, normalizing integral floats for integer settings.
    pub fn coerce(self, value: Value) -> Option<Value> {
        match (self, value) {
            (SettingKind::Float, Value::Number(n)) => Some(Value::Number(n)),
            (SettingKind::Integer, Value::Number(n)) => {
                if n.is_i64() || n.is_u64() {
                    Some(Value::Number(n))
                } else {
                    let f = n.as_f64()?;
                    (f.fract() == 0.0 && f.is_finite()).then(|| Value::from(f as i64))
                }
            }
            (SettingKind::Bool, Value::Bool(b)) => Some(Value::Bool(b)),
            (SettingKind::Text, Value::String(s)) => Some(Value::String(s)),
            _ => None,
        }
    }

    /// Parse a command-line string into a value of this kind.
    pub fn parse_str(self, raw: &str) -> Option<Value> {
        match self {
            SettingKind::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            SettingKind::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
            SettingKind::Bool => raw.trim().parse::<bool>().ok().map(Value::Bool),
            SettingKind::Text => Some(Value::String(raw.to_string())),
        }
    }
}

/// One editable scalar setting.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub section: FormSection,
    pub kind: SettingKind,
}

const fn spec(
    key: &'static str,
    label: &'static str,
    section: FormSection,
    kind: SettingKind,
) -> SettingSpec {
    SettingSpec {
        key,
        label,
        section,
        kind,
    }
}

pub const SETTINGS: &[SettingSpec] = &[
    spec("temperature", "Temperature", FormSection::Basic, SettingKind::Float),
    spec("frequency_penalty", "Frequency Penalty", FormSection::Basic, SettingKind::Float),
    spec("presence_penalty", "Presence Penalty", FormSection::Basic, SettingKind::Float),
    spec("top_p", "Top P", FormSection::Basic, SettingKind::Float),
    spec("top_k", "Top K", FormSection::Basic, SettingKind::Integer),
    spec("repetition_penalty", "Repetition Penalty", FormSection::Basic, SettingKind::Float),
    spec("openai_max_context", "Max Context", FormSection::Basic, SettingKind::Integer),
    spec("openai_max_tokens", "Max Tokens", FormSection::Basic, SettingKind::Integer),
    spec("impersonation_prompt", "Impersonation prompt", FormSection::Chat, SettingKind::Text),
    spec("new_chat_prompt", "New chat prompt", FormSection::Chat, SettingKind::Text),
    spec("continue_nudge_prompt", "Continue nudge prompt", FormSection::Chat, SettingKind::Text),
    spec("group_nudge_prompt", "Group nudge prompt", FormSection::Chat, SettingKind::Text),
    spec("wrap_in_quotes", "Wrap in quotes", FormSection::Other, SettingKind::Bool),
    spec("max_context_unlocked", "Unlock max context", FormSection::Other, SettingKind::Bool),
    spec("stream_openai", "Streaming", FormSection::Other, SettingKind::Bool),
    spec("function_calling", "Function calling", FormSection::Other, SettingKind::Bool),
    spec("enable_web_search", "Web search", FormSection::Other, SettingKind::Bool),
    spec("show_thoughts", "Show thoughts", FormSection::Other, SettingKind::Bool),
];

pub fn lookup(key: &str) -> Option<&'static SettingSpec> {
    SETTINGS.iter().find(|s| s.key == key)
}

/// Settings rendered in `section`, in form order.
pub fn in_section(section: FormSection) -> impl Iterator<Item = &'static SettingSpec> {
    SETTINGS.iter().filter(move |s| s.section == section)
}
