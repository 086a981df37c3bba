//! Navigation projection of a preset.
//!
//! [`project`] is a pure function of the document: the fixed form sections,
//! then the inserted prompts in authoritative order, then (if any) a
//! separator and the uninserted prompts in storage order. When the document
//! has no authoritative order group every prompt is listed in storage order
//! with no enabled indicator.

use crate::command::Command;
use crate::preset::Preset;
use crate::preset::settings::FormSection;
use serde::Serialize;

/// Section id of the prompt list heading.
pub const PROMPTS_SECTION_ID: &str = "prompts-config";
/// Section id of the separator before uninserted prompts.
pub const UNINSERTED_SECTION_ID: &str = "uninserted-prompts";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavKind {
    Section,
    Separator,
    Prompt,
}

/// How a prompt item relates to the order list.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromptState {
    Enabled,
    Disabled,
    Uninserted,
    /// The document has no authoritative order group.
    Unordered,
}

impl PromptState {
    pub fn glyph(self) -> &'static str {
        match self {
            PromptState::Enabled => "✅",
            PromptState::Disabled => "⭕",
            PromptState::Uninserted => "🔸",
            PromptState::Unordered => "└",
        }
    }

    fn is_inserted(self) -> bool {
        matches!(self, PromptState::Enabled | PromptState::Disabled)
    }
}

/// One row of the navigation list.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: String,
    pub section_id: String,
    pub kind: NavKind,
    /// Position in `prompts` (prompt items only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PromptState>,
}

impl NavItem {
    fn section(section_id: &str, label: &str) -> Self {
        Self {
            label: label.to_string(),
            section_id: section_id.to_string(),
            kind: NavKind::Section,
            prompt_index: None,
            identifier: None,
            state: None,
        }
    }

    fn prompt(preset: &Preset, index: usize, state: PromptState) -> Self {
        let prompt = &preset.prompts[index];
        Self {
            label: format!("{} {}", state.glyph(), prompt.display_name()),
            section_id: format!("prompt-{index}"),
            kind: NavKind::Prompt,
            prompt_index: Some(index),
            identifier: Some(prompt.identifier.clone()),
            state: Some(state),
        }
    }

    /// Only inserted prompts can be reordered.
    pub fn is_draggable(&self) -> bool {
        self.kind == NavKind::Prompt && self.state.is_some_and(PromptState::is_inserted)
    }
}

/// Compute the navigation list for `preset`.
pub fn project(preset: &Preset) -> Vec<NavItem> {
    let mut items: Vec<NavItem> = FormSection::ALL
        .iter()
        .map(|s| NavItem::section(s.section_id(), s.title()))
        .collect();
    items.push(NavItem::section(PROMPTS_SECTION_ID, "Prompts"));

    let Some(group) = preset.authoritative_order() else {
        items.extend(
            (0..preset.prompts.len()).map(|i| NavItem::prompt(preset, i, PromptState::Unordered)),
        );
        return items;
    };

    for entry in &group.order {
        // Entries naming no prompt are skipped.
        let Some(index) = preset.prompt_index(&entry.identifier) else {
            continue;
        };
        let state = if entry.enabled {
            PromptState::Enabled
        } else {
            PromptState::Disabled
        };
        items.push(NavItem::prompt(preset, index, state));
    }

    let uninserted: Vec<usize> = preset
        .prompts
        .iter()
        .enumerate()
        .filter(|(_, p)| group.position(&p.identifier).is_none())
        .map(|(i, _)| i)
        .collect();
    if !uninserted.is_empty() {
        items.push(NavItem {
            kind: NavKind::Separator,
            ..NavItem::section(UNINSERTED_SECTION_ID, "Uninserted prompts")
        });
        items.extend(
            uninserted
                .into_iter()
                .map(|i| NavItem::prompt(preset, i, PromptState::Uninserted)),
        );
    }
    items
}

/// Translate a drag-and-drop gesture into a move command.
///
/// Returns `None` when `dragged` is not draggable. A drop onto an inserted
/// prompt moves before it; a drop anywhere else moves to the front.
pub fn resolve_drop(dragged: &NavItem, target: Option<&NavItem>) -> Option<Command> {
    if !dragged.is_draggable() {
        return None;
    }
    let identifier = dragged.identifier.clone()?;
    let before = target
        .filter(|t| t.is_draggable())
        .and_then(|t| t.identifier.clone());
    Some(Command::Move { identifier, before })
}

/// Plain-text rendering for terminals.
pub fn render_text(items: &[NavItem]) -> String {
    let mut out = String::new();
    for item in items {
        match item.kind {
            NavKind::Section => out.push_str(&item.label),
            NavKind::Separator => {
                out.push_str("  -- ");
                out.push_str(&item.label);
                out.push_str(" --");
            }
            NavKind::Prompt => {
                out.push_str("  ");
                out.push_str(&item.label);
            }
        }
        out.push('\n');
    }
    out
}
