//! Prompt-order reconciliation.
//!
//! The authoritative order list is the `order` of the [`OrderGroup`] whose
//! `character_id` is [`EDITOR_CHARACTER_ID`]. A prompt is *inserted* when it
//! has an entry there and *uninserted* otherwise. Every identifier in that
//! list must name an existing prompt; the operations below keep it that way.

use crate::error::{EditorError, Result};
use crate::preset::{EDITOR_CHARACTER_ID, OrderEntry, OrderGroup, Preset, Prompt};

impl Preset {
    /// The authoritative order group, if the document has one.
    pub fn authoritative_order(&self) -> Option<&OrderGroup> {
        self.prompt_order
            .iter()
            .find(|g| g.character_id == EDITOR_CHARACTER_ID)
    }

    fn authoritative_order_mut(&mut self) -> Option<&mut OrderGroup> {
        self.prompt_order
            .iter_mut()
            .find(|g| g.character_id == EDITOR_CHARACTER_ID)
    }

    fn authoritative_order_or_insert(&mut self) -> &mut OrderGroup {
        let idx = match self
            .prompt_order
            .iter()
            .position(|g| g.character_id == EDITOR_CHARACTER_ID)
        {
            Some(idx) => idx,
            None => {
                self.prompt_order.push(OrderGroup::new(EDITOR_CHARACTER_ID));
                self.prompt_order.len() - 1
            }
        };
        &mut self.prompt_order[idx]
    }

    pub fn is_inserted(&self, identifier: &str) -> bool {
        self.authoritative_order()
            .is_some_and(|g| g.position(identifier).is_some())
    }

    /// Enabled flag of an inserted prompt; `None` when uninserted.
    pub fn enabled(&self, identifier: &str) -> Option<bool> {
        let group = self.authoritative_order()?;
        group
            .order
            .iter()
            .find(|e| e.identifier == identifier)
            .map(|e| e.enabled)
    }

    /// Identifiers of the authoritative order list, in order.
    pub fn order_identifiers(&self) -> Vec<&str> {
        self.authoritative_order()
            .map(|g| g.order.iter().map(|e| e.identifier.as_str()).collect())
            .unwrap_or_default()
    }

    /// Insert a prompt at the front of the order list, disabled.
    ///
    /// Returns `false` when the prompt was already inserted (nothing changes).
    pub fn insert(&mut self, identifier: &str) -> Result<bool> {
        if self.prompt(identifier).is_none() {
            return Err(EditorError::prompt_not_found(identifier));
        }
        if self.is_inserted(identifier) {
            return Ok(false);
        }
        self.authoritative_order_or_insert()
            .order
            .insert(0, OrderEntry::new(identifier, false));
        Ok(true)
    }

    /// Drop a prompt's order entry, keeping the prompt itself.
    ///
    /// Returns `false` when there was no entry to drop.
    pub fn remove(&mut self, identifier: &str) -> bool {
        let Some(group) = self.authoritative_order_mut() else {
            return false;
        };
        match group.position(identifier) {
            Some(idx) => {
                group.order.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Set the enabled flag, creating the group and entry when missing.
    ///
    /// A created entry goes to the end of the list.
    pub fn set_enabled(&mut self, identifier: &str, enabled: bool) {
        let group = self.authoritative_order_or_insert();
        match group.order.iter_mut().find(|e| e.identifier == identifier) {
            Some(entry) => entry.enabled = enabled,
            None => group.order.push(OrderEntry::new(identifier, enabled)),
        }
    }

    /// Move `identifier` to sit immediately before `before`, or to the front
    /// when `before` is `None`.
    ///
    /// Both identifiers must be in the order list; otherwise nothing changes
    /// and [`EditorError::OrderEntryMissing`] names the absent one.
    pub fn move_before(&mut self, identifier: &str, before: Option<&str>) -> Result<()> {
        let group = self
            .authoritative_order_mut()
            .ok_or_else(|| EditorError::order_entry_missing(identifier))?;
        let from = group
            .position(identifier)
            .ok_or_else(|| EditorError::order_entry_missing(identifier))?;
        let mut to = match before {
            Some(target) => group
                .position(target)
                .ok_or_else(|| EditorError::order_entry_missing(target))?,
            None => 0,
        };

        let entry = group.order.remove(from);
        // The target index was taken before removal.
        if to > from {
            to -= 1;
        }
        group.order.insert(to, entry);
        Ok(())
    }

    /// Delete a prompt and its order entry.
    pub fn delete_prompt(&mut self, identifier: &str) -> Result<Prompt> {
        let idx = self
            .prompt_index(identifier)
            .ok_or_else(|| EditorError::prompt_not_found(identifier))?;
        self.remove(identifier);
        Ok(self.prompts.remove(idx))
    }

    /// Order entries in the authoritative list that name no prompt.
    pub fn dangling_order_entries(&self) -> Vec<&str> {
        self.order_identifiers()
            .into_iter()
            .filter(|id| self.prompt(id).is_none())
            .collect()
    }
}
