//! Chat message log with hide/restore lifecycle.
//!
//! `hide` moves a message out of the visible ordered log into a side table
//! keyed by id — not a delete. A later `restore` re-appends it at the END of
//! the log (restoration is not position-preserving), optionally flagged
//! canceled. This backs the "hide while an overlay edits it" flow: the
//! overlay coordinator hides the source message while a reservation overlay
//! is open and restores it on close.

use std::collections::HashMap;

use tracing::warn;

use crate::model::Message;

#[derive(Debug, Default)]
pub struct MessageLog {
    visible: Vec<Message>,
    hidden: HashMap<String, Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the end of the log. Ids must be unique; a
    /// duplicate is dropped with a warning since id is the lifecycle key.
    pub fn append(&mut self, message: Message) {
        if self.visible.iter().any(|m| m.id == message.id) || self.hidden.contains_key(&message.id)
        {
            warn!(id = %message.id, "duplicate message id, dropping");
            return;
        }
        self.visible.push(message);
    }

    /// Temporarily remove `id` from the visible log. Returns the removed
    /// message (also retained in the side table for later restore).
    pub fn hide(&mut self, id: &str) -> Option<Message> {
        let pos = self.visible.iter().position(|m| m.id == id)?;
        let message = self.visible.remove(pos);
        self.hidden.insert(id.to_string(), message.clone());
        Some(message)
    }

    /// Bring a hidden message back, appended at the end of the log. With
    /// `mark_canceled` the restored copy carries the canceled flag. Unknown
    /// id is a no-op returning `None`.
    pub fn restore(&mut self, id: &str, mark_canceled: bool) -> Option<&Message> {
        let mut message = self.hidden.remove(id)?;
        if mark_canceled {
            message.canceled = true;
        }
        self.visible.push(message);
        self.visible.last()
    }

    /// Hard-delete a message (visible or hidden). Only explicit
    /// delete-reservation flows use this.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.hidden.remove(id).is_some() {
            return true;
        }
        let before = self.visible.len();
        self.visible.retain(|m| m.id != id);
        self.visible.len() < before
    }

    pub fn messages(&self) -> &[Message] {
        &self.visible
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}
