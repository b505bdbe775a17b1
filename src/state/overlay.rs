//! Overlay visibility slot — the singleton `closed | open(kind, data)`
//! state machine.
//!
//! Exactly one overlay can be visible; the container holds one slot. A
//! `show` with the same kind and record key as the currently open overlay is
//! a no-op so re-delivered frames don't re-initialize a form mid-edit.

use serde_json::Value;

use crate::protocol::OverlayKind;

/// An open overlay and its edit-session bookkeeping.
#[derive(Debug, Clone)]
pub struct OpenOverlay {
    pub kind: OverlayKind,
    pub data: Value,
    /// Chat message hidden while this overlay edits it; restored on close.
    pub hidden_message_id: Option<String>,
    /// Set when the user finalized (saved) before closing — controls the
    /// canceled flag on restoration.
    pub finalized: bool,
}

impl OpenOverlay {
    /// Identity key for the idempotence check: the record id when present.
    fn key(&self) -> Option<&Value> {
        self.data.get("id")
    }
}

#[derive(Debug, Default)]
pub struct OverlaySlot {
    current: Option<OpenOverlay>,
}

impl OverlaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&OpenOverlay> {
        self.current.as_ref()
    }

    /// True when the open overlay has the same kind and record key — the
    /// idempotence test callers use before deciding to displace the slot.
    pub fn is_same(&self, kind: OverlayKind, data: &Value) -> bool {
        match &self.current {
            Some(open) => open.kind == kind && open.key() == data.get("id"),
            None => false,
        }
    }

    /// Open an overlay. Returns `false` (no transition) when an overlay of
    /// the same kind and record key is already open.
    pub fn show(&mut self, kind: OverlayKind, data: Value) -> bool {
        if self.is_same(kind, &data) {
            return false;
        }
        self.current = Some(OpenOverlay {
            kind,
            data,
            hidden_message_id: None,
            finalized: false,
        });
        true
    }

    /// Record the chat message hidden for this edit session.
    pub fn set_hidden_message(&mut self, message_id: String) {
        if let Some(open) = &mut self.current {
            open.hidden_message_id = Some(message_id);
        }
    }

    /// Mark the current edit session as finalized (saved).
    pub fn mark_finalized(&mut self) {
        if let Some(open) = &mut self.current {
            open.finalized = true;
        }
    }

    /// Replace the open overlay's data without a visibility transition.
    pub fn update_data(&mut self, data: Value) {
        if let Some(open) = &mut self.current {
            open.data = data;
        }
    }

    /// Close from any state. Returns what was open so the caller can apply
    /// the restore rule for reservation overlays.
    pub fn close(&mut self) -> Option<OpenOverlay> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn show_from_closed_opens() {
        let mut slot = OverlaySlot::new();
        assert!(slot.show(OverlayKind::Reservation, json!({"id": 1})));
        assert!(slot.is_open());
    }

    #[test]
    fn identical_show_is_noop() {
        let mut slot = OverlaySlot::new();
        assert!(slot.show(OverlayKind::Reservation, json!({"id": 1})));
        assert!(!slot.show(OverlayKind::Reservation, json!({"id": 1})));
    }

    #[test]
    fn different_key_transitions() {
        let mut slot = OverlaySlot::new();
        assert!(slot.show(OverlayKind::Reservation, json!({"id": 1})));
        assert!(slot.show(OverlayKind::Reservation, json!({"id": 2})));
        assert_eq!(slot.current().unwrap().data["id"], 2);
    }

    #[test]
    fn different_kind_transitions() {
        let mut slot = OverlaySlot::new();
        assert!(slot.show(OverlayKind::Reservation, json!({"id": 1})));
        assert!(slot.show(OverlayKind::Analysis, json!({"id": 1})));
    }

    #[test]
    fn new_show_resets_session_bookkeeping() {
        let mut slot = OverlaySlot::new();
        slot.show(OverlayKind::Reservation, json!({"id": 1}));
        slot.set_hidden_message("m-1".into());
        slot.mark_finalized();

        slot.show(OverlayKind::Reservation, json!({"id": 2}));
        let open = slot.current().unwrap();
        assert!(open.hidden_message_id.is_none());
        assert!(!open.finalized);
    }

    #[test]
    fn close_from_any_state() {
        let mut slot = OverlaySlot::new();
        assert!(slot.close().is_none());

        slot.show(OverlayKind::ProductSale, json!({}));
        let closed = slot.close().unwrap();
        assert_eq!(closed.kind, OverlayKind::ProductSale);
        assert!(!slot.is_open());
    }
}
