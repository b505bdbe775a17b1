//! Client-side state containers.
//!
//! All containers are owned by a single [`ClientState`] which in turn is
//! owned by the one dispatch task (see `client::run`). The source system
//! relied on an implicit single-UI-thread guarantee for its last-write-wins
//! semantics; here the guarantee is explicit — nothing else ever holds a
//! mutable reference.

pub mod collection;
pub mod message_log;
pub mod overlay;

pub use collection::{Collection, Keyed};
pub use message_log::MessageLog;
pub use overlay::{OpenOverlay, OverlaySlot};

use serde_json::Value;

use crate::model::{Appointment, ConnectionStatus, Message, Reservation, Room};
use crate::panels::Panel;
use crate::protocol::OverlayKind;

/// Everything the dispatch loop and overlay coordinator mutate.
pub struct ClientState {
    pub log: MessageLog,
    pub reservations: Collection<Reservation>,
    pub appointments: Collection<Appointment>,
    pub rooms: Collection<Room>,
    pub overlay: OverlaySlot,
    /// Last intent seen from the server or a UI action; last-write-wins.
    pub latest_intent: Option<String>,
    /// Panel the UI currently shows; `None` until a first resolution.
    pub active_panel: Option<Panel>,
    /// Last connection status observed — the dedup memory for the status
    /// handler.
    pub last_status: Option<ConnectionStatus>,
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            log: MessageLog::new(),
            reservations: Collection::new("reservations"),
            appointments: Collection::new("appointments"),
            rooms: Collection::new("rooms"),
            overlay: OverlaySlot::new(),
            latest_intent: None,
            active_panel: None,
            last_status: None,
        }
    }

    /// Open an overlay through the full lifecycle rules: a repeat show of
    /// the same kind and record key is a no-op, and a different overlay
    /// closes the current one first — restoring its hidden message — so a
    /// displaced edit session never strands a message in the hidden table.
    pub fn show_overlay(&mut self, kind: OverlayKind, data: Value) -> bool {
        if self.overlay.is_same(kind, &data) {
            return false;
        }
        self.close_overlay();
        self.overlay.show(kind, data)
    }

    /// Close the overlay, applying the restore rule: a reservation overlay
    /// that hid a chat message restores it at the end of the log, flagged
    /// canceled unless the session was finalized first.
    ///
    /// Returns the kind that was open, if any.
    pub fn close_overlay(&mut self) -> Option<OverlayKind> {
        let closed = self.overlay.close()?;
        if closed.kind == OverlayKind::Reservation {
            if let Some(id) = &closed.hidden_message_id {
                self.log.restore(id, !closed.finalized);
            }
        }
        Some(closed.kind)
    }

    /// Append a message and return a clone of it (callers often need the id
    /// after the log takes ownership).
    pub fn push_message(&mut self, message: Message) -> Message {
        let copy = message.clone();
        self.log.append(message);
        copy
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
