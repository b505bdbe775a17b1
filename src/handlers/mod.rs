//! Per-type frame handlers.
//!
//! Each handler takes a validated payload and the mutable [`ClientState`],
//! applies its state changes, and returns an [`Outcome`] describing the UI
//! side effects it derived (panel switch, overlay transition, appended
//! messages). Handlers never panic and never touch raw JSON — the protocol
//! layer already validated everything.
//!
//! The source system swallowed all handler failures into console logs; here
//! they are a structured [`HandlerError`] so the dispatch loop (and tests)
//! can observe them. The loop still treats every error as recoverable.

mod chat;
mod collections;
mod history;
mod notification;
mod overlay;
mod status;

use thiserror::Error;

use crate::panels::Panel;
use crate::protocol::{InboundFrame, OverlayKind};
use crate::state::ClientState;

/// A recoverable per-frame failure. Dispatch logs it and moves on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("unparseable frame: {0}")]
    Unparseable(String),
}

/// UI side effects derived by a handler.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    /// Ids of messages appended to the chat log, in order.
    pub appended: Vec<String>,
    /// Panel the UI should switch to, when a handler resolved one.
    pub panel: Option<Panel>,
    /// Overlay kind opened by this frame, when a transition happened.
    pub overlay_opened: Option<OverlayKind>,
}

/// Route a validated frame to its handler.
pub fn handle_frame(
    frame: InboundFrame,
    state: &mut ClientState,
) -> Result<Outcome, HandlerError> {
    match frame {
        InboundFrame::Chat(payload) => Ok(chat::handle(payload, state)),
        InboundFrame::Reservations(update) => Ok(collections::handle_reservations(update, state)),
        InboundFrame::Appointments(update) => Ok(collections::handle_appointments(update, state)),
        InboundFrame::Notification(payload) => Ok(notification::handle(payload, state)),
        InboundFrame::History(payload) => Ok(history::handle(payload, state)),
        InboundFrame::Status(status) => Ok(status::handle(status, state)),
        InboundFrame::Overlay(frame) => Ok(overlay::handle(frame, state)),
        InboundFrame::Unparseable { reason } => Err(HandlerError::Unparseable(reason)),
    }
}

/// Record `intent` as the latest intent and resolve it to a panel.
///
/// Shared by the chat, notification and overlay handlers — the lowercased
/// intent is stored even when it resolves to no panel, matching
/// last-write-wins semantics for `latest_intent`.
pub(crate) fn apply_intent(intent: &str, state: &mut ClientState, out: &mut Outcome) {
    let intent = intent.to_ascii_lowercase();
    state.latest_intent = Some(intent.clone());
    if let Some(panel) = crate::panels::resolve(&intent) {
        state.active_panel = Some(panel);
        out.panel = Some(panel);
    }
}
