//! Overlay frame handler.
//!
//! The protocol layer already split the two shapes this message type
//! carries: a view switch (no data) resolves through the intent router; an
//! overlay open goes to the visibility slot.

use tracing::debug;

use crate::protocol::OverlayFrame;
use crate::state::ClientState;

use super::{Outcome, apply_intent};

pub fn handle(frame: OverlayFrame, state: &mut ClientState) -> Outcome {
    let mut out = Outcome::default();

    match frame {
        OverlayFrame::ViewSwitch { intent } => {
            if let Some(intent) = intent {
                apply_intent(&intent, state, &mut out);
            }
        }
        OverlayFrame::Open { kind, data } => {
            // The frame may name the chat message being edited; hide it for
            // the duration of the overlay session so close() can restore it.
            let source_message = data
                .get("messageId")
                .and_then(|v| v.as_str())
                .map(str::to_string);

            if state.show_overlay(kind, data) {
                out.overlay_opened = Some(kind);
                if let Some(id) = source_message {
                    if state.log.hide(&id).is_some() {
                        state.overlay.set_hidden_message(id);
                    }
                }
            } else {
                debug!(kind = kind.as_str(), "overlay already open with same key, no-op");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::Panel;
    use crate::protocol::OverlayKind;
    use serde_json::json;

    #[test]
    fn view_switch_resolves_panel() {
        let mut state = ClientState::new();
        let out = handle(OverlayFrame::ViewSwitch { intent: Some("show_calendar".into()) }, &mut state);
        assert_eq!(out.panel, Some(Panel::Calendar));
        assert!(!state.overlay.is_open());
    }

    #[test]
    fn view_switch_without_intent_is_noop() {
        let mut state = ClientState::new();
        let out = handle(OverlayFrame::ViewSwitch { intent: None }, &mut state);
        assert_eq!(out, Outcome::default());
    }

    #[test]
    fn open_with_message_id_hides_the_source_message() {
        let mut state = ClientState::new();
        let msg = state.push_message(crate::model::Message::user("edit reservation 4"));

        handle(
            OverlayFrame::Open {
                kind: OverlayKind::Reservation,
                data: json!({"id": 4, "messageId": msg.id}),
            },
            &mut state,
        );

        assert!(state.log.is_empty());
        assert_eq!(
            state.overlay.current().unwrap().hidden_message_id.as_deref(),
            Some(msg.id.as_str())
        );
    }

    #[test]
    fn open_over_another_session_restores_its_hidden_message() {
        let mut state = ClientState::new();
        let msg = state.push_message(crate::model::Message::user("edit reservation 1"));

        handle(
            OverlayFrame::Open {
                kind: OverlayKind::Reservation,
                data: json!({"id": 1, "messageId": msg.id}),
            },
            &mut state,
        );
        assert!(state.log.is_empty());

        // A second open for a different record displaces the first session;
        // its hidden message must not be stranded.
        handle(
            OverlayFrame::Open { kind: OverlayKind::Reservation, data: json!({"id": 2}) },
            &mut state,
        );

        let restored = state.log.messages().last().unwrap();
        assert_eq!(restored.id, msg.id);
        assert!(restored.canceled);
        assert_eq!(state.overlay.current().unwrap().data["id"], 2);
    }

    #[test]
    fn open_transitions_once_for_identical_key() {
        let mut state = ClientState::new();
        let first = handle(
            OverlayFrame::Open { kind: OverlayKind::Reservation, data: json!({"id": 1}) },
            &mut state,
        );
        let second = handle(
            OverlayFrame::Open { kind: OverlayKind::Reservation, data: json!({"id": 1}) },
            &mut state,
        );

        assert_eq!(first.overlay_opened, Some(OverlayKind::Reservation));
        assert!(second.overlay_opened.is_none());
        assert!(state.overlay.is_open());
    }
}
