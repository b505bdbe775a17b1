//! History handler — automation/run history pushed by the server.

use tracing::debug;

use crate::model::{Message, MessageKind};
use crate::panels::Panel;
use crate::protocol::HistoryPayload;
use crate::state::ClientState;

use super::Outcome;

/// Append a history-kind message. The structured shape may additionally set
/// the active display component directly (no intent lookup).
pub fn handle(payload: HistoryPayload, state: &mut ClientState) -> Outcome {
    let mut out = Outcome::default();

    match payload {
        HistoryPayload::Plain { message } => {
            out.appended
                .push(state.push_message(Message::new(MessageKind::History, message)).id);
        }
        HistoryPayload::Structured { title, items, data, component } => {
            let mut message =
                Message::new(MessageKind::History, title.unwrap_or_else(|| "History".into()));
            if !items.is_empty() {
                message.options = Some(items);
            }
            if data.is_some() {
                // The data blob is for the target panel, not the chat log.
                debug!("history frame carried panel data");
            }
            out.appended.push(state.push_message(message).id);

            if let Some(component) = component {
                if let Some(panel) = Panel::from_id(&component) {
                    state.active_panel = Some(panel);
                    out.panel = Some(panel);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_shape_appends_history_message() {
        let mut state = ClientState::new();
        let out = handle(HistoryPayload::Plain { message: "3 emails processed".into() }, &mut state);
        assert_eq!(out.appended.len(), 1);
        assert_eq!(state.log.messages()[0].kind, MessageKind::History);
        assert_eq!(state.log.messages()[0].text, "3 emails processed");
    }

    #[test]
    fn structured_shape_sets_panel_directly() {
        let mut state = ClientState::new();
        let out = handle(
            HistoryPayload::Structured {
                title: Some("Today's runs".into()),
                items: vec!["booking email check".into(), "whatsapp check".into()],
                data: None,
                component: Some("automation".into()),
            },
            &mut state,
        );

        assert_eq!(out.panel, Some(Panel::Automation));
        assert_eq!(state.active_panel, Some(Panel::Automation));
        let msg = &state.log.messages()[0];
        assert_eq!(msg.text, "Today's runs");
        assert_eq!(msg.options.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn structured_shape_without_component_keeps_view() {
        let mut state = ClientState::new();
        let out = handle(
            HistoryPayload::Structured {
                title: None,
                items: vec![],
                data: None,
                component: None,
            },
            &mut state,
        );
        assert!(out.panel.is_none());
        assert_eq!(state.log.messages()[0].text, "History");
        assert!(state.log.messages()[0].options.is_none());
    }

    #[test]
    fn unknown_component_keeps_view() {
        let mut state = ClientState::new();
        let out = handle(
            HistoryPayload::Structured {
                title: None,
                items: vec![],
                data: None,
                component: Some("spa".into()),
            },
            &mut state,
        );
        assert!(out.panel.is_none());
        assert!(state.active_panel.is_none());
    }
}
