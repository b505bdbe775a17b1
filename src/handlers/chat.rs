//! Chat response handler.

use tracing::debug;

use crate::model::Message;
use crate::protocol::ChatPayload;
use crate::state::ClientState;

use super::{Outcome, apply_intent};

/// Append the bot message when present; record `intent` (or a `show_*`
/// action as its fallback) as the latest intent and resolve the panel.
pub fn handle(payload: ChatPayload, state: &mut ClientState) -> Outcome {
    let mut out = Outcome::default();

    if let Some(text) = payload.message {
        let mut message = Message::bot(text);
        message.reservation = payload.reservation;
        message.options = payload.options;
        out.appended.push(state.push_message(message).id);
    }

    // `action` only counts as an intent with the show_ prefix; other action
    // values belong to the overlay coordinator, not the view router.
    let intent = payload.intent.or_else(|| {
        payload
            .action
            .filter(|a| a.to_ascii_lowercase().starts_with("show_"))
    });

    if let Some(intent) = intent {
        debug!(%intent, "chat frame carried intent");
        apply_intent(&intent, state, &mut out);
    }

    out
}
