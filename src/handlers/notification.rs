//! Notification handler.

use crate::model::Message;
use crate::protocol::NotificationPayload;
use crate::state::ClientState;

use super::{Outcome, apply_intent};

/// Append a notification message; a `show_*` action on the payload is
/// treated exactly like an intent.
pub fn handle(payload: NotificationPayload, state: &mut ClientState) -> Outcome {
    let mut out = Outcome::default();
    out.appended
        .push(state.push_message(Message::notification(payload.message)).id);

    if let Some(action) = payload.action {
        if action.to_ascii_lowercase().starts_with("show_") {
            apply_intent(&action, state, &mut out);
        }
    }

    out
}
