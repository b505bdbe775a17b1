//! Connection status handler.
//!
//! Consecutive identical statuses are deduplicated against
//! `ClientState::last_status` so a chatty transport can't flood the log.
//! Only real `connected`/`disconnected` transitions produce a system
//! message; `connecting` is tracked silently.

use tracing::info;

use crate::model::{ConnectionStatus, Message};
use crate::state::ClientState;

use super::Outcome;

pub fn handle(status: ConnectionStatus, state: &mut ClientState) -> Outcome {
    let mut out = Outcome::default();

    if state.last_status == Some(status) {
        return out;
    }
    state.last_status = Some(status);
    info!(%status, "connection status changed");

    match status {
        ConnectionStatus::Connected => {
            out.appended
                .push(state.push_message(Message::system("Connected to server")).id);
        }
        ConnectionStatus::Disconnected => {
            out.appended
                .push(state.push_message(Message::system("Disconnected from server")).id);
        }
        ConnectionStatus::Connecting => {}
    }

    out
}
