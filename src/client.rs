//! Client run loop — the single owner of all state containers.
//!
//! Mirrors the supervisor pattern: one task selects over transport events,
//! user commands and completed overlay REST calls, routes each to the
//! matching handler, and is the only code that ever holds
//! `&mut ClientState`. Handlers run synchronously on receipt; overlay REST
//! calls are spawned off-task and come back as [`ActionEffect`] events, so
//! the loop stays responsive while a call is in flight.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handlers;
use crate::model::Message;
use crate::overlay::{ActionEffect, Coordinator};
use crate::protocol::{AutomationAction, InboundFrame, OutboundFrame};
use crate::state::ClientState;
use crate::transport::{TransportEvent, TransportHandle};

/// User-initiated commands fed into the run loop.
#[derive(Debug)]
pub enum ClientCommand {
    /// Chat input from the user.
    SendChat { text: String },
    /// Trigger a server-side automation job.
    Automation(AutomationAction),
    /// Propose a reservation mutation to the server over the socket.
    ReservationAction { action: String, data: Value },
    /// An overlay action (save/delete/finalize…) with its payload.
    OverlayAction { action: String, data: Value },
    /// Close the overlay, applying the restore rule.
    CloseOverlay,
}

/// Cloneable command-side handle for UI code.
#[derive(Clone)]
pub struct ClientHandle {
    tx: mpsc::Sender<ClientCommand>,
}

impl ClientHandle {
    pub fn new(tx: mpsc::Sender<ClientCommand>) -> Self {
        Self { tx }
    }

    pub async fn send_chat(&self, text: impl Into<String>) -> bool {
        self.tx.send(ClientCommand::SendChat { text: text.into() }).await.is_ok()
    }

    pub async fn automation(&self, action: AutomationAction) -> bool {
        self.tx.send(ClientCommand::Automation(action)).await.is_ok()
    }

    pub async fn reservation_action(&self, action: impl Into<String>, data: Value) -> bool {
        self.tx
            .send(ClientCommand::ReservationAction { action: action.into(), data })
            .await
            .is_ok()
    }

    pub async fn overlay_action(&self, action: impl Into<String>, data: Value) -> bool {
        self.tx
            .send(ClientCommand::OverlayAction { action: action.into(), data })
            .await
            .is_ok()
    }

    pub async fn close_overlay(&self) -> bool {
        self.tx.send(ClientCommand::CloseOverlay).await.is_ok()
    }
}

/// Run the dispatch loop until `shutdown` is cancelled or both input
/// channels close. Returns the final state (tests inspect it).
pub async fn run(
    mut state: ClientState,
    mut events: mpsc::Receiver<TransportEvent>,
    mut commands: mpsc::Receiver<ClientCommand>,
    transport: TransportHandle,
    coordinator: Arc<Coordinator>,
    shutdown: CancellationToken,
) -> ClientState {
    info!("client dispatch loop ready");

    // Completed overlay REST calls come back through this channel. The loop
    // keeps a sender alive for its whole lifetime so recv never closes.
    let (effect_tx, mut effects) = mpsc::channel::<ActionEffect>(16);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("dispatch loop shutting down");
                break;
            }

            Some(effect) = effects.recv() => {
                coordinator.apply(effect, &mut state);
            }

            event = events.recv() => {
                match event {
                    Some(TransportEvent::Frame(raw)) => {
                        handle_raw_frame(&raw, &mut state);
                    }
                    Some(TransportEvent::Status(status)) => {
                        let _ = handlers::handle_frame(InboundFrame::Status(status), &mut state);
                    }
                    None => {
                        info!("transport events closed, dispatch loop exiting");
                        break;
                    }
                }
            }

            command = commands.recv() => {
                match command {
                    Some(cmd) => {
                        handle_command(cmd, &mut state, &transport, &coordinator, &effect_tx);
                    }
                    None => {
                        info!("command channel closed, dispatch loop exiting");
                        break;
                    }
                }
            }
        }
    }

    state
}

fn handle_raw_frame(raw: &str, state: &mut ClientState) {
    let frame = InboundFrame::parse(raw);
    match handlers::handle_frame(frame, state) {
        Ok(outcome) => {
            if let Some(panel) = outcome.panel {
                debug!(panel = panel.id(), "panel switch");
            }
        }
        // Recoverable by policy: log and keep the loop alive.
        Err(e) => warn!(%e, "frame dropped"),
    }
}

fn handle_command(
    command: ClientCommand,
    state: &mut ClientState,
    transport: &TransportHandle,
    coordinator: &Arc<Coordinator>,
    effect_tx: &mpsc::Sender<ActionEffect>,
) {
    match command {
        ClientCommand::SendChat { text } => {
            state.log.append(Message::user(text.clone()));
            if !transport.send(&OutboundFrame::ChatMessage { content: text }) {
                state.log.append(Message::error("Not connected — message not sent"));
            }
        }
        ClientCommand::Automation(action) => {
            if !transport.send(&OutboundFrame::Automation(action)) {
                state.log.append(Message::error("Not connected — automation not triggered"));
            }
        }
        ClientCommand::ReservationAction { action, data } => {
            if !transport.send(&OutboundFrame::ReservationAction { action, data }) {
                state.log.append(Message::error("Not connected — action not sent"));
            }
        }
        ClientCommand::OverlayAction { action, data } => {
            // Validation and confirmation run here, synchronously; only the
            // REST call itself leaves the dispatch task.
            if let Some(call) = coordinator.prepare(&action, data, state) {
                let coordinator = coordinator.clone();
                let effect_tx = effect_tx.clone();
                tokio::spawn(async move {
                    let effect = coordinator.perform(call).await;
                    let _ = effect_tx.send(effect).await;
                });
            }
        }
        ClientCommand::CloseOverlay => {
            state.close_overlay();
        }
    }
}
