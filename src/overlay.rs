//! Overlay action coordinator.
//!
//! Routes user-initiated overlay actions (save, delete, finalize…) to REST
//! calls and feeds the results back into the chat log and state containers.
//! The work is split in three phases so the dispatch loop never awaits a
//! network call inline:
//!
//! 1. [`Coordinator::prepare`] — synchronous: validation, the confirmation
//!    prompt for destructive actions, the availability check. Produces a
//!    [`PendingCall`] when a REST call is needed.
//! 2. [`Coordinator::perform`] — async, touches no state; safe to run on a
//!    spawned task while the loop keeps processing frames.
//! 3. [`Coordinator::apply`] — synchronous: folds the completed
//!    [`ActionEffect`] back into the state containers.
//!
//! REST failures surface as error-kind chat messages; no retry, no rollback.
//! Unknown action names produce a visible warning message instead of an
//! error — the UI stays responsive whatever the overlay sends.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::FrontDeskApi;
use crate::error::AppError;
use crate::model::{Message, Reservation, Room, room_available};
use crate::protocol::OverlayKind;
use crate::state::ClientState;

/// Synchronous user confirmation for destructive actions.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation that always answers yes — for headless runs and tests that
/// are not about the confirmation step.
pub struct AlwaysConfirm;

impl ConfirmPrompt for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// A validated, confirmed REST call ready to run off the dispatch task.
#[derive(Debug)]
pub enum PendingCall {
    CreateReservation { data: Value },
    UpdateReservation { id: i64, data: Value, close: bool },
    DeleteReservation { id: i64 },
    CreateRoom { data: Value },
    UpdateRoom { id: i64, data: Value },
    DeleteRoom { id: i64 },
    CompleteSale { data: Value },
}

/// The completed result of a [`PendingCall`], applied back on the dispatch
/// task so all state mutation stays single-writer.
#[derive(Debug)]
pub enum ActionEffect {
    /// `close` distinguishes finalize (close the overlay, restore the hidden
    /// message uncanceled) from a mid-session save (overlay stays open).
    ReservationSaved { reservation: Reservation, close: bool },
    ReservationDeleted { id: i64 },
    RoomCreated { room: Room },
    RoomUpdated { room: Room },
    RoomDeleted { id: i64 },
    SaleCompleted,
    Failed(AppError),
}

pub struct Coordinator {
    api: Arc<dyn FrontDeskApi>,
    confirm: Box<dyn ConfirmPrompt>,
}

impl Coordinator {
    pub fn new(api: Arc<dyn FrontDeskApi>, confirm: Box<dyn ConfirmPrompt>) -> Self {
        Self { api, confirm }
    }

    /// Validate an overlay action by name and decide the REST call it needs.
    ///
    /// The action set is closed; anything else appends a warning message.
    /// Actions that complete without a network call (update_overlay_data,
    /// validation failures, declined confirmations) return `None`.
    pub fn prepare(
        &self,
        action: &str,
        data: Value,
        state: &mut ClientState,
    ) -> Option<PendingCall> {
        debug!(%action, "overlay action");
        match action.to_ascii_lowercase().as_str() {
            "finalize_reservation" => {
                if let Some(conflict) = availability_conflict(&data, state) {
                    state.log.append(Message::error(conflict));
                    return None;
                }
                Some(match data_id(&data) {
                    Some(id) => PendingCall::UpdateReservation { id, data, close: true },
                    None => PendingCall::CreateReservation { data },
                })
            }
            "update_reservation" => {
                let Some(id) = data_id(&data) else {
                    state.log.append(Message::error("Cannot update reservation without an id"));
                    return None;
                };
                if let Some(conflict) = availability_conflict(&data, state) {
                    state.log.append(Message::error(conflict));
                    return None;
                }
                Some(PendingCall::UpdateReservation { id, data, close: false })
            }
            "delete_reservation" => {
                let Some(id) = data_id(&data) else {
                    state.log.append(Message::error("Cannot delete reservation without an id"));
                    return None;
                };
                if !self.confirm.confirm(&format!("Delete reservation {id}?")) {
                    debug!(id, "delete reservation declined");
                    return None;
                }
                Some(PendingCall::DeleteReservation { id })
            }
            "add_room" => Some(PendingCall::CreateRoom { data }),
            "update_room" => {
                let Some(id) = data_id(&data) else {
                    state.log.append(Message::error("Cannot update room without an id"));
                    return None;
                };
                Some(PendingCall::UpdateRoom { id, data })
            }
            "delete_room" => {
                let Some(id) = data_id(&data) else {
                    state.log.append(Message::error("Cannot delete room without an id"));
                    return None;
                };
                if !self.confirm.confirm(&format!("Delete room {id}?")) {
                    debug!(id, "delete room declined");
                    return None;
                }
                Some(PendingCall::DeleteRoom { id })
            }
            "complete_sale" => Some(PendingCall::CompleteSale { data }),
            "update_overlay_data" => {
                state.overlay.update_data(data);
                None
            }
            other => {
                warn!(action = other, "unknown overlay action");
                state.log.append(Message::error(format!("Unknown action: {other}")));
                None
            }
        }
    }

    /// Run the REST call. No state access — safe off the dispatch task.
    pub async fn perform(&self, call: PendingCall) -> ActionEffect {
        match call {
            PendingCall::CreateReservation { data } => {
                match self.api.create_reservation(&data).await {
                    Ok(reservation) => ActionEffect::ReservationSaved { reservation, close: true },
                    Err(e) => ActionEffect::Failed(e),
                }
            }
            PendingCall::UpdateReservation { id, data, close } => {
                match self.api.update_reservation(id, &data).await {
                    Ok(reservation) => ActionEffect::ReservationSaved { reservation, close },
                    Err(e) => ActionEffect::Failed(e),
                }
            }
            PendingCall::DeleteReservation { id } => match self.api.delete_reservation(id).await {
                Ok(()) => ActionEffect::ReservationDeleted { id },
                Err(e) => ActionEffect::Failed(e),
            },
            PendingCall::CreateRoom { data } => match self.api.create_room(&data).await {
                Ok(room) => ActionEffect::RoomCreated { room },
                Err(e) => ActionEffect::Failed(e),
            },
            PendingCall::UpdateRoom { id, data } => match self.api.update_room(id, &data).await {
                Ok(room) => ActionEffect::RoomUpdated { room },
                Err(e) => ActionEffect::Failed(e),
            },
            PendingCall::DeleteRoom { id } => match self.api.delete_room(id).await {
                Ok(()) => ActionEffect::RoomDeleted { id },
                Err(e) => ActionEffect::Failed(e),
            },
            PendingCall::CompleteSale { data } => match self.api.complete_sale(&data).await {
                Ok(_) => ActionEffect::SaleCompleted,
                Err(e) => ActionEffect::Failed(e),
            },
        }
    }

    /// Fold a completed effect back into state.
    pub fn apply(&self, effect: ActionEffect, state: &mut ClientState) {
        match effect {
            ActionEffect::ReservationSaved { reservation, close: true } => {
                let guest = reservation.guest_name.clone().unwrap_or_else(|| "guest".into());
                state.reservations.upsert(reservation);
                state.log.append(Message::system(format!("Reservation saved for {guest}")));
                // Finalized before the close so the restore rule sees it.
                state.overlay.mark_finalized();
                state.close_overlay();
            }
            ActionEffect::ReservationSaved { reservation, close: false } => {
                let snapshot = serde_json::to_value(&reservation).unwrap_or(Value::Null);
                state.reservations.upsert(reservation);
                state.overlay.update_data(snapshot);
                state.log.append(Message::system("Reservation updated"));
            }
            ActionEffect::ReservationDeleted { id } => {
                state.reservations.remove(id);
                // The delete flow also removes the chat message the overlay
                // was editing — it is gone, not restored.
                if let Some(open) = state.overlay.current() {
                    if open.kind == OverlayKind::Reservation {
                        if let Some(msg_id) = open.hidden_message_id.clone() {
                            state.log.remove(&msg_id);
                        }
                    }
                }
                state.close_overlay();
                state.log.append(Message::system(format!("Reservation {id} deleted")));
            }
            ActionEffect::RoomCreated { room } => {
                let number = room.number.clone().unwrap_or_else(|| room.id.to_string());
                state.rooms.upsert(room);
                state.log.append(Message::system(format!("Room {number} added")));
            }
            ActionEffect::RoomUpdated { room } => {
                state.rooms.upsert(room);
                state.log.append(Message::system("Room updated"));
            }
            ActionEffect::RoomDeleted { id } => {
                state.rooms.remove(id);
                state.log.append(Message::system(format!("Room {id} deleted")));
            }
            ActionEffect::SaleCompleted => {
                state.log.append(Message::system("Sale completed"));
                state.close_overlay();
            }
            ActionEffect::Failed(error) => {
                warn!(%error, "overlay action failed");
                state.log.append(Message::error(error.to_string()));
            }
        }
    }

    /// All three phases in sequence. Convenient where blocking on the REST
    /// call is fine; the dispatch loop runs the phases separately instead.
    pub async fn dispatch(&self, action: &str, data: Value, state: &mut ClientState) {
        if let Some(call) = self.prepare(action, data, state) {
            let effect = self.perform(call).await;
            self.apply(effect, state);
        }
    }
}

/// Pull a numeric id out of an overlay payload.
fn data_id(data: &Value) -> Option<i64> {
    data.get("id").and_then(Value::as_i64)
}

/// Advisory double-booking check against the local reservations collection.
/// Returns a user-facing conflict description, or `None` when every booked
/// room is free for its dates. Entries the form has not filled in yet
/// (missing room number or dates) cannot conflict and are skipped.
fn availability_conflict(data: &Value, state: &ClientState) -> Option<String> {
    let rooms = data.get("rooms")?.as_array()?;
    let exclude = data_id(data);

    for room in rooms {
        let Some(number) = room.get("roomNumber").and_then(Value::as_str) else {
            continue;
        };
        let Some(start) = room
            .get("startDate")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<chrono::NaiveDate>().ok())
        else {
            continue;
        };
        let Some(end) = room
            .get("endDate")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<chrono::NaiveDate>().ok())
        else {
            continue;
        };
        if !room_available(state.reservations.items(), number, start, end, exclude) {
            return Some(format!("Room {number} is already booked for those dates"));
        }
    }
    None
}
