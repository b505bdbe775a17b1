//! Reservations and appointments update handlers.
//!
//! Both collections share the merge engine in `state::collection`; the
//! handlers just route the validated update to the right container.

use tracing::debug;

use crate::model::{Appointment, Reservation};
use crate::protocol::CollectionUpdate;
use crate::state::ClientState;

use super::Outcome;

pub fn handle_reservations(
    update: CollectionUpdate<Reservation>,
    state: &mut ClientState,
) -> Outcome {
    debug!(action = ?update.action, count = update.items.len(), "reservations update");
    state.reservations.apply(update);
    Outcome::default()
}

pub fn handle_appointments(
    update: CollectionUpdate<Appointment>,
    state: &mut ClientState,
) -> Outcome {
    debug!(action = ?update.action, count = update.items.len(), "appointments update");
    state.appointments.apply(update);
    Outcome::default()
}
