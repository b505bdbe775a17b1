//! Domain types shared across handlers, state containers and the overlay
//! coordinator.
//!
//! Wire payloads arrive loosely typed (camelCase JSON with most fields
//! optional), so the reservation/appointment/room records keep `Option`
//! fields and merge patch-style: an incoming record overrides only the
//! fields it actually carries. This is the typed equivalent of the object
//! spread the server protocol was designed around.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Chat log ─────────────────────────────────────────────────────────────────

/// Classification of a chat-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Bot,
    Error,
    System,
    Notification,
    History,
}

/// A single chat-log entry.
///
/// `id` is the removal/restoration key and must be unique within the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub kind: MessageKind,
    /// ISO-8601 creation time.
    pub timestamp: String,
    /// Reservation the message refers to, when the server attached one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<Reservation>,
    /// Quick-reply options linked to this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Set when the message was restored after a canceled overlay edit.
    #[serde(default)]
    pub canceled: bool,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            kind,
            timestamp: Utc::now().to_rfc3339(),
            reservation: None,
            options: None,
            canceled: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageKind::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Bot, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageKind::System, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, text)
    }

    pub fn notification(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Notification, text)
    }

    pub fn with_reservation(mut self, reservation: Reservation) -> Self {
        self.reservation = Some(reservation);
        self
    }
}

// ── Reservations ─────────────────────────────────────────────────────────────

/// Payment bookkeeping flags on a reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFlags {
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub has_invoice: bool,
    #[serde(default)]
    pub has_receipt: bool,
}

/// Lifecycle state of a single room booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

/// One room × date-range line inside a reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBooking {
    pub room_number: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "type", default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
}

impl RoomBooking {
    /// True if `self` and `other` book the same room on intersecting dates.
    /// Ranges are half-open: `[start, end)` — checkout day does not collide
    /// with the next check-in.
    pub fn overlaps(&self, other: &RoomBooking) -> bool {
        self.room_number == other.room_number
            && self.start_date < other.end_date
            && other.start_date < self.end_date
    }
}

/// A guest reservation. All fields except `id` are optional on the wire;
/// [`Reservation::merge_from`] implements the union-with-new-wins rule
/// the update action relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment: PaymentFlags,
    #[serde(default)]
    pub rooms: Vec<RoomBooking>,
}

impl Reservation {
    /// Field-wise merge: fields present on `patch` override, absent fields
    /// keep their current value. `rooms` is replaced wholesale when the
    /// patch carries any.
    pub fn merge_from(&mut self, patch: Reservation) {
        if patch.guest_name.is_some() {
            self.guest_name = patch.guest_name;
        }
        if patch.phone.is_some() {
            self.phone = patch.phone;
        }
        if patch.email.is_some() {
            self.email = patch.email;
        }
        if patch.notes.is_some() {
            self.notes = patch.notes;
        }
        if patch.payment != PaymentFlags::default() {
            self.payment = patch.payment;
        }
        if !patch.rooms.is_empty() {
            self.rooms = patch.rooms;
        }
    }
}

/// Advisory availability check: true when no booking in `reservations`
/// (other than `exclude_id`, the reservation being edited) occupies
/// `room_number` on a date intersecting `[start, end)`.
///
/// This is a pre-mutation predicate, not a transactional guarantee.
pub fn room_available(
    reservations: &[Reservation],
    room_number: &str,
    start: NaiveDate,
    end: NaiveDate,
    exclude_id: Option<i64>,
) -> bool {
    let candidate = RoomBooking {
        room_number: room_number.to_string(),
        start_date: start,
        end_date: end,
        price: 0.0,
        room_type: None,
        status: BookingStatus::Pending,
    };
    !reservations
        .iter()
        .filter(|r| Some(r.id) != exclude_id)
        .flat_map(|r| r.rooms.iter())
        .filter(|b| b.status != BookingStatus::Cancelled)
        .any(|b| b.overlaps(&candidate))
}

// ── Appointments ─────────────────────────────────────────────────────────────

/// A scheduled appointment (spa, transfer, table booking…). Kept in its own
/// collection with the same keyed-merge rules as reservations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Appointment {
    pub fn merge_from(&mut self, patch: Appointment) {
        if patch.title.is_some() {
            self.title = patch.title;
        }
        if patch.guest_name.is_some() {
            self.guest_name = patch.guest_name;
        }
        if patch.date.is_some() {
            self.date = patch.date;
        }
        if patch.time.is_some() {
            self.time = patch.time;
        }
        if patch.notes.is_some() {
            self.notes = patch.notes;
        }
    }
}

// ── Rooms ────────────────────────────────────────────────────────────────────

/// A physical room as managed from the room-management overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(rename = "type", default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Room {
    pub fn merge_from(&mut self, patch: Room) {
        if patch.number.is_some() {
            self.number = patch.number;
        }
        if patch.room_type.is_some() {
            self.room_type = patch.room_type;
        }
        if patch.price.is_some() {
            self.price = patch.price;
        }
        if patch.status.is_some() {
            self.status = patch.status;
        }
    }
}

// ── Connection status ────────────────────────────────────────────────────────

/// Socket connection state surfaced to the chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}
