//! Inbound frame parsing — raw JSON text to a tagged union.
//!
//! Two protocol generations are in the wild: an early lowercase one
//! (`chat_response`, `reservations_update`, `status`) and a later
//! upper-snake one (`OVERLAY`, `APPOINTMENTS`, `HISTORY`). Normalization is
//! case-insensitive and alias-tolerant; unknown type strings fall open to
//! [`CanonicalType::Chat`] so a newer server never renders the client mute.
//!
//! Malformed payloads never escape this module as errors — they become
//! [`InboundFrame::Unparseable`], which the dispatch loop logs and drops.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{Appointment, ConnectionStatus, Reservation};

// ── Canonical type ───────────────────────────────────────────────────────────

/// The small closed set of message types the client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalType {
    Chat,
    Reservations,
    Appointments,
    Notification,
    History,
    Status,
    Overlay,
}

impl CanonicalType {
    /// Map a raw `type` string to its canonical type.
    ///
    /// Case-insensitive; recognizes every alias both protocol generations
    /// ever used. Unknown strings map to `Chat` — fail-open by policy.
    pub fn normalize(raw: &str) -> CanonicalType {
        match raw.to_ascii_lowercase().as_str() {
            "chat" | "chat_message" | "chat_response" | "message" => CanonicalType::Chat,
            "reservations" | "reservations_update" | "reservation_update" => {
                CanonicalType::Reservations
            }
            "appointments" | "appointments_update" => CanonicalType::Appointments,
            "notification" => CanonicalType::Notification,
            "history" | "chat_history" => CanonicalType::History,
            "status" | "connection_status" => CanonicalType::Status,
            "overlay" | "show_overlay" => CanonicalType::Overlay,
            _ => CanonicalType::Chat,
        }
    }
}

// ── Payload shapes ───────────────────────────────────────────────────────────

/// Chat response payload. Every field optional; a frame carrying none of
/// them is still valid (it just produces no effects).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub reservation: Option<Reservation>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Merge strategy carried on a collection update frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionAction {
    /// Replace the whole collection (`init`, and its synonym `sync`).
    Replace,
    /// Append the payload items.
    Create,
    /// Merge each item by id; insert-with-warning when the id is unknown.
    Update,
    /// Remove every id present in the payload.
    Delete,
}

impl CollectionAction {
    fn parse(raw: &str) -> Option<CollectionAction> {
        match raw.to_ascii_lowercase().as_str() {
            "init" | "sync" => Some(CollectionAction::Replace),
            "create" => Some(CollectionAction::Create),
            "update" => Some(CollectionAction::Update),
            "delete" => Some(CollectionAction::Delete),
            _ => None,
        }
    }
}

/// A validated collection update (reservations or appointments).
#[derive(Debug, Clone)]
pub struct CollectionUpdate<T> {
    pub action: CollectionAction,
    pub items: Vec<T>,
}

/// Notification payload — message required, optional `show_*` action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub message: String,
    #[serde(default)]
    pub action: Option<String>,
}

/// History payload — either a structured block or a bare message.
#[derive(Debug, Clone)]
pub enum HistoryPayload {
    Structured {
        title: Option<String>,
        items: Vec<String>,
        data: Option<Value>,
        component: Option<String>,
    },
    Plain {
        message: String,
    },
}

/// Overlay frame — shape discrimination happens here, once.
///
/// The server reuses one message type for two things: switching the visible
/// panel (no data payload) and opening an editing overlay (data payload
/// present). Handlers see the decision, not the shape.
#[derive(Debug, Clone)]
pub enum OverlayFrame {
    ViewSwitch { intent: Option<String> },
    Open { kind: OverlayKind, data: Value },
}

/// The closed set of overlays the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Reservation,
    Notification,
    Analysis,
    RoomManagement,
    ProductSale,
}

impl OverlayKind {
    /// Parse an intent/action string (`show_` prefix tolerated, both `_`
    /// and `-` separators seen in the wild).
    pub fn parse(raw: &str) -> Option<OverlayKind> {
        let s = raw.to_ascii_lowercase();
        let s = s.strip_prefix("show_").unwrap_or(&s);
        match s.replace('-', "_").as_str() {
            "reservation" | "reservation_overlay" => Some(OverlayKind::Reservation),
            "notification" => Some(OverlayKind::Notification),
            "analysis" | "price_analysis" => Some(OverlayKind::Analysis),
            "room_management" => Some(OverlayKind::RoomManagement),
            "product_sale" | "pos" => Some(OverlayKind::ProductSale),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayKind::Reservation => "reservation",
            OverlayKind::Notification => "notification",
            OverlayKind::Analysis => "analysis",
            OverlayKind::RoomManagement => "room-management",
            OverlayKind::ProductSale => "product-sale",
        }
    }
}

// ── Frame union ──────────────────────────────────────────────────────────────

/// A fully validated inbound frame. One variant per canonical type plus the
/// explicit unparseable fallback.
#[derive(Debug, Clone)]
pub enum InboundFrame {
    Chat(ChatPayload),
    Reservations(CollectionUpdate<Reservation>),
    Appointments(CollectionUpdate<Appointment>),
    Notification(NotificationPayload),
    History(HistoryPayload),
    Status(ConnectionStatus),
    Overlay(OverlayFrame),
    Unparseable { reason: String },
}

/// Raw envelope: `{"type": "...", "payload": ...}`.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    payload: Option<Value>,
}

impl InboundFrame {
    /// Parse raw frame text. Infallible by design: anything that cannot be
    /// validated becomes [`InboundFrame::Unparseable`].
    pub fn parse(raw: &str) -> InboundFrame {
        let frame: RawFrame = match serde_json::from_str(raw) {
            Ok(f) => f,
            Err(e) => {
                return InboundFrame::Unparseable { reason: format!("invalid json: {e}") };
            }
        };

        let Some(kind) = frame.kind else {
            return InboundFrame::Unparseable { reason: "missing type field".into() };
        };

        match CanonicalType::normalize(&kind) {
            CanonicalType::Chat => parse_chat(frame.payload),
            CanonicalType::Reservations => {
                parse_collection(frame.payload, "reservations", InboundFrame::Reservations)
            }
            CanonicalType::Appointments => {
                parse_collection(frame.payload, "appointments", InboundFrame::Appointments)
            }
            CanonicalType::Notification => parse_notification(frame.payload),
            CanonicalType::History => parse_history(frame.payload),
            CanonicalType::Status => parse_status(frame.payload),
            CanonicalType::Overlay => parse_overlay(frame.payload),
        }
    }
}

fn unparseable(reason: impl Into<String>) -> InboundFrame {
    InboundFrame::Unparseable { reason: reason.into() }
}

fn parse_chat(payload: Option<Value>) -> InboundFrame {
    let Some(payload) = payload else {
        return unparseable("chat frame without payload");
    };
    match serde_json::from_value::<ChatPayload>(payload) {
        Ok(p) => InboundFrame::Chat(p),
        Err(e) => unparseable(format!("chat payload: {e}")),
    }
}

/// Collection payloads come in two shapes: a bare array (implicit replace)
/// or `{"action": "...", "<field>": [...]}`.
fn parse_collection<T: serde::de::DeserializeOwned>(
    payload: Option<Value>,
    field: &str,
    wrap: impl FnOnce(CollectionUpdate<T>) -> InboundFrame,
) -> InboundFrame {
    let Some(payload) = payload else {
        return unparseable(format!("{field} frame without payload"));
    };

    let (action, items_value) = match payload {
        Value::Array(_) => (CollectionAction::Replace, payload),
        Value::Object(mut map) => {
            let action = match map.get("action").and_then(Value::as_str) {
                None => CollectionAction::Replace,
                Some(raw) => match CollectionAction::parse(raw) {
                    Some(a) => a,
                    None => return unparseable(format!("unknown {field} action: {raw}")),
                },
            };
            let items = map
                .remove(field)
                .or_else(|| map.remove("items"))
                .unwrap_or(Value::Array(Vec::new()));
            (action, items)
        }
        other => {
            return unparseable(format!("{field} payload must be array or object, got {other}"));
        }
    };

    match serde_json::from_value::<Vec<T>>(items_value) {
        Ok(items) => wrap(CollectionUpdate { action, items }),
        Err(e) => unparseable(format!("{field} items: {e}")),
    }
}

fn parse_notification(payload: Option<Value>) -> InboundFrame {
    let Some(payload) = payload else {
        return unparseable("notification frame without payload");
    };
    match serde_json::from_value::<NotificationPayload>(payload) {
        Ok(p) => InboundFrame::Notification(p),
        Err(e) => unparseable(format!("notification payload: {e}")),
    }
}

fn parse_history(payload: Option<Value>) -> InboundFrame {
    #[derive(Deserialize)]
    struct StructuredHistory {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        items: Vec<String>,
        #[serde(default)]
        data: Option<Value>,
        #[serde(default)]
        component: Option<String>,
    }

    let Some(payload) = payload else {
        return unparseable("history frame without payload");
    };

    if let Some(history) = payload.get("history") {
        return match serde_json::from_value::<StructuredHistory>(history.clone()) {
            Ok(h) => InboundFrame::History(HistoryPayload::Structured {
                title: h.title,
                items: h.items,
                data: h.data,
                component: h.component,
            }),
            Err(e) => unparseable(format!("history block: {e}")),
        };
    }

    match payload.get("message").and_then(Value::as_str) {
        Some(message) => {
            InboundFrame::History(HistoryPayload::Plain { message: message.to_string() })
        }
        None => unparseable("history frame with neither history block nor message"),
    }
}

/// Status payloads are either a bare string or `{"status": "..."}`.
fn parse_status(payload: Option<Value>) -> InboundFrame {
    let Some(payload) = payload else {
        return unparseable("status frame without payload");
    };

    let raw = match &payload {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("status").and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => return unparseable("status payload missing status field"),
        },
        other => return unparseable(format!("status payload: {other}")),
    };

    match raw.to_ascii_lowercase().as_str() {
        "connecting" => InboundFrame::Status(ConnectionStatus::Connecting),
        "connected" => InboundFrame::Status(ConnectionStatus::Connected),
        "disconnected" => InboundFrame::Status(ConnectionStatus::Disconnected),
        other => unparseable(format!("unknown status: {other}")),
    }
}

fn parse_overlay(payload: Option<Value>) -> InboundFrame {
    #[derive(Deserialize)]
    struct OverlayPayload {
        #[serde(default)]
        intent: Option<String>,
        #[serde(default)]
        action: Option<String>,
        #[serde(default)]
        data: Option<Value>,
    }

    // No payload at all: a view switch with nothing to resolve — handlers
    // treat it as "keep current view".
    let Some(payload) = payload else {
        return InboundFrame::Overlay(OverlayFrame::ViewSwitch { intent: None });
    };

    let p: OverlayPayload = match serde_json::from_value(payload) {
        Ok(p) => p,
        Err(e) => return unparseable(format!("overlay payload: {e}")),
    };

    // Prefer intent over action when both are present.
    let intent = p.intent.or(p.action);

    match p.data {
        None => InboundFrame::Overlay(OverlayFrame::ViewSwitch { intent }),
        Some(data) => {
            let Some(raw) = intent else {
                return unparseable("overlay open without intent or action");
            };
            match OverlayKind::parse(&raw) {
                Some(kind) => InboundFrame::Overlay(OverlayFrame::Open { kind, data }),
                None => unparseable(format!("unknown overlay kind: {raw}")),
            }
        }
    }
}
