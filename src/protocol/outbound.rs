//! Outbound frame builders — the three frame kinds the client ever sends.

use serde_json::{Value, json};

/// Server-side automation jobs the client can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationAction {
    BookingEmailCheck,
    WhatsappCheck,
    PriceAnalysis,
}

impl AutomationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationAction::BookingEmailCheck => "booking_email_check",
            AutomationAction::WhatsappCheck => "whatsapp_check",
            AutomationAction::PriceAnalysis => "price_analysis",
        }
    }
}

/// An outbound frame ready for serialization.
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    /// User chat input.
    ChatMessage { content: String },
    /// Trigger a server-side automation job.
    Automation(AutomationAction),
    /// Propose a reservation mutation to the server.
    ReservationAction { action: String, data: Value },
}

impl OutboundFrame {
    /// Serialize to the wire JSON shape.
    pub fn to_json(&self) -> Value {
        match self {
            OutboundFrame::ChatMessage { content } => json!({
                "type": "send_message",
                "payload": { "type": "CHAT_MESSAGE", "content": content },
            }),
            OutboundFrame::Automation(action) => json!({
                "type": "automation_action",
                "payload": action.as_str(),
            }),
            OutboundFrame::ReservationAction { action, data } => json!({
                "type": "reservation_action",
                "payload": { "action": action, "data": data },
            }),
        }
    }

    pub fn to_text(&self) -> String {
        self.to_json().to_string()
    }
}
