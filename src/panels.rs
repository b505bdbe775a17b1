//! Intent → panel router — a static table from semantic intent strings to
//! display-panel identifiers.
//!
//! Resolution is a pure lookup. `None` means "no panel change"; callers
//! keep the current view rather than treating it as an error.

/// Display panels the UI can switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Calendar,
    RoomStatus,
    Stock,
    Analysis,
    Pos,
    Notifications,
    Automation,
}

impl Panel {
    /// Stable identifier used in log messages and by the UI layer.
    pub fn id(&self) -> &'static str {
        match self {
            Panel::Calendar => "calendar",
            Panel::RoomStatus => "room-status",
            Panel::Stock => "stock",
            Panel::Analysis => "analysis",
            Panel::Pos => "pos",
            Panel::Notifications => "notifications",
            Panel::Automation => "automation",
        }
    }

    /// Inverse of [`Panel::id`] — used when the server names a component
    /// directly (history frames) instead of going through an intent.
    pub fn from_id(id: &str) -> Option<Panel> {
        match id.to_ascii_lowercase().as_str() {
            "calendar" => Some(Panel::Calendar),
            "room-status" => Some(Panel::RoomStatus),
            "stock" => Some(Panel::Stock),
            "analysis" => Some(Panel::Analysis),
            "pos" => Some(Panel::Pos),
            "notifications" => Some(Panel::Notifications),
            "automation" => Some(Panel::Automation),
            _ => None,
        }
    }
}

/// Resolve an intent or `show_*` action string to a panel.
///
/// Case-insensitive. Unknown intents resolve to `None` — the current view
/// is preserved.
pub fn resolve(intent: &str) -> Option<Panel> {
    match intent.to_ascii_lowercase().as_str() {
        "show_calendar" | "show_reservations" | "calendar" => Some(Panel::Calendar),
        "show_room_status" | "show_rooms" | "room_status" => Some(Panel::RoomStatus),
        "show_stock" | "stock" => Some(Panel::Stock),
        "show_analysis" | "show_price_analysis" | "analysis" => Some(Panel::Analysis),
        "show_pos" | "show_product_sale" | "pos" => Some(Panel::Pos),
        "show_notifications" | "notifications" => Some(Panel::Notifications),
        "show_automation" | "show_history" | "automation" => Some(Panel::Automation),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_intents_resolve() {
        assert_eq!(resolve("show_calendar"), Some(Panel::Calendar));
        assert_eq!(resolve("show_stock"), Some(Panel::Stock));
        assert_eq!(resolve("show_pos"), Some(Panel::Pos));
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(resolve("SHOW_CALENDAR"), Some(Panel::Calendar));
        assert_eq!(resolve("Show_Room_Status"), Some(Panel::RoomStatus));
    }

    #[test]
    fn unknown_intent_is_none() {
        assert_eq!(resolve("show_minibar"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn panel_ids_are_stable() {
        assert_eq!(Panel::Calendar.id(), "calendar");
        assert_eq!(Panel::RoomStatus.id(), "room-status");
    }

    #[test]
    fn from_id_roundtrips() {
        for p in [
            Panel::Calendar,
            Panel::RoomStatus,
            Panel::Stock,
            Panel::Analysis,
            Panel::Pos,
            Panel::Notifications,
            Panel::Automation,
        ] {
            assert_eq!(Panel::from_id(p.id()), Some(p));
        }
        assert_eq!(Panel::from_id("spa"), None);
    }
}
