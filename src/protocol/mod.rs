//! Wire protocol — inbound frame normalization and outbound frame builders.
//!
//! The server speaks loosely-typed JSON with case-insensitive, historically
//! aliased `type` strings. Everything shape-dependent is decided exactly once
//! here: handlers downstream receive a closed set of validated variants (with
//! a single explicit [`inbound::InboundFrame::Unparseable`] fallback) and
//! never re-inspect raw JSON.

pub mod inbound;
pub mod outbound;

pub use inbound::{
    CanonicalType, ChatPayload, CollectionAction, CollectionUpdate, HistoryPayload,
    InboundFrame, NotificationPayload, OverlayFrame, OverlayKind,
};
pub use outbound::{AutomationAction, OutboundFrame};
