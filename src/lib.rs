//! Front-desk client core.
//!
//! The message routing and state layer behind a chat-driven hotel
//! front-desk UI: a background socket worker delivers loosely-typed server
//! frames; a normalizer turns them into a closed set of validated variants;
//! per-type handlers mutate the state containers (chat log, reservations,
//! appointments, rooms, overlay slot) and derive UI directives through a
//! static intent → panel router. User-initiated overlay actions go through
//! a coordinator that calls REST endpoints and feeds results back into the
//! same containers.
//!
//! All mutation happens in one dispatch task (`client::run`); the transport
//! worker communicates with it purely by message passing.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logger;
pub mod model;
pub mod overlay;
pub mod panels;
pub mod protocol;
pub mod state;
pub mod transport;
