//! End-to-end dispatch scenarios: raw frames through the normalizer and
//! handlers into client state.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use frontdesk_client::client::{self, ClientCommand};
use frontdesk_client::handlers::handle_frame;
use frontdesk_client::model::{ConnectionStatus, MessageKind, Reservation};
use frontdesk_client::overlay::{AlwaysConfirm, Coordinator};
use frontdesk_client::panels::Panel;
use frontdesk_client::protocol::InboundFrame;
use frontdesk_client::state::ClientState;
use frontdesk_client::transport::{Connection, Connector, Transport, TransportEvent};

use frontdesk_client::api::FrontDeskApi;
use frontdesk_client::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

fn apply(raw: &str, state: &mut ClientState) {
    let frame = InboundFrame::parse(raw);
    handle_frame(frame, state).unwrap();
}

#[test]
fn reservations_delete_scenario() {
    let mut state = ClientState::new();
    for id in [5, 7, 9] {
        state.reservations.upsert(Reservation { id, ..Default::default() });
    }

    apply(
        r#"{"type":"RESERVATIONS_UPDATE","payload":{"action":"delete","reservations":[{"id":7}]}}"#,
        &mut state,
    );

    let ids: Vec<_> = state.reservations.items().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![5, 9]);
}

#[test]
fn chat_response_scenario() {
    let mut state = ClientState::new();

    apply(
        r#"{"type":"chat_response","payload":{"intent":"show_calendar","message":"ok"}}"#,
        &mut state,
    );

    assert_eq!(state.log.len(), 1);
    assert_eq!(state.log.messages()[0].text, "ok");
    assert_eq!(state.latest_intent.as_deref(), Some("show_calendar"));
    assert_eq!(state.active_panel, Some(Panel::Calendar));
}

#[test]
fn overlay_show_is_idempotent_on_identical_key() {
    let mut state = ClientState::new();
    let frame = r#"{"type":"OVERLAY","payload":{"intent":"show_reservation","data":{"id":1}}}"#;

    let first = handle_frame(InboundFrame::parse(frame), &mut state).unwrap();
    let second = handle_frame(InboundFrame::parse(frame), &mut state).unwrap();

    assert!(first.overlay_opened.is_some());
    assert!(second.overlay_opened.is_none());
    assert!(state.overlay.is_open());
}

#[test]
fn status_dedup_across_raw_frames() {
    let mut state = ClientState::new();
    apply(r#"{"type":"status","payload":{"status":"connected"}}"#, &mut state);
    apply(r#"{"type":"status","payload":{"status":"connected"}}"#, &mut state);
    apply(r#"{"type":"status","payload":{"status":"disconnected"}}"#, &mut state);

    let texts: Vec<_> = state.log.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Connected to server", "Disconnected from server"]);
}

#[test]
fn unparseable_frame_is_reported_not_fatal() {
    let mut state = ClientState::new();
    let result = handle_frame(InboundFrame::parse("{garbage"), &mut state);
    assert!(result.is_err());
    assert!(state.log.is_empty());
}

// ── Full loop ────────────────────────────────────────────────────────────────

/// API stub — the loop tests never reach REST.
struct NoApi;

#[async_trait]
impl FrontDeskApi for NoApi {
    async fn create_reservation(&self, _: &Value) -> Result<Reservation, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn update_reservation(&self, _: i64, _: &Value) -> Result<Reservation, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn delete_reservation(&self, _: i64) -> Result<(), AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn create_room(&self, _: &Value) -> Result<frontdesk_client::model::Room, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn update_room(&self, _: i64, _: &Value) -> Result<frontdesk_client::model::Room, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn delete_room(&self, _: i64) -> Result<(), AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn complete_sale(&self, _: &Value) -> Result<Value, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
}

/// Connection that delivers scripted frames then parks until shutdown.
/// Outbound frames are recorded for inspection.
struct ScriptedConnection {
    frames: std::vec::IntoIter<String>,
    sent: Arc<std::sync::Mutex<Vec<String>>>,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn send(&mut self, text: String) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, AppError>> {
        match self.frames.next() {
            Some(f) => Some(Ok(f)),
            None => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

struct ScriptedConnector {
    frames: Vec<String>,
    sent: Arc<std::sync::Mutex<Vec<String>>>,
}

impl ScriptedConnector {
    fn new(frames: Vec<String>) -> Self {
        Self { frames, sent: Arc::new(std::sync::Mutex::new(Vec::new())) }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, AppError> {
        Ok(Box::new(ScriptedConnection {
            frames: self.frames.clone().into_iter(),
            sent: self.sent.clone(),
        }))
    }
}

#[tokio::test]
async fn transport_to_state_end_to_end() {
    let frames = vec![
        r#"{"type":"chat_response","payload":{"intent":"show_calendar","message":"Welcome back"}}"#
            .to_string(),
        r#"{"type":"RESERVATIONS","payload":[{"id":5},{"id":7},{"id":9}]}"#.to_string(),
        r#"{"type":"RESERVATIONS_UPDATE","payload":{"action":"delete","reservations":[{"id":7}]}}"#
            .to_string(),
    ];

    let shutdown = CancellationToken::new();
    let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(32);
    let (command_tx, command_rx) = mpsc::channel::<ClientCommand>(8);

    let config = frontdesk_client::config::TransportConfig {
        ws_url: "ws://unused".into(),
        reconnect_attempts: 0,
        reconnect_delay_seconds: 0,
    };
    let connector = Arc::new(ScriptedConnector::new(frames));
    let transport = Transport::new(connector.clone(), config, event_tx, shutdown.clone());
    let handle = transport.connect();
    drop(transport);

    let coordinator = Arc::new(Coordinator::new(Arc::new(NoApi), Box::new(AlwaysConfirm)));
    let loop_task = tokio::spawn(client::run(
        ClientState::new(),
        event_rx,
        command_rx,
        handle,
        coordinator,
        shutdown.clone(),
    ));

    // Give the worker and loop a moment to process the scripted frames.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    // User commands flow through the same loop; outbound frames land on the
    // recorded connection.
    command_tx
        .send(ClientCommand::SendChat { text: "thanks".into() })
        .await
        .unwrap();
    command_tx
        .send(ClientCommand::ReservationAction {
            action: "create".into(),
            data: json!({"guestName": "Ayesha"}),
        })
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    shutdown.cancel();
    let state = loop_task.await.unwrap();

    let sent = connector.sent.lock().unwrap().clone();
    assert!(sent.iter().any(|f| f.contains("CHAT_MESSAGE") && f.contains("thanks")));
    assert!(sent.iter().any(|f| f.contains("reservation_action") && f.contains("Ayesha")));

    // Connected system message + welcome + user chat, reservations merged.
    assert_eq!(state.last_status, Some(ConnectionStatus::Connected));
    assert!(state.log.messages().iter().any(|m| m.text == "Welcome back"));
    assert!(
        state
            .log
            .messages()
            .iter()
            .any(|m| m.kind == MessageKind::User && m.text == "thanks")
    );
    assert_eq!(state.active_panel, Some(Panel::Calendar));
    let ids: Vec<_> = state.reservations.items().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![5, 9]);
}

#[tokio::test]
async fn overlay_lifecycle_through_commands() {
    let shutdown = CancellationToken::new();
    let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(8);
    let (command_tx, command_rx) = mpsc::channel::<ClientCommand>(8);

    // No transport worker: inject events directly.
    let config = frontdesk_client::config::TransportConfig {
        ws_url: "ws://unused".into(),
        reconnect_attempts: 0,
        reconnect_delay_seconds: 0,
    };
    let transport = Transport::new(
        Arc::new(ScriptedConnector::new(Vec::new())),
        config,
        event_tx.clone(),
        shutdown.clone(),
    );
    let handle = transport.connect();
    drop(transport);

    let coordinator = Arc::new(Coordinator::new(Arc::new(NoApi), Box::new(AlwaysConfirm)));
    let loop_task = tokio::spawn(client::run(
        ClientState::new(),
        event_rx,
        command_rx,
        handle,
        coordinator,
        shutdown.clone(),
    ));

    // Server opens a reservation overlay, then the user closes it without
    // finalizing.
    event_tx
        .send(TransportEvent::Frame(
            r#"{"type":"OVERLAY","payload":{"intent":"show_reservation","data":{"id":3}}}"#.into(),
        ))
        .await
        .unwrap();
    command_tx.send(ClientCommand::CloseOverlay).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    shutdown.cancel();
    drop(event_tx);
    let state = loop_task.await.unwrap();

    assert!(!state.overlay.is_open());

    // The update-overlay-data path needs an open overlay; verified at the
    // state level in unit tests. Here we only assert the loop survived the
    // full sequence.
    assert!(state.overlay.current().is_none());
}

/// API whose reservation create never completes — stands in for a slow or
/// hung REST server.
struct HangingApi;

#[async_trait]
impl FrontDeskApi for HangingApi {
    async fn create_reservation(&self, _: &Value) -> Result<Reservation, AppError> {
        std::future::pending::<()>().await;
        unreachable!()
    }
    async fn update_reservation(&self, _: i64, _: &Value) -> Result<Reservation, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn delete_reservation(&self, _: i64) -> Result<(), AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn create_room(&self, _: &Value) -> Result<frontdesk_client::model::Room, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn update_room(&self, _: i64, _: &Value) -> Result<frontdesk_client::model::Room, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn delete_room(&self, _: i64) -> Result<(), AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
    async fn complete_sale(&self, _: &Value) -> Result<Value, AppError> {
        Err(AppError::Api("unexpected call".into()))
    }
}

#[tokio::test]
async fn pending_rest_call_does_not_stall_the_loop() {
    let shutdown = CancellationToken::new();
    let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(8);
    let (command_tx, command_rx) = mpsc::channel::<ClientCommand>(8);

    let config = frontdesk_client::config::TransportConfig {
        ws_url: "ws://unused".into(),
        reconnect_attempts: 0,
        reconnect_delay_seconds: 0,
    };
    let transport = Transport::new(
        Arc::new(ScriptedConnector::new(Vec::new())),
        config,
        event_tx.clone(),
        shutdown.clone(),
    );
    let handle = transport.connect();
    drop(transport);

    let coordinator = Arc::new(Coordinator::new(Arc::new(HangingApi), Box::new(AlwaysConfirm)));
    let loop_task = tokio::spawn(client::run(
        ClientState::new(),
        event_rx,
        command_rx,
        handle,
        coordinator,
        shutdown.clone(),
    ));

    // Kick off a save whose REST call never returns...
    command_tx
        .send(ClientCommand::OverlayAction {
            action: "finalize_reservation".into(),
            data: json!({"guestName": "Walk-in"}),
        })
        .await
        .unwrap();

    // ...then keep talking. Frames must still be processed while the call
    // is in flight.
    event_tx
        .send(TransportEvent::Frame(
            r#"{"type":"chat_response","payload":{"message":"still here"}}"#.into(),
        ))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    shutdown.cancel();
    drop(event_tx);
    let state = loop_task.await.unwrap();

    assert!(state.log.messages().iter().any(|m| m.text == "still here"));
}
