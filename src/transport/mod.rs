//! Socket transport — a background worker task owning the server connection.
//!
//! The worker is the only true concurrency boundary in the client: it talks
//! to the dispatch loop exclusively through message passing
//! ([`TransportEvent`] out, outbound frame queue in), never shared state.
//!
//! # Reconnect policy
//!
//! On connect failure or connection loss the worker retries up to a bounded
//! number of attempts with a fixed delay between them; a successful
//! connection resets the budget. When the budget is exhausted the worker
//! emits a terminal `Disconnected` status and exits — no silent infinite
//! retry. The retry sleep races the shutdown token, so teardown never waits
//! out a delay.

pub mod ws;

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TransportConfig;
use crate::error::AppError;
use crate::model::ConnectionStatus;
use crate::protocol::OutboundFrame;

/// Events the worker pushes to the dispatch loop.
#[derive(Debug)]
pub enum TransportEvent {
    /// A raw inbound frame, not yet parsed.
    Frame(String),
    /// Connection status change (the status handler deduplicates repeats).
    Status(ConnectionStatus),
}

/// One live socket connection.
#[async_trait]
pub trait Connection: Send {
    async fn send(&mut self, text: String) -> Result<(), AppError>;

    /// Next inbound text frame. `None` means the peer closed cleanly.
    async fn recv(&mut self) -> Option<Result<String, AppError>>;
}

/// Connection factory — the seam tests use to script the socket.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>, AppError>;
}

/// Cloneable sender side handed to the rest of the client.
#[derive(Clone)]
pub struct TransportHandle {
    out_tx: mpsc::Sender<String>,
    connected: Arc<AtomicBool>,
}

impl TransportHandle {
    /// Queue an outbound frame. Returns `false` when there is no live
    /// connection (or the queue is full) — callers treat that as "retry
    /// manually", never as fatal.
    pub fn send(&self, frame: &OutboundFrame) -> bool {
        if !self.connected.load(Ordering::SeqCst) {
            return false;
        }
        self.out_tx.try_send(frame.to_text()).is_ok()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Owns the worker lifecycle. One instance per client; repeated
/// [`Transport::connect`] calls while the worker is alive return the same
/// handle instead of starting a second connection.
pub struct Transport {
    connector: Arc<dyn Connector>,
    config: TransportConfig,
    events: mpsc::Sender<TransportEvent>,
    shutdown: CancellationToken,
    handle: Mutex<Option<TransportHandle>>,
}

impl Transport {
    pub fn new(
        connector: Arc<dyn Connector>,
        config: TransportConfig,
        events: mpsc::Sender<TransportEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self { connector, config, events, shutdown, handle: Mutex::new(None) }
    }

    /// Start the worker (first call) or return the in-flight handle.
    pub fn connect(&self) -> TransportHandle {
        let mut guard = self.handle.lock().expect("transport handle lock poisoned");
        if let Some(handle) = &*guard {
            debug!("connect() while worker active, returning existing handle");
            return handle.clone();
        }

        let (out_tx, out_rx) = mpsc::channel::<String>(64);
        let connected = Arc::new(AtomicBool::new(false));
        let handle = TransportHandle { out_tx, connected: connected.clone() };

        tokio::spawn(run_worker(
            self.connector.clone(),
            self.config.clone(),
            self.events.clone(),
            self.shutdown.clone(),
            out_rx,
            connected,
        ));

        *guard = Some(handle.clone());
        handle
    }
}

enum PumpExit {
    Shutdown,
    ConnectionLost,
}

async fn run_worker(
    connector: Arc<dyn Connector>,
    config: TransportConfig,
    events: mpsc::Sender<TransportEvent>,
    shutdown: CancellationToken,
    mut out_rx: mpsc::Receiver<String>,
    connected: Arc<AtomicBool>,
) {
    let mut attempts_left = config.reconnect_attempts;

    loop {
        let _ = events.send(TransportEvent::Status(ConnectionStatus::Connecting)).await;

        match connector.connect().await {
            Ok(conn) => {
                info!("transport connected");
                attempts_left = config.reconnect_attempts;
                connected.store(true, Ordering::SeqCst);
                let _ = events.send(TransportEvent::Status(ConnectionStatus::Connected)).await;

                let exit = pump(conn, &mut out_rx, &events, &shutdown).await;
                connected.store(false, Ordering::SeqCst);

                if let PumpExit::Shutdown = exit {
                    let _ = events
                        .send(TransportEvent::Status(ConnectionStatus::Disconnected))
                        .await;
                    return;
                }
                warn!("transport connection lost");
            }
            Err(e) => {
                warn!(%e, "transport connect failed");
            }
        }

        if attempts_left == 0 {
            info!("reconnect attempts exhausted, transport terminal");
            let _ = events.send(TransportEvent::Status(ConnectionStatus::Disconnected)).await;
            return;
        }
        attempts_left -= 1;

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                let _ = events.send(TransportEvent::Status(ConnectionStatus::Disconnected)).await;
                return;
            }
            _ = sleep(Duration::from_secs(config.reconnect_delay_seconds)) => {}
        }
    }
}

/// Shuttle frames both ways until the connection drops or shutdown fires.
async fn pump(
    mut conn: Box<dyn Connection>,
    out_rx: &mut mpsc::Receiver<String>,
    events: &mpsc::Sender<TransportEvent>,
    shutdown: &CancellationToken,
) -> PumpExit {
    let mut outbound_open = true;
    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                return PumpExit::Shutdown;
            }

            outbound = out_rx.recv(), if outbound_open => {
                match outbound {
                    Some(text) => {
                        if let Err(e) = conn.send(text).await {
                            warn!(%e, "outbound send failed");
                            return PumpExit::ConnectionLost;
                        }
                    }
                    // All handles dropped; nothing left to send but keep
                    // receiving.
                    None => outbound_open = false,
                }
            }

            inbound = conn.recv() => {
                match inbound {
                    Some(Ok(text)) => {
                        if events.send(TransportEvent::Frame(text)).await.is_err() {
                            // Dispatch loop gone — treat as shutdown.
                            return PumpExit::Shutdown;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(%e, "inbound recv failed");
                        return PumpExit::ConnectionLost;
                    }
                    None => {
                        return PumpExit::ConnectionLost;
                    }
                }
            }
        }
    }
}
