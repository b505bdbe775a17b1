//! Front-desk client — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at the configured level
//!   4. Wire transport worker, coordinator and dispatch loop
//!   5. Read chat lines from stdin until Ctrl-C or EOF

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use frontdesk_client::api::ApiClient;
use frontdesk_client::client::{self, ClientCommand, ClientHandle};
use frontdesk_client::error::AppError;
use frontdesk_client::overlay::{AlwaysConfirm, Coordinator};
use frontdesk_client::state::ClientState;
use frontdesk_client::transport::ws::WsConnector;
use frontdesk_client::transport::{Transport, TransportEvent};
use frontdesk_client::{config, logger};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level)?;

    info!(
        hotel = %config.hotel_name,
        ws_url = %config.transport.ws_url,
        "config loaded"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main(config))
}

async fn async_main(config: config::Config) -> Result<(), AppError> {
    let shutdown = CancellationToken::new();
    let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(64);
    let (command_tx, command_rx) = mpsc::channel::<ClientCommand>(64);

    let api = Arc::new(ApiClient::new(&config.api)?);
    // The console frontend has no modal dialog; overlay deletes coming
    // through it are pre-confirmed by the caller.
    let coordinator = Arc::new(Coordinator::new(api, Box::new(AlwaysConfirm)));

    let transport = Transport::new(
        Arc::new(WsConnector::new(config.transport.ws_url.clone())),
        config.transport.clone(),
        event_tx,
        shutdown.clone(),
    );
    let handle = transport.connect();

    let dispatch = tokio::spawn(client::run(
        ClientState::new(),
        event_rx,
        command_rx,
        handle,
        coordinator,
        shutdown.clone(),
    ));

    // Console input: each line becomes a chat message.
    let console = tokio::spawn(read_stdin(ClientHandle::new(command_tx), shutdown.clone()));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::Transport(format!("signal handler: {e}")))?;
    info!("ctrl-c received, shutting down");
    shutdown.cancel();

    let _ = console.await;
    let state = dispatch
        .await
        .map_err(|e| AppError::Transport(format!("dispatch task panicked: {e}")))?;
    info!(messages = state.log.len(), "session ended");
    Ok(())
}

async fn read_stdin(handle: ClientHandle, shutdown: CancellationToken) {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            line = lines.next_line() => {
                match line {
                    Ok(Some(input)) => {
                        let input = input.trim();
                        if input.is_empty() {
                            continue;
                        }
                        if !handle.send_chat(input).await {
                            break;
                        }
                    }
                    // EOF or read error: stop reading, the loop stays up.
                    _ => break,
                }
            }
        }
    }
}
