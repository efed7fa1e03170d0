use std::sync::Arc;

use arena_shared::protocol::{ClientMsg, ServerMsg};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};

use crate::session::SessionCommand;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub session_tx: mpsc::Sender<SessionCommand>,
    pub connection_semaphore: Arc<Semaphore>,
}

impl AppState {
    pub fn new(session_tx: mpsc::Sender<SessionCommand>, max_connections: usize) -> Self {
        Self {
            session_tx,
            connection_semaphore: Arc::new(Semaphore::new(max_connections)),
        }
    }
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let permit = match Arc::clone(&app_state.connection_semaphore).try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!("Connection refused: participant limit reached");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, permit))
}

async fn handle_socket(socket: WebSocket, app_state: AppState, _permit: OwnedSemaphorePermit) {
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMsg>();

    // Join the session
    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .session_tx
        .send(SessionCommand::Join {
            outbound: outbound_tx,
            response: resp_tx,
        })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Join command");
        return;
    }

    let my_id = match resp_rx.await {
        Ok(id) => id,
        Err(_) => {
            tracing::error!("Failed to receive participant id");
            return;
        }
    };

    tracing::info!("Participant {} connected", my_id);

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(ClientMsg::StateUpdate(state)) => {
                                let _ = app_state
                                    .session_tx
                                    .send(SessionCommand::Update { id: my_id, state })
                                    .await;
                            }
                            Err(e) => {
                                tracing::debug!("Ignoring unparseable frame from {}: {}", my_id, e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Socket error for {}: {}", my_id, e);
                        break;
                    }
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client
            outbound = outbound_rx.recv() => {
                let Some(msg) = outbound else { break };
                match serde_json::to_string(&msg) {
                    Ok(json) => {
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Failed to encode message for {}: {}", my_id, e),
                }
            }
        }
    }

    // Cleanup on disconnect
    let _ = app_state
        .session_tx
        .send(SessionCommand::Leave { id: my_id })
        .await;
    tracing::info!("Participant {} disconnected", my_id);
}
