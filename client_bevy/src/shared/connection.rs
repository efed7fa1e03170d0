use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

use arena_shared::protocol::{BodyState, ClientMsg, ServerMsg, PROTOCOL_VERSION};
use bevy::prelude::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone)]
pub enum NetEvent {
    Connected,
    Disconnected,
    Message(ServerMsg),
    ProtocolMismatch { server: u32, client: u32 },
}

type NativeCmdSender = tokio::sync::mpsc::UnboundedSender<ClientMsg>;

/// Game-side end of the relay connection. The socket lives on its own
/// thread; this resource only moves messages across channels.
#[derive(Resource)]
pub struct ServerConnection {
    pub state: ConnectionState,
    pub self_id: Option<u32>,
    pub protocol_mismatch: bool,

    event_rx: Mutex<Receiver<NetEvent>>,
    cmd_tx: Option<NativeCmdSender>,
}

impl ServerConnection {
    pub fn new(url: String) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<NetEvent>();
        let cmd_tx = spawn_native_network_thread(url, event_tx);

        Self {
            state: ConnectionState::Connecting,
            self_id: None,
            protocol_mismatch: false,
            event_rx: Mutex::new(event_rx),
            cmd_tx: Some(cmd_tx),
        }
    }

    /// Connection with no network thread; tests push events through the
    /// returned sender.
    #[cfg(test)]
    pub fn test_stub_with_sender() -> (Self, Sender<NetEvent>) {
        let (event_tx, event_rx) = mpsc::channel::<NetEvent>();
        let conn = Self {
            state: ConnectionState::Connecting,
            self_id: None,
            protocol_mismatch: false,
            event_rx: Mutex::new(event_rx),
            cmd_tx: None,
        };
        (conn, event_tx)
    }

    pub fn poll_events(&mut self) -> Vec<NetEvent> {
        let mut out = Vec::new();
        if let Ok(rx) = self.event_rx.lock() {
            while let Ok(evt) = rx.try_recv() {
                out.push(evt);
            }
        }
        out
    }

    pub fn send_state(&self, state: BodyState) {
        self.send(ClientMsg::StateUpdate(state));
    }

    fn send(&self, msg: ClientMsg) {
        if self.state != ConnectionState::Connected {
            return;
        }
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(msg);
        }
    }
}

/// Turns one text frame from the relay into the event the game sees.
/// Frames that do not parse are dropped.
pub(crate) fn decode_server_msg(text: &str) -> Option<NetEvent> {
    let server_msg = match serde_json::from_str::<ServerMsg>(text) {
        Ok(msg) => msg,
        Err(e) => {
            bevy::log::debug!("Dropping unparseable relay frame: {}", e);
            return None;
        }
    };
    if let ServerMsg::Bootstrap(b) = &server_msg {
        if b.protocol_version != PROTOCOL_VERSION {
            return Some(NetEvent::ProtocolMismatch {
                server: b.protocol_version,
                client: PROTOCOL_VERSION,
            });
        }
    }
    Some(NetEvent::Message(server_msg))
}

fn spawn_native_network_thread(url: String, event_tx: Sender<NetEvent>) -> NativeCmdSender {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    let (cmd_tx, mut cmd_rx) = tokio::sync::mpsc::unbounded_channel::<ClientMsg>();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_io()
            .enable_time()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                bevy::log::error!("Failed to build network runtime: {}", e);
                let _ = event_tx.send(NetEvent::Disconnected);
                return;
            }
        };

        rt.block_on(async move {
            let mut reconnect_delay = Duration::from_millis(1000);
            let max_delay = Duration::from_millis(30_000);

            loop {
                let connect = tokio_tungstenite::connect_async(url.as_str()).await;

                let (ws_stream, _) = match connect {
                    Ok(x) => x,
                    Err(e) => {
                        bevy::log::debug!("Connect to {} failed: {}", url, e);
                        let _ = event_tx.send(NetEvent::Disconnected);
                        tokio::time::sleep(reconnect_delay).await;
                        reconnect_delay = (reconnect_delay.mul_f32(1.5)).min(max_delay);
                        continue;
                    }
                };

                reconnect_delay = Duration::from_millis(1000);
                // Updates queued while offline describe a stale body.
                while cmd_rx.try_recv().is_ok() {}
                let _ = event_tx.send(NetEvent::Connected);

                let (mut write, mut read) = ws_stream.split();

                loop {
                    tokio::select! {
                        biased;

                        Some(cmd) = cmd_rx.recv() => {
                            if let Ok(text) = serde_json::to_string(&cmd) {
                                if write.send(Message::Text(text.into())).await.is_err() {
                                    break;
                                }
                            }
                        }

                        msg = read.next() => {
                            match msg {
                                Some(Ok(Message::Text(txt))) => {
                                    let Some(evt) = decode_server_msg(&txt) else {
                                        continue;
                                    };
                                    let mismatch = matches!(evt, NetEvent::ProtocolMismatch { .. });
                                    let _ = event_tx.send(evt);
                                    if mismatch {
                                        // No reconnect after a version mismatch.
                                        let _ = write.close().await;
                                        return;
                                    }
                                }
                                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                                Some(Ok(_)) => {}
                            }
                        }
                    }
                }

                let _ = event_tx.send(NetEvent::Disconnected);
                tokio::time::sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay.mul_f32(1.5)).min(max_delay);
            }
        });
    });

    cmd_tx
}
