//! Wire protocol and WebSocket client for board synchronization.

use crate::entry::{EntryKey, EntrySnapshot, TextEntry};
use serde::{Deserialize, Serialize};

/// Messages sent to the board server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Append one character to the board.
    Push {
        #[serde(flatten)]
        entry: TextEntry,
    },
    /// Overwrite the shared last-submission timestamp.
    SetLastSubmission { value: u64 },
    /// Delete an entry by key (admin).
    Remove { key: EntryKey },
}

/// Messages received from the board server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full entry snapshot, sent on connect and after every mutation.
    Entries { entries: EntrySnapshot },
    /// Shared last-submission timestamp, sent on connect and after every
    /// overwrite (from any client, this one included).
    LastSubmission { value: u64 },
    /// Ack to the issuing client: its push landed under `key`.
    Pushed { key: EntryKey },
    /// Ack to the issuing client: its remove landed.
    Removed { key: EntryKey },
    /// A write from the issuing client was rejected.
    Error { message: String },
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events surfaced by the WebSocket client.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    Connected,
    Disconnected,
    /// Whole-snapshot change notification.
    Entries(EntrySnapshot),
    /// Timestamp change notification.
    LastSubmission(u64),
    /// Own push acknowledged.
    Pushed { key: EntryKey },
    /// Own remove acknowledged.
    Removed { key: EntryKey },
    /// Own write rejected, or transport failure.
    Error { message: String },
}

fn event_for(msg: ServerMessage) -> SyncEvent {
    match msg {
        ServerMessage::Entries { entries } => SyncEvent::Entries(entries),
        ServerMessage::LastSubmission { value } => SyncEvent::LastSubmission(value),
        ServerMessage::Pushed { key } => SyncEvent::Pushed { key },
        ServerMessage::Removed { key } => SyncEvent::Removed { key },
        ServerMessage::Error { message } => SyncEvent::Error { message },
    }
}

mod native_client {
    use super::*;
    use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{connect, Message};
    use url::Url;

    /// Commands sent to the WebSocket thread.
    enum WsCommand {
        Send(String),
        Close,
    }

    /// WebSocket client backed by a background thread.
    ///
    /// Events are queued by the thread and handed out through the
    /// non-blocking `poll_events()`. A failed connection stops delivering
    /// updates; there is no reconnect logic.
    pub struct NativeWebSocket {
        state: ConnectionState,
        events: Vec<SyncEvent>,
        cmd_tx: Option<Sender<WsCommand>>,
        event_rx: Option<Receiver<SyncEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeWebSocket {
        /// Create a new disconnected client.
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                events: Vec::new(),
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        /// Connect to the board server.
        pub fn connect(&mut self, url: &str) -> Result<(), String> {
            if self.cmd_tx.is_some() {
                return Err("already connected".to_string());
            }

            let parsed = Url::parse(url).map_err(|e| format!("invalid URL: {e}"))?;
            if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                return Err(format!("invalid WebSocket URL scheme: {}", parsed.scheme()));
            }

            self.state = ConnectionState::Connecting;

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<SyncEvent>();
            let url = url.to_string();

            let handle = thread::spawn(move || run_socket(&url, cmd_rx, event_tx));

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);

            Ok(())
        }

        /// Disconnect from the server.
        pub fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }

        /// Send a client message.
        pub fn send(&self, msg: &ClientMessage) -> Result<(), String> {
            let json =
                serde_json::to_string(msg).map_err(|e| format!("encode failed: {e}"))?;
            if let Some(ref tx) = self.cmd_tx {
                tx.send(WsCommand::Send(json))
                    .map_err(|e| format!("send failed: {e}"))
            } else {
                Err("not connected".to_string())
            }
        }

        /// Poll for pending events (non-blocking).
        pub fn poll_events(&mut self) -> Vec<SyncEvent> {
            if let Some(ref rx) = self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    match &event {
                        SyncEvent::Connected => self.state = ConnectionState::Connected,
                        SyncEvent::Disconnected => {
                            self.state = ConnectionState::Disconnected
                        }
                        SyncEvent::Error { .. } => {
                            if self.state != ConnectionState::Connected {
                                self.state = ConnectionState::Error;
                            }
                        }
                        _ => {}
                    }
                    self.events.push(event);
                }
            }
            std::mem::take(&mut self.events)
        }

        /// Current connection state.
        pub fn state(&self) -> ConnectionState {
            self.state
        }

        pub fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }
    }

    fn run_socket(url: &str, cmd_rx: Receiver<WsCommand>, event_tx: Sender<SyncEvent>) {
        log::info!("websocket thread: connecting to {url}");

        let (mut socket, response) = match connect(url) {
            Ok(ok) => ok,
            Err(e) => {
                log::error!("websocket connection failed: {e}");
                let _ = event_tx.send(SyncEvent::Error {
                    message: format!("connection failed: {e}"),
                });
                return;
            }
        };

        log::info!("websocket connected, status: {}", response.status());
        let _ = event_tx.send(SyncEvent::Connected);

        // Short read timeout on the TCP stream keeps the loop responsive
        // to outgoing commands.
        if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
            let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
            let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
        }

        loop {
            match cmd_rx.try_recv() {
                Ok(WsCommand::Send(json)) => {
                    if let Err(e) = socket.send(Message::Text(json)) {
                        log::error!("websocket send error: {e}");
                        break;
                    }
                }
                Ok(WsCommand::Close) => {
                    let _ = socket.close(None);
                    break;
                }
                Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            match socket.read() {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(msg) => {
                        let _ = event_tx.send(event_for(msg));
                    }
                    Err(e) => log::warn!("unparseable server message ({e}): {text}"),
                },
                Ok(Message::Ping(data)) => {
                    let _ = socket.send(Message::Pong(data));
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => {
                    log::error!("websocket read error: {e}");
                    break;
                }
            }
        }

        log::info!("websocket thread exiting");
        let _ = event_tx.send(SyncEvent::Disconnected);
    }

    impl Default for NativeWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for NativeWebSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }
}

pub use native_client::NativeWebSocket;
