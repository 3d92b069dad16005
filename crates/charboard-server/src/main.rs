//! Charboard board server
//!
//! Hosts the single shared text board. Every connected client receives the
//! whole entry collection again after each mutation, plus the shared
//! last-submission timestamp that drives the global cooldown.
//!
//! ## Protocol
//!
//! Messages are JSON with the following format:
//! ```json
//! { "type": "push", "char": "h", "submittedAt": 1700000000000 }
//! { "type": "set_last_submission", "value": 1700000000000 }
//! { "type": "remove", "key": "01ARZ3NDEKTSV4RRFFQ69G5FAV" }
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use charboard_core::store::{BoardStore, MemoryStore, StoreEvent};
use charboard_core::sync::{ClientMessage, ServerMessage};
use charboard_core::TextEntry;
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;
const DEFAULT_PORT: u16 = 3030;

/// Shared application state
struct AppState {
    /// The one global board.
    store: Arc<dyn BoardStore>,
    /// Fan-out channel for snapshot and timestamp notifications.
    tx: broadcast::Sender<ServerMessage>,
}

impl AppState {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let store = Arc::new(MemoryStore::new());

        // Every mutation notifies the store's subscription stream; one
        // bridge thread fans those notifications out to all sockets.
        let subscription = store.subscribe();
        let notify_tx = tx.clone();
        std::thread::spawn(move || {
            while let Some(event) = subscription.next() {
                let msg = match event {
                    StoreEvent::Entries(entries) => ServerMessage::Entries { entries },
                    StoreEvent::LastSubmission(value) => {
                        ServerMessage::LastSubmission { value }
                    }
                };
                // No receivers just means no clients are connected.
                let _ = notify_tx.send(msg);
            }
        });

        Self { store, tx }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charboard_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("CHARBOARD_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));
    info!("charboard server listening on {addr}");
    info!("WebSocket endpoint: ws://{addr}/ws");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Index page
async fn index() -> &'static str {
    "Charboard Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).unwrap();
    sender.send(Message::Text(json.into())).await
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4().to_string();
    info!("new connection: {peer_id}");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.tx.subscribe();

    // Initial load: the whole collection, then the shared timestamp.
    let initial = async {
        let entries = state.store.snapshot().await?;
        let value = state.store.last_submission().await?;
        Ok::<_, charboard_core::store::StoreError>((entries, value))
    }
    .await;
    match initial {
        Ok((entries, value)) => {
            if send_json(&mut sender, &ServerMessage::Entries { entries })
                .await
                .is_err()
            {
                return;
            }
            if send_json(&mut sender, &ServerMessage::LastSubmission { value })
                .await
                .is_err()
            {
                return;
            }
        }
        Err(e) => {
            warn!("initial load failed for {peer_id}: {e}");
            return;
        }
    }

    loop {
        tokio::select! {
            // Messages from this client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(reply) =
                                    handle_client_message(&state, &peer_id, client_msg).await
                                {
                                    if send_json(&mut sender, &reply).await.is_err() {
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                warn!("invalid message from {peer_id}: {e}");
                                let err = ServerMessage::Error {
                                    message: format!("invalid message: {e}"),
                                };
                                let _ = send_json(&mut sender, &err).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ignore ping/pong/binary
                    Some(Err(e)) => {
                        warn!("websocket error for {peer_id}: {e}");
                        break;
                    }
                }
            }

            // Board-wide notifications
            broadcast_msg = rx.recv() => {
                match broadcast_msg {
                    Ok(server_msg) => {
                        if send_json(&mut sender, &server_msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // The next whole-snapshot notification catches this
                        // client up; nothing to replay.
                        warn!("peer {peer_id} lagged by {n} notifications");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    info!("connection closed: {peer_id}");
}

/// Apply one client message to the board.
///
/// Notifications for everyone go through the broadcast channel; the
/// returned message (ack or rejection) goes to the issuing client only.
async fn handle_client_message(
    state: &AppState,
    peer_id: &str,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Push { entry } => {
            // Clients validate first; this re-check guards direct writers.
            if entry.ch.trim().chars().count() != 1 {
                return Some(ServerMessage::Error {
                    message: "exactly one character per submission".to_string(),
                });
            }
            let entry = TextEntry::new(entry.ch.trim(), entry.submitted_at);
            match state.store.push_entry(&entry).await {
                Ok(key) => {
                    info!("peer {peer_id} pushed {key}");
                    Some(ServerMessage::Pushed { key })
                }
                Err(e) => {
                    warn!("push from {peer_id} failed: {e}");
                    Some(ServerMessage::Error {
                        message: e.to_string(),
                    })
                }
            }
        }
        ClientMessage::SetLastSubmission { value } => {
            // The store notification reaches everyone, the writer
            // included, so every client re-evaluates its cooldown.
            match state.store.set_last_submission(value).await {
                Ok(()) => None,
                Err(e) => {
                    warn!("timestamp overwrite from {peer_id} failed: {e}");
                    Some(ServerMessage::Error {
                        message: e.to_string(),
                    })
                }
            }
        }
        ClientMessage::Remove { key } => match state.store.remove_entry(&key).await {
            Ok(()) => {
                info!("peer {peer_id} removed {key}");
                Some(ServerMessage::Removed { key })
            }
            Err(e) => {
                warn!("remove of {key} from {peer_id} failed: {e}");
                Some(ServerMessage::Error {
                    message: e.to_string(),
                })
            }
        },
    }
}
