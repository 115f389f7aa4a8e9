//! Chat WebSocket handler

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::state::GatewayState;

/// Upgrade an incoming connection into the chat service loop
pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_chat_socket(socket, state))
}

/// Drive one chat connection: register it with the service, pump inbound
/// frames in, and drain outbound frames onto the socket until either side
/// closes.
async fn handle_chat_socket(socket: WebSocket, state: Arc<GatewayState>) {
    let (mut sink, mut stream) = socket.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let connection_id = state.chat.connect(out_tx).await;
    debug!(connection_id, "chat websocket connected");

    let writer = tokio::spawn(async move {
        while let Some(payload) = out_rx.recv().await {
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => state.chat.handle_frame(connection_id, &text).await,
            Message::Close(_) => break,
            // Pings are answered by axum itself; binary frames are not
            // part of the protocol
            _ => {}
        }
    }

    state.chat.disconnect(connection_id).await;
    debug!(connection_id, "chat websocket closed");
    writer.abort();
}
