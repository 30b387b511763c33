pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt, Sink};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = ulid::Ulid::new().to_string();

    tracing::info!("WebSocket connected: {}", connection_id);

    let mut broadcast_rx = state.broadcast.subscribe();

    loop {
        tokio::select! {
            broadcast_msg = broadcast_rx.recv() => {
                match broadcast_msg {
                    Ok(msg) => {
                        if send_json(&mut sender, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Snapshots are full state, the next one catches the client up
                        tracing::warn!("Connection {} skipped {} broadcasts", connection_id, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message from {}: {}", connection_id, text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &connection_id, &state).await
                                {
                                    if send_json(&mut sender, &response).await.is_err() {
                                        tracing::error!("Failed to send response");
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                let _ = send_json(&mut sender, &error).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    handlers::handle_disconnect(&state, &connection_id).await;
    tracing::info!("WebSocket connection closed: {}", connection_id);
}

async fn send_json<S>(sender: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::error!("Failed to serialize message: {}", e);
    })?;
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}
