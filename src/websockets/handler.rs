use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::player::ConnectionId;
use crate::shared::{AppError, AppState, ErrorKind};

use super::broadcast::MessageBroadcaster;
use super::messages::{ClientMessage, WebSocketMessage};
use super::socket::{Connection, MessageHandler};

/// Decodes inbound client events and routes them to the core services
pub struct WebsocketReceiveHandler {
    app_state: AppState,
}

impl WebsocketReceiveHandler {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    async fn dispatch(&self, connection: &ConnectionId, message: ClientMessage) -> Result<(), AppError> {
        let state = &self.app_state;
        match message {
            ClientMessage::Join { name, ai } => state.matchmaker.join(connection, &name, ai).await,
            ClientMessage::CreateRoom {
                overs,
                wickets,
                name,
            } => state
                .matchmaker
                .create_room(connection, name, overs, wickets)
                .await
                .map(|_| ()),
            ClientMessage::JoinRoom { room_id, name } => {
                state.matchmaker.join_room(connection, &room_id, name).await
            }
            ClientMessage::Toss(_) => state.matchmaker.toss(connection).await,
            ClientMessage::TossChoice { choice } => {
                state.matchmaker.toss_choice(connection, choice).await
            }
            ClientMessage::PlayTurn { number } => {
                state.turn_engine.submit_move(connection, number).await
            }
            ClientMessage::ReconnectPlayer { player_id, name } => {
                state.supervisor.reconnect(connection, &player_id, name).await
            }
            ClientMessage::LeaveRoom(_) => state.supervisor.leave_room(connection).await,
            ClientMessage::Chat { msg } => state.room_service.send_chat(connection, &msg).await,
        }
    }

    async fn touch(&self, connection: &ConnectionId) {
        if let Some(player) = self.app_state.store.lock().await.players.lookup_mut(connection) {
            player.touch();
        }
    }

    async fn reply(&self, connection: &ConnectionId, message: &WebSocketMessage) {
        MessageBroadcaster::send_to_player(&self.app_state.connection_manager, connection, message)
            .await;
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection: &ConnectionId, message: String) {
        debug!(connection = %connection, message = %message, "Received message");

        let client_message = match serde_json::from_str::<ClientMessage>(&message) {
            Ok(client_message) => client_message,
            Err(e) => {
                warn!(connection = %connection, error = %e, "Failed to parse WebSocket message");
                self.reply(
                    connection,
                    &WebSocketMessage::error(
                        format!("Malformed message: {}", e),
                        ErrorKind::InvalidInput,
                    ),
                )
                .await;
                return;
            }
        };

        let is_reconnect = matches!(client_message, ClientMessage::ReconnectPlayer { .. });
        match self.dispatch(connection, client_message).await {
            Ok(()) => self.touch(connection).await,
            Err(e) => {
                warn!(connection = %connection, error = %e, kind = %e.kind(), "Request rejected");
                self.reply(connection, &WebSocketMessage::error(e.to_string(), e.kind()))
                    .await;
                if is_reconnect && e == AppError::SessionNotFound {
                    self.reply(
                        connection,
                        &WebSocketMessage::reconnect_failed("Session expired, start a new game"),
                    )
                    .await;
                }
            }
        }
    }
}

/// WebSocket endpoint: GET /ws
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    debug!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let connection_id = ConnectionId::new();

    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;
    let active = app_state.connection_manager.count_connections().await;
    info!(connection = %connection_id, active, "WebSocket connection established");

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state.clone()));
    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    if let Err(e) = connection.run().await {
        warn!(connection = %connection_id, error = ?e, "WebSocket connection ended with error");
    }

    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
    app_state.supervisor.handle_disconnect(&connection_id).await;
    info!(connection = %connection_id, "WebSocket connection closed");
}
