use std::sync::Arc;
use tracing::warn;

use super::{connection_manager::ConnectionManager, messages::WebSocketMessage};
use crate::player::ConnectionId;

pub struct MessageBroadcaster;

impl MessageBroadcaster {
    pub async fn send_to_player(
        connection_manager: &Arc<dyn ConnectionManager>,
        connection: &ConnectionId,
        message: &WebSocketMessage,
    ) {
        if let Some(message_json) = Self::serialize(message) {
            connection_manager
                .send_to_player(connection, &message_json)
                .await;
        }
    }

    pub async fn broadcast_to_players(
        connection_manager: &Arc<dyn ConnectionManager>,
        connections: &[ConnectionId],
        message: &WebSocketMessage,
    ) {
        if let Some(message_json) = Self::serialize(message) {
            connection_manager
                .send_to_players(connections, &message_json)
                .await;
        }
    }

    fn serialize(message: &WebSocketMessage) -> Option<String> {
        serde_json::to_string(message)
            .map_err(|e| {
                warn!(
                    message_type = ?message.message_type,
                    error = %e,
                    "Failed to serialize outbound message"
                )
            })
            .ok()
    }
}
