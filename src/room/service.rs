use std::sync::Arc;
use tracing::{debug, instrument};

use super::models::{ChatEntry, RoomModel};
use crate::player::ConnectionId;
use crate::shared::AppError;
use crate::store::SharedStore;
use crate::websockets::broadcast::MessageBroadcaster;
use crate::websockets::messages::WebSocketMessage;
use crate::websockets::ConnectionManager;

/// Service for room-scoped operations outside of play: chat and lookups
pub struct RoomService {
    store: SharedStore,
    connections: Arc<dyn ConnectionManager>,
}

impl RoomService {
    pub fn new(store: SharedStore, connections: Arc<dyn ConnectionManager>) -> Self {
        Self { store, connections }
    }

    /// Appends a chat line to the caller's room and relays it to every human in it
    #[instrument(skip(self, message))]
    pub async fn send_chat(&self, connection: &ConnectionId, message: &str) -> Result<(), AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::InvalidInput("Chat message cannot be empty".to_string()));
        }

        let mut store = self.store.lock().await;
        let room_id = store.room_id_of(connection)?;
        let sender = store
            .players
            .lookup(connection)
            .map(|player| player.name.clone())
            .unwrap_or_default();

        let room = store
            .rooms
            .get_room_mut(&room_id)
            .ok_or_else(|| AppError::RoomNotFound(room_id.clone()))?;
        let entry = ChatEntry::player(sender, message);
        let outbound = WebSocketMessage::chat(&entry);
        room.push_chat(entry);
        let recipients = room.humans();

        debug!(room_id = %room_id, "Chat message appended");
        MessageBroadcaster::broadcast_to_players(&self.connections, &recipients, &outbound).await;
        Ok(())
    }

    /// Snapshot of a room's current state
    pub async fn get_room(&self, room_id: &str) -> Option<RoomModel> {
        self.store.lock().await.rooms.get_room(room_id).cloned()
    }
}
