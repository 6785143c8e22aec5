use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::player::{ConnectionId, PlayerRegistry, PlayerToken};
use crate::room::{RoomModel, RoomRepository};
use crate::shared::AppError;

/// All mutable game state, guarded as one unit
///
/// Matchmaking, move resolution, reconnects and forfeits all read-then-write
/// players and rooms together, so they share a single critical section.
#[derive(Debug, Default)]
pub struct GameStore {
    pub players: PlayerRegistry,
    pub rooms: RoomRepository,
}

pub type SharedStore = Arc<Mutex<GameStore>>;

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Room id the connection is currently attached to
    pub fn room_id_of(&self, connection: &ConnectionId) -> Result<String, AppError> {
        self.players
            .lookup(connection)
            .ok_or(AppError::PlayerNotFound)?
            .room_id
            .clone()
            .ok_or(AppError::NotInRoom)
    }

    /// Rebinds a durable token to a new connection across registry and rooms
    pub fn reassociate(
        &mut self,
        token: &PlayerToken,
        new_connection: &ConnectionId,
    ) -> Result<ConnectionId, AppError> {
        let old_connection = self.players.reassociate(token, new_connection)?;

        let room_id = self
            .players
            .lookup(new_connection)
            .and_then(|player| player.room_id.clone());
        if let Some(room) = room_id.and_then(|id| self.rooms.get_room_mut(&id)) {
            room.rekey(&old_connection, new_connection);
            debug!(room_id = %room.id, "Room participants re-keyed");
        }

        Ok(old_connection)
    }

    /// Removes a room and releases its participants
    ///
    /// Live players stay registered without a room; disconnected ones are purged.
    pub fn teardown_room(&mut self, room_id: &str) -> Option<RoomModel> {
        let room = self.rooms.delete_room(room_id)?;

        for connection in room.humans() {
            let live = match self.players.lookup_mut(&connection) {
                Some(player) if player.room_id.as_deref() == Some(room_id) => {
                    player.room_id = None;
                    player.live
                }
                _ => continue,
            };
            if !live {
                self.players.remove(&connection);
            }
        }

        info!(room_id = %room_id, "Room torn down");
        Some(room)
    }
}
