use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::models::RoomModel;
use crate::player::ConnectionId;
use crate::shared::AppError;

/// Room Store: room id -> room state
///
/// Only ever touched inside the store's critical section, so it needs no
/// locking of its own.
#[derive(Debug, Default)]
pub struct RoomRepository {
    rooms: HashMap<String, RoomModel>,
}

impl RoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room id derived from the creator's connection, unique among live rooms
    pub fn allocate_id(&self, creator: &ConnectionId) -> String {
        let base = format!("room_{}", creator);
        if !self.rooms.contains_key(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !self.rooms.contains_key(candidate))
            .unwrap_or(base)
    }

    pub fn create_room(&mut self, room: RoomModel) -> Result<(), AppError> {
        if self.rooms.contains_key(&room.id) {
            warn!(room_id = %room.id, "Room already exists");
            return Err(AppError::RoomAlreadyExists(room.id));
        }
        info!(room_id = %room.id, mode = %room.mode, "Room created");
        self.rooms.insert(room.id.clone(), room);
        Ok(())
    }

    pub fn get_room(&self, room_id: &str) -> Option<&RoomModel> {
        let room = self.rooms.get(room_id);
        if room.is_none() {
            debug!(room_id = %room_id, "Room not found");
        }
        room
    }

    pub fn get_room_mut(&mut self, room_id: &str) -> Option<&mut RoomModel> {
        self.rooms.get_mut(room_id)
    }

    pub fn delete_room(&mut self, room_id: &str) -> Option<RoomModel> {
        let room = self.rooms.remove(room_id);
        if room.is_some() {
            info!(room_id = %room_id, "Room deleted");
        }
        room
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
