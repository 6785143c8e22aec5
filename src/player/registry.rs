use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::models::{ConnectionId, PlayerModel, PlayerToken};
use crate::shared::AppError;

/// Registry of players keyed by their current connection handle
///
/// Also indexes the durable token so a returning client can be re-bound to its
/// record under a new connection. At most one connection is associated with a
/// token at any time.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<ConnectionId, PlayerModel>,
    tokens: HashMap<PlayerToken, ConnectionId>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, or refreshes the display name of an existing one
    pub fn register(&mut self, connection: &ConnectionId, name: &str) -> &mut PlayerModel {
        let tokens = &mut self.tokens;
        let player = self
            .players
            .entry(connection.clone())
            .or_insert_with(|| {
                let player = PlayerModel::new(connection.clone(), name.to_string());
                info!(
                    connection = %connection,
                    name = %name,
                    token = %player.token,
                    "Registered new player"
                );
                tokens.insert(player.token.clone(), connection.clone());
                player
            });

        debug!(connection = %connection, name = %name, "Player registration refreshed");
        if !name.is_empty() {
            player.name = name.to_string();
        }
        player.touch();
        player
    }

    pub fn lookup(&self, connection: &ConnectionId) -> Option<&PlayerModel> {
        self.players.get(connection)
    }

    pub fn lookup_mut(&mut self, connection: &ConnectionId) -> Option<&mut PlayerModel> {
        self.players.get_mut(connection)
    }

    pub fn find_by_token(&self, token: &PlayerToken) -> Option<&PlayerModel> {
        self.tokens
            .get(token)
            .and_then(|connection| self.players.get(connection))
    }

    /// Marks a player as gone; returns the updated record if known
    pub fn mark_disconnected(&mut self, connection: &ConnectionId) -> Option<&PlayerModel> {
        let player = self.players.get_mut(connection)?;
        player.live = false;
        player.disconnected_at = Some(Utc::now());
        info!(connection = %connection, name = %player.name, "Player marked disconnected");
        Some(player)
    }

    /// Moves the record owning `token` onto `new_connection`
    ///
    /// Returns the retired connection handle. Callers must re-key any other
    /// structure indexed by that handle.
    pub fn reassociate(
        &mut self,
        token: &PlayerToken,
        new_connection: &ConnectionId,
    ) -> Result<ConnectionId, AppError> {
        let old_connection = self
            .tokens
            .get(token)
            .cloned()
            .ok_or(AppError::SessionNotFound)?;

        let mut player = self
            .players
            .remove(&old_connection)
            .ok_or(AppError::SessionNotFound)?;

        if let Some(displaced) = self.players.remove(new_connection) {
            warn!(
                connection = %new_connection,
                displaced_token = %displaced.token,
                "Discarding record previously bound to reconnecting connection"
            );
            self.tokens.remove(&displaced.token);
        }

        player.connection = new_connection.clone();
        player.live = true;
        player.disconnected_at = None;
        player.touch();

        self.tokens.insert(token.clone(), new_connection.clone());
        self.players.insert(new_connection.clone(), player);

        info!(
            token = %token,
            old_connection = %old_connection,
            new_connection = %new_connection,
            "Player reassociated with new connection"
        );
        Ok(old_connection)
    }

    /// First live, unattached player queued for pairing, other than `excluding`
    pub fn find_waiting(&self, excluding: &ConnectionId) -> Option<ConnectionId> {
        self.players
            .values()
            .find(|p| p.waiting && p.live && !p.is_attached() && &p.connection != excluding)
            .map(|p| p.connection.clone())
    }

    pub fn remove(&mut self, connection: &ConnectionId) -> Option<PlayerModel> {
        let player = self.players.remove(connection)?;
        self.tokens.remove(&player.token);
        info!(connection = %connection, name = %player.name, "Player purged");
        Some(player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
