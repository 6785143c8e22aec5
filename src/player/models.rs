use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transient handle of one transport connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity handed to the client at match start; survives reconnects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerToken(String);

impl PlayerToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayerToken {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PlayerToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerModel {
    pub connection: ConnectionId,
    pub token: PlayerToken,
    pub name: String,
    /// Runs in the current match
    pub score: u32,
    /// Wickets lost in the current match
    pub wickets: u32,
    pub room_id: Option<String>,
    pub live: bool,
    /// Queued for implicit pairing
    pub waiting: bool,
    pub last_activity: DateTime<Utc>,
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl PlayerModel {
    pub fn new(connection: ConnectionId, name: String) -> Self {
        Self {
            connection,
            token: PlayerToken::new(),
            name,
            score: 0,
            wickets: 0,
            room_id: None,
            live: true,
            waiting: false,
            last_activity: Utc::now(),
            disconnected_at: None,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_attached(&self) -> bool {
        self.room_id.is_some()
    }

    /// Binds the player to a freshly started match
    pub fn enter_room(&mut self, room_id: &str) {
        self.room_id = Some(room_id.to_string());
        self.waiting = false;
        self.reset_stats();
    }

    pub fn reset_stats(&mut self) {
        self.score = 0;
        self.wickets = 0;
    }
}
