#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, RwLock};

use handcricket::room::Move;
use handcricket::websockets::{ConnectionManager, MessageType, WebSocketMessage};
use handcricket::{BotStrategy, ConnectionId};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every message per connection instead of writing to sockets
#[derive(Clone)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<ConnectionId, VecDeque<String>>>>,
    connected: Arc<RwLock<Vec<ConnectionId>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(RwLock::new(HashMap::new())),
            connected: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn get_messages_for(&self, connection: &ConnectionId) -> Vec<WebSocketMessage> {
        self.sent_messages
            .read()
            .await
            .get(connection)
            .map(|queue| {
                queue
                    .iter()
                    .filter_map(|raw| serde_json::from_str(raw).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pops the oldest undelivered message for the connection
    pub async fn consume_message_for(&self, connection: &ConnectionId) -> Option<WebSocketMessage> {
        let raw = self
            .sent_messages
            .write()
            .await
            .get_mut(connection)?
            .pop_front()?;
        serde_json::from_str(&raw).ok()
    }

    pub async fn messages_of_type(
        &self,
        connection: &ConnectionId,
        message_type: MessageType,
    ) -> Vec<WebSocketMessage> {
        self.get_messages_for(connection)
            .await
            .into_iter()
            .filter(|message| message.message_type == message_type)
            .collect()
    }

    pub async fn last_of_type(
        &self,
        connection: &ConnectionId,
        message_type: MessageType,
    ) -> Option<WebSocketMessage> {
        self.messages_of_type(connection, message_type).await.pop()
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, connection: ConnectionId, _sender: mpsc::UnboundedSender<String>) {
        self.connected.write().await.push(connection);
    }

    async fn remove_connection(&self, connection: &ConnectionId) {
        self.connected.write().await.retain(|c| c != connection);
    }

    async fn send_to_player(&self, connection: &ConnectionId, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(connection.clone())
            .or_default()
            .push_back(message.to_string());
    }

    async fn send_to_players(&self, connections: &[ConnectionId], message: &str) {
        for connection in connections {
            self.send_to_player(connection, message).await;
        }
    }

    async fn count_connections(&self) -> usize {
        self.connected.read().await.len()
    }
}

/// AI strategy that plays a fixed script, then repeats its last number
pub struct ScriptedBot {
    script: Mutex<VecDeque<i64>>,
    last: Mutex<i64>,
}

impl ScriptedBot {
    pub fn new(script: Vec<i64>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(0),
        }
    }
}

impl BotStrategy for ScriptedBot {
    fn choose_move(&self) -> Move {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        Move::try_from(*last).unwrap()
    }

    fn strategy_name(&self) -> &'static str {
        "scripted"
    }
}
