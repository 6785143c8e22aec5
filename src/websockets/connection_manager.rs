use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::player::ConnectionId;

/// Delivers serialized messages to currently connected clients
///
/// Sends are fire-and-forget: a recipient that is not connected simply misses
/// the message.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection: ConnectionId, sender: mpsc::UnboundedSender<String>);

    async fn remove_connection(&self, connection: &ConnectionId);

    async fn send_to_player(&self, connection: &ConnectionId, message: &str);

    async fn send_to_players(&self, connections: &[ConnectionId], message: &str);

    async fn count_connections(&self) -> usize;
}

pub struct InMemoryConnectionManager {
    // connection -> outbound sender
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection: ConnectionId, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection, sender);
    }

    async fn remove_connection(&self, connection: &ConnectionId) {
        let mut connections = self.connections.write().await;
        connections.remove(connection);
    }

    async fn send_to_player(&self, connection: &ConnectionId, message: &str) {
        let connections = self.connections.read().await;
        if let Some(sender) = connections.get(connection) {
            let _ = sender.send(message.to_string());
        }
    }

    async fn send_to_players(&self, connections: &[ConnectionId], message: &str) {
        let senders = self.connections.read().await;
        for connection in connections {
            if let Some(sender) = senders.get(connection) {
                let _ = sender.send(message.to_string());
            }
        }
    }

    async fn count_connections(&self) -> usize {
        self.connections.read().await.len()
    }
}
