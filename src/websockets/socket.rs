use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::player::ConnectionId;

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next text message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Handler for incoming WebSocket messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, connection: &ConnectionId, message: String);
}

#[derive(Debug)]
pub enum SocketError {
    SendFailed(String),
    ReceiveFailed(String),
}

#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Binary frames carry no events; ping/pong is answered by axum
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// One managed client connection
///
/// Outbound messages arrive on the channel registered with the
/// ConnectionManager; inbound text frames go to the message handler.
pub struct Connection {
    pub connection_id: ConnectionId,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        connection_id: ConnectionId,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            connection_id,
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    /// Run the connection - handles both sending and receiving until disconnect
    pub async fn run(mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => self.socket.send_message(message).await?,
                        None => break,
                    }
                }

                msg = self.socket.receive_message() => {
                    match msg {
                        Ok(Some(message)) => {
                            self.message_handler
                                .handle_message(&self.connection_id, message)
                                .await;
                        }
                        Ok(None) => {
                            debug!(connection = %self.connection_id, "Client closed connection");
                            break;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        let _ = self.socket.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedSocket {
        inbound: VecDeque<String>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SocketWrapper for ScriptedSocket {
        async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
            match self.inbound.pop_front() {
                Some(message) => Ok(Some(message)),
                None => {
                    // Give queued outbound messages a chance before hanging up
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    Ok(None)
                }
            }
        }

        async fn close(&mut self) -> Result<(), SocketError> {
            Ok(())
        }
    }

    struct RecordingHandler {
        seen: Mutex<Vec<(ConnectionId, String)>>,
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle_message(&self, connection: &ConnectionId, message: String) {
            self.seen.lock().unwrap().push((connection.clone(), message));
        }
    }

    #[tokio::test]
    async fn test_connection_routes_both_directions() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let socket = ScriptedSocket {
            inbound: VecDeque::from(vec!["hello".to_string()]),
            sent: sent.clone(),
        };
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
        });
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("welcome".to_string()).unwrap();

        let connection = Connection::new(
            ConnectionId::from("c1"),
            Box::new(socket),
            rx,
            handler.clone(),
        );
        connection.run().await.unwrap();

        let seen = handler.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], (ConnectionId::from("c1"), "hello".to_string()));
        assert_eq!(sent.lock().unwrap().as_slice(), ["welcome".to_string()]);
    }
}
