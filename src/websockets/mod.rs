// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{ClientMessage, MessageType, TossChoice, WebSocketMessage};
pub use socket::MessageHandler;

// Internal modules
pub mod broadcast;
mod connection_manager;
mod handler;
pub mod messages;
mod socket;
