// Library crate for the hand-cricket game server
// This file exposes the public API for integration tests

pub mod bot;
pub mod config;
pub mod game;
pub mod matchmaking;
pub mod player;
pub mod room;
pub mod session;
pub mod shared;
pub mod store;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use bot::{BotStrategy, RandomBotStrategy};
pub use config::GameConfig;
pub use game::{BallEvent, TurnEngine};
pub use matchmaking::Matchmaker;
pub use player::{ConnectionId, PlayerToken};
pub use room::{models::RoomModel, repository::RoomRepository, RoomService, RoomStatus};
pub use session::SessionSupervisor;
pub use shared::{AppError, AppState, ErrorKind};
pub use store::{GameStore, SharedStore};
pub use websockets::{
    ClientMessage, ConnectionManager, MessageHandler, MessageType, WebSocketMessage,
    WebsocketReceiveHandler,
};
