// Room Store and room-scoped services
pub use models::{overs_label, ChatEntry, Move, Participant, RoomMode, RoomModel, RoomStatus, Side};
pub use repository::RoomRepository;
pub use service::RoomService;

pub mod models;
pub mod repository;
pub mod service;
