// Matchmaker: turns join/create/toss requests into started rooms
pub use service::Matchmaker;

mod service;
