// Player Registry: connection handle -> durable player record
pub use generators::generate_display_name;
pub use models::{ConnectionId, PlayerModel, PlayerToken};
pub use registry::PlayerRegistry;

mod generators;
pub mod models;
pub mod registry;
