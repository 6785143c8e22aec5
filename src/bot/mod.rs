// AI Substitute
pub mod random_strategy;
pub mod types;

pub use random_strategy::RandomBotStrategy;
pub use types::{bot_display_name, BotStrategy};
