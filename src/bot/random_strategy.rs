use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tracing::debug;

use super::types::BotStrategy;
use crate::room::{models::MAX_MOVE, Move};

/// Uniform pick over 0..=6, independent on every call
pub struct RandomBotStrategy {
    seeded: Option<Mutex<StdRng>>,
}

impl RandomBotStrategy {
    pub fn new() -> Self {
        Self { seeded: None }
    }

    /// Reproducible sequence of moves
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn draw(&self) -> u8 {
        match &self.seeded {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                rng.random_range(0..=MAX_MOVE)
            }
            None => rand::rng().random_range(0..=MAX_MOVE),
        }
    }
}

impl Default for RandomBotStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl BotStrategy for RandomBotStrategy {
    fn choose_move(&self) -> Move {
        let value = self.draw();
        debug!(value, "AI move drawn");
        Move::clamped(value)
    }

    fn strategy_name(&self) -> &'static str {
        "RandomBotStrategy"
    }
}
