// Public API
pub use logic::{decide_result, is_finished, next_turn, resolve_ball, BallEvent, BallOutcome, MatchResult};
pub use service::TurnEngine;
pub use summary::{score_line, summary_message, winner_name};

// Internal modules
mod logic;
mod service;
mod summary;
