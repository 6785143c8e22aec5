use crate::room::Move;

/// Decision-making for the AI substitute
///
/// Strategies never see the human's pending move: the engine draws the AI's
/// move with no access to room state.
pub trait BotStrategy: Send + Sync {
    fn choose_move(&self) -> Move;

    /// Get the name of this strategy
    fn strategy_name(&self) -> &'static str;
}

/// Display name for an AI opponent, e.g. "mighty-otter Bot"
pub fn bot_display_name() -> String {
    let petname = petname::Petnames::default().generate_one(2, "-");
    format!("{} Bot", petname)
}
