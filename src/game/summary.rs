use chrono::Utc;

use super::logic::MatchResult;
use crate::room::{overs_label, RoomModel};
use crate::websockets::messages::{GameSummaryPayload, ScoreLine, SideSummary, WebSocketMessage};

/// Score line as seen from `slot`
pub fn score_line(room: &RoomModel, slot: usize) -> ScoreLine {
    let (your_score, your_wickets, balls) = room
        .sides
        .get(slot)
        .map(|side| (side.score, side.wickets, side.balls))
        .unwrap_or_default();
    let (opponent_score, opponent_wickets) = room
        .opponent(slot)
        .map(|side| (side.score, side.wickets))
        .unwrap_or_default();

    ScoreLine {
        your_score,
        your_wickets,
        opponent_score,
        opponent_wickets,
        balls,
        overs: overs_label(balls),
    }
}

pub fn winner_name(room: &RoomModel, result: &MatchResult) -> Option<String> {
    match result {
        MatchResult::Winner(slot) => room.sides.get(*slot).map(|side| side.name.clone()),
        MatchResult::Tie => None,
    }
}

/// Final summary sent to every human participant
pub fn summary_message(room: &RoomModel, result: &MatchResult, by_default: bool) -> WebSocketMessage {
    let duration_secs = room
        .started_at
        .map(|started| (Utc::now() - started).num_seconds().max(0))
        .unwrap_or(0);

    WebSocketMessage::game_summary(GameSummaryPayload {
        room_id: room.id.clone(),
        winner: winner_name(room, result),
        tie: *result == MatchResult::Tie,
        by_default,
        scores: room
            .sides
            .iter()
            .map(|side| SideSummary {
                name: side.name.clone(),
                score: side.score,
                wickets: side.wickets,
                balls: side.balls,
            })
            .collect(),
        duration_secs,
    })
}
