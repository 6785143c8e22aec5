// Ball resolution and win evaluation.
//
// A ball resolves only once both participants have a pending move. Equal numbers
// cost both sides a wicket; otherwise each side scores its own number. Either
// way both sides face one more ball. The match ends as soon as one side reaches
// the wicket limit or has faced every ball of the innings.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::room::{models::MAX_PARTICIPANTS, Move, RoomModel, RoomStatus};

/// Outcome tag of a resolved ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BallEvent {
    Wicket,
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Slot of the winning side
    Winner(usize),
    Tie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BallOutcome {
    /// Moves indexed by slot
    pub moves: [Move; 2],
    pub event: BallEvent,
    /// Set when this ball ended the match
    pub result: Option<MatchResult>,
}

/// Resolves the in-flight ball if both moves are present
///
/// Returns `None` and leaves the room untouched otherwise.
pub fn resolve_ball(room: &mut RoomModel) -> Option<BallOutcome> {
    if room.sides.len() != MAX_PARTICIPANTS || room.status != RoomStatus::InProgress {
        return None;
    }
    let first = *room.moves.get(&room.sides[0].participant)?;
    let second = *room.moves.get(&room.sides[1].participant)?;
    room.moves.clear();

    let event = if first == second {
        room.sides.iter_mut().for_each(|side| side.wickets += 1);
        BallEvent::Wicket
    } else {
        room.sides[0].score += first.value() as u32;
        room.sides[1].score += second.value() as u32;
        BallEvent::Run
    };
    room.sides.iter_mut().for_each(|side| side.balls += 1);

    let result = if is_finished(room) {
        room.status = RoomStatus::Done;
        Some(decide_result(room))
    } else {
        None
    };

    Some(BallOutcome {
        moves: [first, second],
        event,
        result,
    })
}

pub fn is_finished(room: &RoomModel) -> bool {
    let max_balls = room.max_balls();
    room.sides
        .iter()
        .any(|side| side.wickets >= room.wicket_limit || side.balls >= max_balls)
}

/// Higher score wins; level scores tie
pub fn decide_result(room: &RoomModel) -> MatchResult {
    match (room.sides.first(), room.sides.get(1)) {
        (Some(a), Some(b)) if a.score > b.score => MatchResult::Winner(0),
        (Some(a), Some(b)) if b.score > a.score => MatchResult::Winner(1),
        _ => MatchResult::Tie,
    }
}

/// Slot that moves after `mover`: the other human, or `mover` again against the AI
pub fn next_turn(room: &RoomModel, mover: usize) -> usize {
    match room.opponent(mover) {
        Some(side) if !side.participant.is_bot() => RoomModel::opponent_slot(mover),
        _ => mover,
    }
}
