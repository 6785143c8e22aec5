use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::logic::{next_turn, resolve_ball, BallOutcome};
use super::summary::{score_line, summary_message, winner_name};
use crate::bot::BotStrategy;
use crate::player::ConnectionId;
use crate::room::{overs_label, Participant, RoomModel, RoomStatus};
use crate::shared::AppError;
use crate::store::{GameStore, SharedStore};
use crate::websockets::broadcast::MessageBroadcaster;
use crate::websockets::messages::{MoveResultPayload, WebSocketMessage};
use crate::websockets::ConnectionManager;

/// Turn Engine: accepts moves, resolves balls and ends matches
pub struct TurnEngine {
    store: SharedStore,
    connections: Arc<dyn ConnectionManager>,
    bot: Arc<dyn BotStrategy>,
}

/// Notification produced inside the critical section, delivered before it ends
struct Outbound {
    to: Vec<ConnectionId>,
    message: WebSocketMessage,
}

impl Outbound {
    fn to_one(connection: ConnectionId, message: WebSocketMessage) -> Self {
        Self {
            to: vec![connection],
            message,
        }
    }
}

impl TurnEngine {
    pub fn new(
        store: SharedStore,
        connections: Arc<dyn ConnectionManager>,
        bot: Arc<dyn BotStrategy>,
    ) -> Self {
        Self {
            store,
            connections,
            bot,
        }
    }

    /// Records a move for the caller and resolves the ball once both sides have moved
    #[instrument(skip(self))]
    pub async fn submit_move(&self, connection: &ConnectionId, number: i64) -> Result<(), AppError> {
        let chosen = crate::room::Move::try_from(number)?;

        let mut guard = self.store.lock().await;
        let store: &mut GameStore = &mut guard;

        let room_id = store.room_id_of(connection)?;
        let room = store
            .rooms
            .get_room_mut(&room_id)
            .ok_or_else(|| AppError::RoomNotFound(room_id.clone()))?;

        if room.status != RoomStatus::InProgress {
            return Err(AppError::GameNotInProgress);
        }
        let slot = room.slot_of(connection).ok_or(AppError::NotInRoom)?;
        if room.turn != slot {
            return Err(AppError::NotYourTurn);
        }

        room.moves
            .insert(room.sides[slot].participant.clone(), chosen);
        debug!(room_id = %room_id, slot, "Move recorded");

        if room.opponent(slot).is_some_and(|side| side.participant.is_bot()) {
            // Drawn after the human's move is stored but independent of it
            let bot_move = self.bot.choose_move();
            debug!(
                room_id = %room_id,
                strategy = self.bot.strategy_name(),
                "Bot move drawn"
            );
            room.moves.insert(Participant::Bot, bot_move);
        }

        let mut outbound = Vec::new();
        let finished = match resolve_ball(room) {
            None => {
                room.turn = RoomModel::opponent_slot(slot);
                outbound.extend(Self::turn_prompt(room));
                false
            }
            Some(outcome) => {
                outbound.extend(Self::move_results(room, &outcome));
                match outcome.result {
                    Some(result) => {
                        info!(
                            room_id = %room_id,
                            winner = ?winner_name(room, &result),
                            "Match finished"
                        );
                        outbound.push(Outbound {
                            to: room.humans(),
                            message: summary_message(room, &result, false),
                        });
                        true
                    }
                    None => {
                        room.turn = next_turn(room, slot);
                        outbound.extend(Self::turn_prompt(room));
                        false
                    }
                }
            }
        };

        Self::sync_player_stats(store, &room_id);
        if finished {
            store.teardown_room(&room_id);
        }

        for Outbound { to, message } in outbound {
            MessageBroadcaster::broadcast_to_players(&self.connections, &to, &message).await;
        }
        Ok(())
    }

    /// `your_turn` for whoever holds the turn pointer, unless it is the AI
    fn turn_prompt(room: &RoomModel) -> Option<Outbound> {
        let side = room.sides.get(room.turn)?;
        let connection = side.participant.connection()?.clone();
        Some(Outbound::to_one(
            connection,
            WebSocketMessage::your_turn(&room.id, side.balls, overs_label(side.balls)),
        ))
    }

    fn move_results(room: &RoomModel, outcome: &BallOutcome) -> Vec<Outbound> {
        let winner = outcome
            .result
            .as_ref()
            .and_then(|result| winner_name(room, result));

        room.sides
            .iter()
            .enumerate()
            .filter_map(|(slot, side)| {
                let connection = side.participant.connection()?.clone();
                let message = WebSocketMessage::move_result(MoveResultPayload {
                    your: outcome.moves[slot].value(),
                    opponent: outcome.moves[RoomModel::opponent_slot(slot)].value(),
                    score: score_line(room, slot),
                    events: outcome.event,
                    game_over: outcome.result.is_some(),
                    winner: winner.clone(),
                });
                Some(Outbound::to_one(connection, message))
            })
            .collect()
    }

    /// Mirrors each human side's tally onto its player record
    fn sync_player_stats(store: &mut GameStore, room_id: &str) {
        let Some(room) = store.rooms.get_room(room_id) else {
            return;
        };
        for side in &room.sides {
            if let Some(player) = side
                .participant
                .connection()
                .and_then(|connection| store.players.lookup_mut(connection))
            {
                player.score = side.score;
                player.wickets = side.wickets;
            }
        }
    }
}
