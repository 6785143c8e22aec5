use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::Display;

use crate::player::ConnectionId;
use crate::shared::AppError;

pub const MAX_PARTICIPANTS: usize = 2;
pub const BALLS_PER_OVER: u32 = 6;
pub const MAX_MOVE: u8 = 6;

/// A number from 0 to 6 submitted for one ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Move(u8);

impl Move {
    /// For values produced internally, already known to be in range
    pub(crate) fn clamped(value: u8) -> Self {
        Self(value.min(MAX_MOVE))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Move {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=MAX_MOVE as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(AppError::InvalidMove(value))
        }
    }
}

/// Occupant of a room slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Participant {
    Human(ConnectionId),
    Bot,
}

impl Participant {
    pub fn is_bot(&self) -> bool {
        matches!(self, Participant::Bot)
    }

    pub fn connection(&self) -> Option<&ConnectionId> {
        match self {
            Participant::Human(connection) => Some(connection),
            Participant::Bot => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    InProgress,
    Done,
}

/// How the room came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoomMode {
    /// Implicit pairing of two waiting connections
    Paired,
    /// Created by one player, joined by id, started by a toss
    Explicit,
    /// A human against the AI substitute
    Bot,
}

/// One participant slot with its running tally
#[derive(Debug, Clone, PartialEq)]
pub struct Side {
    pub participant: Participant,
    pub name: String,
    pub score: u32,
    pub wickets: u32,
    pub balls: u32,
}

impl Side {
    pub fn human(connection: ConnectionId, name: impl Into<String>) -> Self {
        Self::new(Participant::Human(connection), name.into())
    }

    pub fn bot(name: impl Into<String>) -> Self {
        Self::new(Participant::Bot, name.into())
    }

    fn new(participant: Participant, name: String) -> Self {
        Self {
            participant,
            name,
            score: 0,
            wickets: 0,
            balls: 0,
        }
    }

    fn reset(&mut self) {
        self.score = 0;
        self.wickets = 0;
        self.balls = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatEntry {
    pub sender: String,
    pub message: String,
    pub system: bool,
    pub at: DateTime<Utc>,
}

impl ChatEntry {
    pub fn player(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
            system: false,
            at: Utc::now(),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self {
            sender: "system".to_string(),
            message: message.into(),
            system: true,
            at: Utc::now(),
        }
    }
}

/// In-memory state of one match container
#[derive(Debug, Clone)]
pub struct RoomModel {
    pub id: String,
    pub mode: RoomMode,
    /// Slot 0 is the creator
    pub sides: Vec<Side>,
    pub overs: u32,
    pub wicket_limit: u32,
    /// Pending moves of the in-flight ball, cleared on every resolution
    pub moves: HashMap<Participant, Move>,
    pub status: RoomStatus,
    pub toss_winner: Option<usize>,
    pub first_batter: Option<usize>,
    /// Slot that must move next
    pub turn: usize,
    pub chat: Vec<ChatEntry>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}

impl RoomModel {
    pub fn new(id: String, mode: RoomMode, host: Side, overs: u32, wicket_limit: u32) -> Self {
        Self {
            id,
            mode,
            sides: vec![host],
            overs,
            wicket_limit,
            moves: HashMap::new(),
            status: RoomStatus::Waiting,
            toss_winner: None,
            first_batter: None,
            turn: 0,
            chat: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.sides.len() >= MAX_PARTICIPANTS
    }

    pub fn has_bot(&self) -> bool {
        self.sides.iter().any(|side| side.participant.is_bot())
    }

    pub fn slot_of(&self, connection: &ConnectionId) -> Option<usize> {
        self.sides
            .iter()
            .position(|side| side.participant.connection() == Some(connection))
    }

    pub fn has_participant(&self, connection: &ConnectionId) -> bool {
        self.slot_of(connection).is_some()
    }

    pub fn opponent_slot(slot: usize) -> usize {
        1 - slot
    }

    pub fn opponent(&self, slot: usize) -> Option<&Side> {
        self.sides.get(Self::opponent_slot(slot))
    }

    pub fn add_side(&mut self, side: Side) -> Result<usize, AppError> {
        if let Some(connection) = side.participant.connection() {
            if self.has_participant(connection) {
                return Err(AppError::AlreadyInRoom);
            }
        }
        if self.is_full() {
            return Err(AppError::RoomFull);
        }
        self.sides.push(side);
        Ok(self.sides.len() - 1)
    }

    pub fn remove_participant(&mut self, connection: &ConnectionId) -> Option<Side> {
        let slot = self.slot_of(connection)?;
        self.moves.remove(&self.sides[slot].participant);
        Some(self.sides.remove(slot))
    }

    /// Connections of every human participant
    pub fn humans(&self) -> Vec<ConnectionId> {
        self.sides
            .iter()
            .filter_map(|side| side.participant.connection().cloned())
            .collect()
    }

    pub fn humans_except(&self, connection: &ConnectionId) -> Vec<ConnectionId> {
        self.humans()
            .into_iter()
            .filter(|c| c != connection)
            .collect()
    }

    /// Opens the match with `first` leading every ball
    pub fn start_match(&mut self, first: usize) {
        self.sides.iter_mut().for_each(Side::reset);
        self.moves.clear();
        self.first_batter = Some(first);
        self.turn = first;
        self.status = RoomStatus::InProgress;
        self.started_at = Some(Utc::now());
    }

    /// Back to an open lobby after a participant left
    pub fn reset_to_waiting(&mut self) {
        self.sides.iter_mut().for_each(Side::reset);
        self.moves.clear();
        self.toss_winner = None;
        self.first_batter = None;
        self.turn = 0;
        self.status = RoomStatus::Waiting;
        self.started_at = None;
    }

    /// Replaces a retired connection handle everywhere in the room
    pub fn rekey(&mut self, old: &ConnectionId, new: &ConnectionId) {
        let old_participant = Participant::Human(old.clone());
        let new_participant = Participant::Human(new.clone());

        for side in self.sides.iter_mut() {
            if side.participant == old_participant {
                side.participant = new_participant.clone();
            }
        }
        if let Some(pending) = self.moves.remove(&old_participant) {
            self.moves.insert(new_participant, pending);
        }
    }

    pub fn push_chat(&mut self, entry: ChatEntry) {
        self.chat.push(entry);
    }

    pub fn max_balls(&self) -> u32 {
        self.overs * BALLS_PER_OVER
    }
}

/// Cricket over notation, e.g. 8 balls -> "1.2"
pub fn overs_label(balls: u32) -> String {
    format!("{}.{}", balls / BALLS_PER_OVER, balls % BALLS_PER_OVER)
}
