use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::game::BallEvent;
use crate::room::{ChatEntry, RoomStatus};
use crate::shared::ErrorKind;

/// Inbound events, validated at the boundary before they reach the core
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        name: String,
        #[serde(default)]
        ai: bool,
    },
    #[serde(alias = "createRoom")]
    CreateRoom {
        overs: u32,
        wickets: u32,
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(alias = "joinRoom")]
    JoinRoom {
        room_id: String,
        #[serde(default)]
        name: Option<String>,
    },
    Toss(Option<EmptyPayload>),
    TossChoice {
        choice: TossChoice,
    },
    #[serde(alias = "play")]
    PlayTurn {
        number: i64,
    },
    ReconnectPlayer {
        player_id: String,
        #[serde(default)]
        name: Option<String>,
    },
    LeaveRoom(Option<EmptyPayload>),
    Chat {
        msg: String,
    },
}

/// Body of events that carry no fields; `{}`, `null` and an absent payload all decode
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TossChoice {
    Bat,
    Bowl,
}

/// Message types for WebSocket communication (server -> client)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Waiting,
    Start,
    RoomCreated,
    RoomJoined,
    TossResult,
    MatchStart,
    YourTurn,
    MoveResult,
    GameSummary,
    Chat,
    ReconnectSuccess,
    ReconnectFailed,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Envelope of every outbound message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPayload {
    pub room_id: String,
    pub opponent: String,
    pub you_first: bool,
    /// Durable token to present on reconnect
    pub player_id: String,
    pub overs: u32,
    pub wickets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreatedPayload {
    pub room_id: String,
    pub overs: u32,
    pub wickets: u32,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomJoinedPayload {
    pub room_id: String,
    pub players: Vec<String>,
    pub overs: u32,
    pub wickets: u32,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TossResultPayload {
    pub you_win: bool,
    /// Options open to the recipient; empty for the toss loser
    pub choose: Vec<TossChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStartPayload {
    pub room_id: String,
    pub opponent: String,
    pub you_bat: bool,
    pub you_first: bool,
    pub overs: u32,
    pub wickets: u32,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YourTurnPayload {
    pub room_id: String,
    pub balls: u32,
    pub overs: String,
}

/// Score line from the recipient's point of view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreLine {
    pub your_score: u32,
    pub your_wickets: u32,
    pub opponent_score: u32,
    pub opponent_wickets: u32,
    pub balls: u32,
    pub overs: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResultPayload {
    pub your: u8,
    pub opponent: u8,
    pub score: ScoreLine,
    pub events: BallEvent,
    pub game_over: bool,
    pub winner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SideSummary {
    pub name: String,
    pub score: u32,
    pub wickets: u32,
    pub balls: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummaryPayload {
    pub room_id: String,
    pub winner: Option<String>,
    pub tie: bool,
    /// Decided by abandonment rather than play
    pub by_default: bool,
    pub scores: Vec<SideSummary>,
    pub duration_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub sender: String,
    pub message: String,
    pub system: bool,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpponentSnapshot {
    pub name: String,
    pub score: u32,
    pub wickets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectSuccessPayload {
    pub player_id: String,
    pub name: String,
    pub room_id: Option<String>,
    pub status: Option<RoomStatus>,
    pub your_score: u32,
    pub your_wickets: u32,
    pub opponent: Option<OpponentSnapshot>,
    pub your_turn: bool,
    pub balls: u32,
    pub chat: Vec<ChatPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectFailedPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    pub kind: ErrorKind,
}

impl From<&ChatEntry> for ChatPayload {
    fn from(entry: &ChatEntry) -> Self {
        Self {
            sender: entry.sender.clone(),
            message: entry.message.clone(),
            system: entry.system,
            at: entry.at,
        }
    }
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    fn with_payload<T: Serialize>(message_type: MessageType, payload: &T) -> Self {
        Self::new(
            message_type,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    pub fn waiting(message: impl Into<String>) -> Self {
        Self::with_payload(
            MessageType::Waiting,
            &WaitingPayload {
                message: message.into(),
            },
        )
    }

    pub fn start(payload: StartPayload) -> Self {
        Self::with_payload(MessageType::Start, &payload)
    }

    pub fn room_created(payload: RoomCreatedPayload) -> Self {
        Self::with_payload(MessageType::RoomCreated, &payload)
    }

    pub fn room_joined(payload: RoomJoinedPayload) -> Self {
        Self::with_payload(MessageType::RoomJoined, &payload)
    }

    pub fn toss_result(you_win: bool) -> Self {
        let choose = if you_win {
            vec![TossChoice::Bat, TossChoice::Bowl]
        } else {
            vec![]
        };
        Self::with_payload(MessageType::TossResult, &TossResultPayload { you_win, choose })
    }

    pub fn match_start(payload: MatchStartPayload) -> Self {
        Self::with_payload(MessageType::MatchStart, &payload)
    }

    pub fn your_turn(room_id: &str, balls: u32, overs: String) -> Self {
        Self::with_payload(
            MessageType::YourTurn,
            &YourTurnPayload {
                room_id: room_id.to_string(),
                balls,
                overs,
            },
        )
    }

    pub fn move_result(payload: MoveResultPayload) -> Self {
        Self::with_payload(MessageType::MoveResult, &payload)
    }

    pub fn game_summary(payload: GameSummaryPayload) -> Self {
        Self::with_payload(MessageType::GameSummary, &payload)
    }

    pub fn chat(entry: &ChatEntry) -> Self {
        Self::with_payload(MessageType::Chat, &ChatPayload::from(entry))
    }

    pub fn reconnect_success(payload: ReconnectSuccessPayload) -> Self {
        Self::with_payload(MessageType::ReconnectSuccess, &payload)
    }

    pub fn reconnect_failed(message: impl Into<String>) -> Self {
        Self::with_payload(
            MessageType::ReconnectFailed,
            &ReconnectFailedPayload {
                message: message.into(),
            },
        )
    }

    pub fn error(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self::with_payload(
            MessageType::Error,
            &ErrorPayload {
                message: message.into(),
                kind,
            },
        )
    }
}
