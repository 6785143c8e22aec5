use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum_macros::Display;
use thiserror::Error;

use crate::bot::{BotStrategy, RandomBotStrategy};
use crate::config::GameConfig;
use crate::game::TurnEngine;
use crate::matchmaking::Matchmaker;
use crate::room::service::RoomService;
use crate::session::SessionSupervisor;
use crate::store::{GameStore, SharedStore};
use crate::websockets::ConnectionManager;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: GameConfig,
    pub store: SharedStore,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub matchmaker: Arc<Matchmaker>,
    pub turn_engine: Arc<TurnEngine>,
    pub room_service: Arc<RoomService>,
    pub supervisor: SessionSupervisor,
}

impl AppState {
    pub fn new(config: GameConfig, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self::with_bot_strategy(config, connection_manager, Arc::new(RandomBotStrategy::new()))
    }

    /// Builds the state with a specific AI strategy
    pub fn with_bot_strategy(
        config: GameConfig,
        connection_manager: Arc<dyn ConnectionManager>,
        bot_strategy: Arc<dyn BotStrategy>,
    ) -> Self {
        let store = GameStore::shared();

        let matchmaker = Arc::new(Matchmaker::new(
            store.clone(),
            connection_manager.clone(),
            config.clone(),
        ));
        let turn_engine = Arc::new(TurnEngine::new(
            store.clone(),
            connection_manager.clone(),
            bot_strategy,
        ));
        let room_service = Arc::new(RoomService::new(store.clone(), connection_manager.clone()));
        let supervisor = SessionSupervisor::new(
            store.clone(),
            connection_manager.clone(),
            config.grace_period,
        );

        Self {
            config,
            store,
            connection_manager,
            matchmaker,
            turn_engine,
            room_service,
            supervisor,
        }
    }
}

/// Broad classes of failure reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    InvalidState,
    NotFound,
    Conflict,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Invalid move {0}: pick a number from 0 to 6")]
    InvalidMove(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("It is not your turn")]
    NotYourTurn,

    #[error("Game is not in progress")]
    GameNotInProgress,

    #[error("Toss has already been done")]
    TossAlreadyDone,

    #[error("Toss has not been done yet")]
    TossNotDone,

    #[error("Only the toss winner can choose to bat or bowl")]
    NotTossWinner,

    #[error("Room needs two players first")]
    RoomNotReady,

    #[error("You are not in a room")]
    NotInRoom,

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Session not found, start a new game")]
    SessionNotFound,

    #[error("Player not found, join first")]
    PlayerNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Already in a room")]
    AlreadyInRoom,

    #[error("Room already exists: {0}")]
    RoomAlreadyExists(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidMove(_) | AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::NotYourTurn
            | AppError::GameNotInProgress
            | AppError::TossAlreadyDone
            | AppError::TossNotDone
            | AppError::NotTossWinner
            | AppError::RoomNotReady
            | AppError::NotInRoom => ErrorKind::InvalidState,
            AppError::RoomNotFound(_) | AppError::SessionNotFound | AppError::PlayerNotFound => {
                ErrorKind::NotFound
            }
            AppError::RoomFull | AppError::AlreadyInRoom | AppError::RoomAlreadyExists(_) => {
                ErrorKind::Conflict
            }
        }
    }
}
