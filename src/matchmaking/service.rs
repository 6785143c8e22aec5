use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::bot::bot_display_name;
use crate::config::{GameConfig, MAX_OVERS, MAX_WICKETS};
use crate::player::{generate_display_name, ConnectionId};
use crate::room::models::MAX_PARTICIPANTS;
use crate::room::{overs_label, RoomMode, RoomModel, RoomStatus, Side};
use crate::shared::AppError;
use crate::store::{GameStore, SharedStore};
use crate::websockets::broadcast::MessageBroadcaster;
use crate::websockets::messages::{
    MatchStartPayload, RoomCreatedPayload, RoomJoinedPayload, StartPayload, TossChoice,
    WebSocketMessage,
};
use crate::websockets::ConnectionManager;

/// Matchmaker: implicit pairing, explicit rooms with a toss, and AI rooms
pub struct Matchmaker {
    store: SharedStore,
    connections: Arc<dyn ConnectionManager>,
    config: GameConfig,
}

impl Matchmaker {
    pub fn new(
        store: SharedStore,
        connections: Arc<dyn ConnectionManager>,
        config: GameConfig,
    ) -> Self {
        Self {
            store,
            connections,
            config,
        }
    }

    /// Pairs the caller with a waiting player, starts an AI match, or queues the caller
    #[instrument(skip(self))]
    pub async fn join(&self, connection: &ConnectionId, name: &str, ai: bool) -> Result<(), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
        }

        let mut guard = self.store.lock().await;
        let store: &mut GameStore = &mut guard;
        Self::ensure_unattached(store, connection)?;
        store.players.register(connection, name);

        if ai {
            return self.start_bot_match(store, connection, name).await;
        }

        // Lookup and room creation share one critical section so a waiting
        // player is never paired twice.
        match store.players.find_waiting(connection) {
            Some(waiting) => self.start_paired_match(store, &waiting, connection).await,
            None => {
                if let Some(player) = store.players.lookup_mut(connection) {
                    player.waiting = true;
                }
                info!(connection = %connection, "Player waiting for an opponent");
                MessageBroadcaster::send_to_player(
                    &self.connections,
                    connection,
                    &WebSocketMessage::waiting("Waiting for an opponent..."),
                )
                .await;
                Ok(())
            }
        }
    }

    async fn start_bot_match(
        &self,
        store: &mut GameStore,
        connection: &ConnectionId,
        name: &str,
    ) -> Result<(), AppError> {
        let room_id = store.rooms.allocate_id(connection);
        let bot_name = bot_display_name();
        let mut room = RoomModel::new(
            room_id.clone(),
            RoomMode::Bot,
            Side::human(connection.clone(), name),
            self.config.default_overs,
            self.config.default_wickets,
        );
        room.add_side(Side::bot(bot_name.clone()))?;
        room.start_match(0);
        store.rooms.create_room(room)?;

        let player = store
            .players
            .lookup_mut(connection)
            .ok_or(AppError::PlayerNotFound)?;
        player.enter_room(&room_id);
        let player_id = player.token.to_string();

        info!(room_id = %room_id, bot = %bot_name, "AI match started");
        let start = WebSocketMessage::start(StartPayload {
            room_id: room_id.clone(),
            opponent: bot_name,
            you_first: true,
            player_id,
            overs: self.config.default_overs,
            wickets: self.config.default_wickets,
        });
        MessageBroadcaster::send_to_player(&self.connections, connection, &start).await;
        MessageBroadcaster::send_to_player(
            &self.connections,
            connection,
            &WebSocketMessage::your_turn(&room_id, 0, overs_label(0)),
        )
        .await;
        Ok(())
    }

    async fn start_paired_match(
        &self,
        store: &mut GameStore,
        waiting: &ConnectionId,
        joiner: &ConnectionId,
    ) -> Result<(), AppError> {
        let room_id = store.rooms.allocate_id(waiting);
        let waiting_name = Self::display_name(store, waiting);
        let joiner_name = Self::display_name(store, joiner);

        let mut room = RoomModel::new(
            room_id.clone(),
            RoomMode::Paired,
            Side::human(waiting.clone(), waiting_name),
            self.config.default_overs,
            self.config.default_wickets,
        );
        room.add_side(Side::human(joiner.clone(), joiner_name))?;
        let first = rand::rng().random_range(0..MAX_PARTICIPANTS);
        room.start_match(first);

        let sides: Vec<(ConnectionId, String)> = room
            .sides
            .iter()
            .filter_map(|side| Some((side.participant.connection()?.clone(), side.name.clone())))
            .collect();
        store.rooms.create_room(room)?;

        let mut tokens = Vec::with_capacity(sides.len());
        for (connection, _) in &sides {
            let player = store
                .players
                .lookup_mut(connection)
                .ok_or(AppError::PlayerNotFound)?;
            player.enter_room(&room_id);
            tokens.push(player.token.to_string());
        }

        info!(
            room_id = %room_id,
            first_mover = %sides[first].1,
            "Players paired"
        );
        for (slot, ((connection, _), player_id)) in sides.iter().zip(tokens).enumerate() {
            let start = WebSocketMessage::start(StartPayload {
                room_id: room_id.clone(),
                opponent: sides[RoomModel::opponent_slot(slot)].1.clone(),
                you_first: slot == first,
                player_id,
                overs: self.config.default_overs,
                wickets: self.config.default_wickets,
            });
            MessageBroadcaster::send_to_player(&self.connections, connection, &start).await;
        }
        MessageBroadcaster::send_to_player(
            &self.connections,
            &sides[first].0,
            &WebSocketMessage::your_turn(&room_id, 0, overs_label(0)),
        )
        .await;
        Ok(())
    }

    /// Opens an explicit room that a second player joins by id
    #[instrument(skip(self))]
    pub async fn create_room(
        &self,
        connection: &ConnectionId,
        name: Option<String>,
        overs: u32,
        wickets: u32,
    ) -> Result<String, AppError> {
        if !(1..=MAX_OVERS).contains(&overs) {
            return Err(AppError::InvalidInput(format!(
                "Overs must be between 1 and {}",
                MAX_OVERS
            )));
        }
        if !(1..=MAX_WICKETS).contains(&wickets) {
            return Err(AppError::InvalidInput(format!(
                "Wickets must be between 1 and {}",
                MAX_WICKETS
            )));
        }

        let mut guard = self.store.lock().await;
        let store: &mut GameStore = &mut guard;
        Self::ensure_unattached(store, connection)?;

        let name = Self::resolve_name(store, connection, name);
        let room_id = store.rooms.allocate_id(connection);
        store.rooms.create_room(RoomModel::new(
            room_id.clone(),
            RoomMode::Explicit,
            Side::human(connection.clone(), name.clone()),
            overs,
            wickets,
        ))?;

        let player = store.players.register(connection, &name);
        player.enter_room(&room_id);
        let player_id = player.token.to_string();

        info!(room_id = %room_id, overs, wickets, "Explicit room opened");
        MessageBroadcaster::send_to_player(
            &self.connections,
            connection,
            &WebSocketMessage::room_created(RoomCreatedPayload {
                room_id: room_id.clone(),
                overs,
                wickets,
                player_id,
            }),
        )
        .await;
        Ok(room_id)
    }

    /// Takes the second slot of an explicit room
    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        connection: &ConnectionId,
        room_id: &str,
        name: Option<String>,
    ) -> Result<(), AppError> {
        let mut guard = self.store.lock().await;
        let store: &mut GameStore = &mut guard;

        let room = store
            .rooms
            .get_room(room_id)
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))?;
        if room.has_participant(connection) {
            return Err(AppError::AlreadyInRoom);
        }
        if room.is_full() {
            return Err(AppError::RoomFull);
        }
        Self::ensure_unattached(store, connection)?;

        let name = Self::resolve_name(store, connection, name);
        let room = store
            .rooms
            .get_room_mut(room_id)
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))?;
        room.add_side(Side::human(connection.clone(), name.clone()))?;
        let (overs, wickets) = (room.overs, room.wicket_limit);
        let players: Vec<String> = room.sides.iter().map(|side| side.name.clone()).collect();
        let humans = room.humans();

        store.players.register(connection, &name).enter_room(room_id);

        info!(room_id = %room_id, players = ?players, "Second player joined room");
        for human in &humans {
            let player_id = store
                .players
                .lookup(human)
                .map(|player| player.token.to_string())
                .unwrap_or_default();
            let joined = WebSocketMessage::room_joined(RoomJoinedPayload {
                room_id: room_id.to_string(),
                players: players.clone(),
                overs,
                wickets,
                player_id,
            });
            MessageBroadcaster::send_to_player(&self.connections, human, &joined).await;
        }
        Ok(())
    }

    /// Picks the toss winner of a full explicit room
    #[instrument(skip(self))]
    pub async fn toss(&self, connection: &ConnectionId) -> Result<(), AppError> {
        let mut guard = self.store.lock().await;
        let room_id = guard.room_id_of(connection)?;
        let room = guard
            .rooms
            .get_room_mut(&room_id)
            .ok_or_else(|| AppError::RoomNotFound(room_id.clone()))?;

        if room.toss_winner.is_some() || room.status != RoomStatus::Waiting {
            return Err(AppError::TossAlreadyDone);
        }
        if !room.is_full() {
            return Err(AppError::RoomNotReady);
        }

        let winner = rand::rng().random_range(0..MAX_PARTICIPANTS);
        room.toss_winner = Some(winner);
        info!(room_id = %room_id, winner = %room.sides[winner].name, "Toss decided");

        for (slot, side) in room.sides.iter().enumerate() {
            if let Some(human) = side.participant.connection() {
                MessageBroadcaster::send_to_player(
                    &self.connections,
                    human,
                    &WebSocketMessage::toss_result(slot == winner),
                )
                .await;
            }
        }
        Ok(())
    }

    /// Records the toss winner's choice and starts the match
    #[instrument(skip(self))]
    pub async fn toss_choice(&self, connection: &ConnectionId, choice: TossChoice) -> Result<(), AppError> {
        let mut guard = self.store.lock().await;
        let store: &mut GameStore = &mut guard;
        let room_id = store.room_id_of(connection)?;
        let room = store
            .rooms
            .get_room_mut(&room_id)
            .ok_or_else(|| AppError::RoomNotFound(room_id.clone()))?;

        if room.status != RoomStatus::Waiting {
            return Err(AppError::TossAlreadyDone);
        }
        let winner = room.toss_winner.ok_or(AppError::TossNotDone)?;
        if room.slot_of(connection) != Some(winner) {
            return Err(AppError::NotTossWinner);
        }

        let batter = match choice {
            TossChoice::Bat => winner,
            TossChoice::Bowl => RoomModel::opponent_slot(winner),
        };
        room.start_match(batter);
        info!(
            room_id = %room_id,
            choice = %choice,
            batter = %room.sides[batter].name,
            "Match started after toss"
        );

        let room = room.clone();
        for (slot, side) in room.sides.iter().enumerate() {
            let Some(human) = side.participant.connection() else {
                continue;
            };
            let player_id = match store.players.lookup_mut(human) {
                Some(player) => {
                    player.reset_stats();
                    player.token.to_string()
                }
                None => String::new(),
            };
            let opponent = room
                .opponent(slot)
                .map(|side| side.name.clone())
                .unwrap_or_default();
            let start = WebSocketMessage::match_start(MatchStartPayload {
                room_id: room_id.clone(),
                opponent,
                you_bat: slot == batter,
                you_first: slot == batter,
                overs: room.overs,
                wickets: room.wicket_limit,
                player_id,
            });
            MessageBroadcaster::send_to_player(&self.connections, human, &start).await;
        }

        if let Some(batter_connection) = room.sides[batter].participant.connection() {
            MessageBroadcaster::send_to_player(
                &self.connections,
                batter_connection,
                &WebSocketMessage::your_turn(&room_id, 0, overs_label(0)),
            )
            .await;
        }
        Ok(())
    }

    fn ensure_unattached(store: &GameStore, connection: &ConnectionId) -> Result<(), AppError> {
        match store.players.lookup(connection) {
            Some(player) if player.is_attached() => Err(AppError::AlreadyInRoom),
            _ => Ok(()),
        }
    }

    /// Supplied name, else the registered one, else a generated one
    fn resolve_name(store: &GameStore, connection: &ConnectionId, name: Option<String>) -> String {
        name.map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .or_else(|| store.players.lookup(connection).map(|p| p.name.clone()))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                let generated = generate_display_name();
                debug!(connection = %connection, name = %generated, "Generated display name");
                generated
            })
    }

    fn display_name(store: &GameStore, connection: &ConnectionId) -> String {
        store
            .players
            .lookup(connection)
            .map(|player| player.name.clone())
            .unwrap_or_default()
    }
}
