use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::game::{summary_message, MatchResult};
use crate::player::{ConnectionId, PlayerToken};
use crate::room::{ChatEntry, RoomModel, RoomStatus};
use crate::shared::AppError;
use crate::store::{GameStore, SharedStore};
use crate::websockets::broadcast::MessageBroadcaster;
use crate::websockets::messages::{
    ChatPayload, OpponentSnapshot, ReconnectSuccessPayload, WebSocketMessage,
};
use crate::websockets::ConnectionManager;

/// Pending forfeits are scoped to one (player, room) pair
type TimerKey = (PlayerToken, String);

/// Session Supervisor: disconnect grace, reconnect, forfeit and voluntary leave
///
/// Every decision runs inside the store's critical section. The grace timer
/// re-checks cancellation and liveness after taking the lock, so a reconnect
/// and an expiring timer can never both take effect: whichever locks first wins.
#[derive(Clone)]
pub struct SessionSupervisor {
    store: SharedStore,
    connections: Arc<dyn ConnectionManager>,
    grace_period: Duration,
    timers: Arc<Mutex<HashMap<TimerKey, CancellationToken>>>,
}

impl SessionSupervisor {
    pub fn new(
        store: SharedStore,
        connections: Arc<dyn ConnectionManager>,
        grace_period: Duration,
    ) -> Self {
        Self {
            store,
            connections,
            grace_period,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Transport reported the connection gone
    #[instrument(skip(self))]
    pub async fn handle_disconnect(&self, connection: &ConnectionId) {
        let mut guard = self.store.lock().await;
        let store: &mut GameStore = &mut guard;

        let Some(player) = store.players.lookup(connection) else {
            debug!("Disconnect of unregistered or retired connection ignored");
            return;
        };
        let Some(room_id) = player.room_id.clone() else {
            store.players.remove(connection);
            return;
        };
        let token = player.token.clone();
        let name = player.name.clone();
        store.players.mark_disconnected(connection);

        if let Some(room) = store.rooms.get_room_mut(&room_id) {
            let notice = ChatEntry::system(format!("{} disconnected, waiting for them to return", name));
            let message = WebSocketMessage::chat(&notice);
            room.push_chat(notice);
            let others = room.humans_except(connection);
            MessageBroadcaster::broadcast_to_players(&self.connections, &others, &message).await;
        }

        self.schedule_forfeit(token, room_id).await;
    }

    /// Arms the grace timer; called with the store lock held
    async fn schedule_forfeit(&self, token: PlayerToken, room_id: String) {
        let cancel = CancellationToken::new();
        let key = (token.clone(), room_id.clone());
        if let Some(previous) = self.timers.lock().await.insert(key, cancel.clone()) {
            previous.cancel();
        }
        info!(
            token = %token,
            room_id = %room_id,
            grace_secs = self.grace_period.as_secs_f64(),
            "Forfeit scheduled"
        );

        let supervisor = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(token = %token, room_id = %room_id, "Forfeit timer cancelled");
                }
                _ = tokio::time::sleep(supervisor.grace_period) => {
                    supervisor.expire_grace(&token, &room_id, &cancel).await;
                }
            }
        });
    }

    async fn expire_grace(&self, token: &PlayerToken, room_id: &str, cancel: &CancellationToken) {
        let mut guard = self.store.lock().await;
        if cancel.is_cancelled() {
            return;
        }
        self.timers
            .lock()
            .await
            .remove(&(token.clone(), room_id.to_string()));

        let store: &mut GameStore = &mut guard;
        let connection = match store.players.find_by_token(token) {
            Some(player) if !player.live && player.room_id.as_deref() == Some(room_id) => {
                player.connection.clone()
            }
            _ => {
                debug!(token = %token, room_id = %room_id, "Grace expired with nothing to forfeit");
                return;
            }
        };

        warn!(token = %token, room_id = %room_id, "Reconnect window elapsed, forfeiting");
        self.forfeit(store, &connection, room_id).await;
    }

    /// Ends the room in the opponent's favour and purges the absent player
    async fn forfeit(&self, store: &mut GameStore, connection: &ConnectionId, room_id: &str) {
        let name = store
            .players
            .lookup(connection)
            .map(|player| player.name.clone())
            .unwrap_or_default();

        if let Some(room) = store.rooms.get_room_mut(room_id) {
            let remaining = room.humans_except(connection);
            let message = match (room.status, room.slot_of(connection)) {
                (RoomStatus::InProgress, Some(slot)) => {
                    room.status = RoomStatus::Done;
                    summary_message(room, &MatchResult::Winner(RoomModel::opponent_slot(slot)), true)
                }
                _ => {
                    let notice = ChatEntry::system(format!("{} did not return, room closed", name));
                    let message = WebSocketMessage::chat(&notice);
                    room.push_chat(notice);
                    message
                }
            };
            MessageBroadcaster::broadcast_to_players(&self.connections, &remaining, &message).await;
        }

        store.teardown_room(room_id);
        store.players.remove(connection);
    }

    /// Restores a durable identity onto a new connection and pushes the game snapshot
    #[instrument(skip(self))]
    pub async fn reconnect(
        &self,
        connection: &ConnectionId,
        player_id: &str,
        name: Option<String>,
    ) -> Result<(), AppError> {
        let token = PlayerToken::from(player_id);
        let mut guard = self.store.lock().await;
        let store: &mut GameStore = &mut guard;

        if store.players.find_by_token(&token).is_none() {
            return Err(AppError::SessionNotFound);
        }
        if let Some(current) = store.players.lookup(connection) {
            if current.token != token && current.is_attached() {
                return Err(AppError::AlreadyInRoom);
            }
        }

        let retired = store.reassociate(&token, connection)?;
        let player = store
            .players
            .lookup_mut(connection)
            .ok_or(AppError::SessionNotFound)?;
        if let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            player.name = name;
        }
        let name = player.name.clone();
        let room_id = player.room_id.clone();

        if let Some(room_id) = &room_id {
            if let Some(cancel) = self
                .timers
                .lock()
                .await
                .remove(&(token.clone(), room_id.clone()))
            {
                cancel.cancel();
            }
        }

        let room = room_id
            .as_deref()
            .and_then(|id| store.rooms.get_room_mut(id));
        let payload = match room {
            Some(room) => {
                let slot = room.slot_of(connection);
                if let Some(side) = slot.and_then(|s| room.sides.get_mut(s)) {
                    side.name = name.clone();
                }
                let notice = ChatEntry::system(format!("{} reconnected", name));
                let message = WebSocketMessage::chat(&notice);
                room.push_chat(notice);
                let others = room.humans_except(connection);
                MessageBroadcaster::broadcast_to_players(&self.connections, &others, &message).await;

                Self::snapshot(room, slot, &token, &name)
            }
            None => ReconnectSuccessPayload {
                player_id: token.to_string(),
                name: name.clone(),
                room_id: None,
                status: None,
                your_score: 0,
                your_wickets: 0,
                opponent: None,
                your_turn: false,
                balls: 0,
                chat: Vec::new(),
            },
        };

        info!(
            token = %token,
            retired = %retired,
            room_id = ?room_id,
            "Player reconnected"
        );
        MessageBroadcaster::send_to_player(
            &self.connections,
            connection,
            &WebSocketMessage::reconnect_success(payload),
        )
        .await;
        Ok(())
    }

    fn snapshot(
        room: &RoomModel,
        slot: Option<usize>,
        token: &PlayerToken,
        name: &str,
    ) -> ReconnectSuccessPayload {
        let own = slot.and_then(|s| room.sides.get(s));
        let opponent = slot.and_then(|s| room.opponent(s)).map(|side| OpponentSnapshot {
            name: side.name.clone(),
            score: side.score,
            wickets: side.wickets,
        });

        ReconnectSuccessPayload {
            player_id: token.to_string(),
            name: name.to_string(),
            room_id: Some(room.id.clone()),
            status: Some(room.status),
            your_score: own.map_or(0, |side| side.score),
            your_wickets: own.map_or(0, |side| side.wickets),
            opponent,
            your_turn: room.status == RoomStatus::InProgress && slot == Some(room.turn),
            balls: own.map_or(0, |side| side.balls),
            chat: room.chat.iter().map(ChatPayload::from).collect(),
        }
    }

    /// Immediate, voluntary exit from the caller's room
    #[instrument(skip(self))]
    pub async fn leave_room(&self, connection: &ConnectionId) -> Result<(), AppError> {
        let mut guard = self.store.lock().await;
        let store: &mut GameStore = &mut guard;

        let room_id = store.room_id_of(connection)?;
        let name = store
            .players
            .lookup(connection)
            .map(|player| player.name.clone())
            .unwrap_or_default();
        let room = store
            .rooms
            .get_room_mut(&room_id)
            .ok_or_else(|| AppError::RoomNotFound(room_id.clone()))?;
        let remaining = room.humans_except(connection);

        if room.has_bot() || remaining.is_empty() {
            store.teardown_room(&room_id);
            info!(room_id = %room_id, "Room closed after last human left");
            return Ok(());
        }

        if room.status == RoomStatus::InProgress {
            if let Some(slot) = room.slot_of(connection) {
                let winner = MatchResult::Winner(RoomModel::opponent_slot(slot));
                let summary = summary_message(room, &winner, true);
                MessageBroadcaster::broadcast_to_players(&self.connections, &remaining, &summary)
                    .await;
            }
        }

        room.remove_participant(connection);
        room.reset_to_waiting();
        let notice = ChatEntry::system(format!("{} left the room", name));
        let message = WebSocketMessage::chat(&notice);
        room.push_chat(notice);
        MessageBroadcaster::broadcast_to_players(&self.connections, &remaining, &message).await;

        for other in &remaining {
            if let Some(player) = store.players.lookup_mut(other) {
                player.reset_stats();
            }
        }
        if let Some(leaver) = store.players.lookup_mut(connection) {
            leaver.room_id = None;
            leaver.reset_stats();
        }

        info!(room_id = %room_id, "Player left, room reopened");
        Ok(())
    }

    /// Number of armed forfeit timers
    pub async fn pending_forfeits(&self) -> usize {
        self.timers.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{RoomMode, Side};
    use crate::websockets::InMemoryConnectionManager;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::from(id)
    }

    async fn supervisor_with_match(grace: Duration) -> (SessionSupervisor, SharedStore, PlayerToken) {
        let store = GameStore::shared();
        let token = {
            let mut guard = store.lock().await;
            let token = guard.players.register(&conn("a"), "alice").token.clone();
            guard.players.lookup_mut(&conn("a")).unwrap().enter_room("room_a");
            guard.players.register(&conn("b"), "bob").enter_room("room_a");
            let mut room = RoomModel::new(
                "room_a".into(),
                RoomMode::Paired,
                Side::human(conn("a"), "alice"),
                2,
                2,
            );
            room.add_side(Side::human(conn("b"), "bob")).unwrap();
            room.start_match(0);
            guard.rooms.create_room(room).unwrap();
            token
        };
        let supervisor =
            SessionSupervisor::new(store.clone(), Arc::new(InMemoryConnectionManager::new()), grace);
        (supervisor, store, token)
    }

    #[tokio::test]
    async fn test_disconnect_arms_timer_and_reconnect_cancels_it() {
        let (supervisor, store, token) = supervisor_with_match(Duration::from_secs(60)).await;

        supervisor.handle_disconnect(&conn("a")).await;
        assert_eq!(supervisor.pending_forfeits().await, 1);
        assert!(!store.lock().await.players.lookup(&conn("a")).unwrap().live);

        supervisor
            .reconnect(&conn("a2"), token.as_str(), None)
            .await
            .unwrap();

        assert_eq!(supervisor.pending_forfeits().await, 0);
        let guard = store.lock().await;
        assert!(guard.players.lookup(&conn("a2")).unwrap().live);
        assert_eq!(guard.rooms.get_room("room_a").unwrap().slot_of(&conn("a2")), Some(0));
    }

    #[tokio::test]
    async fn test_expired_grace_forfeits_match() {
        let (supervisor, store, token) = supervisor_with_match(Duration::from_millis(30)).await;

        supervisor.handle_disconnect(&conn("a")).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        {
            let guard = store.lock().await;
            assert!(!guard.rooms.contains("room_a"));
            assert!(guard.players.find_by_token(&token).is_none());
            assert!(guard.players.lookup(&conn("b")).unwrap().room_id.is_none());
        }
        assert_eq!(
            supervisor.reconnect(&conn("a2"), token.as_str(), None).await,
            Err(AppError::SessionNotFound)
        );
    }

    async fn armed_timer(supervisor: &SessionSupervisor, token: &PlayerToken) -> CancellationToken {
        supervisor
            .timers
            .lock()
            .await
            .get(&(token.clone(), "room_a".to_string()))
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_expiry_after_reconnect_keeps_room() {
        let (supervisor, store, token) = supervisor_with_match(Duration::from_secs(60)).await;
        supervisor.handle_disconnect(&conn("a")).await;
        let cancel = armed_timer(&supervisor, &token).await;

        // Reconnect wins the lock; the sleeping branch arrives afterwards
        supervisor
            .reconnect(&conn("a2"), token.as_str(), None)
            .await
            .unwrap();
        supervisor.expire_grace(&token, "room_a", &cancel).await;

        let guard = store.lock().await;
        assert!(guard.rooms.contains("room_a"));
        assert!(guard.players.lookup(&conn("a2")).unwrap().live);
    }

    #[tokio::test]
    async fn test_stale_expiry_ignored_after_second_disconnect() {
        let (supervisor, store, token) = supervisor_with_match(Duration::from_secs(60)).await;
        supervisor.handle_disconnect(&conn("a")).await;
        let stale = armed_timer(&supervisor, &token).await;
        supervisor
            .reconnect(&conn("a2"), token.as_str(), None)
            .await
            .unwrap();
        supervisor.handle_disconnect(&conn("a2")).await;

        // Player is offline in the same room again, but this timer was cancelled
        supervisor.expire_grace(&token, "room_a", &stale).await;

        assert!(stale.is_cancelled());
        assert_eq!(supervisor.pending_forfeits().await, 1);
        let guard = store.lock().await;
        assert!(guard.rooms.contains("room_a"));
        assert!(guard.players.find_by_token(&token).is_some());
    }

    #[tokio::test]
    async fn test_disconnect_without_room_purges_player() {
        let (supervisor, store, _token) = supervisor_with_match(Duration::from_secs(60)).await;
        store.lock().await.players.register(&conn("idle"), "idle");

        supervisor.handle_disconnect(&conn("idle")).await;
        supervisor.handle_disconnect(&conn("never-seen")).await;

        assert!(store.lock().await.players.lookup(&conn("idle")).is_none());
        assert_eq!(supervisor.pending_forfeits().await, 0);
    }

    #[tokio::test]
    async fn test_leave_reopens_room_for_remaining_player() {
        let (supervisor, store, _token) = supervisor_with_match(Duration::from_secs(60)).await;

        supervisor.leave_room(&conn("b")).await.unwrap();

        let guard = store.lock().await;
        let room = guard.rooms.get_room("room_a").unwrap();
        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.sides.len(), 1);
        assert!(room.chat.last().unwrap().system);
        assert!(guard.players.lookup(&conn("b")).unwrap().room_id.is_none());
        drop(guard);

        assert_eq!(
            supervisor.leave_room(&conn("b")).await,
            Err(AppError::NotInRoom)
        );
        supervisor.leave_room(&conn("a")).await.unwrap();
        assert!(store.lock().await.rooms.is_empty());
    }
}
