#![allow(dead_code)]

use serde_json::{json, Value};

use handcricket::websockets::{MessageHandler, MessageType};
use handcricket::ConnectionId;

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Feed a raw inbound frame through the dispatcher
    pub async fn send_raw(&self, connection: &ConnectionId, raw: &str) {
        self.input_handler
            .handle_message(connection, raw.to_string())
            .await;
    }

    /// Send a typed client event
    pub async fn send_event(&self, connection: &ConnectionId, event_type: &str, payload: Value) {
        let frame = json!({ "type": event_type, "payload": payload });
        self.send_raw(connection, &frame.to_string()).await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_join(&self, connection: &ConnectionId, name: &str) {
        self.send_event(connection, "join", json!({ "name": name }))
            .await;
    }

    pub async fn send_join_ai(&self, connection: &ConnectionId, name: &str) {
        self.send_event(connection, "join", json!({ "name": name, "ai": true }))
            .await;
    }

    pub async fn send_create_room(&self, connection: &ConnectionId, overs: u32, wickets: u32) {
        let name = connection.to_string();
        self.send_event(
            connection,
            "createRoom",
            json!({ "overs": overs, "wickets": wickets, "name": name }),
        )
        .await;
    }

    pub async fn send_join_room(&self, connection: &ConnectionId, room_id: &str) {
        let name = connection.to_string();
        self.send_event(
            connection,
            "joinRoom",
            json!({ "room_id": room_id, "name": name }),
        )
        .await;
    }

    pub async fn send_toss(&self, connection: &ConnectionId) {
        self.send_event(connection, "toss", json!({})).await;
    }

    pub async fn send_toss_choice(&self, connection: &ConnectionId, choice: &str) {
        self.send_event(connection, "toss_choice", json!({ "choice": choice }))
            .await;
    }

    pub async fn send_play(&self, connection: &ConnectionId, number: i64) {
        self.send_event(connection, "play_turn", json!({ "number": number }))
            .await;
    }

    pub async fn send_chat(&self, connection: &ConnectionId, msg: &str) {
        self.send_event(connection, "chat", json!({ "msg": msg }))
            .await;
    }

    pub async fn send_leave(&self, connection: &ConnectionId) {
        self.send_event(connection, "leave_room", json!({})).await;
    }

    pub async fn send_reconnect(&self, connection: &ConnectionId, player_id: &str) {
        self.send_event(
            connection,
            "reconnect_player",
            json!({ "player_id": player_id }),
        )
        .await;
    }

    /// Transport-level disconnect, as the socket loop reports it
    pub async fn disconnect(&self, connection: &ConnectionId) {
        self.app_state
            .connection_manager
            .remove_connection(connection)
            .await;
        self.app_state.supervisor.handle_disconnect(connection).await;
    }

    // ============================================================================
    // Composite flows
    // ============================================================================

    /// Pairs two players implicitly; returns (first mover, second mover)
    pub async fn pair(&self, a: &ConnectionId, b: &ConnectionId) -> (ConnectionId, ConnectionId) {
        self.send_join(a, &a.to_string()).await;
        self.send_join(b, &b.to_string()).await;

        let start = self
            .mock_conn_manager
            .last_of_type(a, MessageType::Start)
            .await
            .expect("paired players receive start");
        if start.payload["you_first"] == true {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    /// Plays one full ball: leader then follower
    pub async fn play_ball(
        &self,
        leader: &ConnectionId,
        leader_number: i64,
        follower: &ConnectionId,
        follower_number: i64,
    ) {
        self.send_play(leader, leader_number).await;
        self.send_play(follower, follower_number).await;
    }

    /// Durable token handed out in the player's most recent start notice
    pub async fn player_token(&self, connection: &ConnectionId) -> String {
        for message_type in [
            MessageType::Start,
            MessageType::MatchStart,
            MessageType::RoomJoined,
            MessageType::RoomCreated,
        ] {
            if let Some(message) = self
                .mock_conn_manager
                .last_of_type(connection, message_type)
                .await
            {
                return message.payload["player_id"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
            }
        }
        panic!("{} never received a player_id", connection);
    }

    pub async fn room_exists(&self, room_id: &str) -> bool {
        self.app_state.room_service.get_room(room_id).await.is_some()
    }
}
