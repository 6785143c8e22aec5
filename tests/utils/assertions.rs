//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use handcricket::websockets::{MessageType, WebSocketMessage};
use handcricket::ConnectionId;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<&'a ConnectionId>,
}

impl<'a> MessageAssertion<'a> {
    pub fn for_player(setup: &'a TestSetup, player: &'a ConnectionId) -> Self {
        Self {
            setup,
            players: vec![player],
        }
    }

    pub fn for_players(setup: &'a TestSetup, players: Vec<&'a ConnectionId>) -> Self {
        Self { setup, players }
    }

    /// Assert that every player's next message has the given type (consumes it)
    ///
    /// Returns the content received by the first player.
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages: Vec<WebSocketMessage> = vec![];

        for player in &self.players {
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(player)
                .await;
            let message = message
                .unwrap_or_else(|| panic!("{} should have received {:?}", player, expected_type));
            assert_eq!(
                message.message_type, expected_type,
                "{} received wrong message type: {:?}",
                player, message.payload
            );
            messages.push(message);
        }

        MessageContent {
            payload: messages[0].payload.clone(),
        }
    }

    /// Assert that players have no undelivered messages left
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(player)
                .await;
            assert!(
                message.is_none(),
                "{} should not have received anything, got {:?}",
                player,
                message.map(|m| m.message_type)
            );
        }
    }

    /// Assert that players received a sequence of message types in order (consumes them)
    pub async fn received_message_sequence(
        self,
        expected_types: Vec<MessageType>,
    ) -> Vec<MessageContent> {
        let mut result_messages = vec![];

        for player in &self.players {
            for (i, expected_type) in expected_types.iter().enumerate() {
                let message = self
                    .setup
                    .mock_conn_manager
                    .consume_message_for(player)
                    .await
                    .unwrap_or_else(|| panic!("{} is missing message {}", player, i));
                assert_eq!(
                    message.message_type, *expected_type,
                    "{} message {} has wrong type",
                    player, i
                );

                // Only collect messages from the first player to avoid duplicates
                if *player == self.players[0] {
                    result_messages.push(MessageContent {
                        payload: message.payload,
                    });
                }
            }
        }

        result_messages
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub payload: serde_json::Value,
}

impl MessageContent {
    pub fn with_field(self, field: &str, expected: serde_json::Value) -> Self {
        assert_eq!(self.payload[field], expected, "unexpected {}", field);
        self
    }

    pub fn with_error_kind(self, expected_kind: &str) -> Self {
        assert_eq!(self.payload["kind"], expected_kind);
        self
    }

    /// Assert the score line of a move_result from the recipient's view
    pub fn with_score(self, your_score: u32, your_wickets: u32, opponent_score: u32, opponent_wickets: u32) -> Self {
        let score = &self.payload["score"];
        assert_eq!(score["your_score"], your_score);
        assert_eq!(score["your_wickets"], your_wickets);
        assert_eq!(score["opponent_score"], opponent_score);
        assert_eq!(score["opponent_wickets"], opponent_wickets);
        self
    }

    pub fn with_event(self, expected_event: &str) -> Self {
        assert_eq!(self.payload["events"], expected_event);
        self
    }

    pub fn with_winner(self, expected_winner: Option<&str>) -> Self {
        match expected_winner {
            Some(name) => assert_eq!(self.payload["winner"], name),
            None => assert!(self.payload["winner"].is_null()),
        }
        self
    }
}
