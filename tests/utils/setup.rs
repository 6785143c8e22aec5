use std::sync::Arc;
use std::time::Duration;

use handcricket::{
    AppState, BotStrategy, ConnectionId, GameConfig, RandomBotStrategy, WebsocketReceiveHandler,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app_state: AppState,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
}

pub struct TestSetupBuilder {
    config: GameConfig,
    bot: Arc<dyn BotStrategy>,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default().with_grace_period(Duration::from_secs(60)),
            bot: Arc::new(RandomBotStrategy::with_seed(7)),
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.config = self.config.with_grace_period(grace_period);
        self
    }

    pub fn with_match_limits(mut self, overs: u32, wickets: u32) -> Self {
        self.config = self.config.with_match_limits(overs, wickets);
        self
    }

    pub fn with_bot(mut self, bot: impl BotStrategy + 'static) -> Self {
        self.bot = Arc::new(bot);
        self
    }

    pub fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let app_state =
            AppState::with_bot_strategy(self.config, mock_conn_manager.clone(), self.bot);
        let input_handler = WebsocketReceiveHandler::new(app_state.clone());

        TestSetup {
            app_state,
            mock_conn_manager,
            input_handler,
        }
    }
}

/// Connection handle for a named test player
pub fn player(name: &str) -> ConnectionId {
    ConnectionId::from(name)
}
