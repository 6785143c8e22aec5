use std::time::Duration;

/// Process-wide game configuration
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// How long a disconnected player may take to reconnect before forfeiting
    pub grace_period: Duration,
    /// Innings length for implicitly paired and AI matches
    pub default_overs: u32,
    /// Wicket limit for implicitly paired and AI matches
    pub default_wickets: u32,
    pub bind_addr: String,
}

pub const MAX_OVERS: u32 = 20;
pub const MAX_WICKETS: u32 = 10;

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(300),
            default_overs: 2,
            default_wickets: 2,
            bind_addr: "0.0.0.0:10000".to_string(),
        }
    }
}

impl GameConfig {
    /// Reads overrides from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let grace_period = std::env::var("RECONNECT_GRACE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.grace_period);

        let default_overs = std::env::var("DEFAULT_OVERS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|overs| (1..=MAX_OVERS).contains(overs))
            .unwrap_or(defaults.default_overs);

        let default_wickets = std::env::var("DEFAULT_WICKETS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|wickets| (1..=MAX_WICKETS).contains(wickets))
            .unwrap_or(defaults.default_wickets);

        Self {
            grace_period,
            default_overs,
            default_wickets,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_match_limits(mut self, overs: u32, wickets: u32) -> Self {
        self.default_overs = overs;
        self.default_wickets = wickets;
        self
    }
}
