//! Room configuration.
//!
//! A room is configured once at construction. Configuration can be built in
//! code with the builder methods or loaded from JSON; missing JSON fields
//! take their defaults.
//!
//! ```
//! use rust_sgs::core::RoomConfig;
//!
//! let config = RoomConfig::from_json(r#"{ "player_count": 3, "seed": 7 }"#).unwrap();
//! assert_eq!(config.player_count, 3);
//! assert_eq!(config.max_hp, 4);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid room config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("player count must be between 2 and 8 (got {0})")]
    PlayerCount(usize),

    #[error("max hp must be positive (got {0})")]
    MaxHp(i32),
}

/// Room configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Number of seats (2-8).
    pub player_count: usize,

    /// Starting and maximum HP of every player.
    pub max_hp: i32,

    /// Cards dealt to each player at game start.
    pub initial_hand: usize,

    /// Cards drawn in each draw phase.
    pub draw_per_turn: usize,

    /// Seed for pile shuffles.
    pub seed: u64,

    /// Shuffle the draw pile at construction. Off keeps registry order,
    /// which scripted games and tests rely on.
    pub shuffle: bool,

    /// Nested trigger dispatches allowed before the room reports a loop.
    pub max_dispatch_depth: usize,

    /// Rejected play intents re-prompted before the play phase ends.
    pub max_reprompts: usize,

    /// Slash uses allowed per turn.
    pub slash_per_turn: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            max_hp: 4,
            initial_hand: 4,
            draw_per_turn: 2,
            seed: 42,
            shuffle: true,
            max_dispatch_depth: 64,
            max_reprompts: 3,
            slash_per_turn: 1,
        }
    }
}

impl RoomConfig {
    /// Create a config for the given number of seats.
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=8).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount(self.player_count));
        }
        if self.max_hp <= 0 {
            return Err(ConfigError::MaxHp(self.max_hp));
        }
        Ok(())
    }

    /// Set the maximum HP.
    #[must_use]
    pub fn with_max_hp(mut self, max_hp: i32) -> Self {
        self.max_hp = max_hp;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_initial_hand(mut self, cards: usize) -> Self {
        self.initial_hand = cards;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Keep the draw pile in registry order.
    #[must_use]
    pub fn unshuffled(mut self) -> Self {
        self.shuffle = false;
        self
    }

    /// Set the dispatch depth limit.
    #[must_use]
    pub fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }
}
