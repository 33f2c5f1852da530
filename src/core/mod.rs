//! Core engine types: players, state, RNG, configuration, errors.
//!
//! These are the building blocks the room orchestrates. Nothing here knows
//! about specific cards; card content plugs in through `cards` and
//! `triggers`.

pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use config::{ConfigError, RoomConfig};
pub use error::{EngineError, UseError};
pub use player::{Player, PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{GameState, Phase, TurnState};
