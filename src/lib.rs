//! # rust-sgs
//!
//! An event-driven rules engine for a trick-taking card game of the
//! slash/jink/peach family.
//!
//! ## Design Principles
//!
//! 1. **Content-Agnostic Core**: the room knows no card by name. Cards plug in
//!    through [`CardBehavior`] and equipment or player abilities through
//!    [`Skill`], registered in named packages at startup.
//!
//! 2. **One Writer**: a [`Room`] owns its [`GameState`] and is the only thing
//!    that mutates it. Skills and behaviors act through room operations.
//!
//! 3. **Explicit Suspension Points**: every player decision goes through the
//!    [`AskHandler`] collaborator and falls back to a documented default on
//!    timeout or disconnect.
//!
//! ## Architecture
//!
//! - **Trigger Dispatch**: each event payload is threaded through the
//!   attached skills in priority order with exclusive `&mut` access; any
//!   skill may consume the event. Nested dispatches are tracked on a frame
//!   stack with a depth limit.
//!
//! - **Card Use State Machine**: `Declared -> Validated -> Used ->
//!   Effecting -> Resolved`; a rejected declaration changes nothing.
//!
//! - **Damage Pipeline**: `Predamage -> Predamaged -> apply -> Damage ->
//!   Damaged`, with dying, death and iron-chain conduction after it.
//!
//! ## Modules
//!
//! - `core`: players, configuration, game state, RNG, errors
//! - `zones`: card locations
//! - `cards`: definitions, runtime cards, patterns, the card contract, the
//!   package registry
//! - `triggers`: event kinds, payloads, skill contracts, the trigger registry
//! - `room`: the orchestrator and its collaborator contracts
//! - `packages`: the standard and maneuvering card sets
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_sgs::{packages, PlayerId, Room, RoomConfig};
//!
//! let registry = Arc::new(packages::bootstrap().unwrap());
//! let mut room = Room::new(RoomConfig::new(4).with_seed(7), registry).unwrap();
//!
//! room.start_game().unwrap();
//! room.run_turn(PlayerId::new(0)).unwrap();
//! assert_eq!(room.state().turn().turn_number, 1);
//! ```

pub mod core;
pub mod zones;
pub mod cards;
pub mod triggers;
pub mod room;
pub mod packages;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, EngineError, GameState, Phase, Player, PlayerId, PlayerMap, RoomConfig, UseError,
};

pub use crate::zones::{Place, Zone, ZoneManager, ZonePosition};

pub use crate::cards::{
    Capabilities, Card, CardBehavior, CardDefinition, CardId, CardPattern, CardRegistry, CardType,
    JudgePattern, Package, RegistryError, Suit,
};

pub use crate::triggers::{
    DamageStruct, EventPayload, Nature, Skill, SkillKind, TriggerEvent, TriggerRegistry, ViewAsSkill,
};

pub use crate::room::{
    AskHandler, CardChoice, DamageOutcome, Dispatch, LogMessage, PassiveAsk, Presenter, Room,
    ScriptedAsk, UseIntent, UseOutcome,
};
