//! Trigger system: event kinds, payloads, skills, and their attachments.
//!
//! The rules engine exposes a closed set of dispatch points
//! ([`TriggerEvent`]). Skills subscribe to a subset of them and are attached
//! to a player, a piece of equipment, or the room itself. When the room
//! dispatches an event it threads one mutable [`EventPayload`] through every
//! attached skill in a fixed order; any skill may change the payload or
//! consume the event.
//!
//! ## Key Components
//!
//! - [`TriggerEvent`]: dispatch point
//! - [`EventPayload`]: tagged record for one dispatch (`DamageStruct`,
//!   `CardEffectStruct`, `SlashEffectStruct`, ...)
//! - [`Skill`] / [`ViewAsSkill`]: content contracts
//! - [`TriggerRegistry`]: per-room attachment table
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_sgs::core::{EngineError, PlayerId};
//! use rust_sgs::room::Room;
//! use rust_sgs::triggers::{EventPayload, Skill, SkillSource, TriggerEvent, TriggerRegistry};
//!
//! /// Halves incoming damage, rounding down.
//! struct Halve;
//!
//! impl Skill for Halve {
//!     fn name(&self) -> &str {
//!         "halve"
//!     }
//!
//!     fn events(&self) -> &[TriggerEvent] {
//!         &[TriggerEvent::Predamaged]
//!     }
//!
//!     fn trigger(
//!         &self,
//!         event: TriggerEvent,
//!         _room: &mut Room,
//!         _owner: PlayerId,
//!         payload: &mut EventPayload,
//!     ) -> Result<bool, EngineError> {
//!         let damage = payload.damage_mut(event)?;
//!         damage.amount /= 2;
//!         Ok(false)
//!     }
//! }
//!
//! let mut registry = TriggerRegistry::new();
//! registry.attach(Arc::new(Halve), Some(PlayerId::new(1)), SkillSource::Player);
//! assert_eq!(registry.listeners(TriggerEvent::Predamaged, PlayerId::new(1)).len(), 1);
//! assert!(registry.listeners(TriggerEvent::Predamaged, PlayerId::new(0)).is_empty());
//! ```

mod event;
mod registry;
mod skill;

pub use crate::cards::Nature;
pub use event::{
    CardEffectStruct, CardUseStruct, DamageStruct, DyingStruct, EventPayload, JudgeStruct,
    RecoverStruct, SlashEffectStruct, TriggerEvent,
};
pub use registry::{Listener, ListenerId, SkillSource, TriggerRegistry, ViewAsEntry};
pub use skill::{
    Skill, SkillKind, ViewAsSkill, PRIORITY_CAP, PRIORITY_EQUIPMENT, PRIORITY_PLAYER,
    PRIORITY_RULE,
};
