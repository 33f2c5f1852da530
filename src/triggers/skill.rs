//! Skill contracts.
//!
//! A [`Skill`] listens to a fixed set of [`TriggerEvent`]s and runs with
//! exclusive access to the room and the event payload. Returning `Ok(true)`
//! consumes the event for that one dispatch: later skills in the chain are
//! not run, and the skill stays attached.
//!
//! A [`ViewAsSkill`] turns selected physical cards into a virtual card, such
//! as the Fan turning a plain slash into a fire slash.
//!
//! Skills hold no per-room state. Anything that must persist between
//! invocations goes into player flags and marks through the room.

use crate::cards::{Card, CardPattern};
use crate::core::{EngineError, PlayerId};
use crate::room::Room;

use super::event::{EventPayload, TriggerEvent};

/// Where a skill comes from. Decides its default priority and whether
/// armor suppression applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkillKind {
    /// Acquired by a player.
    Player,
    /// Attached by an equipped weapon.
    Weapon,
    /// Attached by equipped armor; silenced while the wearer has a
    /// `qinggang` mark.
    Armor,
    /// Engine rule, attached globally to every room.
    Rule,
}

/// Priority of equipment skills.
pub const PRIORITY_EQUIPMENT: i32 = 2;
/// Priority of player skills.
pub const PRIORITY_PLAYER: i32 = 1;
/// Priority of rule skills.
pub const PRIORITY_RULE: i32 = 0;
/// Priority of cap-type skills, which must see every amplification first.
pub const PRIORITY_CAP: i32 = -1;

impl SkillKind {
    #[must_use]
    pub const fn default_priority(self) -> i32 {
        match self {
            SkillKind::Weapon | SkillKind::Armor => PRIORITY_EQUIPMENT,
            SkillKind::Player => PRIORITY_PLAYER,
            SkillKind::Rule => PRIORITY_RULE,
        }
    }
}

/// An event handler attached to a player, a piece of equipment, or the room.
pub trait Skill: Send + Sync {
    /// Globally unique name.
    fn name(&self) -> &str;

    /// Events this skill listens to.
    fn events(&self) -> &[TriggerEvent];

    fn kind(&self) -> SkillKind {
        SkillKind::Player
    }

    /// Higher runs first; ties run in attachment order.
    fn priority(&self) -> i32 {
        self.kind().default_priority()
    }

    /// Whether the skill applies for this owner right now.
    fn triggerable(&self, room: &Room, owner: PlayerId) -> bool {
        let player = room.state().player(owner);
        match self.kind() {
            SkillKind::Rule => true,
            SkillKind::Armor => player.alive && player.mark("qinggang") == 0,
            SkillKind::Player | SkillKind::Weapon => player.alive,
        }
    }

    /// Handle one event. Returns whether the event is consumed.
    fn trigger(
        &self,
        event: TriggerEvent,
        room: &mut Room,
        owner: PlayerId,
        payload: &mut EventPayload,
    ) -> Result<bool, EngineError>;

    /// Extra targets the owner may choose for `card`.
    fn extra_targets(&self, _card: &Card) -> usize {
        0
    }

    /// Distance limit the owner's tricks use instead of their default.
    fn trick_range(&self, _card: &Card) -> Option<u32> {
        None
    }
}

/// Turns selected physical cards into a virtual card.
pub trait ViewAsSkill: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the skill offers a card to use in the play phase.
    fn enabled_at_play(&self, _room: &Room, _player: PlayerId) -> bool {
        true
    }

    /// Whether the skill can answer a response request for `pattern`.
    fn enabled_at_response(&self, _room: &Room, _player: PlayerId, _pattern: &CardPattern) -> bool {
        false
    }

    /// Incremental selection check.
    fn view_filter(&self, selected: &[Card], candidate: &Card) -> bool;

    /// Build the virtual card, or `None` if the selection is incomplete.
    fn view_as(&self, room: &Room, cards: &[Card]) -> Option<Card>;
}
