//! The card contract.
//!
//! Every [`CardDefinition`](super::CardDefinition) carries a `CardBehavior`.
//! The room drives a use through it in a fixed order:
//!
//! ```text
//! Declared -> Validated(is_available, target_filter x N, targets_feasible)
//!          -> Used(on_use) -> Effecting(on_effect per target) -> Resolved
//! ```
//!
//! Query methods take `&Room` and must not mutate anything. Mutating methods
//! take `&mut Room` and change game state only through room operations.
//! The defaults implement the common case for each card type, so most
//! behaviors override one or two methods.

use crate::core::{EngineError, PlayerId};
use crate::room::Room;
use crate::triggers::{CardEffectStruct, CardUseStruct};

use super::definition::CardType;
use super::instance::Card;
use super::pattern::CardPattern;

/// Rules of one card kind.
pub trait CardBehavior: Send + Sync {
    /// Whether the card answers a response pattern.
    fn matches(&self, card: &Card, pattern: &CardPattern) -> bool {
        pattern.matches(card)
    }

    /// Whether the player may use the card in their play phase.
    ///
    /// The default enforces the once-per-turn flag.
    fn is_available(&self, room: &Room, card: &Card, player: PlayerId) -> bool {
        !(card.definition().once && room.state().player(player).has_used(card.class()))
    }

    /// Incremental target check for `candidate`, given the targets chosen so
    /// far. Must be monotonic: a count cap may reject at k+1 what it
    /// accepted at k, never the reverse.
    fn target_filter(
        &self,
        _room: &Room,
        _card: &Card,
        _selected: &[PlayerId],
        _candidate: PlayerId,
        _actor: PlayerId,
    ) -> bool {
        false
    }

    /// Final check on the complete target set.
    fn targets_feasible(&self, _room: &Room, card: &Card, targets: &[PlayerId], _actor: PlayerId) -> bool {
        card.is_target_fixed() || !targets.is_empty()
    }

    /// Side effects at the moment of use, before any per-target effect.
    fn on_use(&self, room: &mut Room, card_use: &CardUseStruct) -> Result<(), EngineError> {
        room.default_on_use(card_use)
    }

    /// Apply the card to its targets.
    fn use_card(
        &self,
        room: &mut Room,
        card: &Card,
        source: PlayerId,
        targets: &[PlayerId],
    ) -> Result<(), EngineError> {
        room.default_use_card(card, source, targets)
    }

    /// Resolution against one target.
    fn on_effect(&self, room: &mut Room, effect: &CardEffectStruct) -> Result<(), EngineError> {
        if effect.card.card_type() == CardType::DelayedTrick {
            room.resolve_delayed_trick(&effect.card, effect.to)?;
        }
        Ok(())
    }

    /// Whether a nullification may cancel this card's effect.
    fn is_cancelable(&self, card: &Card) -> bool {
        card.card_type().is_trick()
    }

    /// Delayed-trick payload, run when its judgment is bad.
    fn take_effect(&self, _room: &mut Room, _card: &Card, _target: PlayerId) -> Result<(), EngineError> {
        Ok(())
    }

    fn on_install(&self, _room: &mut Room, _card: &Card, _owner: PlayerId) -> Result<(), EngineError> {
        Ok(())
    }

    fn on_uninstall(&self, _room: &mut Room, _card: &Card, _owner: PlayerId) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Behavior with every default: horses, response-only cards in tests, and
/// definitions whose rules live entirely in attached skills.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainBehavior;

impl CardBehavior for PlainBehavior {}
