//! The maneuvering package.
//!
//! Adds damage natures and the cards built around them: fire and thunder
//! slashes, the Fan that sets slashes alight, Vine armor that burns, iron
//! chains that conduct nature damage, plus analeptic, fire attack, supply
//! shortage, the Guding blade and the Silver lion.

use std::sync::Arc;

use crate::cards::{
    Capabilities, Card, CardBehavior, CardDefinition, CardPattern, CardType, JudgePattern, Package, PlainBehavior,
    Suit,
};
use crate::core::{EngineError, Phase, PlayerId};
use crate::room::{LogMessage, Room};
use crate::triggers::{
    CardEffectStruct, CardUseStruct, DamageStruct, EventPayload, Nature, RecoverStruct, Skill, SkillKind,
    ViewAsSkill, PRIORITY_CAP, TriggerEvent,
};
use crate::zones::Place;

use super::standard::{equipment, SlashBehavior};

// === Basic cards ===

/// Analeptic: rescues its user from dying, otherwise makes their next slash
/// deal one extra damage. Once per turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalepticBehavior;

impl CardBehavior for AnalepticBehavior {
    fn on_effect(&self, room: &mut Room, effect: &CardEffectStruct) -> Result<(), EngineError> {
        let to = effect.to;
        room.broadcast_invoke("animate", &format!("analeptic:{0}:{0}", to.index()));

        if room.state().player(to).has_flag("dying") {
            room.recover(RecoverStruct {
                who: effect.from,
                to,
                card: Some(effect.card.clone()),
                amount: 1,
            })?;
        } else {
            room.send_log(LogMessage::new("#Drank").from(to));
            room.set_flag(to, "drank");
        }
        Ok(())
    }
}

// === Tricks ===

/// Fire attack: the target shows a hand card; the user may discard a card of
/// the same suit to deal one fire damage.
#[derive(Clone, Copy, Debug, Default)]
pub struct FireAttackBehavior;

impl CardBehavior for FireAttackBehavior {
    fn target_filter(
        &self,
        room: &Room,
        card: &Card,
        selected: &[PlayerId],
        candidate: PlayerId,
        actor: PlayerId,
    ) -> bool {
        let state = room.state();
        if selected.len() >= 1 + room.extra_targets(actor, card) || state.hand_count(candidate) == 0 {
            return false;
        }
        if candidate == actor {
            // The fire attack itself is still in hand.
            return state.hand_count(actor) >= 2;
        }
        room.trick_range(actor, card)
            .is_none_or(|range| state.distance(actor, candidate) <= range)
    }

    fn on_effect(&self, room: &mut Room, effect: &CardEffectStruct) -> Result<(), EngineError> {
        let (Some(from), to) = (effect.from, effect.to) else {
            return Ok(());
        };
        let Some(shown) = room.ask_for_card_show(to, from, "fire_attack")? else {
            return Ok(());
        };
        let Some(suit) = shown.suit() else {
            return Ok(());
        };

        let prompt = format!("@fire-attack:{}::{}", to.index(), suit.name());
        let discarded = room.ask_for_card(from, &CardPattern::suit(suit), &prompt, "fire_attack")?;
        if let Some(discarded) = discarded {
            room.discard(Some(from), &discarded)?;
            let damage = DamageStruct::new(Some(from), to)
                .with_card(effect.card.clone())
                .with_nature(Nature::Fire);
            room.damage(damage)?;
        }
        Ok(())
    }
}

/// Iron chain: toggles the chained state of up to two players. Used with no
/// targets, it is recast: discarded for one new card.
#[derive(Clone, Copy, Debug, Default)]
pub struct IronChainBehavior;

impl CardBehavior for IronChainBehavior {
    fn target_filter(
        &self,
        room: &Room,
        card: &Card,
        selected: &[PlayerId],
        _candidate: PlayerId,
        actor: PlayerId,
    ) -> bool {
        selected.len() < 2 + room.extra_targets(actor, card)
    }

    fn targets_feasible(&self, room: &Room, card: &Card, targets: &[PlayerId], actor: PlayerId) -> bool {
        let limit = 2 + room.extra_targets(actor, card);
        // Substituted through guhuo, the card must really be aimed at someone.
        if card.skill_name() == Some("guhuo") {
            (1..=limit).contains(&targets.len())
        } else {
            targets.len() <= limit
        }
    }

    fn on_use(&self, room: &mut Room, card_use: &CardUseStruct) -> Result<(), EngineError> {
        if !card_use.to.is_empty() {
            return room.default_on_use(card_use);
        }
        let from = card_use.from;
        room.move_cards_of(&card_use.card, Place::DISCARD_PILE)?;
        room.send_log(LogMessage::new("#Recast").from(from).card(&card_use.card));
        room.draw_cards(from, 1)?;
        Ok(())
    }

    fn on_effect(&self, room: &mut Room, effect: &CardEffectStruct) -> Result<(), EngineError> {
        let chained = !room.state().player(effect.to).chained;
        room.set_chained(effect.to, chained);
        room.set_emotion(effect.to, "chain");
        Ok(())
    }
}

/// Supply shortage: delayed trick on a player at distance 1; unless the
/// judgment is a club, their next draw phase is skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct SupplyShortageBehavior;

impl CardBehavior for SupplyShortageBehavior {
    fn target_filter(
        &self,
        room: &Room,
        card: &Card,
        selected: &[PlayerId],
        candidate: PlayerId,
        actor: PlayerId,
    ) -> bool {
        let state = room.state();
        let range = room.trick_range(actor, card).unwrap_or(1);
        let already = state
            .judging(candidate)
            .into_iter()
            .filter_map(|id| state.delayed_trick(id))
            .any(|attached| attached.name() == card.name());

        selected.is_empty() && candidate != actor && !already && state.distance(actor, candidate) <= range
    }

    fn take_effect(&self, room: &mut Room, _card: &Card, target: PlayerId) -> Result<(), EngineError> {
        room.skip_phase(target, Phase::Draw);
        Ok(())
    }
}

// === Equipment skills ===

/// Fan: the wielder may turn a normal slash into a fire slash as it takes
/// effect.
struct FanSkill;

impl Skill for FanSkill {
    fn name(&self) -> &str {
        "fan"
    }

    fn events(&self) -> &[TriggerEvent] {
        &[TriggerEvent::SlashEffect]
    }

    fn kind(&self) -> SkillKind {
        SkillKind::Weapon
    }

    fn trigger(
        &self,
        event: TriggerEvent,
        room: &mut Room,
        owner: PlayerId,
        payload: &mut EventPayload,
    ) -> Result<bool, EngineError> {
        if payload.slash_effect(event)?.nature != Nature::Normal {
            return Ok(false);
        }
        if room.ask_for_skill_invoke(owner, self.name(), payload)? {
            payload.slash_effect_mut(event)?.nature = Nature::Fire;
            room.set_emotion(owner, "weapon/fan");
        }
        Ok(false)
    }
}

/// Fan view-as: one plain slash becomes a fire slash.
struct FanViewAs;

impl ViewAsSkill for FanViewAs {
    fn name(&self) -> &str {
        "fan"
    }

    fn enabled_at_play(&self, room: &Room, player: PlayerId) -> bool {
        room.can_slash(player)
    }

    fn enabled_at_response(&self, room: &Room, _player: PlayerId, pattern: &CardPattern) -> bool {
        room.registry()
            .definition("fire_slash")
            .is_some_and(|def| pattern.admits(def.capabilities))
    }

    fn view_filter(&self, selected: &[Card], candidate: &Card) -> bool {
        selected.is_empty() && candidate.name() == "slash"
    }

    fn view_as(&self, room: &Room, cards: &[Card]) -> Option<Card> {
        if cards.len() != 1 {
            return None;
        }
        let def = room.registry().definition("fire_slash")?;
        Some(Card::virtual_of(def.clone(), cards, Some(self.name())))
    }
}

/// Guding blade: slashes deal one extra damage to a target with no hand
/// cards.
struct GudingBlade;

impl Skill for GudingBlade {
    fn name(&self) -> &str {
        "guding_blade"
    }

    fn events(&self) -> &[TriggerEvent] {
        &[TriggerEvent::Predamage]
    }

    fn kind(&self) -> SkillKind {
        SkillKind::Weapon
    }

    fn trigger(
        &self,
        event: TriggerEvent,
        room: &mut Room,
        owner: PlayerId,
        payload: &mut EventPayload,
    ) -> Result<bool, EngineError> {
        let damage = payload.damage(event)?;
        let by_slash = damage.card.as_ref().is_some_and(|c| c.has_capability(Capabilities::SLASH));
        if !by_slash || room.state().hand_count(damage.to) > 0 {
            return Ok(false);
        }

        let (to, amount) = (damage.to, damage.amount);
        room.set_emotion(owner, "weapon/guding_blade");
        room.send_log(
            LogMessage::new("#GudingBladeEffect")
                .from(owner)
                .to(to)
                .arg(amount)
                .arg2(amount + 1),
        );
        payload.damage_mut(event)?.amount += 1;
        Ok(false)
    }
}

/// Vine: normal slashes and AOE tricks are nullified; fire damage is
/// increased by one.
struct Vine;

impl Skill for Vine {
    fn name(&self) -> &str {
        "vine"
    }

    fn events(&self) -> &[TriggerEvent] {
        &[TriggerEvent::Predamaged, TriggerEvent::SlashEffected, TriggerEvent::CardEffected]
    }

    fn kind(&self) -> SkillKind {
        SkillKind::Armor
    }

    fn trigger(
        &self,
        event: TriggerEvent,
        room: &mut Room,
        owner: PlayerId,
        payload: &mut EventPayload,
    ) -> Result<bool, EngineError> {
        match event {
            TriggerEvent::SlashEffected => {
                let effect = payload.slash_effect(event)?;
                if effect.nature != Nature::Normal {
                    return Ok(false);
                }
                let slash = effect.slash.name().to_string();
                self.nullify(room, owner, slash);
                Ok(true)
            }
            TriggerEvent::CardEffected => {
                let effect = payload.card_effect(event)?;
                if !effect.card.has_capability(Capabilities::AOE) {
                    return Ok(false);
                }
                let card = effect.card.name().to_string();
                self.nullify(room, owner, card);
                Ok(true)
            }
            _ => {
                let damage = payload.damage_mut(event)?;
                if damage.nature == Nature::Fire {
                    let amount = damage.amount;
                    damage.amount += 1;
                    room.set_emotion(owner, "armor/vineburn");
                    room.send_log(LogMessage::new("#VineDamage").from(owner).arg(amount).arg2(amount + 1));
                }
                Ok(false)
            }
        }
    }
}

impl Vine {
    fn nullify(&self, room: &mut Room, owner: PlayerId, card: String) {
        room.set_emotion(owner, "armor/vine");
        room.send_log(LogMessage::new("#ArmorNullify").from(owner).arg(self.name()).arg2(card));
    }
}

/// Silver lion: damage above one is reduced to one. Runs after every other
/// damage modifier on the wearer.
struct SilverLion;

impl Skill for SilverLion {
    fn name(&self) -> &str {
        "silver_lion"
    }

    fn events(&self) -> &[TriggerEvent] {
        &[TriggerEvent::Predamaged]
    }

    fn kind(&self) -> SkillKind {
        SkillKind::Armor
    }

    fn priority(&self) -> i32 {
        PRIORITY_CAP
    }

    fn trigger(
        &self,
        event: TriggerEvent,
        room: &mut Room,
        owner: PlayerId,
        payload: &mut EventPayload,
    ) -> Result<bool, EngineError> {
        let damage = payload.damage_mut(event)?;
        if damage.amount <= 1 {
            return Ok(false);
        }
        let amount = damage.amount;
        damage.amount = 1;
        room.set_emotion(owner, "armor/silver_lion");
        room.send_log(LogMessage::new("#SilverLion").from(owner).arg(amount).arg2(self.name()));
        Ok(false)
    }
}

/// Silver lion card: taking it off recovers one HP, unless its removal was
/// forced through armor-ignoring effects.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilverLionBehavior;

impl CardBehavior for SilverLionBehavior {
    fn on_uninstall(&self, room: &mut Room, card: &Card, owner: PlayerId) -> Result<(), EngineError> {
        let player = room.state().player(owner);
        if !player.alive || player.has_flag("wuqian") || player.mark("qinggang") > 0 {
            return Ok(());
        }
        if player.is_wounded() {
            room.set_emotion(owner, "armor/silver_lion");
        }
        room.recover(RecoverStruct {
            who: None,
            to: owner,
            card: Some(card.clone()),
            amount: 1,
        })?;
        Ok(())
    }
}

fn definitions() -> Vec<CardDefinition> {
    let slash_caps = Capabilities::SLASH | Capabilities::DAMAGE;
    vec![
        CardDefinition::new("fire_slash", "Slash", CardType::Basic, Arc::new(SlashBehavior))
            .with_capabilities(slash_caps)
            .with_nature(Nature::Fire),
        CardDefinition::new("thunder_slash", "Slash", CardType::Basic, Arc::new(SlashBehavior))
            .with_capabilities(slash_caps)
            .with_nature(Nature::Thunder),
        CardDefinition::new("analeptic", "Analeptic", CardType::Basic, Arc::new(AnalepticBehavior))
            .with_capabilities(Capabilities::ANALEPTIC)
            .target_fixed()
            .once(),
        CardDefinition::new("fire_attack", "FireAttack", CardType::Trick, Arc::new(FireAttackBehavior))
            .with_capabilities(Capabilities::DAMAGE),
        CardDefinition::new("iron_chain", "IronChain", CardType::Trick, Arc::new(IronChainBehavior)),
        CardDefinition::new("supply_shortage", "SupplyShortage", CardType::DelayedTrick, Arc::new(SupplyShortageBehavior))
            .with_judge(JudgePattern::suits(&[Suit::Club]), true),
        equipment("fan", CardType::Weapon, Arc::new(PlainBehavior))
            .with_range(4)
            .with_skill(Arc::new(FanSkill))
            .with_view_as(Arc::new(FanViewAs)),
        equipment("guding_blade", CardType::Weapon, Arc::new(PlainBehavior))
            .with_range(2)
            .with_skill(Arc::new(GudingBlade)),
        equipment("vine", CardType::Armor, Arc::new(PlainBehavior)).with_skill(Arc::new(Vine)),
        equipment("silver_lion", CardType::Armor, Arc::new(SilverLionBehavior)).with_skill(Arc::new(SilverLion)),
        equipment("hualiu", CardType::DefensiveHorse, Arc::new(PlainBehavior)),
    ]
}

/// Physical cards, by suit. Jink, peach and nullification come from the
/// standard package.
const CARDS: &[(&str, Suit, u8)] = &[
    ("guding_blade", Suit::Spade, 1),
    ("vine", Suit::Spade, 2),
    ("analeptic", Suit::Spade, 3),
    ("thunder_slash", Suit::Spade, 4),
    ("thunder_slash", Suit::Spade, 5),
    ("thunder_slash", Suit::Spade, 6),
    ("thunder_slash", Suit::Spade, 7),
    ("thunder_slash", Suit::Spade, 8),
    ("analeptic", Suit::Spade, 9),
    ("supply_shortage", Suit::Spade, 10),
    ("iron_chain", Suit::Spade, 11),
    ("iron_chain", Suit::Spade, 12),
    ("nullification", Suit::Spade, 13),
    ("silver_lion", Suit::Club, 1),
    ("vine", Suit::Club, 2),
    ("analeptic", Suit::Club, 3),
    ("supply_shortage", Suit::Club, 4),
    ("thunder_slash", Suit::Club, 5),
    ("thunder_slash", Suit::Club, 6),
    ("thunder_slash", Suit::Club, 7),
    ("thunder_slash", Suit::Club, 8),
    ("analeptic", Suit::Club, 9),
    ("iron_chain", Suit::Club, 10),
    ("iron_chain", Suit::Club, 11),
    ("iron_chain", Suit::Club, 12),
    ("iron_chain", Suit::Club, 13),
    ("nullification", Suit::Heart, 1),
    ("fire_attack", Suit::Heart, 2),
    ("fire_attack", Suit::Heart, 3),
    ("fire_slash", Suit::Heart, 4),
    ("peach", Suit::Heart, 5),
    ("peach", Suit::Heart, 6),
    ("fire_slash", Suit::Heart, 7),
    ("jink", Suit::Heart, 8),
    ("jink", Suit::Heart, 9),
    ("fire_slash", Suit::Heart, 10),
    ("jink", Suit::Heart, 11),
    ("jink", Suit::Heart, 12),
    ("nullification", Suit::Heart, 13),
    ("fan", Suit::Diamond, 1),
    ("peach", Suit::Diamond, 2),
    ("peach", Suit::Diamond, 3),
    ("fire_slash", Suit::Diamond, 4),
    ("fire_slash", Suit::Diamond, 5),
    ("jink", Suit::Diamond, 6),
    ("jink", Suit::Diamond, 7),
    ("jink", Suit::Diamond, 8),
    ("analeptic", Suit::Diamond, 9),
    ("jink", Suit::Diamond, 10),
    ("jink", Suit::Diamond, 11),
    ("fire_attack", Suit::Diamond, 12),
    ("hualiu", Suit::Diamond, 13),
];

/// Build the maneuvering package.
#[must_use]
pub fn package() -> Package {
    let package = definitions()
        .into_iter()
        .fold(Package::new("maneuvering"), Package::with_definition);
    CARDS
        .iter()
        .fold(package, |package, &(name, suit, rank)| package.with_card(name, suit, rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::bootstrap;

    #[test]
    fn test_nature_slashes_keep_their_nature() {
        let registry = bootstrap().unwrap();
        let fire = registry.definition("fire_slash").unwrap();
        let thunder = registry.definition("thunder_slash").unwrap();
        assert_eq!(fire.nature, Nature::Fire);
        assert_eq!(thunder.nature, Nature::Thunder);
        assert_eq!(fire.class, "Slash");
    }

    #[test]
    fn test_fan_view_as_only_takes_plain_slash() {
        let registry = bootstrap().unwrap();
        let find = |name: &str| registry.cards().iter().find(|c| c.name() == name).unwrap().clone();
        let slash = find("slash");
        let thunder = find("thunder_slash");

        assert!(FanViewAs.view_filter(&[], &slash));
        assert!(!FanViewAs.view_filter(&[], &thunder));
        assert!(!FanViewAs.view_filter(&[slash.clone()], &slash));
    }

    #[test]
    fn test_maneuvering_requires_standard() {
        let mut registry = crate::cards::CardRegistry::new();
        assert!(matches!(
            registry.install(package()),
            Err(crate::cards::RegistryError::UnknownDefinition { .. })
        ));
    }
}
