//! The standard package: basic cards, nullification, AOE tricks, the
//! Qinggang sword and two horses.

use std::sync::Arc;

use crate::cards::{
    Capabilities, Card, CardBehavior, CardDefinition, CardPattern, CardType, Package, PlainBehavior, Suit,
};
use crate::core::{EngineError, PlayerId};
use crate::room::Room;
use crate::triggers::{
    CardEffectStruct, CardUseStruct, DamageStruct, EventPayload, RecoverStruct, Skill, SkillKind,
    SlashEffectStruct, TriggerEvent,
};

/// Slash rules, shared by every slash variant.
///
/// Usable while the per-turn slash allowance lasts, against other players in
/// attack range (one target plus any skill-granted extras). A pending
/// `drank` bonus applies to every target of the slash and is spent once the
/// slash is used, even when `CardUsed` is consumed or the use aborts.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlashBehavior;

impl CardBehavior for SlashBehavior {
    fn is_available(&self, room: &Room, _card: &Card, player: PlayerId) -> bool {
        room.can_slash(player)
    }

    fn target_filter(
        &self,
        room: &Room,
        card: &Card,
        selected: &[PlayerId],
        candidate: PlayerId,
        actor: PlayerId,
    ) -> bool {
        selected.len() < 1 + room.extra_targets(actor, card)
            && candidate != actor
            && room.state().in_attack_range(actor, candidate)
    }

    fn on_use(&self, room: &mut Room, card_use: &CardUseStruct) -> Result<(), EngineError> {
        let result = room.default_on_use(card_use);
        room.clear_flag(card_use.from, "drank");
        result
    }

    fn on_effect(&self, room: &mut Room, effect: &CardEffectStruct) -> Result<(), EngineError> {
        let Some(from) = effect.from else {
            return Ok(());
        };
        let drank = room.state().player(from).has_flag("drank");
        room.slash_effect(SlashEffectStruct {
            slash: effect.card.clone(),
            from,
            to: effect.to,
            nature: effect.card.nature(),
            drank,
            jink: None,
        })
    }
}

/// Cards that only answer requests: jink and nullification.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseOnly;

impl CardBehavior for ResponseOnly {
    fn is_available(&self, _room: &Room, _card: &Card, _player: PlayerId) -> bool {
        false
    }
}

/// Peach: recover one HP. Usable on yourself while wounded, and by anyone
/// to rescue a dying player.
#[derive(Clone, Copy, Debug, Default)]
pub struct PeachBehavior;

impl CardBehavior for PeachBehavior {
    fn is_available(&self, room: &Room, _card: &Card, player: PlayerId) -> bool {
        room.state().player(player).is_wounded()
    }

    fn on_effect(&self, room: &mut Room, effect: &CardEffectStruct) -> Result<(), EngineError> {
        room.recover(RecoverStruct {
            who: effect.from,
            to: effect.to,
            card: Some(effect.card.clone()),
            amount: 1,
        })?;
        Ok(())
    }
}

/// Trick hitting every other living player, each of whom may answer with a
/// card of the `response` capability to avoid one damage.
#[derive(Clone, Copy, Debug)]
pub struct AoeBehavior {
    response: Capabilities,
    reason: &'static str,
}

impl AoeBehavior {
    /// Archery attack: answered with a jink.
    pub const ARCHERY: AoeBehavior = AoeBehavior {
        response: Capabilities::JINK,
        reason: "jink",
    };

    /// Savage assault: answered with a slash.
    pub const SAVAGE: AoeBehavior = AoeBehavior {
        response: Capabilities::SLASH,
        reason: "slash",
    };
}

impl CardBehavior for AoeBehavior {
    fn is_available(&self, room: &Room, _card: &Card, player: PlayerId) -> bool {
        !room.state().other_alive_players(player).is_empty()
    }

    fn use_card(&self, room: &mut Room, card: &Card, source: PlayerId, _targets: &[PlayerId]) -> Result<(), EngineError> {
        let targets = room.state().other_alive_players(source);
        let multiple = targets.len() > 1;
        for to in targets {
            room.card_effect(CardEffectStruct {
                card: card.clone(),
                from: Some(source),
                to,
                multiple,
            })?;
        }
        Ok(())
    }

    fn on_effect(&self, room: &mut Room, effect: &CardEffectStruct) -> Result<(), EngineError> {
        let pattern = CardPattern::capability(self.response);
        let prompt = format!("{}:{}", effect.card.name(), effect.to.index());
        if let Some(answer) = room.ask_for_card(effect.to, &pattern, &prompt, self.reason)? {
            room.discard(Some(effect.to), &answer)?;
            return Ok(());
        }
        room.damage(DamageStruct::new(effect.from, effect.to).with_card(effect.card.clone()))?;
        Ok(())
    }
}

/// Qinggang sword: the wielder's slashes ignore the target's armor.
struct QinggangSword;

impl Skill for QinggangSword {
    fn name(&self) -> &str {
        "qinggang_sword"
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
        let to = payload.slash_effect(event)?.to;
        room.set_emotion(owner, "weapon/qinggang_sword");
        room.add_mark(to, "qinggang", 1);
        Ok(false)
    }
}

/// Equipment definition: target-fixed, installed on use.
pub(crate) fn equipment(name: &str, card_type: CardType, behavior: Arc<dyn CardBehavior>) -> CardDefinition {
    let class = match card_type {
        CardType::DefensiveHorse => "DefensiveHorse",
        CardType::OffensiveHorse => "OffensiveHorse",
        CardType::Armor => "Armor",
        _ => "Weapon",
    };
    CardDefinition::new(name, class, card_type, behavior).target_fixed()
}

fn definitions() -> Vec<CardDefinition> {
    vec![
        CardDefinition::new("slash", "Slash", CardType::Basic, Arc::new(SlashBehavior))
            .with_capabilities(Capabilities::SLASH | Capabilities::DAMAGE),
        CardDefinition::new("jink", "Jink", CardType::Basic, Arc::new(ResponseOnly)).with_capabilities(Capabilities::JINK),
        CardDefinition::new("peach", "Peach", CardType::Basic, Arc::new(PeachBehavior))
            .with_capabilities(Capabilities::PEACH)
            .target_fixed(),
        CardDefinition::new("nullification", "Nullification", CardType::Trick, Arc::new(ResponseOnly))
            .with_capabilities(Capabilities::NULLIFICATION),
        CardDefinition::new("archery_attack", "ArcheryAttack", CardType::Trick, Arc::new(AoeBehavior::ARCHERY))
            .with_capabilities(Capabilities::AOE | Capabilities::DAMAGE)
            .target_fixed(),
        CardDefinition::new("savage_assault", "SavageAssault", CardType::Trick, Arc::new(AoeBehavior::SAVAGE))
            .with_capabilities(Capabilities::AOE | Capabilities::DAMAGE)
            .target_fixed(),
        equipment("qinggang_sword", CardType::Weapon, Arc::new(PlainBehavior))
            .with_range(2)
            .with_skill(Arc::new(QinggangSword)),
        equipment("jueying", CardType::DefensiveHorse, Arc::new(PlainBehavior)),
        equipment("chitu", CardType::OffensiveHorse, Arc::new(PlainBehavior)),
    ]
}

/// Physical cards, by suit.
const CARDS: &[(&str, Suit, u8)] = &[
    ("jueying", Suit::Spade, 5),
    ("qinggang_sword", Suit::Spade, 6),
    ("savage_assault", Suit::Spade, 7),
    ("slash", Suit::Spade, 7),
    ("slash", Suit::Spade, 8),
    ("slash", Suit::Spade, 8),
    ("slash", Suit::Spade, 9),
    ("slash", Suit::Spade, 9),
    ("slash", Suit::Spade, 10),
    ("slash", Suit::Spade, 10),
    ("nullification", Suit::Spade, 11),
    ("savage_assault", Suit::Spade, 13),
    ("slash", Suit::Club, 2),
    ("slash", Suit::Club, 3),
    ("slash", Suit::Club, 4),
    ("slash", Suit::Club, 5),
    ("slash", Suit::Club, 6),
    ("savage_assault", Suit::Club, 7),
    ("slash", Suit::Club, 7),
    ("slash", Suit::Club, 8),
    ("slash", Suit::Club, 8),
    ("slash", Suit::Club, 9),
    ("slash", Suit::Club, 9),
    ("slash", Suit::Club, 10),
    ("slash", Suit::Club, 10),
    ("slash", Suit::Club, 11),
    ("slash", Suit::Club, 11),
    ("nullification", Suit::Club, 12),
    ("nullification", Suit::Club, 13),
    ("archery_attack", Suit::Heart, 1),
    ("jink", Suit::Heart, 2),
    ("jink", Suit::Heart, 2),
    ("peach", Suit::Heart, 3),
    ("peach", Suit::Heart, 4),
    ("chitu", Suit::Heart, 5),
    ("peach", Suit::Heart, 6),
    ("peach", Suit::Heart, 7),
    ("peach", Suit::Heart, 8),
    ("peach", Suit::Heart, 9),
    ("slash", Suit::Heart, 10),
    ("slash", Suit::Heart, 10),
    ("slash", Suit::Heart, 11),
    ("peach", Suit::Heart, 12),
    ("jink", Suit::Heart, 13),
    ("jink", Suit::Diamond, 2),
    ("jink", Suit::Diamond, 2),
    ("jink", Suit::Diamond, 3),
    ("jink", Suit::Diamond, 4),
    ("jink", Suit::Diamond, 5),
    ("slash", Suit::Diamond, 6),
    ("jink", Suit::Diamond, 6),
    ("slash", Suit::Diamond, 7),
    ("jink", Suit::Diamond, 7),
    ("slash", Suit::Diamond, 8),
    ("jink", Suit::Diamond, 8),
    ("slash", Suit::Diamond, 9),
    ("jink", Suit::Diamond, 9),
    ("slash", Suit::Diamond, 10),
    ("jink", Suit::Diamond, 10),
    ("jink", Suit::Diamond, 11),
    ("jink", Suit::Diamond, 11),
    ("peach", Suit::Diamond, 12),
    ("slash", Suit::Diamond, 13),
];

/// Build the standard package.
#[must_use]
pub fn package() -> Package {
    let package = definitions()
        .into_iter()
        .fold(Package::new("standard"), Package::with_definition);
    CARDS
        .iter()
        .fold(package, |package, &(name, suit, rank)| package.with_card(name, suit, rank))
}
