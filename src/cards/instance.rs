//! Runtime cards: physical cards and virtual cards.
//!
//! A physical card has its own [`CardId`] and lives in exactly one place.
//! A virtual card is synthesized for one use/effect cycle, usually by a
//! view-as skill, and wraps the ids of the physical cards it consumed. It has
//! no id of its own; moving it moves its subcards.

use std::sync::Arc;

use smallvec::SmallVec;

use super::definition::{Capabilities, CardDefinition, CardId, CardType, Color, Nature, Suit};
use super::pattern::CardPattern;

/// A card as seen by rules: a definition plus suit, rank and provenance.
#[derive(Clone)]
pub struct Card {
    id: Option<CardId>,
    def: Arc<CardDefinition>,
    suit: Option<Suit>,
    rank: u8,
    subcards: SmallVec<[CardId; 2]>,
    skill_name: Option<String>,
}

impl Card {
    /// A physical card.
    #[must_use]
    pub fn physical(id: CardId, def: Arc<CardDefinition>, suit: Suit, rank: u8) -> Self {
        Self {
            id: Some(id),
            def,
            suit: Some(suit),
            rank,
            subcards: SmallVec::new(),
            skill_name: None,
        }
    }

    /// A virtual card wrapping `subcards`.
    ///
    /// Suit and rank are inherited when there is exactly one subcard; a
    /// virtual card built from several cards has the common suit if any, and
    /// no rank.
    #[must_use]
    pub fn virtual_of(def: Arc<CardDefinition>, subcards: &[Card], skill_name: Option<&str>) -> Self {
        let suit = match subcards.first().and_then(Card::suit) {
            Some(first) if subcards.iter().all(|c| c.suit() == Some(first)) => Some(first),
            _ => None,
        };
        let rank = if subcards.len() == 1 { subcards[0].rank } else { 0 };

        Self {
            id: None,
            def,
            suit,
            rank,
            subcards: subcards.iter().flat_map(Card::effective_ids).collect(),
            skill_name: skill_name.map(str::to_string),
        }
    }

    /// Id of a physical card; `None` for virtual cards.
    #[must_use]
    pub fn id(&self) -> Option<CardId> {
        self.id
    }

    /// Physical card ids that move when this card moves.
    #[must_use]
    pub fn effective_ids(&self) -> SmallVec<[CardId; 2]> {
        match self.id {
            Some(id) => SmallVec::from_slice(&[id]),
            None => self.subcards.clone(),
        }
    }

    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.id.is_none()
    }

    #[must_use]
    pub fn definition(&self) -> &Arc<CardDefinition> {
        &self.def
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.def.class
    }

    #[must_use]
    pub fn card_type(&self) -> CardType {
        self.def.card_type
    }

    #[must_use]
    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.def.has_capability(capability)
    }

    #[must_use]
    pub fn nature(&self) -> Nature {
        self.def.nature
    }

    #[must_use]
    pub fn is_target_fixed(&self) -> bool {
        self.def.target_fixed
    }

    #[must_use]
    pub fn suit(&self) -> Option<Suit> {
        self.suit
    }

    #[must_use]
    pub fn color(&self) -> Option<Color> {
        self.suit.map(Suit::color)
    }

    #[must_use]
    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Name of the skill that produced this card, if any.
    #[must_use]
    pub fn skill_name(&self) -> Option<&str> {
        self.skill_name.as_deref()
    }

    /// Tag the card with the skill it is used through.
    #[must_use]
    pub fn with_skill_name(mut self, skill: impl Into<String>) -> Self {
        self.skill_name = Some(skill.into());
        self
    }

    /// Response legality check, delegated to the card's behavior.
    #[must_use]
    pub fn matches(&self, pattern: &CardPattern) -> bool {
        self.def.behavior.matches(self, pattern)
    }
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("Card");
        dbg.field("name", &self.def.name);
        match self.id {
            Some(id) => dbg.field("id", &id),
            None => dbg.field("subcards", &self.subcards),
        };
        dbg.field("suit", &self.suit).field("rank", &self.rank);
        if let Some(skill) = &self.skill_name {
            dbg.field("skill", skill);
        }
        dbg.finish()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.suit, self.id) {
            (Some(suit), Some(_)) => write!(f, "{}[{} {}]", self.def.name, suit.name(), self.rank),
            _ => write!(f, "{}", self.def.name),
        }
    }
}
