//! Card definitions - static card data.
//!
//! A `CardDefinition` describes one kind of card ("fire_slash", "vine"): its
//! type, capabilities, nature, use flags, attached skills, and the
//! [`CardBehavior`] that implements its rules. Physical cards pair a
//! definition with a suit and rank; see [`Card`](super::Card).

use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::behavior::CardBehavior;
use super::pattern::JudgePattern;
use crate::triggers::{Skill, ViewAsSkill};

/// Unique identifier of a physical card within a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spade,
    Club,
    Heart,
    Diamond,
}

/// Card color, derived from suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Black,
    Red,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Club, Suit::Heart, Suit::Diamond];

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Suit::Spade | Suit::Club => Color::Black,
            Suit::Heart | Suit::Diamond => Color::Red,
        }
    }

    /// Lowercase suit name as used in log arguments.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Suit::Spade => "spade",
            Suit::Club => "club",
            Suit::Heart => "heart",
            Suit::Diamond => "diamond",
        }
    }

    /// Single-letter code used by suit patterns (`.S`, `.H`, ...).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Suit::Spade => 'S',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Diamond => 'D',
        }
    }

    #[must_use]
    pub fn from_letter(letter: char) -> Option<Suit> {
        Suit::ALL.into_iter().find(|s| s.letter() == letter.to_ascii_uppercase())
    }
}

/// Damage classification carried by slashes and damage events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    #[default]
    Normal,
    Fire,
    Thunder,
}

impl Nature {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Nature::Normal => "normal",
            Nature::Fire => "fire",
            Nature::Thunder => "thunder",
        }
    }
}

/// Card subtype tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Basic,
    /// Resolves immediately.
    Trick,
    /// Attaches to a target and resolves through a judgment.
    DelayedTrick,
    Weapon,
    Armor,
    DefensiveHorse,
    OffensiveHorse,
}

impl CardType {
    /// Equipment occupies a slot in the equipment area.
    #[must_use]
    pub const fn is_equipment(self) -> bool {
        matches!(
            self,
            CardType::Weapon | CardType::Armor | CardType::DefensiveHorse | CardType::OffensiveHorse
        )
    }

    #[must_use]
    pub const fn is_trick(self) -> bool {
        matches!(self, CardType::Trick | CardType::DelayedTrick)
    }
}

bitflags! {
    /// Rule-relevant capabilities of a card, checked instead of names.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capabilities: u32 {
        const SLASH = 1;
        const JINK = 1 << 1;
        const PEACH = 1 << 2;
        const ANALEPTIC = 1 << 3;
        const NULLIFICATION = 1 << 4;
        /// Affects every other player (area of effect).
        const AOE = 1 << 5;
        /// Deals damage as its effect.
        const DAMAGE = 1 << 6;
    }
}

/// Judgment a delayed trick performs when it resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JudgeSpec {
    pub pattern: JudgePattern,
    /// Whether a card matching the pattern counts as a good outcome.
    pub good: bool,
    pub reason: String,
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use rust_sgs::cards::{Capabilities, CardDefinition, CardType, Nature};
/// use rust_sgs::packages::standard::SlashBehavior;
///
/// let fire = CardDefinition::new("fire_slash", "Slash", CardType::Basic, Arc::new(SlashBehavior))
///     .with_capabilities(Capabilities::SLASH | Capabilities::DAMAGE)
///     .with_nature(Nature::Fire);
///
/// assert_eq!(fire.nature, Nature::Fire);
/// assert!(fire.capabilities.contains(Capabilities::SLASH));
/// ```
#[derive(Clone)]
pub struct CardDefinition {
    /// Globally unique definition name.
    pub name: String,

    /// Usage-history class shared by variants ("Slash" for every slash).
    pub class: String,

    pub card_type: CardType,

    pub capabilities: Capabilities,

    /// Fixed at construction; variants never reassign it.
    pub nature: Nature,

    /// Applies to its user without target selection.
    pub target_fixed: bool,

    /// Limited to one use per turn.
    pub once: bool,

    /// Attack range granted while equipped (weapons only).
    pub weapon_range: Option<u32>,

    /// Judgment for delayed tricks.
    pub judge: Option<JudgeSpec>,

    /// Trigger skill active while the card is equipped.
    pub skill: Option<Arc<dyn Skill>>,

    /// View-as skill granted to the wearer while equipped.
    pub view_as: Option<Arc<dyn ViewAsSkill>>,

    pub behavior: Arc<dyn CardBehavior>,
}

impl CardDefinition {
    /// Create a new definition with no capabilities and normal nature.
    pub fn new(
        name: impl Into<String>,
        class: impl Into<String>,
        card_type: CardType,
        behavior: Arc<dyn CardBehavior>,
    ) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            card_type,
            capabilities: Capabilities::empty(),
            nature: Nature::Normal,
            target_fixed: false,
            once: false,
            weapon_range: None,
            judge: None,
            skill: None,
            view_as: None,
            behavior,
        }
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities |= capabilities;
        self
    }

    #[must_use]
    pub fn with_nature(mut self, nature: Nature) -> Self {
        self.nature = nature;
        self
    }

    #[must_use]
    pub fn target_fixed(mut self) -> Self {
        self.target_fixed = true;
        self
    }

    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: u32) -> Self {
        self.weapon_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_judge(mut self, pattern: JudgePattern, good: bool) -> Self {
        self.judge = Some(JudgeSpec {
            pattern,
            good,
            reason: self.name.clone(),
        });
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: Arc<dyn Skill>) -> Self {
        self.skill = Some(skill);
        self
    }

    #[must_use]
    pub fn with_view_as(mut self, skill: Arc<dyn ViewAsSkill>) -> Self {
        self.view_as = Some(skill);
        self
    }

    #[must_use]
    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.capabilities.intersects(capability)
    }
}

impl std::fmt::Debug for CardDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDefinition")
            .field("name", &self.name)
            .field("class", &self.class)
            .field("card_type", &self.card_type)
            .field("capabilities", &self.capabilities)
            .field("nature", &self.nature)
            .field("target_fixed", &self.target_fixed)
            .field("once", &self.once)
            .field("skill", &self.skill.as_ref().map(|s| s.name().to_string()))
            .finish_non_exhaustive()
    }
}
