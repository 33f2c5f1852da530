//! Card patterns for responses and judgments.
//!
//! Response patterns are written as short strings:
//!
//! | pattern            | matches                                   |
//! |--------------------|-------------------------------------------|
//! | `.`                | any card                                  |
//! | `slash`, `jink`... | cards with that capability (`Capabilities`)|
//! | `fire_slash`       | that exact definition name                |
//! | `.S` `.C` `.H` `.D`| cards of that suit                        |
//! | `a+b`              | either `a` or `b`                         |
//!
//! ```
//! use rust_sgs::cards::CardPattern;
//!
//! let pattern = CardPattern::parse("peach+analeptic").unwrap();
//! assert_eq!(pattern.to_string(), "peach+analeptic");
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use super::definition::{Capabilities, Suit};
use super::instance::Card;

/// Pattern parse failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("empty card pattern")]
    Empty,

    #[error("unknown suit letter in pattern '{0}'")]
    UnknownSuit(String),
}

/// What a response card must satisfy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardPattern {
    Any,
    Capability(Capabilities),
    Name(String),
    Suit(Suit),
    AnyOf(Vec<CardPattern>),
}

const CAPABILITY_NAMES: [(&str, Capabilities); 5] = [
    ("slash", Capabilities::SLASH),
    ("jink", Capabilities::JINK),
    ("peach", Capabilities::PEACH),
    ("analeptic", Capabilities::ANALEPTIC),
    ("nullification", Capabilities::NULLIFICATION),
];

impl CardPattern {
    /// Parse a pattern string.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PatternError::Empty);
        }
        if text.contains('+') {
            let parts = text
                .split('+')
                .map(CardPattern::parse)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(CardPattern::AnyOf(parts));
        }
        if text == "." {
            return Ok(CardPattern::Any);
        }
        if let Some(rest) = text.strip_prefix('.') {
            let mut chars = rest.chars();
            return match (chars.next().and_then(Suit::from_letter), chars.next()) {
                (Some(suit), None) => Ok(CardPattern::Suit(suit)),
                _ => Err(PatternError::UnknownSuit(text.to_string())),
            };
        }
        if let Some((_, caps)) = CAPABILITY_NAMES.iter().find(|(name, _)| *name == text) {
            return Ok(CardPattern::Capability(*caps));
        }
        Ok(CardPattern::Name(text.to_string()))
    }

    /// Pattern matching any card with the capability.
    #[must_use]
    pub fn capability(capability: Capabilities) -> Self {
        CardPattern::Capability(capability)
    }

    /// Pattern matching cards of one suit.
    #[must_use]
    pub fn suit(suit: Suit) -> Self {
        CardPattern::Suit(suit)
    }

    /// Whether some card carrying `capabilities` could answer this pattern,
    /// whatever its name or suit.
    #[must_use]
    pub fn admits(&self, capabilities: Capabilities) -> bool {
        match self {
            CardPattern::Any => true,
            CardPattern::Capability(caps) => capabilities.contains(*caps),
            CardPattern::Name(_) | CardPattern::Suit(_) => false,
            CardPattern::AnyOf(parts) => parts.iter().any(|p| p.admits(capabilities)),
        }
    }

    /// Structural match against a card.
    ///
    /// Cards should be checked through [`Card::matches`], which lets a
    /// card's behavior widen what it answers to.
    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            CardPattern::Any => true,
            CardPattern::Capability(caps) => card.has_capability(*caps),
            CardPattern::Name(name) => card.name() == name,
            CardPattern::Suit(suit) => card.suit() == Some(*suit),
            CardPattern::AnyOf(parts) => parts.iter().any(|p| card.matches(p)),
        }
    }
}

impl std::fmt::Display for CardPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardPattern::Any => write!(f, "."),
            CardPattern::Capability(caps) => {
                let name = CAPABILITY_NAMES
                    .iter()
                    .find(|(_, c)| c == caps)
                    .map_or("?", |(name, _)| *name);
                write!(f, "{name}")
            }
            CardPattern::Name(name) => write!(f, "{name}"),
            CardPattern::Suit(suit) => write!(f, ".{}", suit.letter()),
            CardPattern::AnyOf(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "+")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

/// Suit/rank predicate a judgment card is evaluated against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgePattern {
    /// Allowed suits; empty means any suit.
    pub suits: SmallVec<[Suit; 4]>,
    /// Inclusive rank range; `None` means any rank.
    pub ranks: Option<(u8, u8)>,
}

impl JudgePattern {
    /// Match cards of the given suits.
    #[must_use]
    pub fn suits(suits: &[Suit]) -> Self {
        Self {
            suits: SmallVec::from_slice(suits),
            ranks: None,
        }
    }

    /// Restrict to an inclusive rank range.
    #[must_use]
    pub fn with_ranks(mut self, low: u8, high: u8) -> Self {
        self.ranks = Some((low, high));
        self
    }

    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        let suit_ok = self.suits.is_empty() || card.suit().is_some_and(|s| self.suits.contains(&s));
        let rank_ok = self
            .ranks
            .is_none_or(|(low, high)| (low..=high).contains(&card.rank()));
        suit_ok && rank_ok
    }
}
