//! Zone manager for card locations and movement.
//!
//! Every physical card is in exactly one [`Place`] at a time. The manager
//! keeps a location index (card -> place) and an ordered list per place, and
//! updates both in a single call so a move is atomic from the room's view.
//!
//! Order convention: the last element of a place's list is its top.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::PlayerId;

/// Kinds of card location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Shared face-down pile cards are drawn and judged from.
    DrawPile,
    /// Shared face-up discard pile.
    DiscardPile,
    /// A player's hand.
    Hand,
    /// A player's equipment area.
    Equip,
    /// A player's judging area (attached delayed tricks).
    Judging,
    /// Cards currently being used or judged.
    Table,
}

/// A concrete location: a zone plus its owner for per-player zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Place {
    pub zone: Zone,
    pub owner: Option<PlayerId>,
}

impl Place {
    pub const DRAW_PILE: Place = Place { zone: Zone::DrawPile, owner: None };
    pub const DISCARD_PILE: Place = Place { zone: Zone::DiscardPile, owner: None };
    pub const TABLE: Place = Place { zone: Zone::Table, owner: None };

    #[must_use]
    pub const fn hand(player: PlayerId) -> Self {
        Self { zone: Zone::Hand, owner: Some(player) }
    }

    #[must_use]
    pub const fn equip(player: PlayerId) -> Self {
        Self { zone: Zone::Equip, owner: Some(player) }
    }

    #[must_use]
    pub const fn judging(player: PlayerId) -> Self {
        Self { zone: Zone::Judging, owner: Some(player) }
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.owner {
            Some(owner) => write!(f, "{:?}({})", self.zone, owner),
            None => write!(f, "{:?}", self.zone),
        }
    }
}

/// Position for inserting a card into a place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add on top (end of the list).
    Top,
    /// Add at the bottom (start of the list).
    Bottom,
}

/// Tracks the single location of every card.
///
/// ```
/// use rust_sgs::cards::CardId;
/// use rust_sgs::core::PlayerId;
/// use rust_sgs::zones::{Place, ZoneManager};
///
/// let mut zones = ZoneManager::new();
/// zones.add(CardId::new(1), Place::DRAW_PILE, None);
/// zones.move_to(CardId::new(1), Place::hand(PlayerId::new(0)), None);
///
/// assert_eq!(zones.place_of(CardId::new(1)), Some(Place::hand(PlayerId::new(0))));
/// assert_eq!(zones.count(Place::DRAW_PILE), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    locations: FxHashMap<CardId, Place>,
    order: FxHashMap<Place, Vector<CardId>>,
}

impl ZoneManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a card. Returns `false` if it is already tracked.
    pub fn add(&mut self, card: CardId, place: Place, position: Option<ZonePosition>) -> bool {
        if self.locations.contains_key(&card) {
            return false;
        }
        self.locations.insert(card, place);
        self.insert_ordered(card, place, position);
        true
    }

    /// Move a tracked card. Returns the previous place, or `None` if the
    /// card is not tracked.
    pub fn move_to(
        &mut self,
        card: CardId,
        place: Place,
        position: Option<ZonePosition>,
    ) -> Option<Place> {
        let old = self.locations.get(&card).copied()?;

        if let Some(list) = self.order.get_mut(&old) {
            list.retain(|&c| c != card);
        }
        self.locations.insert(card, place);
        self.insert_ordered(card, place, position);

        Some(old)
    }

    fn insert_ordered(&mut self, card: CardId, place: Place, position: Option<ZonePosition>) {
        let list = self.order.entry(place).or_default();
        match position.unwrap_or(ZonePosition::Top) {
            ZonePosition::Top => list.push_back(card),
            ZonePosition::Bottom => list.push_front(card),
        }
    }

    /// Where a card currently is.
    #[must_use]
    pub fn place_of(&self, card: CardId) -> Option<Place> {
        self.locations.get(&card).copied()
    }

    /// Whether a card is at the given place.
    #[must_use]
    pub fn is_at(&self, card: CardId, place: Place) -> bool {
        self.locations.get(&card) == Some(&place)
    }

    /// Cards at a place, bottom to top.
    #[must_use]
    pub fn cards_at(&self, place: Place) -> Vec<CardId> {
        self.order
            .get(&place)
            .map(|list| list.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of cards at a place.
    #[must_use]
    pub fn count(&self, place: Place) -> usize {
        self.order.get(&place).map_or(0, Vector::len)
    }

    /// Top card of a place.
    #[must_use]
    pub fn top(&self, place: Place) -> Option<CardId> {
        self.order.get(&place)?.last().copied()
    }

    /// Replace the order of a place with a permutation of its cards.
    ///
    /// Returns `false` and leaves the place untouched if `cards` is not a
    /// permutation of the current contents.
    pub fn reorder(&mut self, place: Place, cards: &[CardId]) -> bool {
        let mut current = self.cards_at(place);
        let mut proposed = cards.to_vec();
        current.sort();
        proposed.sort();
        if current != proposed {
            return false;
        }
        self.order.insert(place, cards.iter().copied().collect());
        true
    }

    /// Total number of tracked cards.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.locations.len()
    }
}
