//! Game state: players, card locations, cards, turn progress.
//!
//! `GameState` is owned by a [`Room`](crate::room::Room) and is the single
//! source of truth for a game. Everything outside the room reads it through
//! the accessors here; the mutable accessors are crate-private so that the
//! room stays the sole writer.
//!
//! ## Seats and distance
//!
//! Players sit in a circle. The distance between two living players is the
//! shorter walk around the circle, counting only living seats, adjusted by
//! horses: +1 when the target rides a defensive horse, -1 when the source
//! rides an offensive horse, never below 1.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::player::{Player, PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{Card, CardId, CardType};
use crate::zones::{Place, ZoneManager};

/// Turn phases, in order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    NotActive,
    Start,
    Judge,
    Draw,
    Play,
    Discard,
    Finish,
}

impl Phase {
    /// Phases of one turn, in order.
    pub const TURN: [Phase; 6] = [
        Phase::Start,
        Phase::Judge,
        Phase::Draw,
        Phase::Play,
        Phase::Discard,
        Phase::Finish,
    ];
}

/// Whose turn it is and how far it has progressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub current: PlayerId,
    pub phase: Phase,
    /// Turns started so far.
    pub turn_number: u32,
}

/// Complete state of one game.
#[derive(Clone, Debug)]
pub struct GameState {
    players: PlayerMap<Player>,
    zones: ZoneManager,
    cards: FxHashMap<CardId, Card>,
    /// Virtual delayed tricks, keyed by each physical card behind them.
    attached: FxHashMap<CardId, Card>,
    rng: GameRng,
    turn: TurnState,
}

impl GameState {
    /// Create a state with `player_count` players at `max_hp` and no cards.
    #[must_use]
    pub fn new(player_count: usize, max_hp: i32, seed: u64) -> Self {
        Self {
            players: PlayerMap::new(player_count, |id| Player::new(id, max_hp)),
            zones: ZoneManager::new(),
            cards: FxHashMap::default(),
            attached: FxHashMap::default(),
            rng: GameRng::new(seed),
            turn: TurnState::default(),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id]
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().map(|(_, p)| p)
    }

    /// Living players in seat order starting from `from` (inclusive).
    #[must_use]
    pub fn alive_players_from(&self, from: PlayerId) -> Vec<PlayerId> {
        let count = self.player_count();
        (0..count)
            .map(|step| PlayerId::new(((from.index() + step) % count) as u8))
            .filter(|&p| self.players[p].alive)
            .collect()
    }

    /// Living players in seat order starting from seat 0.
    #[must_use]
    pub fn alive_players(&self) -> Vec<PlayerId> {
        self.alive_players_from(PlayerId::new(0))
    }

    /// Living players other than `player`, clockwise from the seat after it.
    #[must_use]
    pub fn other_alive_players(&self, player: PlayerId) -> Vec<PlayerId> {
        self.alive_players_from(player.next(self.player_count()))
            .into_iter()
            .filter(|&p| p != player)
            .collect()
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    #[must_use]
    pub fn place_of(&self, id: CardId) -> Option<Place> {
        self.zones.place_of(id)
    }

    /// Hand cards, oldest first.
    #[must_use]
    pub fn hand(&self, player: PlayerId) -> Vec<CardId> {
        self.zones.cards_at(Place::hand(player))
    }

    #[must_use]
    pub fn hand_count(&self, player: PlayerId) -> usize {
        self.zones.count(Place::hand(player))
    }

    #[must_use]
    pub fn equips(&self, player: PlayerId) -> Vec<CardId> {
        self.zones.cards_at(Place::equip(player))
    }

    /// Delayed tricks attached to a player, oldest first.
    #[must_use]
    pub fn judging(&self, player: PlayerId) -> Vec<CardId> {
        self.zones.cards_at(Place::judging(player))
    }

    /// The delayed trick a judging-area card stands for: the virtual card it
    /// was attached as, or the card itself.
    #[must_use]
    pub fn delayed_trick(&self, id: CardId) -> Option<&Card> {
        self.attached.get(&id).or_else(|| self.cards.get(&id))
    }

    /// The equipment in a slot, if any.
    #[must_use]
    pub fn equipped(&self, player: PlayerId, slot: CardType) -> Option<&Card> {
        self.equips(player)
            .into_iter()
            .filter_map(|id| self.cards.get(&id))
            .find(|card| card.card_type() == slot)
    }

    #[must_use]
    pub fn turn(&self) -> TurnState {
        self.turn
    }

    /// Attack range: the equipped weapon's range, or 1.
    #[must_use]
    pub fn attack_range(&self, player: PlayerId) -> u32 {
        self.equipped(player, CardType::Weapon)
            .and_then(|weapon| weapon.definition().weapon_range)
            .unwrap_or(1)
    }

    /// Seat distance between two players, with horse adjustments.
    #[must_use]
    pub fn distance(&self, from: PlayerId, to: PlayerId) -> u32 {
        if from == to {
            return 0;
        }
        let seats = self.alive_players_from(from);
        let Some(right) = seats.iter().position(|&p| p == to) else {
            // Dead players are out of reach.
            return u32::MAX;
        };
        let left = seats.len() - right;
        let mut distance = right.min(left) as i64;

        if self.equipped(to, CardType::DefensiveHorse).is_some() {
            distance += 1;
        }
        if self.equipped(from, CardType::OffensiveHorse).is_some() {
            distance -= 1;
        }
        distance.max(1) as u32
    }

    /// Whether `to` is within `from`'s attack range.
    #[must_use]
    pub fn in_attack_range(&self, from: PlayerId, to: PlayerId) -> bool {
        from != to && self.distance(from, to) <= self.attack_range(from)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id]
    }

    pub(crate) fn zones_mut(&mut self) -> &mut ZoneManager {
        &mut self.zones
    }

    pub(crate) fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    pub(crate) fn turn_mut(&mut self) -> &mut TurnState {
        &mut self.turn
    }

    pub(crate) fn attach_trick(&mut self, card: &Card) {
        if card.is_virtual() {
            for id in card.effective_ids() {
                self.attached.insert(id, card.clone());
            }
        }
    }

    pub(crate) fn detach_trick(&mut self, id: CardId) -> Option<Card> {
        self.attached.remove(&id)
    }

    pub(crate) fn insert_card(&mut self, card: Card, place: Place) {
        if let Some(id) = card.id() {
            self.zones.add(id, place, None);
            self.cards.insert(id, card);
        }
    }
}
