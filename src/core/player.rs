//! Player identification, seat-indexed storage, and per-player game state.
//!
//! ## PlayerId
//!
//! Seat index of a player, 0-based. Seats form a circle: the player after
//! seat `n - 1` is seat 0.
//!
//! ## PlayerMap
//!
//! Per-seat storage backed by `Vec` for O(1) access by `PlayerId`.
//!
//! ## Player
//!
//! Mutable per-player state: HP, alive flag, chain state, flags, marks,
//! per-turn usage history and skipped phases. Card locations (hand, equip,
//! judging area) live in the zone manager, not here.

use im::HashSet as ImHashSet;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

use super::state::Phase;

/// Seat identifier supporting 1-255 players.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seats for a room with `player_count` players.
    ///
    /// ```
    /// use rust_sgs::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(4).collect();
    /// assert_eq!(players.len(), 4);
    /// assert_eq!(players[3], PlayerId::new(3));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// The next seat clockwise.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count) as u8)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use rust_sgs::core::{PlayerId, PlayerMap};
///
/// let mut hp: PlayerMap<i32> = PlayerMap::new(4, |_| 4);
/// hp[PlayerId::new(1)] -= 1;
/// assert_eq!(hp[PlayerId::new(1)], 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Get the number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a seat's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all seat IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.data.len() as u8).map(PlayerId)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// Mutable state of one seated player.
///
/// Only the room writes these fields; everything else reads them through
/// `GameState`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Seat of this player.
    pub id: PlayerId,

    /// Current hit points. May drop to zero or below while dying.
    pub hp: i32,

    /// Maximum hit points.
    pub max_hp: i32,

    /// Dead players are skipped by turn order, distance, and asks.
    pub alive: bool,

    /// Iron-chain state.
    pub chained: bool,

    /// Boolean flags (`drank`, `dying`, ...).
    pub flags: ImHashSet<String>,

    /// Counted marks (`qinggang`, ...).
    pub marks: FxHashMap<String, i32>,

    /// Card classes used this turn, with counts (cleared at turn end).
    pub history: FxHashMap<String, u32>,

    /// Phases to skip on this player's next turn.
    pub skipped: SmallVec<[Phase; 2]>,
}

impl Player {
    /// Create a living player at full health.
    #[must_use]
    pub fn new(id: PlayerId, max_hp: i32) -> Self {
        Self {
            id,
            hp: max_hp,
            max_hp,
            alive: true,
            chained: false,
            flags: ImHashSet::new(),
            marks: FxHashMap::default(),
            history: FxHashMap::default(),
            skipped: SmallVec::new(),
        }
    }

    /// Check a boolean flag.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Get a mark count (0 when absent).
    #[must_use]
    pub fn mark(&self, mark: &str) -> i32 {
        self.marks.get(mark).copied().unwrap_or(0)
    }

    /// Whether a card class has been used this turn.
    #[must_use]
    pub fn has_used(&self, class: &str) -> bool {
        self.used_times(class) > 0
    }

    /// How many times a card class has been used this turn.
    #[must_use]
    pub fn used_times(&self, class: &str) -> u32 {
        self.history.get(class).copied().unwrap_or(0)
    }

    /// Hit points below maximum.
    #[must_use]
    pub fn is_wounded(&self) -> bool {
        self.hp < self.max_hp
    }

    /// Whether the given phase is scheduled to be skipped.
    #[must_use]
    pub fn is_skipping(&self, phase: Phase) -> bool {
        self.skipped.contains(&phase)
    }
}
