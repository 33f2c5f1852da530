//! Ask collaborator: the suspension points of the room.
//!
//! Whenever the rules need a player's decision the room calls its
//! [`AskHandler`] and waits for the answer. Every ask has a documented
//! default that applies when the handler times out or the player is
//! disconnected:
//!
//! | ask                     | default                          |
//! |-------------------------|----------------------------------|
//! | `ask_for_skill_invoke`  | decline                          |
//! | `ask_for_card`          | no card                          |
//! | `ask_for_card_show`     | first hand card                  |
//! | `ask_for_use`           | end the play phase               |
//! | `ask_for_discard`       | oldest hand cards                |
//!
//! Defaults are logged with `warn!`. Only [`AskError::Failed`] aborts the
//! current action.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cards::{Card, CardId, CardPattern};
use crate::core::{EngineError, GameState, PlayerId, UseError};
use crate::triggers::EventPayload;

use super::{LogMessage, Room};

/// How an ask failed to produce an answer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AskError {
    #[error("timed out")]
    Timeout,

    #[error("disconnected")]
    Disconnected,

    /// A failure no default can cover.
    #[error("{0}")]
    Failed(String),
}

/// A card offered in answer to an ask or as part of a use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardChoice {
    /// A held physical card.
    Physical(CardId),
    /// A virtual card built by a view-as skill from held cards.
    ViewAs { skill: String, cards: Vec<CardId> },
}

/// A play-phase intent: this card on these targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UseIntent {
    pub card: CardChoice,
    pub targets: Vec<PlayerId>,
}

impl UseIntent {
    pub fn new(card: CardId, targets: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            card: CardChoice::Physical(card),
            targets: targets.into_iter().collect(),
        }
    }

    pub fn view_as(
        skill: impl Into<String>,
        cards: impl IntoIterator<Item = CardId>,
        targets: impl IntoIterator<Item = PlayerId>,
    ) -> Self {
        Self {
            card: CardChoice::ViewAs {
                skill: skill.into(),
                cards: cards.into_iter().collect(),
            },
            targets: targets.into_iter().collect(),
        }
    }
}

/// Parameters of a card request.
#[derive(Clone, Debug)]
pub struct CardRequest<'a> {
    pub pattern: &'a CardPattern,
    pub prompt: &'a str,
    /// Short reason key (`jink`, `nullification`, `fire_attack`, ...).
    pub reason: &'a str,
}

/// Player-decision collaborator.
pub trait AskHandler: Send {
    fn ask_for_skill_invoke(
        &mut self,
        state: &GameState,
        player: PlayerId,
        skill: &str,
        payload: &EventPayload,
    ) -> Result<bool, AskError>;

    fn ask_for_card(
        &mut self,
        state: &GameState,
        player: PlayerId,
        request: &CardRequest<'_>,
    ) -> Result<Option<CardChoice>, AskError>;

    fn ask_for_card_show(
        &mut self,
        state: &GameState,
        player: PlayerId,
        requester: PlayerId,
        reason: &str,
    ) -> Result<CardId, AskError>;

    fn ask_for_use(&mut self, state: &GameState, player: PlayerId) -> Result<Option<UseIntent>, AskError>;

    fn ask_for_discard(
        &mut self,
        state: &GameState,
        player: PlayerId,
        count: usize,
        reason: &str,
    ) -> Result<Vec<CardId>, AskError>;
}

/// Handler that answers every ask with its default immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassiveAsk;

impl AskHandler for PassiveAsk {
    fn ask_for_skill_invoke(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        _skill: &str,
        _payload: &EventPayload,
    ) -> Result<bool, AskError> {
        Ok(false)
    }

    fn ask_for_card(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        _request: &CardRequest<'_>,
    ) -> Result<Option<CardChoice>, AskError> {
        Ok(None)
    }

    fn ask_for_card_show(
        &mut self,
        state: &GameState,
        player: PlayerId,
        _requester: PlayerId,
        _reason: &str,
    ) -> Result<CardId, AskError> {
        state.hand(player).first().copied().ok_or(AskError::Timeout)
    }

    fn ask_for_use(&mut self, _state: &GameState, _player: PlayerId) -> Result<Option<UseIntent>, AskError> {
        Ok(None)
    }

    fn ask_for_discard(
        &mut self,
        state: &GameState,
        player: PlayerId,
        count: usize,
        _reason: &str,
    ) -> Result<Vec<CardId>, AskError> {
        Ok(state.hand(player).into_iter().take(count).collect())
    }
}

/// Handler answering from per-player queues.
///
/// Card answers are keyed by player and request reason, skill invocations by
/// player and skill name. An empty queue answers with
/// [`AskError::Timeout`], so the room falls back to the ask's default; only
/// the decisions a scenario cares about need scripting.
///
/// ```
/// use rust_sgs::cards::CardId;
/// use rust_sgs::core::PlayerId;
/// use rust_sgs::room::{CardChoice, ScriptedAsk};
///
/// let ask = ScriptedAsk::new()
///     .invoke(PlayerId::new(0), "fan", true)
///     .card(PlayerId::new(1), "jink", Some(CardChoice::Physical(CardId::new(3))));
/// assert_eq!(ask.pending(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptedAsk {
    invokes: FxHashMap<(PlayerId, String), VecDeque<bool>>,
    cards: FxHashMap<(PlayerId, String), VecDeque<Option<CardChoice>>>,
    shows: FxHashMap<PlayerId, VecDeque<CardId>>,
    uses: FxHashMap<PlayerId, VecDeque<Option<UseIntent>>>,
    discards: FxHashMap<PlayerId, VecDeque<Vec<CardId>>>,
    broken: FxHashMap<PlayerId, AskError>,
}

impl ScriptedAsk {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn invoke(mut self, player: PlayerId, skill: &str, accept: bool) -> Self {
        self.invokes
            .entry((player, skill.to_string()))
            .or_default()
            .push_back(accept);
        self
    }

    #[must_use]
    pub fn card(mut self, player: PlayerId, reason: &str, choice: Option<CardChoice>) -> Self {
        self.cards
            .entry((player, reason.to_string()))
            .or_default()
            .push_back(choice);
        self
    }

    #[must_use]
    pub fn show(mut self, player: PlayerId, card: CardId) -> Self {
        self.shows.entry(player).or_default().push_back(card);
        self
    }

    #[must_use]
    pub fn play(mut self, player: PlayerId, intent: UseIntent) -> Self {
        self.uses.entry(player).or_default().push_back(Some(intent));
        self
    }

    #[must_use]
    pub fn discard(mut self, player: PlayerId, cards: Vec<CardId>) -> Self {
        self.discards.entry(player).or_default().push_back(cards);
        self
    }

    /// Make every ask to `player` fail with `error`.
    #[must_use]
    pub fn broken(mut self, player: PlayerId, error: AskError) -> Self {
        self.broken.insert(player, error);
        self
    }

    /// Scripted answers not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.invokes.values().map(VecDeque::len).sum::<usize>()
            + self.cards.values().map(VecDeque::len).sum::<usize>()
            + self.shows.values().map(VecDeque::len).sum::<usize>()
            + self.uses.values().map(VecDeque::len).sum::<usize>()
            + self.discards.values().map(VecDeque::len).sum::<usize>()
    }

    fn check(&self, player: PlayerId) -> Result<(), AskError> {
        match self.broken.get(&player) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl AskHandler for ScriptedAsk {
    fn ask_for_skill_invoke(
        &mut self,
        _state: &GameState,
        player: PlayerId,
        skill: &str,
        _payload: &EventPayload,
    ) -> Result<bool, AskError> {
        self.check(player)?;
        self.invokes
            .get_mut(&(player, skill.to_string()))
            .and_then(VecDeque::pop_front)
            .ok_or(AskError::Timeout)
    }

    fn ask_for_card(
        &mut self,
        _state: &GameState,
        player: PlayerId,
        request: &CardRequest<'_>,
    ) -> Result<Option<CardChoice>, AskError> {
        self.check(player)?;
        self.cards
            .get_mut(&(player, request.reason.to_string()))
            .and_then(VecDeque::pop_front)
            .ok_or(AskError::Timeout)
    }

    fn ask_for_card_show(
        &mut self,
        _state: &GameState,
        player: PlayerId,
        _requester: PlayerId,
        _reason: &str,
    ) -> Result<CardId, AskError> {
        self.check(player)?;
        self.shows
            .get_mut(&player)
            .and_then(VecDeque::pop_front)
            .ok_or(AskError::Timeout)
    }

    fn ask_for_use(&mut self, _state: &GameState, player: PlayerId) -> Result<Option<UseIntent>, AskError> {
        self.check(player)?;
        self.uses
            .get_mut(&player)
            .and_then(VecDeque::pop_front)
            .ok_or(AskError::Timeout)
    }

    fn ask_for_discard(
        &mut self,
        _state: &GameState,
        player: PlayerId,
        _count: usize,
        _reason: &str,
    ) -> Result<Vec<CardId>, AskError> {
        self.check(player)?;
        self.discards
            .get_mut(&player)
            .and_then(VecDeque::pop_front)
            .ok_or(AskError::Timeout)
    }
}

impl Room {
    /// Map an ask result to its answer, falling back to `default` on
    /// timeout or disconnect.
    fn settle<T>(&self, player: PlayerId, ask: &str, result: Result<T, AskError>, default: T) -> Result<T, EngineError> {
        match result {
            Ok(answer) => Ok(answer),
            Err(error @ (AskError::Timeout | AskError::Disconnected)) => {
                warn!(%player, ask, %error, "ask resolved to default");
                Ok(default)
            }
            Err(AskError::Failed(message)) => {
                tracing::error!(%player, ask, %message, "ask failed");
                Err(EngineError::Collaborator { player, message })
            }
        }
    }

    /// Ask whether `player` invokes an optional skill. Defaults to no.
    pub fn ask_for_skill_invoke(
        &mut self,
        player: PlayerId,
        skill: &str,
        payload: &EventPayload,
    ) -> Result<bool, EngineError> {
        let result = self.ask.ask_for_skill_invoke(&self.state, player, skill, payload);
        let accepted = self.settle(player, "skill_invoke", result, false)?;
        if accepted {
            self.send_log(LogMessage::new("#InvokeSkill").from(player).arg(skill));
        }
        Ok(accepted)
    }

    /// Ask `player` for a card matching `pattern`. Defaults to no card.
    ///
    /// Answers that are not held or do not match are re-asked silently, up
    /// to the configured re-prompt limit. The returned card has not moved
    /// yet; the caller decides where it goes.
    pub fn ask_for_card(
        &mut self,
        player: PlayerId,
        pattern: &CardPattern,
        prompt: &str,
        reason: &str,
    ) -> Result<Option<Card>, EngineError> {
        if !self.state.player(player).alive {
            return Ok(None);
        }
        for _ in 0..=self.config.max_reprompts {
            let request = CardRequest { pattern, prompt, reason };
            let result = self.ask.ask_for_card(&self.state, player, &request);
            let Some(choice) = self.settle(player, "card", result, None)? else {
                return Ok(None);
            };
            match self.resolve_response(player, &choice, pattern) {
                Ok(card) => return Ok(Some(card)),
                Err(error) => debug!(%player, reason, %error, "card answer rejected"),
            }
        }
        Ok(None)
    }

    fn resolve_response(&self, player: PlayerId, choice: &CardChoice, pattern: &CardPattern) -> Result<Card, UseError> {
        if let CardChoice::ViewAs { skill, .. } = choice {
            let enabled = self
                .triggers
                .view_as_skill(player, skill)
                .is_some_and(|s| s.enabled_at_response(self, player, pattern));
            if !enabled {
                return Err(UseError::ViewAsRejected(skill.clone()));
            }
        }
        let card = self.resolve_choice(player, choice)?;
        if card.matches(pattern) {
            Ok(card)
        } else {
            Err(UseError::PatternMismatch)
        }
    }

    /// Ask `player` to show a hand card to `requester`. A single hand card
    /// is shown without asking; an empty hand shows nothing. Defaults to
    /// the first hand card.
    pub fn ask_for_card_show(
        &mut self,
        player: PlayerId,
        requester: PlayerId,
        reason: &str,
    ) -> Result<Option<Card>, EngineError> {
        let hand = self.state.hand(player);
        let Some(&first) = hand.first() else {
            return Ok(None);
        };
        let id = if hand.len() == 1 {
            first
        } else {
            let result = self.ask.ask_for_card_show(&self.state, player, requester, reason);
            let answer = self.settle(player, "card_show", result, first)?;
            if hand.contains(&answer) {
                answer
            } else {
                debug!(%player, reason, card = %answer, "card show answer rejected");
                first
            }
        };
        self.show_card(player, id)?;
        Ok(self.state.card(id).cloned())
    }

    /// Ask `player` for a play-phase intent. Defaults to ending the phase.
    pub fn ask_for_use(&mut self, player: PlayerId) -> Result<Option<UseIntent>, EngineError> {
        let result = self.ask.ask_for_use(&self.state, player);
        self.settle(player, "use", result, None)
    }

    /// Ask `player` to pick exactly `count` hand cards to discard. Invalid
    /// picks and the default both take the oldest hand cards.
    pub fn ask_for_discard(&mut self, player: PlayerId, count: usize, reason: &str) -> Result<Vec<CardId>, EngineError> {
        let hand = self.state.hand(player);
        let default: Vec<_> = hand.iter().copied().take(count).collect();
        let result = self.ask.ask_for_discard(&self.state, player, count, reason);
        let mut picked = self.settle(player, "discard", result, default.clone())?;

        picked.sort();
        picked.dedup();
        if picked.len() != count.min(hand.len()) || !picked.iter().all(|id| hand.contains(id)) {
            debug!(%player, reason, "discard answer rejected");
            return Ok(default);
        }
        Ok(picked)
    }
}
