//! The room: sole owner and mutator of one game.
//!
//! A [`Room`] owns the [`GameState`], the per-room [`TriggerRegistry`], and
//! the two host collaborators: an [`AskHandler`] for player decisions and a
//! [`Presenter`] for notifications. Every rule runs through it:
//!
//! - trigger dispatch (`dispatch.rs`)
//! - the card-use state machine and card/slash effects (`card_use.rs`)
//! - damage, recovery, dying and death (`damage.rs`)
//! - judgments and delayed tricks (`judge.rs`)
//! - turn phases (`turn.rs`)
//!
//! This file holds construction, read access, and the primitive mutators
//! (card movement, flags, marks, notifications) the rules are built from.
//! Primitives always succeed for tracked cards and never dispatch events,
//! with one exception: a card leaving an equipment area is uninstalled.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_sgs::core::{PlayerId, RoomConfig};
//! use rust_sgs::packages;
//! use rust_sgs::room::Room;
//!
//! let registry = Arc::new(packages::bootstrap().unwrap());
//! let mut room = Room::new(RoomConfig::new(2).unshuffled(), registry).unwrap();
//!
//! let chain = room.find_card("iron_chain").unwrap();
//! room.give_card(PlayerId::new(0), chain).unwrap();
//! assert_eq!(room.state().hand(PlayerId::new(0)), vec![chain]);
//! ```

mod ask;
mod card_use;
mod damage;
mod dispatch;
mod judge;
mod present;
mod turn;

pub use ask::{AskError, AskHandler, CardChoice, CardRequest, PassiveAsk, ScriptedAsk, UseIntent};
pub use card_use::{UseOutcome, UseStage};
pub use damage::DamageOutcome;
pub use dispatch::{Dispatch, DispatchFrame};
pub use present::{LogMessage, Notification, NullPresenter, Presenter};

use std::sync::Arc;

use im::Vector;
use tracing::{debug, info};

use crate::cards::{Card, CardId, CardRegistry};
use crate::core::{ConfigError, EngineError, GameState, Phase, PlayerId, RoomConfig};
use crate::triggers::{SkillSource, TriggerRegistry};
use crate::zones::{Place, Zone, ZonePosition};

/// Orchestrator of one game.
pub struct Room {
    config: RoomConfig,
    registry: Arc<CardRegistry>,
    state: GameState,
    triggers: TriggerRegistry,
    frames: Vec<DispatchFrame>,
    ask: Box<dyn AskHandler>,
    presenter: Box<dyn Presenter>,
    history: Vector<Notification>,
}

impl Room {
    /// Create a room with every registered card in the draw pile and every
    /// rule skill attached. Asks default to [`PassiveAsk`] and notifications
    /// to [`NullPresenter`].
    pub fn new(config: RoomConfig, registry: Arc<CardRegistry>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut state = GameState::new(config.player_count, config.max_hp, config.seed);
        for card in registry.cards() {
            state.insert_card(card.clone(), Place::DRAW_PILE);
        }
        if config.shuffle {
            let mut pile = state.zones().cards_at(Place::DRAW_PILE);
            state.rng_mut().shuffle(&mut pile);
            state.zones_mut().reorder(Place::DRAW_PILE, &pile);
        }

        let mut triggers = TriggerRegistry::new();
        for skill in registry.rule_skills() {
            triggers.attach(skill.clone(), None, SkillSource::Global);
        }

        info!(
            players = config.player_count,
            cards = registry.cards().len(),
            seed = config.seed,
            "room created"
        );

        Ok(Self {
            config,
            registry,
            state,
            triggers,
            frames: Vec::new(),
            ask: Box::new(PassiveAsk),
            presenter: Box::new(NullPresenter),
            history: Vector::new(),
        })
    }

    #[must_use]
    pub fn with_ask(mut self, ask: Box<dyn AskHandler>) -> Self {
        self.ask = ask;
        self
    }

    #[must_use]
    pub fn with_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    /// Swap the ask handler, returning the previous one.
    pub fn set_ask_handler(&mut self, ask: Box<dyn AskHandler>) -> Box<dyn AskHandler> {
        std::mem::replace(&mut self.ask, ask)
    }

    #[must_use]
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<CardRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    /// Every notification sent so far.
    #[must_use]
    pub fn notifications(&self) -> &Vector<Notification> {
        &self.history
    }

    /// Log entries sent so far.
    pub fn logs(&self) -> impl Iterator<Item = &LogMessage> {
        self.history.iter().filter_map(|n| match n {
            Notification::Log(log) => Some(log),
            _ => None,
        })
    }

    /// Log entries of one kind.
    pub fn logs_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a LogMessage> + 'a {
        self.logs().filter(move |log| log.kind == kind)
    }

    /// First card with the given definition name still in the draw pile.
    #[must_use]
    pub fn find_card(&self, name: &str) -> Option<CardId> {
        self.find_cards(name).into_iter().next()
    }

    /// Every card with the given definition name still in the draw pile, by
    /// id.
    #[must_use]
    pub fn find_cards(&self, name: &str) -> Vec<CardId> {
        self.registry
            .cards()
            .iter()
            .filter(|card| card.name() == name)
            .filter_map(Card::id)
            .filter(|&id| self.state.zones().is_at(id, Place::DRAW_PILE))
            .collect()
    }

    /// Give `player` a trigger skill from the registry.
    pub fn acquire_skill(&mut self, player: PlayerId, name: &str) -> Result<(), EngineError> {
        let skill = self
            .registry
            .skill(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownSkill(name.to_string()))?;
        self.triggers.attach(skill, Some(player), SkillSource::Player);
        Ok(())
    }

    /// Give `player` a view-as skill from the registry.
    pub fn acquire_view_as(&mut self, player: PlayerId, name: &str) -> Result<(), EngineError> {
        let skill = self
            .registry
            .view_as_skill(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownSkill(name.to_string()))?;
        self.triggers.attach_view_as(skill, player, SkillSource::Player);
        Ok(())
    }

    /// Extra targets `player`'s skills grant for `card`.
    #[must_use]
    pub fn extra_targets(&self, player: PlayerId, card: &Card) -> usize {
        self.triggers
            .skills_of(player)
            .iter()
            .map(|skill| skill.extra_targets(card))
            .sum()
    }

    /// Largest trick distance `player`'s skills grant for `card`, if any.
    #[must_use]
    pub fn trick_range(&self, player: PlayerId, card: &Card) -> Option<u32> {
        self.triggers
            .skills_of(player)
            .iter()
            .filter_map(|skill| skill.trick_range(card))
            .max()
    }

    /// Whether `player` may still use a slash this turn.
    #[must_use]
    pub fn can_slash(&self, player: PlayerId) -> bool {
        self.state.player(player).used_times("Slash") < self.config.slash_per_turn
    }

    // === Card movement ===

    /// Move a card to the top of a place.
    pub fn move_card_to(&mut self, card: CardId, place: Place) -> Result<(), EngineError> {
        self.move_card_to_position(card, place, ZonePosition::Top)
    }

    /// Move a card. A card leaving an equipment area is uninstalled: its
    /// skills are detached and its `on_uninstall` runs. A card leaving a
    /// judging area drops the virtual trick it was attached as.
    pub fn move_card_to_position(
        &mut self,
        card: CardId,
        place: Place,
        position: ZonePosition,
    ) -> Result<(), EngineError> {
        let old = self
            .state
            .zones_mut()
            .move_to(card, place, Some(position))
            .ok_or(EngineError::UnknownCard(card))?;
        debug!(%card, from = %old, to = %place, "card moved");

        if old.zone == Zone::Judging && old != place {
            self.state.detach_trick(card);
        }
        if old.zone == Zone::Equip && old != place {
            if let Some(owner) = old.owner {
                self.uninstall(owner, card)?;
            }
        }
        Ok(())
    }

    /// Move every physical card behind `card` to a place.
    pub fn move_cards_of(&mut self, card: &Card, place: Place) -> Result<(), EngineError> {
        for id in card.effective_ids() {
            self.move_card_to(id, place)?;
        }
        Ok(())
    }

    /// Put a card into a player's hand.
    pub fn give_card(&mut self, player: PlayerId, card: CardId) -> Result<(), EngineError> {
        self.move_card_to(card, Place::hand(player))
    }

    /// Put a card on top of the draw pile.
    pub fn put_on_top(&mut self, card: CardId) -> Result<(), EngineError> {
        self.move_card_to(card, Place::DRAW_PILE)
    }

    /// Take the top card of the draw pile, reshuffling the discard pile in
    /// when the draw pile is empty. `None` when both are empty.
    pub fn take_top(&mut self) -> Result<Option<CardId>, EngineError> {
        if self.state.zones().count(Place::DRAW_PILE) == 0 {
            self.reshuffle()?;
        }
        Ok(self.state.zones().top(Place::DRAW_PILE))
    }

    fn reshuffle(&mut self) -> Result<(), EngineError> {
        let mut pile = self.state.zones().cards_at(Place::DISCARD_PILE);
        if self.config.shuffle {
            self.state.rng_mut().shuffle(&mut pile);
        }
        info!(cards = pile.len(), "reshuffled discard pile");
        for id in pile {
            self.move_card_to(id, Place::DRAW_PILE)?;
        }
        Ok(())
    }

    /// Draw `count` cards into a player's hand.
    pub fn draw_cards(&mut self, player: PlayerId, count: usize) -> Result<Vec<CardId>, EngineError> {
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(id) = self.take_top()? else {
                break;
            };
            self.give_card(player, id)?;
            drawn.push(id);
        }
        if !drawn.is_empty() {
            self.send_log(LogMessage::new("#DrawNCards").from(player).arg(drawn.len()));
        }
        Ok(drawn)
    }

    /// Put a card's physical cards into the discard pile.
    pub fn discard(&mut self, player: Option<PlayerId>, card: &Card) -> Result<(), EngineError> {
        self.move_cards_of(card, Place::DISCARD_PILE)?;
        let mut log = LogMessage::new("$DiscardCard").card(card);
        if let Some(player) = player {
            log = log.from(player);
        }
        self.send_log(log);
        Ok(())
    }

    /// Reveal a hand card to everyone.
    pub fn show_card(&mut self, player: PlayerId, card: CardId) -> Result<(), EngineError> {
        let shown = self.state.card(card).ok_or(EngineError::UnknownCard(card))?.to_string();
        self.broadcast_invoke("showCard", &format!("{}:{}", player.index(), card.raw()));
        self.send_log(LogMessage::new("$ShowCard").from(player).card(shown));
        Ok(())
    }

    // === Equipment ===

    /// Equip a card, replacing whatever occupies its slot.
    pub fn install_equip(&mut self, player: PlayerId, card: &Card) -> Result<(), EngineError> {
        let Some(id) = card.id() else {
            debug!(card = %card, "virtual equipment is not installed");
            return Ok(());
        };
        let old = self
            .state
            .equipped(player, card.card_type())
            .and_then(Card::id);
        if let Some(old) = old {
            self.move_card_to(old, Place::DISCARD_PILE)?;
        }
        self.move_card_to(id, Place::equip(player))?;

        let def = card.definition().clone();
        if let Some(skill) = &def.skill {
            self.triggers.attach(skill.clone(), Some(player), SkillSource::Equipment(id));
        }
        if let Some(view) = &def.view_as {
            self.triggers.attach_view_as(view.clone(), player, SkillSource::Equipment(id));
        }
        self.send_log(LogMessage::new("$Install").from(player).card(card));
        def.behavior.on_install(self, card, player)
    }

    fn uninstall(&mut self, owner: PlayerId, id: CardId) -> Result<(), EngineError> {
        self.triggers.detach_source(owner, SkillSource::Equipment(id));
        let card = self.state.card(id).cloned().ok_or(EngineError::UnknownCard(id))?;
        self.send_log(LogMessage::new("$Uninstall").from(owner).card(&card));
        card.definition().behavior.clone().on_uninstall(self, &card, owner)
    }

    // === Player state ===

    pub fn set_flag(&mut self, player: PlayerId, flag: &str) {
        self.state.player_mut(player).flags.insert(flag.to_string());
    }

    pub fn clear_flag(&mut self, player: PlayerId, flag: &str) {
        self.state.player_mut(player).flags.remove(flag);
    }

    pub fn add_mark(&mut self, player: PlayerId, mark: &str, count: i32) {
        let value = self.state.player(player).mark(mark) + count;
        self.set_mark(player, mark, value);
    }

    /// Set a mark; zero removes it.
    pub fn set_mark(&mut self, player: PlayerId, mark: &str, value: i32) {
        let marks = &mut self.state.player_mut(player).marks;
        if value == 0 {
            marks.remove(mark);
        } else {
            marks.insert(mark.to_string(), value);
        }
    }

    /// Set the iron-chain state and broadcast it.
    pub fn set_chained(&mut self, player: PlayerId, chained: bool) {
        self.state.player_mut(player).chained = chained;
        self.broadcast_property(player, "chained", &chained.to_string());
    }

    /// Schedule a phase of `player`'s next turn to be skipped.
    pub fn skip_phase(&mut self, player: PlayerId, phase: Phase) {
        let skipped = &mut self.state.player_mut(player).skipped;
        if !skipped.contains(&phase) {
            skipped.push(phase);
        }
        self.send_log(LogMessage::new("#SkipPhase").from(player).arg(format!("{phase:?}")));
    }

    pub(crate) fn record_use(&mut self, player: PlayerId, class: &str) {
        *self
            .state
            .player_mut(player)
            .history
            .entry(class.to_string())
            .or_insert(0) += 1;
    }

    // === Notifications ===

    pub fn send_log(&mut self, log: LogMessage) {
        self.presenter.send_log(&log);
        self.history.push_back(Notification::Log(log));
    }

    pub fn set_emotion(&mut self, player: PlayerId, emotion: &str) {
        self.presenter.set_emotion(player, emotion);
        self.history.push_back(Notification::Emotion {
            player,
            emotion: emotion.to_string(),
        });
    }

    pub fn broadcast_property(&mut self, player: PlayerId, name: &str, value: &str) {
        self.presenter.broadcast_property(player, name, value);
        self.history.push_back(Notification::Property {
            player,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn broadcast_invoke(&mut self, channel: &str, payload: &str) {
        self.presenter.broadcast_invoke(channel, payload);
        self.history.push_back(Notification::Invoke {
            channel: channel.to_string(),
            payload: payload.to_string(),
        });
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("config", &self.config)
            .field("turn", &self.state.turn())
            .field("listeners", &self.triggers.len())
            .field("dispatch_depth", &self.frames.len())
            .finish_non_exhaustive()
    }
}
