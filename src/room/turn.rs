//! Game start and turn phases.

use tracing::{debug, info};

use crate::cards::Card;
use crate::core::{EngineError, Phase, PlayerId};
use crate::triggers::{CardEffectStruct, EventPayload, TriggerEvent};
use crate::zones::Place;

use super::card_use::UseOutcome;
use super::{LogMessage, Room};

impl Room {
    /// Deal the opening hands and fire `GameStart` for every player.
    pub fn start_game(&mut self) -> Result<(), EngineError> {
        let count = self.config.initial_hand;
        for player in PlayerId::all(self.state.player_count()) {
            self.draw_cards(player, count)?;
        }
        for player in PlayerId::all(self.state.player_count()) {
            self.trigger(TriggerEvent::GameStart, player, &mut EventPayload::None)?;
        }
        info!(players = self.state.player_count(), "game started");
        Ok(())
    }

    /// The next living seat after `player`, clockwise.
    #[must_use]
    pub fn next_alive(&self, player: PlayerId) -> Option<PlayerId> {
        self.state.other_alive_players(player).into_iter().next()
    }

    /// Whether at most one player is left standing.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.alive_players().len() <= 1
    }

    /// Run one full turn for `player`.
    ///
    /// Each phase fires `PhaseStart`; consuming it skips the phase's default
    /// action. Phases scheduled with [`Room::skip_phase`] do not start at
    /// all. Per-turn history and the skip list are cleared when the turn
    /// ends, including when it ends in an error.
    pub fn run_turn(&mut self, player: PlayerId) -> Result<(), EngineError> {
        {
            let turn = self.state.turn_mut();
            turn.current = player;
            turn.turn_number += 1;
        }
        info!(%player, turn = self.state.turn().turn_number, "turn started");

        let result = self.run_phases(player);
        self.end_turn(player);
        result
    }

    fn run_phases(&mut self, player: PlayerId) -> Result<(), EngineError> {
        for phase in Phase::TURN {
            if !self.state.player(player).alive {
                break;
            }
            if self.state.player(player).is_skipping(phase) {
                debug!(%player, ?phase, "phase skipped");
                continue;
            }
            self.state.turn_mut().phase = phase;

            let mut payload = EventPayload::Phase(phase);
            if self.trigger(TriggerEvent::PhaseStart, player, &mut payload)?.is_consumed() {
                continue;
            }

            match phase {
                Phase::Judge => self.judge_phase(player)?,
                Phase::Draw => {
                    self.draw_cards(player, self.config.draw_per_turn)?;
                }
                Phase::Play => self.play_phase(player)?,
                Phase::Discard => self.discard_phase(player)?,
                Phase::Start | Phase::Finish | Phase::NotActive => {}
            }
        }
        Ok(())
    }

    fn end_turn(&mut self, player: PlayerId) {
        let state = self.state.player_mut(player);
        state.history.clear();
        state.skipped.clear();
        state.flags.remove("drank");
        self.state.turn_mut().phase = Phase::NotActive;
        debug!(%player, "turn ended");
    }

    /// Resolve delayed tricks in the judging area, most recent first.
    fn judge_phase(&mut self, player: PlayerId) -> Result<(), EngineError> {
        let mut pending = self.state.judging(player);
        while let Some(id) = pending.pop() {
            if !self.state.player(player).alive {
                break;
            }
            if !self.state.zones().is_at(id, Place::judging(player)) {
                continue;
            }
            let card: Card = self.state.delayed_trick(id).cloned().ok_or(EngineError::UnknownCard(id))?;
            self.move_cards_of(&card, Place::TABLE)?;
            let result = self.card_effect(CardEffectStruct {
                card: card.clone(),
                from: None,
                to: player,
                multiple: false,
            });
            for id in card.effective_ids() {
                if self.state.zones().is_at(id, Place::TABLE) {
                    self.move_card_to(id, Place::DISCARD_PILE)?;
                }
            }
            result?;
        }
        Ok(())
    }

    /// Ask for uses until the player passes or exceeds the re-prompt limit.
    fn play_phase(&mut self, player: PlayerId) -> Result<(), EngineError> {
        let mut rejected = 0;
        while self.state.player(player).alive && !self.is_game_over() {
            let Some(intent) = self.ask_for_use(player)? else {
                break;
            };
            match self.use_card(player, &intent)? {
                UseOutcome::Resolved => rejected = 0,
                UseOutcome::Rejected(error) => {
                    rejected += 1;
                    self.send_log(LogMessage::new("#UseRejected").from(player).arg(&error));
                    if rejected > self.config.max_reprompts {
                        debug!(%player, "play phase ended after repeated rejections");
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Discard down to the hand limit, which is the player's HP.
    fn discard_phase(&mut self, player: PlayerId) -> Result<(), EngineError> {
        let limit = usize::try_from(self.state.player(player).hp.max(0)).unwrap_or(0);
        let excess = self.state.hand_count(player).saturating_sub(limit);
        if excess == 0 {
            return Ok(());
        }
        for id in self.ask_for_discard(player, excess, "discard")? {
            let card = self.state.card(id).cloned().ok_or(EngineError::UnknownCard(id))?;
            self.discard(Some(player), &card)?;
        }
        Ok(())
    }
}
