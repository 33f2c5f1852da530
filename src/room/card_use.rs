//! The card-use state machine and per-target effects.
//!
//! ```text
//! Declared --resolve card--> Validated --on_use--> Used
//!     ^            |                                 |
//!     |  rejected  |                          use_card per target
//!     +------------+                                 v
//!                                        Effecting --> Resolved
//! ```
//!
//! A rejected declaration changes nothing: the card stays where it was, no
//! event fires, and the caller re-prompts the actor. Once validated, the
//! card's physical cards move to the table, and whatever is still on the
//! table when the use resolves goes to the discard pile.

use smallvec::SmallVec;
use tracing::debug;

use crate::cards::{Capabilities, Card, CardPattern, CardType};
use crate::core::{EngineError, PlayerId, UseError};
use crate::triggers::{CardEffectStruct, CardUseStruct, DamageStruct, EventPayload, SlashEffectStruct, TriggerEvent};
use crate::zones::Place;

use super::ask::{CardChoice, UseIntent};
use super::{LogMessage, Room};

/// Stages of one card use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UseStage {
    Declared,
    Validated,
    Used,
    Effecting,
    Resolved,
}

/// Result of declaring a use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UseOutcome {
    Resolved,
    /// Nothing happened; the actor may choose again.
    Rejected(UseError),
}

impl UseOutcome {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, UseOutcome::Resolved)
    }
}

impl Room {
    /// Run a play-phase use declared by `actor`.
    pub fn use_card(&mut self, actor: PlayerId, intent: &UseIntent) -> Result<UseOutcome, EngineError> {
        debug!(%actor, stage = ?UseStage::Declared, card = ?intent.card, targets = ?intent.targets, "use");

        let validated = self
            .resolve_play_choice(actor, &intent.card)
            .and_then(|card| self.validate_use(actor, &card, &intent.targets).map(|()| card));
        let card = match validated {
            Ok(card) => card,
            Err(error) => {
                debug!(%actor, %error, "use rejected");
                return Ok(UseOutcome::Rejected(error));
            }
        };

        let to: SmallVec<[PlayerId; 4]> = if card.is_target_fixed() {
            SmallVec::new()
        } else {
            intent.targets.iter().copied().collect()
        };
        debug!(%actor, stage = ?UseStage::Validated, card = %card, "use");

        self.record_use(actor, card.class());
        self.perform_use(CardUseStruct { card, from: actor, to })?;
        Ok(UseOutcome::Resolved)
    }

    /// Use a card without play-phase validation, as when a peach is used to
    /// rescue a dying player.
    pub fn use_card_as_response(&mut self, from: PlayerId, card: Card, targets: &[PlayerId]) -> Result<(), EngineError> {
        self.perform_use(CardUseStruct {
            card,
            from,
            to: targets.iter().copied().collect(),
        })
    }

    fn resolve_play_choice(&self, actor: PlayerId, choice: &CardChoice) -> Result<Card, UseError> {
        if let CardChoice::ViewAs { skill, .. } = choice {
            let enabled = self
                .triggers
                .view_as_skill(actor, skill)
                .is_some_and(|s| s.enabled_at_play(self, actor));
            if !enabled {
                return Err(UseError::ViewAsRejected(skill.clone()));
            }
        }
        self.resolve_choice(actor, choice)
    }

    /// Turn a choice into a card the player may offer: a held physical card,
    /// or a virtual card built by one of the player's view-as skills from
    /// held or equipped cards.
    pub(crate) fn resolve_choice(&self, player: PlayerId, choice: &CardChoice) -> Result<Card, UseError> {
        match choice {
            CardChoice::Physical(id) => {
                if !self.state.zones().is_at(*id, Place::hand(player)) {
                    return Err(UseError::NotOwned(*id));
                }
                self.state.card(*id).cloned().ok_or(UseError::NotOwned(*id))
            }
            CardChoice::ViewAs { skill, cards } => {
                let view = self
                    .triggers
                    .view_as_skill(player, skill)
                    .ok_or_else(|| UseError::ViewAsRejected(skill.clone()))?;

                let mut selected: Vec<Card> = Vec::with_capacity(cards.len());
                for &id in cards {
                    let held = self.state.zones().is_at(id, Place::hand(player))
                        || self.state.zones().is_at(id, Place::equip(player));
                    let card = self.state.card(id).filter(|_| held).ok_or(UseError::NotOwned(id))?;
                    if !view.view_filter(&selected, card) {
                        return Err(UseError::ViewAsRejected(skill.clone()));
                    }
                    selected.push(card.clone());
                }

                view.view_as(self, &selected)
                    .map(|card| card.with_skill_name(skill.as_str()))
                    .ok_or_else(|| UseError::ViewAsRejected(skill.clone()))
            }
        }
    }

    fn validate_use(&self, actor: PlayerId, card: &Card, targets: &[PlayerId]) -> Result<(), UseError> {
        let behavior = &card.definition().behavior;
        if !self.state.player(actor).alive || !behavior.is_available(self, card, actor) {
            return Err(UseError::Unavailable);
        }
        if card.is_target_fixed() {
            return Ok(());
        }
        for (index, &candidate) in targets.iter().enumerate() {
            let selected = &targets[..index];
            let legal = candidate.index() < self.state.player_count()
                && self.state.player(candidate).alive
                && !selected.contains(&candidate)
                && behavior.target_filter(self, card, selected, candidate, actor);
            if !legal {
                return Err(UseError::IllegalTarget { index });
            }
        }
        if !behavior.targets_feasible(self, card, targets, actor) {
            return Err(UseError::InfeasibleTargets);
        }
        Ok(())
    }

    fn perform_use(&mut self, card_use: CardUseStruct) -> Result<(), EngineError> {
        let card = card_use.card.clone();
        self.move_cards_of(&card, Place::TABLE)?;

        let mut log = LogMessage::new("#UseCard").from(card_use.from).card(&card);
        for &to in &card_use.to {
            log = log.to(to);
        }
        self.send_log(log);

        debug!(from = %card_use.from, stage = ?UseStage::Used, card = %card, "use");
        let result = card.definition().behavior.clone().on_use(self, &card_use);

        for id in card.effective_ids() {
            if self.state.zones().is_at(id, Place::TABLE) {
                self.move_card_to(id, Place::DISCARD_PILE)?;
            }
        }
        result?;
        debug!(from = %card_use.from, stage = ?UseStage::Resolved, card = %card, "use");
        Ok(())
    }

    /// Default `on_use`: install equipment, attach delayed tricks, otherwise
    /// dispatch `CardUsed` and apply the card to its targets.
    pub fn default_on_use(&mut self, card_use: &CardUseStruct) -> Result<(), EngineError> {
        let card = &card_use.card;
        match card.card_type() {
            t if t.is_equipment() => self.install_equip(card_use.from, card),
            CardType::DelayedTrick => {
                let target = card_use.to.first().copied().unwrap_or(card_use.from);
                self.move_cards_of(card, Place::judging(target))?;
                self.state.attach_trick(card);
                self.send_log(LogMessage::new("$AttachTrick").from(card_use.from).to(target).card(card));
                Ok(())
            }
            _ => {
                let mut payload = EventPayload::CardUse(card_use.clone());
                if self.trigger(TriggerEvent::CardUsed, card_use.from, &mut payload)?.is_consumed() {
                    return Ok(());
                }
                let card_use = payload.into_card_use(TriggerEvent::CardUsed)?;
                debug!(from = %card_use.from, stage = ?UseStage::Effecting, card = %card_use.card, "use");
                card_use.card.definition().behavior.clone().use_card(
                    self,
                    &card_use.card,
                    card_use.from,
                    &card_use.to,
                )
            }
        }
    }

    /// Default `use_card`: one effect per target, in order. A target-fixed
    /// card with no targets applies to its user.
    pub fn default_use_card(&mut self, card: &Card, source: PlayerId, targets: &[PlayerId]) -> Result<(), EngineError> {
        let targets: SmallVec<[PlayerId; 4]> = if targets.is_empty() && card.is_target_fixed() {
            SmallVec::from_slice(&[source])
        } else {
            SmallVec::from_slice(targets)
        };
        let multiple = targets.len() > 1;
        for to in targets {
            self.card_effect(CardEffectStruct {
                card: card.clone(),
                from: Some(source),
                to,
                multiple,
            })?;
        }
        Ok(())
    }

    /// Resolve a card against one target. Returns whether the effect ran.
    ///
    /// Dispatches `CardEffect` and `CardEffected` on the target; consuming
    /// either nullifies the effect. Cancelable cards then go through the
    /// nullification chain before `on_effect` runs.
    pub fn card_effect(&mut self, effect: CardEffectStruct) -> Result<bool, EngineError> {
        let to = effect.to;
        if !self.state.player(to).alive {
            return Ok(false);
        }

        let mut payload = EventPayload::CardEffect(effect);
        if self.trigger(TriggerEvent::CardEffect, to, &mut payload)?.is_consumed() {
            return Ok(false);
        }
        if self.trigger(TriggerEvent::CardEffected, to, &mut payload)?.is_consumed() {
            return Ok(false);
        }
        let effect = payload.into_card_effect(TriggerEvent::CardEffected)?;

        if self.is_canceled(&effect)? {
            self.send_log(LogMessage::new("#Nullified").to(to).card(&effect.card));
            return Ok(false);
        }

        effect.card.definition().behavior.clone().on_effect(self, &effect)?;
        Ok(true)
    }

    /// Nullification chain. Every living player, starting from the current
    /// player, may answer with a nullification; a played nullification may
    /// itself be nullified. Returns whether the effect ends up canceled.
    fn is_canceled(&mut self, effect: &CardEffectStruct) -> Result<bool, EngineError> {
        if !effect.card.definition().behavior.is_cancelable(&effect.card) {
            return Ok(false);
        }

        let pattern = CardPattern::Capability(Capabilities::NULLIFICATION);
        let mut canceled = false;
        let mut answering = effect.card.to_string();

        loop {
            let mut played = None;
            for player in self.state.alive_players_from(self.state.turn().current) {
                if !self.can_respond(player, &pattern) {
                    continue;
                }
                let prompt = format!("@nullification:{answering}:{}", effect.to.index());
                if let Some(card) = self.ask_for_card(player, &pattern, &prompt, "nullification")? {
                    played = Some((player, card));
                    break;
                }
            }
            let Some((player, card)) = played else {
                break;
            };
            self.send_log(LogMessage::new("#NullificationUsed").from(player).card(&card).arg(&answering));
            self.discard(Some(player), &card)?;
            answering = card.to_string();
            canceled = !canceled;
        }
        Ok(canceled)
    }

    /// Whether `player` holds a matching card or has a view-as skill that
    /// can answer `pattern`.
    #[must_use]
    pub fn can_respond(&self, player: PlayerId, pattern: &CardPattern) -> bool {
        let holds = self
            .state
            .hand(player)
            .into_iter()
            .filter_map(|id| self.state.card(id))
            .any(|card| card.matches(pattern));
        holds
            || self
                .triggers
                .view_as_skills_of(player)
                .iter()
                .any(|skill| skill.enabled_at_response(self, player, pattern))
    }

    /// Resolve a slash against its target.
    ///
    /// `SlashEffect` runs on the source (nature overrides, armor-ignoring
    /// marks), `SlashEffected` on the target (armor); either may consume the
    /// slash. The target may then dodge with a jink; otherwise the slash
    /// deals one damage, plus one if the source drank. Armor-ignoring marks
    /// set for this slash are cleared afterwards.
    pub fn slash_effect(&mut self, effect: SlashEffectStruct) -> Result<(), EngineError> {
        let to = effect.to;
        let result = self.run_slash_effect(effect);
        if self.state.player(to).mark("qinggang") > 0 {
            self.add_mark(to, "qinggang", -1);
        }
        result
    }

    fn run_slash_effect(&mut self, effect: SlashEffectStruct) -> Result<(), EngineError> {
        let (from, to) = (effect.from, effect.to);
        let mut payload = EventPayload::SlashEffect(effect);

        if self.trigger(TriggerEvent::SlashEffect, from, &mut payload)?.is_consumed() {
            return Ok(());
        }
        if self.trigger(TriggerEvent::SlashEffected, to, &mut payload)?.is_consumed() {
            return Ok(());
        }

        let pattern = CardPattern::Capability(Capabilities::JINK);
        let prompt = format!("slash-jink:{}", from.index());
        if let Some(jink) = self.ask_for_card(to, &pattern, &prompt, "jink")? {
            self.discard(Some(to), &jink)?;
            self.send_log(LogMessage::new("#Jink").from(to).card(&jink));
            payload.slash_effect_mut(TriggerEvent::SlashMissed)?.jink = Some(jink);
            self.trigger(TriggerEvent::SlashMissed, from, &mut payload)?;
            return Ok(());
        }

        let effect = payload.into_slash_effect(TriggerEvent::SlashEffected)?;
        let damage = DamageStruct {
            from: Some(from),
            to,
            card: Some(effect.slash),
            amount: 1 + i32::from(effect.drank),
            nature: effect.nature,
            chain: false,
        };
        self.damage(damage)?;
        Ok(())
    }
}
