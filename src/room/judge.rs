//! Judgments.
//!
//! A judgment flips the top card of the draw pile onto the table. Skills
//! listening on `AskForRetrial` may swap it for another card before
//! `FinishJudge` reads the result.

use tracing::debug;

use crate::cards::{Card, CardId};
use crate::core::{EngineError, PlayerId};
use crate::triggers::{EventPayload, JudgeStruct, TriggerEvent};
use crate::zones::Place;

use super::{LogMessage, Room};

impl Room {
    /// Perform a judgment for `judge.who` and return it with its final card.
    pub fn judge(&mut self, judge: JudgeStruct) -> Result<JudgeStruct, EngineError> {
        let who = judge.who;
        let mut payload = EventPayload::Judge(judge);
        self.trigger(TriggerEvent::StartJudge, who, &mut payload)?;

        if let Some(id) = self.take_top()? {
            self.move_card_to(id, Place::TABLE)?;
            let card = self.state.card(id).cloned().ok_or(EngineError::UnknownCard(id))?;
            self.send_log(LogMessage::new("$InitialJudge").from(who).card(&card));
            payload.judge_mut(TriggerEvent::StartJudge)?.card = Some(card);
        }

        self.trigger(TriggerEvent::AskForRetrial, who, &mut payload)?;
        self.trigger(TriggerEvent::FinishJudge, who, &mut payload)?;

        let judge = payload.into_judge(TriggerEvent::FinishJudge)?;
        let verdict = if judge.is_good() { "good" } else { "bad" };
        debug!(%who, reason = %judge.reason, verdict, "judgment");
        let mut log = LogMessage::new("#JudgeResult").from(who).arg(&judge.reason).arg2(verdict);
        if let Some(card) = &judge.card {
            log = log.card(card);
        }
        self.send_log(log);

        if let Some(id) = judge.card.as_ref().and_then(Card::id) {
            if self.state.zones().is_at(id, Place::TABLE) {
                self.move_card_to(id, Place::DISCARD_PILE)?;
            }
        }
        Ok(judge)
    }

    /// Replace a judgment's card during `AskForRetrial`: the old card goes
    /// to the discard pile and `card` takes its place on the table.
    pub fn retrial(&mut self, judge: &mut JudgeStruct, card: CardId, by: PlayerId) -> Result<(), EngineError> {
        let new = self.state.card(card).cloned().ok_or(EngineError::UnknownCard(card))?;
        if let Some(old) = judge.card.as_ref().and_then(Card::id) {
            self.move_card_to(old, Place::DISCARD_PILE)?;
        }
        self.move_card_to(card, Place::TABLE)?;
        self.send_log(LogMessage::new("$ChangedJudge").from(by).to(judge.who).card(&new));
        judge.card = Some(new);
        Ok(())
    }

    /// Judge a delayed trick against `target` and run its payload on a bad
    /// result. A definition without a judge spec always takes effect.
    pub fn resolve_delayed_trick(&mut self, card: &Card, target: PlayerId) -> Result<(), EngineError> {
        let def = card.definition().clone();
        let bad = match &def.judge {
            Some(spec) => {
                let judge = JudgeStruct::new(target, spec.pattern.clone(), spec.good, spec.reason.as_str());
                self.judge(judge)?.is_bad()
            }
            None => true,
        };
        if bad {
            def.behavior.take_effect(self, card, target)?;
        }
        Ok(())
    }
}
