//! Damage, recovery, dying, and death.
//!
//! ## Damage pipeline
//!
//! ```text
//! Predamage(source) -> Predamaged(target) -> apply -> Damage(source) -> Damaged(target)
//! ```
//!
//! Consuming `Predamage` or `Predamaged` nullifies the damage: no HP changes
//! and no later stage fires. Skills rewrite the amount in place; a
//! non-positive amount after the pre-stages is a zero-damage instance, which
//! is logged and fires no reaction stage.
//!
//! Fire and thunder damage to a chained player unchains them and is then
//! conducted, at the amount originally declared, to every other chained
//! player in seat order. Conducted damage is marked `chain` and does not
//! conduct again.

use tracing::info;

use crate::cards::Capabilities;
use crate::cards::CardPattern;
use crate::core::{EngineError, PlayerId};
use crate::triggers::{DamageStruct, DyingStruct, EventPayload, Nature, RecoverStruct, TriggerEvent};
use crate::zones::Place;

use super::{Dispatch, LogMessage, Room};

/// What a damage instance did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// A pre-stage skill consumed the damage.
    Nullified { skill: String },
    /// HP dropped by `amount`, which may be zero.
    Applied { amount: i32, nature: Nature },
    /// The target was already dead.
    Ignored,
}

impl Room {
    /// Run one damage instance through the pipeline.
    pub fn damage(&mut self, damage: DamageStruct) -> Result<DamageOutcome, EngineError> {
        let declared = damage.amount;
        let conducts = !damage.chain && self.state.player(damage.to).chained;
        let outcome = self.apply_damage(damage.clone())?;

        if let DamageOutcome::Applied { amount, nature } = outcome {
            if conducts && amount > 0 && nature != Nature::Normal {
                self.conduct_chain(&damage, nature, declared)?;
            }
        }
        Ok(outcome)
    }

    fn apply_damage(&mut self, damage: DamageStruct) -> Result<DamageOutcome, EngineError> {
        let to = damage.to;
        if !self.state.player(to).alive {
            return Ok(DamageOutcome::Ignored);
        }

        let mut payload = EventPayload::Damage(damage);
        if let Some(from) = payload.damage(TriggerEvent::Predamage)?.from {
            if let Dispatch::Consumed { skill } = self.trigger(TriggerEvent::Predamage, from, &mut payload)? {
                return Ok(DamageOutcome::Nullified { skill });
            }
        }
        if let Dispatch::Consumed { skill } = self.trigger(TriggerEvent::Predamaged, to, &mut payload)? {
            return Ok(DamageOutcome::Nullified { skill });
        }

        let damage = payload.damage_mut(TriggerEvent::Predamaged)?;
        damage.amount = damage.amount.max(0);
        let (amount, nature, from) = (damage.amount, damage.nature, damage.from);

        if amount == 0 {
            let mut log = LogMessage::new("#ZeroDamage").to(to);
            if let Some(from) = from {
                log = log.from(from);
            }
            self.send_log(log);
            return Ok(DamageOutcome::Applied { amount, nature });
        }

        self.state.player_mut(to).hp -= amount;
        let hp = self.state.player(to).hp;
        info!(?from, %to, amount, nature = nature.name(), hp, "damage applied");

        let mut log = LogMessage::new("#Damage").to(to).arg(amount).arg2(nature.name());
        if let Some(from) = from {
            log = log.from(from);
        }
        self.send_log(log);
        self.broadcast_property(to, "hp", &hp.to_string());

        if nature != Nature::Normal && self.state.player(to).chained {
            self.set_chained(to, false);
        }

        if let Some(from) = from {
            self.trigger(TriggerEvent::Damage, from, &mut payload)?;
        }
        self.trigger(TriggerEvent::Damaged, to, &mut payload)?;

        if self.state.player(to).alive && self.state.player(to).hp <= 0 {
            let damage = payload.into_damage(TriggerEvent::Damaged)?;
            self.enter_dying(to, Some(damage))?;
        }
        Ok(DamageOutcome::Applied { amount, nature })
    }

    fn conduct_chain(&mut self, origin: &DamageStruct, nature: Nature, amount: i32) -> Result<(), EngineError> {
        let chained: Vec<PlayerId> = self
            .state
            .alive_players()
            .into_iter()
            .filter(|&p| p != origin.to && self.state.player(p).chained)
            .collect();

        for to in chained {
            // An earlier conducted damage may have killed or unchained them.
            if !self.state.player(to).alive || !self.state.player(to).chained {
                continue;
            }
            self.send_log(LogMessage::new("#IronChainDamage").to(to));
            let conducted = DamageStruct {
                from: origin.from,
                to,
                card: origin.card.clone(),
                amount,
                nature,
                chain: true,
            };
            self.damage(conducted)?;
        }
        Ok(())
    }

    /// Restore HP, capped at the maximum. Returns the amount restored.
    pub fn recover(&mut self, recover: RecoverStruct) -> Result<i32, EngineError> {
        let to = recover.to;
        let player = self.state.player(to);
        if !player.alive {
            return Ok(0);
        }
        let amount = recover.amount.min(player.max_hp - player.hp).max(0);
        if amount == 0 {
            return Ok(0);
        }

        self.state.player_mut(to).hp += amount;
        let hp = self.state.player(to).hp;
        info!(%to, amount, hp, "hp recovered");

        let mut log = LogMessage::new("#Recover").to(to).arg(amount);
        if let Some(who) = recover.who {
            log = log.from(who);
        }
        self.send_log(log);
        self.broadcast_property(to, "hp", &hp.to_string());

        let mut payload = EventPayload::Recover(RecoverStruct { amount, ..recover });
        self.trigger(TriggerEvent::HpRecover, to, &mut payload)?;
        Ok(amount)
    }

    /// Dying sequence: every living player, starting from the current one,
    /// may rescue `who` with peaches (the dying player may also drink an
    /// analeptic) until their HP is positive. Death follows otherwise.
    pub fn enter_dying(&mut self, who: PlayerId, damage: Option<DamageStruct>) -> Result<(), EngineError> {
        self.set_flag(who, "dying");
        self.send_log(LogMessage::new("#Dying").from(who));

        let mut payload = EventPayload::Dying(DyingStruct { who, damage });
        self.trigger(TriggerEvent::Dying, who, &mut payload)?;

        let peach = CardPattern::capability(Capabilities::PEACH);
        let own = CardPattern::AnyOf(vec![peach.clone(), CardPattern::capability(Capabilities::ANALEPTIC)]);

        for saver in self.state.alive_players_from(self.state.turn().current) {
            let pattern = if saver == who { &own } else { &peach };
            while self.state.player(who).hp <= 0 && self.state.player(saver).alive {
                let need = 1 - self.state.player(who).hp;
                let prompt = format!("@askforpeaches:{}:{need}", who.index());
                let Some(card) = self.ask_for_card(saver, pattern, &prompt, "peach")? else {
                    break;
                };
                self.use_card_as_response(saver, card, &[who])?;
            }
            if self.state.player(who).hp > 0 {
                break;
            }
        }

        self.clear_flag(who, "dying");
        if self.state.player(who).hp <= 0 {
            let damage = payload.into_dying(TriggerEvent::Dying)?.damage;
            self.kill_player(who, damage.as_ref())?;
        }
        Ok(())
    }

    /// Kill a player: `Death` fires, every card they hold is discarded, and
    /// all their skills are detached.
    pub fn kill_player(&mut self, who: PlayerId, damage: Option<&DamageStruct>) -> Result<(), EngineError> {
        let mut payload = EventPayload::Dying(DyingStruct {
            who,
            damage: damage.cloned(),
        });
        self.trigger(TriggerEvent::Death, who, &mut payload)?;

        self.state.player_mut(who).alive = false;
        let killer = damage.and_then(|d| d.from);
        info!(%who, ?killer, "player died");
        let mut log = LogMessage::new("#Death").to(who);
        if let Some(killer) = killer {
            log = log.from(killer);
        }
        self.send_log(log);
        self.broadcast_property(who, "alive", "false");

        let mut held = self.state.hand(who);
        held.extend(self.state.equips(who));
        held.extend(self.state.judging(who));
        for id in held {
            self.move_card_to(id, Place::DISCARD_PILE)?;
        }
        self.triggers.detach_player(who);
        Ok(())
    }
}
