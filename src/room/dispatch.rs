//! Trigger dispatch.
//!
//! `Room::trigger` threads one payload through every listener attached for
//! an event, in registry order. Each listener gets exclusive `&mut` access to
//! the room and the payload for the duration of its call; the dispatcher
//! takes the payload back before calling the next one.
//!
//! Skills may dispatch nested events from inside a handler (a card effect
//! that deals damage, a damage that starts a dying sequence). Each active
//! dispatch is a [`DispatchFrame`] on the room's frame stack; the payload of
//! an outer dispatch is never reachable from an inner one.

use tracing::{debug, error, info};

use crate::core::{EngineError, PlayerId};
use crate::triggers::{EventPayload, TriggerEvent};

use super::{LogMessage, Room};

/// One active dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchFrame {
    pub event: TriggerEvent,
    pub player: PlayerId,
}

/// How a dispatch ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Every listener ran.
    Completed,
    /// A listener consumed the event.
    Consumed { skill: String },
}

impl Dispatch {
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        matches!(self, Dispatch::Consumed { .. })
    }
}

impl Room {
    /// Dispatch `event` on `player` with `payload`.
    ///
    /// Runs the player's skills and global skills in priority order until
    /// one consumes the event. A consumption is logged as `#Consumed` with
    /// the skill name; it is not an error.
    ///
    /// Errors abort this dispatch only. The frame stack is unwound either
    /// way.
    pub fn trigger(
        &mut self,
        event: TriggerEvent,
        player: PlayerId,
        payload: &mut EventPayload,
    ) -> Result<Dispatch, EngineError> {
        if !event.accepts(payload) {
            let err = EngineError::MalformedPayload {
                event,
                expected: event.payload_name(),
                skill: None,
            };
            error!(%event, %player, got = payload.name(), "dispatch rejected");
            return Err(err);
        }

        let depth = self.frames.len() + 1;
        if depth > self.config.max_dispatch_depth {
            error!(%event, %player, depth, "dispatch nested too deep");
            return Err(EngineError::DispatchTooDeep { event, depth });
        }

        self.frames.push(DispatchFrame { event, player });
        let result = self.run_listeners(event, player, payload);
        self.frames.pop();

        if let Err(err) = &result {
            error!(%event, %player, %err, "dispatch aborted");
        }
        result
    }

    fn run_listeners(
        &mut self,
        event: TriggerEvent,
        player: PlayerId,
        payload: &mut EventPayload,
    ) -> Result<Dispatch, EngineError> {
        for listener in self.triggers.listeners(event, player) {
            // An earlier handler may have detached this one (equipment lost).
            if !self.triggers.is_attached(listener.id) {
                continue;
            }
            let owner = listener.owner.unwrap_or(player);
            let skill = listener.skill;
            if !skill.triggerable(self, owner) {
                continue;
            }

            debug!(%event, skill = skill.name(), %owner, depth = self.frames.len(), "invoke skill");
            let consumed = skill
                .trigger(event, self, owner, payload)
                .map_err(|err| err.in_skill(skill.name()))?;

            if !event.accepts(payload) {
                return Err(EngineError::MalformedPayload {
                    event,
                    expected: event.payload_name(),
                    skill: Some(skill.name().to_string()),
                });
            }

            if consumed {
                info!(%event, skill = skill.name(), %owner, "event consumed");
                self.send_log(
                    LogMessage::new("#Consumed")
                        .from(owner)
                        .arg(skill.name())
                        .arg2(event),
                );
                return Ok(Dispatch::Consumed {
                    skill: skill.name().to_string(),
                });
            }
        }
        Ok(Dispatch::Completed)
    }

    /// Active dispatches, outermost first.
    #[must_use]
    pub fn dispatch_stack(&self) -> &[DispatchFrame] {
        &self.frames
    }
}
