//! Engine error taxonomy.
//!
//! - [`EngineError`]: contract violations and collaborator failures. Fatal to
//!   the dispatch or action that raised them, never to the room.
//! - [`UseError`]: an illegal card use. Recovered by re-prompting the actor;
//!   surfaced as `UseOutcome::Rejected`, not as an error.
//!
//! Skill consumption of an event is ordinary control flow and has no error
//! variant.

use thiserror::Error;

use super::player::PlayerId;
use crate::cards::CardId;
use crate::triggers::TriggerEvent;

/// Errors that abort the current dispatch or action.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A payload variant did not match its event kind.
    #[error("malformed payload for {event}: expected {expected}{}", skill_suffix(.skill))]
    MalformedPayload {
        event: TriggerEvent,
        expected: &'static str,
        skill: Option<String>,
    },

    /// Nested dispatches exceeded the configured depth.
    #[error("dispatch of {event} nested {depth} deep")]
    DispatchTooDeep { event: TriggerEvent, depth: usize },

    /// A card id unknown to this room.
    #[error("unknown card {0}")]
    UnknownCard(CardId),

    /// A card definition name unknown to the registry.
    #[error("unknown card definition '{0}'")]
    UnknownDefinition(String),

    /// A skill name unknown to the registry.
    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    /// A host collaborator failed in a way no default can cover.
    #[error("collaborator failure for {player}: {message}")]
    Collaborator { player: PlayerId, message: String },
}

impl EngineError {
    /// Attach the offending skill to a payload error raised inside it.
    #[must_use]
    pub fn in_skill(self, name: &str) -> Self {
        match self {
            EngineError::MalformedPayload { event, expected, skill: None } => {
                EngineError::MalformedPayload {
                    event,
                    expected,
                    skill: Some(name.to_string()),
                }
            }
            other => other,
        }
    }
}

fn skill_suffix(skill: &Option<String>) -> String {
    skill
        .as_ref()
        .map(|s| format!(" (raised in skill '{s}')"))
        .unwrap_or_default()
}

/// Reasons a declared card use is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UseError {
    #[error("card cannot be used now")]
    Unavailable,

    #[error("target #{index} is not legal")]
    IllegalTarget { index: usize },

    #[error("target set is not feasible")]
    InfeasibleTargets,

    #[error("card {0} is not held by the user")]
    NotOwned(CardId),

    #[error("view-as skill '{0}' rejected the selection")]
    ViewAsRejected(String),

    #[error("card does not match the requested pattern")]
    PatternMismatch,
}
