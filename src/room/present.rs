//! Presentation collaborator: fire-and-forget notifications.
//!
//! The room reports logs, emotions, property changes, and skill invocations
//! to a [`Presenter`]. Presenters never block the room and cannot fail it.
//! The room also keeps its own [`Notification`] history, which tests and
//! replays read back.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PlayerId;

/// One structured game log entry.
///
/// `kind` is a log key such as `#Damage` or `#ArmorNullify`; `arg` and
/// `arg2` carry its parameters as text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub kind: String,
    pub from: Option<PlayerId>,
    pub to: SmallVec<[PlayerId; 2]>,
    pub card: Option<String>,
    pub arg: String,
    pub arg2: String,
}

impl LogMessage {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from(mut self, player: PlayerId) -> Self {
        self.from = Some(player);
        self
    }

    #[must_use]
    pub fn to(mut self, player: PlayerId) -> Self {
        self.to.push(player);
        self
    }

    #[must_use]
    pub fn card(mut self, card: impl ToString) -> Self {
        self.card = Some(card.to_string());
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.arg = arg.to_string();
        self
    }

    #[must_use]
    pub fn arg2(mut self, arg2: impl ToString) -> Self {
        self.arg2 = arg2.to_string();
        self
    }
}

/// Everything the room has told its presenter, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    Log(LogMessage),
    Emotion { player: PlayerId, emotion: String },
    Property { player: PlayerId, name: String, value: String },
    Invoke { channel: String, payload: String },
}

/// Receiver of room notifications.
pub trait Presenter: Send {
    fn send_log(&mut self, _log: &LogMessage) {}

    fn set_emotion(&mut self, _player: PlayerId, _emotion: &str) {}

    fn broadcast_property(&mut self, _player: PlayerId, _name: &str, _value: &str) {}

    fn broadcast_invoke(&mut self, _channel: &str, _payload: &str) {}
}

/// Presenter that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}
