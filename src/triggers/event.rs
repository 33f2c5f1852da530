//! Trigger events and the payloads they carry.
//!
//! A [`TriggerEvent`] names a dispatch point in the rules. Each kind carries
//! exactly one [`EventPayload`] variant; the room rejects a dispatch whose
//! payload does not match its kind, and the typed accessors here return the
//! same error when a skill asks for the wrong record.
//!
//! ## Payloads by kind
//!
//! | kind                                             | payload        |
//! |--------------------------------------------------|----------------|
//! | `GameStart`                                      | `None`         |
//! | `PhaseStart`                                     | `Phase`        |
//! | `CardUsed`                                       | `CardUse`      |
//! | `CardEffect`, `CardEffected`                     | `CardEffect`   |
//! | `SlashEffect`, `SlashEffected`, `SlashMissed`    | `SlashEffect`  |
//! | `Predamage`, `Predamaged`, `Damage`, `Damaged`   | `Damage`       |
//! | `HpRecover`                                      | `Recover`      |
//! | `Dying`, `Death`                                 | `Dying`        |
//! | `StartJudge`, `AskForRetrial`, `FinishJudge`     | `Judge`        |

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Card, JudgePattern, Nature};
use crate::core::{EngineError, Phase, PlayerId};

/// Dispatch points of the rules engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggerEvent {
    GameStart,
    PhaseStart,
    CardUsed,
    /// Before a card's effect resolves against one target.
    CardEffect,
    /// Target side of `CardEffect`; consuming it nullifies the effect.
    CardEffected,
    /// Source side of a slash, before any damage exists.
    SlashEffect,
    SlashEffected,
    SlashMissed,
    /// Source-side damage modification.
    Predamage,
    /// Target-side damage modification.
    Predamaged,
    /// After HP loss, source side.
    Damage,
    /// After HP loss, target side.
    Damaged,
    HpRecover,
    Dying,
    Death,
    StartJudge,
    AskForRetrial,
    FinishJudge,
}

impl TriggerEvent {
    /// Name of the payload variant this kind carries.
    #[must_use]
    pub const fn payload_name(self) -> &'static str {
        match self {
            TriggerEvent::GameStart => "none",
            TriggerEvent::PhaseStart => "phase",
            TriggerEvent::CardUsed => "card use",
            TriggerEvent::CardEffect | TriggerEvent::CardEffected => "card effect",
            TriggerEvent::SlashEffect | TriggerEvent::SlashEffected | TriggerEvent::SlashMissed => {
                "slash effect"
            }
            TriggerEvent::Predamage
            | TriggerEvent::Predamaged
            | TriggerEvent::Damage
            | TriggerEvent::Damaged => "damage",
            TriggerEvent::HpRecover => "recover",
            TriggerEvent::Dying | TriggerEvent::Death => "dying",
            TriggerEvent::StartJudge | TriggerEvent::AskForRetrial | TriggerEvent::FinishJudge => {
                "judge"
            }
        }
    }

    /// Whether `payload` is the variant this kind carries.
    #[must_use]
    pub fn accepts(self, payload: &EventPayload) -> bool {
        payload.name() == self.payload_name()
    }

    fn malformed(self) -> EngineError {
        EngineError::MalformedPayload {
            event: self,
            expected: self.payload_name(),
            skill: None,
        }
    }
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One damage instance flowing through the damage pipeline.
#[derive(Clone, Debug)]
pub struct DamageStruct {
    pub from: Option<PlayerId>,
    pub to: PlayerId,
    pub card: Option<Card>,
    pub amount: i32,
    pub nature: Nature,
    /// Set on damage conducted through iron chains.
    pub chain: bool,
}

impl DamageStruct {
    /// One point of normal damage.
    #[must_use]
    pub fn new(from: Option<PlayerId>, to: PlayerId) -> Self {
        Self {
            from,
            to,
            card: None,
            amount: 1,
            nature: Nature::Normal,
            chain: false,
        }
    }

    #[must_use]
    pub fn with_card(mut self, card: Card) -> Self {
        self.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn with_nature(mut self, nature: Nature) -> Self {
        self.nature = nature;
        self
    }
}

/// A declared card use.
#[derive(Clone, Debug)]
pub struct CardUseStruct {
    pub card: Card,
    pub from: PlayerId,
    pub to: SmallVec<[PlayerId; 4]>,
}

/// A card's effect on one target.
#[derive(Clone, Debug)]
pub struct CardEffectStruct {
    pub card: Card,
    /// `None` for delayed tricks resolving in a judging area.
    pub from: Option<PlayerId>,
    pub to: PlayerId,
    /// Part of a use with several targets.
    pub multiple: bool,
}

/// A slash resolving against one target.
#[derive(Clone, Debug)]
pub struct SlashEffectStruct {
    pub slash: Card,
    pub from: PlayerId,
    pub to: PlayerId,
    /// Starts as the card's nature; `SlashEffect` skills may override it.
    pub nature: Nature,
    /// Adds one damage.
    pub drank: bool,
    /// The jink that dodged this slash, once one has.
    pub jink: Option<Card>,
}

#[derive(Clone, Debug)]
pub struct RecoverStruct {
    pub who: Option<PlayerId>,
    pub to: PlayerId,
    pub card: Option<Card>,
    pub amount: i32,
}

/// A judgment in progress.
#[derive(Clone, Debug)]
pub struct JudgeStruct {
    pub who: PlayerId,
    pub pattern: JudgePattern,
    /// Whether matching the pattern is the good outcome.
    pub good: bool,
    pub reason: String,
    /// The judge card, once drawn.
    pub card: Option<Card>,
}

impl JudgeStruct {
    #[must_use]
    pub fn new(who: PlayerId, pattern: JudgePattern, good: bool, reason: impl Into<String>) -> Self {
        Self {
            who,
            pattern,
            good,
            reason: reason.into(),
            card: None,
        }
    }

    /// Good outcome. A judgment without a card (empty piles) counts as good.
    #[must_use]
    pub fn is_good(&self) -> bool {
        self.card
            .as_ref()
            .is_none_or(|card| self.pattern.matches(card) == self.good)
    }

    #[must_use]
    pub fn is_bad(&self) -> bool {
        !self.is_good()
    }
}

#[derive(Clone, Debug)]
pub struct DyingStruct {
    pub who: PlayerId,
    /// The damage that brought the player down, if any.
    pub damage: Option<DamageStruct>,
}

/// The single mutable record threaded through one dispatch.
#[derive(Clone, Debug)]
pub enum EventPayload {
    None,
    Phase(Phase),
    CardUse(CardUseStruct),
    CardEffect(CardEffectStruct),
    SlashEffect(SlashEffectStruct),
    Damage(DamageStruct),
    Recover(RecoverStruct),
    Judge(JudgeStruct),
    Dying(DyingStruct),
}

macro_rules! payload_accessors {
    ($($variant:ident => $get:ident, $get_mut:ident, $into:ident: $ty:ty;)*) => {
        impl EventPayload {
            $(
                pub fn $get(&self, event: TriggerEvent) -> Result<&$ty, EngineError> {
                    match self {
                        EventPayload::$variant(inner) => Ok(inner),
                        _ => Err(event.malformed()),
                    }
                }

                pub fn $get_mut(&mut self, event: TriggerEvent) -> Result<&mut $ty, EngineError> {
                    match self {
                        EventPayload::$variant(inner) => Ok(inner),
                        _ => Err(event.malformed()),
                    }
                }

                pub fn $into(self, event: TriggerEvent) -> Result<$ty, EngineError> {
                    match self {
                        EventPayload::$variant(inner) => Ok(inner),
                        _ => Err(event.malformed()),
                    }
                }
            )*
        }
    };
}

payload_accessors! {
    CardUse => card_use, card_use_mut, into_card_use: CardUseStruct;
    CardEffect => card_effect, card_effect_mut, into_card_effect: CardEffectStruct;
    SlashEffect => slash_effect, slash_effect_mut, into_slash_effect: SlashEffectStruct;
    Damage => damage, damage_mut, into_damage: DamageStruct;
    Recover => recover, recover_mut, into_recover: RecoverStruct;
    Judge => judge, judge_mut, into_judge: JudgeStruct;
    Dying => dying, dying_mut, into_dying: DyingStruct;
}

impl EventPayload {
    /// Variant name, matching [`TriggerEvent::payload_name`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            EventPayload::None => "none",
            EventPayload::Phase(_) => "phase",
            EventPayload::CardUse(_) => "card use",
            EventPayload::CardEffect(_) => "card effect",
            EventPayload::SlashEffect(_) => "slash effect",
            EventPayload::Damage(_) => "damage",
            EventPayload::Recover(_) => "recover",
            EventPayload::Judge(_) => "judge",
            EventPayload::Dying(_) => "dying",
        }
    }

    pub fn phase(&self, event: TriggerEvent) -> Result<Phase, EngineError> {
        match self {
            EventPayload::Phase(phase) => Ok(*phase),
            _ => Err(event.malformed()),
        }
    }
}
