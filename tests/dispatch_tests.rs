//! Trigger dispatch integration tests.
//!
//! These tests verify that skills run in priority order, that consumption
//! stops a dispatch without detaching the consumer, that payload contract
//! violations and runaway recursion are reported as errors, and that a
//! skill detached during a dispatch is not run.

use std::sync::Arc;

use rust_sgs::cards::{CardRegistry, Package};
use rust_sgs::core::{EngineError, Phase, PlayerId, RoomConfig};
use rust_sgs::packages;
use rust_sgs::room::{DamageOutcome, Room};
use rust_sgs::triggers::{DamageStruct, EventPayload, Nature, Skill, SkillKind, TriggerEvent};
use rust_sgs::zones::Place;
use tracing_subscriber::EnvFilter;

type Action = fn(TriggerEvent, &mut Room, PlayerId, &mut EventPayload) -> Result<bool, EngineError>;

/// Skill whose behavior is a plain function.
struct Hook {
    name: &'static str,
    events: Vec<TriggerEvent>,
    kind: SkillKind,
    priority: Option<i32>,
    action: Action,
}

impl Hook {
    fn new(name: &'static str, event: TriggerEvent, action: Action) -> Self {
        Self {
            name,
            events: vec![event],
            kind: SkillKind::Player,
            priority: None,
            action,
        }
    }

    fn with_kind(mut self, kind: SkillKind) -> Self {
        self.kind = kind;
        self
    }

    fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl Skill for Hook {
    fn name(&self) -> &str {
        self.name
    }

    fn events(&self) -> &[TriggerEvent] {
        &self.events
    }

    fn kind(&self) -> SkillKind {
        self.kind
    }

    fn priority(&self) -> i32 {
        self.priority.unwrap_or(self.kind.default_priority())
    }

    fn trigger(
        &self,
        event: TriggerEvent,
        room: &mut Room,
        owner: PlayerId,
        payload: &mut EventPayload,
    ) -> Result<bool, EngineError> {
        (self.action)(event, room, owner, payload)
    }
}

fn shield(_: TriggerEvent, _: &mut Room, _: PlayerId, _: &mut EventPayload) -> Result<bool, EngineError> {
    Ok(true)
}

fn record(_: TriggerEvent, room: &mut Room, owner: PlayerId, _: &mut EventPayload) -> Result<bool, EngineError> {
    room.add_mark(owner, "recorded", 1);
    Ok(false)
}

fn amplify(event: TriggerEvent, _: &mut Room, _: PlayerId, payload: &mut EventPayload) -> Result<bool, EngineError> {
    payload.damage_mut(event)?.amount += 2;
    Ok(false)
}

fn corrupt(_: TriggerEvent, _: &mut Room, _: PlayerId, payload: &mut EventPayload) -> Result<bool, EngineError> {
    *payload = EventPayload::None;
    Ok(false)
}

fn recurse(event: TriggerEvent, room: &mut Room, owner: PlayerId, payload: &mut EventPayload) -> Result<bool, EngineError> {
    room.trigger(event, owner, payload)?;
    Ok(false)
}

fn disarm(_: TriggerEvent, room: &mut Room, owner: PlayerId, _: &mut EventPayload) -> Result<bool, EngineError> {
    for id in room.state().equips(owner) {
        room.move_card_to(id, Place::DISCARD_PILE)?;
    }
    Ok(false)
}

fn registry() -> CardRegistry {
    let mut registry = packages::bootstrap().unwrap();
    let hooks = Package::new("hooks")
        .with_skill(Arc::new(Hook::new("shield", TriggerEvent::Predamaged, shield)))
        .with_skill(Arc::new(
            Hook::new("recorder", TriggerEvent::Predamaged, record).with_priority(0),
        ))
        .with_skill(Arc::new(Hook::new("amplify", TriggerEvent::Predamaged, amplify)))
        .with_skill(Arc::new(Hook::new("corrupt", TriggerEvent::Predamaged, corrupt)))
        .with_skill(Arc::new(Hook::new("recurse", TriggerEvent::PhaseStart, recurse)))
        .with_skill(Arc::new(
            Hook::new("disarm", TriggerEvent::Predamaged, disarm).with_priority(5),
        ))
        .with_skill(Arc::new(
            Hook::new("greeting", TriggerEvent::GameStart, record).with_kind(SkillKind::Rule),
        ));
    registry.install(hooks).unwrap();
    registry
}

/// Route engine logs to the test harness; set `RUST_LOG=rust_sgs=debug` to
/// see dispatch traces.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn room_with(config: RoomConfig) -> Room {
    Room::new(config.unshuffled(), Arc::new(registry())).unwrap()
}

fn room(players: usize) -> Room {
    room_with(RoomConfig::new(players))
}

fn equip(room: &mut Room, player: PlayerId, name: &str) {
    let id = room.find_card(name).unwrap();
    let card = room.state().card(id).unwrap().clone();
    room.install_equip(player, &card).unwrap();
}

// =============================================================================
// Consumption and ordering
// =============================================================================

/// A consuming skill nullifies the damage and stops later skills.
#[test]
fn test_consumption_stops_dispatch() {
    let mut room = room(2);
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    room.acquire_skill(p1, "shield").unwrap();
    room.acquire_skill(p1, "recorder").unwrap();

    let outcome = room.damage(DamageStruct::new(Some(p0), p1)).unwrap();

    assert_eq!(outcome, DamageOutcome::Nullified { skill: "shield".to_string() });
    assert_eq!(room.state().player(p1).hp, 4);
    assert_eq!(room.state().player(p1).mark("recorded"), 0);
    let log = room.logs_of("#Consumed").next().unwrap();
    assert_eq!((log.arg.as_str(), log.arg2.as_str()), ("shield", "Predamaged"));
}

/// Consuming an event does not detach the consumer.
#[test]
fn test_consumer_stays_attached() {
    let mut room = room(2);
    let p1 = PlayerId::new(1);
    room.acquire_skill(p1, "shield").unwrap();

    room.damage(DamageStruct::new(None, p1)).unwrap();
    let outcome = room.damage(DamageStruct::new(None, p1)).unwrap();

    assert!(matches!(outcome, DamageOutcome::Nullified { .. }));
    assert!(room.triggers().has_skill(p1, "shield"));
}

/// Lower-priority skills still run when nothing consumes.
#[test]
fn test_completed_dispatch_runs_everyone() {
    let mut room = room(2);
    let p1 = PlayerId::new(1);
    room.acquire_skill(p1, "recorder").unwrap();

    room.damage(DamageStruct::new(None, p1)).unwrap();

    assert_eq!(room.state().player(p1).mark("recorded"), 1);
    assert_eq!(room.state().player(p1).hp, 3);
}

/// A cap skill sees amplification from player skills regardless of
/// attachment order.
#[test]
fn test_cap_runs_after_amplifier() {
    let mut room = room(2);
    let p1 = PlayerId::new(1);
    equip(&mut room, p1, "silver_lion");
    room.acquire_skill(p1, "amplify").unwrap();

    room.damage(DamageStruct::new(None, p1)).unwrap();

    assert_eq!(room.state().player(p1).hp, 3);
    let log = room.logs_of("#SilverLion").next().unwrap();
    assert_eq!(log.arg, "3");
}

/// A skill whose equipment is lost mid-dispatch is not run.
#[test]
fn test_detached_skill_is_skipped() {
    init_tracing();
    let mut room = room(2);
    let p1 = PlayerId::new(1);
    equip(&mut room, p1, "vine");
    room.acquire_skill(p1, "disarm").unwrap();

    room.damage(DamageStruct::new(None, p1).with_nature(Nature::Fire)).unwrap();

    assert_eq!(room.state().player(p1).hp, 3);
    assert!(!room.triggers().has_skill(p1, "vine"));
    assert_eq!(room.logs_of("#VineDamage").count(), 0);
}

// =============================================================================
// Contract violations
// =============================================================================

/// Dispatching with the wrong payload variant is rejected up front.
#[test]
fn test_malformed_payload_is_rejected() {
    let mut room = room(2);
    let mut payload = EventPayload::Phase(Phase::Draw);

    let err = room.trigger(TriggerEvent::Predamaged, PlayerId::new(1), &mut payload).unwrap_err();

    assert_eq!(
        err,
        EngineError::MalformedPayload {
            event: TriggerEvent::Predamaged,
            expected: "damage",
            skill: None,
        }
    );
}

/// A skill that replaces the payload with another variant is named in the
/// error, and the frame stack is unwound.
#[test]
fn test_payload_replacement_names_skill() {
    init_tracing();
    let mut room = room(2);
    let p1 = PlayerId::new(1);
    room.acquire_skill(p1, "corrupt").unwrap();

    let err = room.damage(DamageStruct::new(None, p1)).unwrap_err();

    assert_eq!(
        err,
        EngineError::MalformedPayload {
            event: TriggerEvent::Predamaged,
            expected: "damage",
            skill: Some("corrupt".to_string()),
        }
    );
    assert!(room.dispatch_stack().is_empty());
    assert_eq!(room.state().player(p1).hp, 4);
}

/// Unbounded re-dispatch hits the depth limit instead of the stack.
#[test]
fn test_runaway_recursion_is_bounded() {
    init_tracing();
    let mut room = room_with(RoomConfig::new(2).with_max_dispatch_depth(8));
    let p0 = PlayerId::new(0);
    room.acquire_skill(p0, "recurse").unwrap();

    let mut payload = EventPayload::Phase(Phase::Play);
    let err = room.trigger(TriggerEvent::PhaseStart, p0, &mut payload).unwrap_err();

    assert_eq!(err, EngineError::DispatchTooDeep { event: TriggerEvent::PhaseStart, depth: 9 });
    assert!(room.dispatch_stack().is_empty());
}

/// A turn aborted by a dispatch error still ends cleanly.
#[test]
fn test_aborted_turn_still_ends() {
    init_tracing();
    let mut room = room_with(RoomConfig::new(2).with_max_dispatch_depth(4));
    let p0 = PlayerId::new(0);
    room.acquire_skill(p0, "recurse").unwrap();

    assert!(room.run_turn(p0).is_err());
    assert_eq!(room.state().turn().phase, Phase::NotActive);
    assert!(room.dispatch_stack().is_empty());
}

/// Acquiring an unregistered skill fails.
#[test]
fn test_unknown_skill() {
    let mut room = room(2);
    assert_eq!(
        room.acquire_skill(PlayerId::new(0), "nope"),
        Err(EngineError::UnknownSkill("nope".to_string()))
    );
}

// =============================================================================
// Rule skills
// =============================================================================

/// Rule skills are attached to the room and run for every player.
#[test]
fn test_rule_skill_runs_for_everyone() {
    let mut room = room(3);

    room.start_game().unwrap();

    for player in PlayerId::all(3) {
        assert_eq!(room.state().player(player).mark("recorded"), 1);
    }
}
