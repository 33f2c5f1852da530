//! Card use integration tests.
//!
//! These tests verify use validation (a rejected use changes nothing),
//! the jink and nullification response windows, equipment installation,
//! delayed tricks, and the play phase driving uses through the ask handler.

use std::sync::Arc;

use rust_sgs::cards::{CardId, CardType};
use rust_sgs::core::{EngineError, PlayerId, RoomConfig, UseError};
use rust_sgs::packages;
use rust_sgs::room::{AskError, CardChoice, Room, ScriptedAsk, UseIntent, UseOutcome};
use rust_sgs::triggers::DamageStruct;
use rust_sgs::zones::Place;

fn room(players: usize) -> Room {
    let registry = Arc::new(packages::bootstrap().unwrap());
    Room::new(RoomConfig::new(players).unshuffled(), registry).unwrap()
}

fn give(room: &mut Room, player: PlayerId, name: &str) -> CardId {
    let id = room.find_card(name).unwrap();
    room.give_card(player, id).unwrap();
    id
}

fn players() -> (PlayerId, PlayerId, PlayerId, PlayerId) {
    (PlayerId::new(0), PlayerId::new(1), PlayerId::new(2), PlayerId::new(3))
}

// =============================================================================
// Validation
// =============================================================================

/// A slash out of attack range is rejected and the card stays in hand.
#[test]
fn test_out_of_range_slash_is_rejected() {
    let mut room = room(4);
    let (p0, _, p2, _) = players();
    let slash = give(&mut room, p0, "slash");

    let outcome = room.use_card(p0, &UseIntent::new(slash, [p2])).unwrap();

    assert_eq!(outcome, UseOutcome::Rejected(UseError::IllegalTarget { index: 0 }));
    assert_eq!(room.state().place_of(slash), Some(Place::hand(p0)));
    assert_eq!(room.state().player(p2).hp, 4);
    assert_eq!(room.logs_of("#UseCard").count(), 0);
}

/// Only one slash may be used per turn.
#[test]
fn test_second_slash_is_unavailable() {
    let mut room = room(2);
    let (p0, p1, _, _) = players();
    let first = give(&mut room, p0, "slash");
    let second = give(&mut room, p0, "slash");

    assert!(room.use_card(p0, &UseIntent::new(first, [p1])).unwrap().is_resolved());
    let outcome = room.use_card(p0, &UseIntent::new(second, [p1])).unwrap();

    assert_eq!(outcome, UseOutcome::Rejected(UseError::Unavailable));
    assert_eq!(room.state().player(p1).hp, 3);
}

/// A card that is not in the actor's hand cannot be used.
#[test]
fn test_unheld_card_is_rejected() {
    let mut room = room(2);
    let (p0, p1, _, _) = players();
    let slash = room.find_card("slash").unwrap();

    let outcome = room.use_card(p0, &UseIntent::new(slash, [p1])).unwrap();

    assert_eq!(outcome, UseOutcome::Rejected(UseError::NotOwned(slash)));
    assert_eq!(room.state().place_of(slash), Some(Place::DRAW_PILE));
}

/// Targeting yourself with a slash is illegal.
#[test]
fn test_self_slash_is_rejected() {
    let mut room = room(2);
    let (p0, _, _, _) = players();
    let slash = give(&mut room, p0, "slash");

    let outcome = room.use_card(p0, &UseIntent::new(slash, [p0])).unwrap();
    assert_eq!(outcome, UseOutcome::Rejected(UseError::IllegalTarget { index: 0 }));
}

/// Peach can only be used while wounded.
#[test]
fn test_peach_requires_wound() {
    let mut room = room(2);
    let (p0, _, _, _) = players();
    let peach = give(&mut room, p0, "peach");

    let outcome = room.use_card(p0, &UseIntent::new(peach, [])).unwrap();
    assert_eq!(outcome, UseOutcome::Rejected(UseError::Unavailable));

    room.damage(DamageStruct::new(None, p0)).unwrap();
    assert!(room.use_card(p0, &UseIntent::new(peach, [])).unwrap().is_resolved());
    assert_eq!(room.state().player(p0).hp, 4);
    assert_eq!(room.state().place_of(peach), Some(Place::DISCARD_PILE));
}

// =============================================================================
// Slash and jink
// =============================================================================

/// An unanswered slash deals one damage and is discarded.
#[test]
fn test_slash_hits() {
    let mut room = room(2);
    let (p0, p1, _, _) = players();
    let slash = give(&mut room, p0, "slash");

    assert!(room.use_card(p0, &UseIntent::new(slash, [p1])).unwrap().is_resolved());

    assert_eq!(room.state().player(p1).hp, 3);
    assert_eq!(room.state().place_of(slash), Some(Place::DISCARD_PILE));
    let used = room.logs_of("#UseCard").next().unwrap();
    assert_eq!(used.from, Some(p0));
    assert_eq!(used.to.as_slice(), &[p1]);
}

/// A jink dodges the slash.
#[test]
fn test_jink_dodges_slash() {
    let mut room = room(2);
    let (p0, p1, _, _) = players();
    let slash = give(&mut room, p0, "slash");
    let jink = give(&mut room, p1, "jink");
    room.set_ask_handler(Box::new(ScriptedAsk::new().card(p1, "jink", Some(CardChoice::Physical(jink)))));

    room.use_card(p0, &UseIntent::new(slash, [p1])).unwrap();

    assert_eq!(room.state().player(p1).hp, 4);
    assert_eq!(room.state().place_of(jink), Some(Place::DISCARD_PILE));
    assert_eq!(room.logs_of("#Jink").count(), 1);
}

/// Answering a jink request with a card that is not a jink counts as no
/// answer.
#[test]
fn test_wrong_card_does_not_dodge() {
    let mut room = room(2);
    let (p0, p1, _, _) = players();
    let slash = give(&mut room, p0, "slash");
    let peach = give(&mut room, p1, "peach");
    room.set_ask_handler(Box::new(ScriptedAsk::new().card(p1, "jink", Some(CardChoice::Physical(peach)))));

    room.use_card(p0, &UseIntent::new(slash, [p1])).unwrap();

    assert_eq!(room.state().player(p1).hp, 3);
    assert_eq!(room.state().place_of(peach), Some(Place::hand(p1)));
}

/// A collaborator failure aborts the slash, but the slash still reaches the
/// discard pile and the drank bonus is spent.
#[test]
fn test_failed_response_still_discards_slash() {
    let mut room = room(2);
    let (p0, p1, _, _) = players();
    let slash = give(&mut room, p0, "slash");
    give(&mut room, p1, "jink");
    room.set_flag(p0, "drank");
    room.set_ask_handler(Box::new(
        ScriptedAsk::new().broken(p1, AskError::Failed("socket".to_string())),
    ));

    let result = room.use_card(p0, &UseIntent::new(slash, [p1]));

    assert!(matches!(result, Err(EngineError::Collaborator { player, .. }) if player == p1));
    assert_eq!(room.state().place_of(slash), Some(Place::DISCARD_PILE));
    assert_eq!(room.state().zones().count(Place::TABLE), 0);
    assert!(!room.state().player(p0).has_flag("drank"));
    assert_eq!(room.state().player(p1).hp, 4);
}

// =============================================================================
// Nullification
// =============================================================================

/// A single nullification cancels a trick's effect on its target.
#[test]
fn test_nullification_cancels_trick() {
    let mut room = room(3);
    let (p0, p1, _, _) = players();
    let chain = give(&mut room, p0, "iron_chain");
    let nullification = give(&mut room, p1, "nullification");
    room.set_ask_handler(Box::new(
        ScriptedAsk::new().card(p1, "nullification", Some(CardChoice::Physical(nullification))),
    ));

    room.use_card(p0, &UseIntent::new(chain, [p1])).unwrap();

    assert!(!room.state().player(p1).chained);
    assert_eq!(room.logs_of("#Nullified").count(), 1);
    assert_eq!(room.state().place_of(nullification), Some(Place::DISCARD_PILE));
}

/// A nullification can itself be nullified; the trick then takes effect.
#[test]
fn test_nullification_chain_parity() {
    let mut room = room(3);
    let (p0, p1, _, _) = players();
    let chain = give(&mut room, p0, "iron_chain");
    let counter = give(&mut room, p0, "nullification");
    let nullification = give(&mut room, p1, "nullification");
    room.set_ask_handler(Box::new(
        ScriptedAsk::new()
            .card(p0, "nullification", None)
            .card(p0, "nullification", Some(CardChoice::Physical(counter)))
            .card(p1, "nullification", Some(CardChoice::Physical(nullification))),
    ));

    room.use_card(p0, &UseIntent::new(chain, [p1])).unwrap();

    assert!(room.state().player(p1).chained);
    assert_eq!(room.logs_of("#NullificationUsed").count(), 2);
    assert_eq!(room.logs_of("#Nullified").count(), 0);
}

/// Players without a nullification are not asked.
#[test]
fn test_nullification_skips_players_who_cannot_respond() {
    let mut room = room(3);
    let (p0, p1, _, _) = players();
    let chain = give(&mut room, p0, "iron_chain");
    let script = ScriptedAsk::new().card(p1, "nullification", None);
    room.set_ask_handler(Box::new(script));

    room.use_card(p0, &UseIntent::new(chain, [p1])).unwrap();

    assert!(room.state().player(p1).chained);
}

// =============================================================================
// Equipment and delayed tricks
// =============================================================================

/// Using a weapon installs it and extends the attack range.
#[test]
fn test_weapon_use_installs_and_extends_range() {
    let mut room = room(4);
    let (p0, _, p2, _) = players();
    let sword = give(&mut room, p0, "qinggang_sword");
    let slash = give(&mut room, p0, "slash");

    assert!(room.use_card(p0, &UseIntent::new(sword, [])).unwrap().is_resolved());

    assert_eq!(room.state().place_of(sword), Some(Place::equip(p0)));
    assert!(room.state().equipped(p0, CardType::Weapon).is_some());
    assert!(room.triggers().has_skill(p0, "qinggang_sword"));
    assert!(room.use_card(p0, &UseIntent::new(slash, [p2])).unwrap().is_resolved());
    assert_eq!(room.state().player(p2).hp, 3);
}

/// A second weapon replaces the first and detaches its skill.
#[test]
fn test_weapon_replacement() {
    let mut room = room(2);
    let (p0, _, _, _) = players();
    let sword = give(&mut room, p0, "qinggang_sword");
    let blade = give(&mut room, p0, "guding_blade");

    room.use_card(p0, &UseIntent::new(sword, [])).unwrap();
    room.use_card(p0, &UseIntent::new(blade, [])).unwrap();

    assert_eq!(room.state().place_of(sword), Some(Place::DISCARD_PILE));
    assert_eq!(room.state().place_of(blade), Some(Place::equip(p0)));
    assert!(!room.triggers().has_skill(p0, "qinggang_sword"));
    assert!(room.triggers().has_skill(p0, "guding_blade"));
}

/// A delayed trick attaches to its target; a second copy on the same
/// target is illegal.
#[test]
fn test_delayed_trick_attaches_once() {
    let mut room = room(2);
    let (p0, p1, _, _) = players();
    let first = give(&mut room, p0, "supply_shortage");
    let second = give(&mut room, p0, "supply_shortage");

    assert!(room.use_card(p0, &UseIntent::new(first, [p1])).unwrap().is_resolved());
    assert_eq!(room.state().judging(p1), vec![first]);
    assert_eq!(room.logs_of("$AttachTrick").count(), 1);

    let outcome = room.use_card(p0, &UseIntent::new(second, [p1])).unwrap();
    assert_eq!(outcome, UseOutcome::Rejected(UseError::IllegalTarget { index: 0 }));
}

// =============================================================================
// AOE tricks
// =============================================================================

/// Savage assault hits everyone else; a slash answers it.
#[test]
fn test_savage_assault() {
    let mut room = room(3);
    let (p0, p1, p2, _) = players();
    let assault = give(&mut room, p0, "savage_assault");
    let answer = give(&mut room, p1, "slash");
    room.set_ask_handler(Box::new(ScriptedAsk::new().card(p1, "slash", Some(CardChoice::Physical(answer)))));

    assert!(room.use_card(p0, &UseIntent::new(assault, [])).unwrap().is_resolved());

    assert_eq!(room.state().player(p0).hp, 4);
    assert_eq!(room.state().player(p1).hp, 4);
    assert_eq!(room.state().player(p2).hp, 3);
    assert_eq!(room.state().place_of(answer), Some(Place::DISCARD_PILE));
}

/// Archery attack damages every unanswering player.
#[test]
fn test_archery_attack() {
    let mut room = room(4);
    let (p0, p1, p2, p3) = players();
    let archery = give(&mut room, p0, "archery_attack");

    room.use_card(p0, &UseIntent::new(archery, [])).unwrap();

    assert_eq!(room.state().player(p0).hp, 4);
    for p in [p1, p2, p3] {
        assert_eq!(room.state().player(p).hp, 3);
    }
}

// =============================================================================
// Play phase
// =============================================================================

/// The play phase runs scripted uses, logs rejections, and ends on timeout.
#[test]
fn test_play_phase_drives_uses() {
    let mut room = room(4);
    let (p0, p1, p2, _) = players();
    let slash = give(&mut room, p0, "slash");
    room.set_ask_handler(Box::new(
        ScriptedAsk::new()
            .play(p0, UseIntent::new(slash, [p2]))
            .play(p0, UseIntent::new(slash, [p1])),
    ));

    room.run_turn(p0).unwrap();

    assert_eq!(room.logs_of("#UseRejected").count(), 1);
    assert_eq!(room.state().player(p1).hp, 3);
    assert_eq!(room.state().player(p2).hp, 4);
    assert!(!room.state().player(p0).has_used("Slash"));
}
