//! Damage pipeline integration tests.
//!
//! These tests verify modifier ordering (source before target, caps last),
//! the nullified/zero-damage distinction, iron-chain conduction, and the
//! dying and death sequence.

use std::sync::Arc;

use proptest::prelude::*;
use rust_sgs::cards::CardId;
use rust_sgs::core::{PlayerId, RoomConfig};
use rust_sgs::packages;
use rust_sgs::room::{CardChoice, DamageOutcome, Notification, Room, ScriptedAsk};
use rust_sgs::triggers::{DamageStruct, Nature, RecoverStruct};
use rust_sgs::zones::Place;

fn room_with(config: RoomConfig) -> Room {
    let registry = Arc::new(packages::bootstrap().unwrap());
    Room::new(config.unshuffled(), registry).unwrap()
}

fn room(players: usize) -> Room {
    room_with(RoomConfig::new(players))
}

fn give(room: &mut Room, player: PlayerId, name: &str) -> CardId {
    let id = room.find_card(name).unwrap();
    room.give_card(player, id).unwrap();
    id
}

fn equip(room: &mut Room, player: PlayerId, name: &str) -> CardId {
    let id = room.find_card(name).unwrap();
    let card = room.state().card(id).unwrap().clone();
    room.install_equip(player, &card).unwrap();
    id
}

fn hp(room: &Room, player: PlayerId) -> i32 {
    room.state().player(player).hp
}

fn slash_damage(room: &Room, from: PlayerId, to: PlayerId) -> DamageStruct {
    let slash = room.find_card("slash").unwrap();
    let card = room.state().card(slash).unwrap().clone();
    DamageStruct::new(Some(from), to).with_card(card)
}

// =============================================================================
// Armor and weapon modifiers
// =============================================================================

proptest! {
    /// Vine adds exactly one to fire damage, whatever the amount.
    #[test]
    fn prop_vine_adds_one_to_fire(amount in 1i32..6) {
        let mut room = room_with(RoomConfig::new(2).with_max_hp(20));
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
        equip(&mut room, p1, "vine");

        let damage = DamageStruct::new(Some(p0), p1).with_amount(amount).with_nature(Nature::Fire);
        let outcome = room.damage(damage).unwrap();

        prop_assert_eq!(outcome, DamageOutcome::Applied { amount: amount + 1, nature: Nature::Fire });
        prop_assert_eq!(hp(&room, p1), 20 - amount - 1);
    }

    /// Silver lion clamps any damage above one to exactly one.
    #[test]
    fn prop_silver_lion_clamps_to_one(amount in 2i32..10, thunder in any::<bool>()) {
        let mut room = room_with(RoomConfig::new(2).with_max_hp(20));
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
        equip(&mut room, p1, "silver_lion");

        let nature = if thunder { Nature::Thunder } else { Nature::Normal };
        let damage = DamageStruct::new(Some(p0), p1).with_amount(amount).with_nature(nature);
        room.damage(damage).unwrap();

        prop_assert_eq!(hp(&room, p1), 19);
        prop_assert_eq!(room.logs_of("#SilverLion").count(), 1);
    }
}

/// Vine's +1 stacks with the Guding blade's +1 in a fixed order.
#[test]
fn test_fire_amplifiers_stack() {
    let mut room = room_with(RoomConfig::new(2).with_max_hp(10));
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    equip(&mut room, p0, "guding_blade");
    equip(&mut room, p1, "vine");

    let damage = slash_damage(&room, p0, p1).with_nature(Nature::Fire);
    let outcome = room.damage(damage).unwrap();

    assert_eq!(outcome, DamageOutcome::Applied { amount: 3, nature: Nature::Fire });
    let guding = room.logs_of("#GudingBladeEffect").next().unwrap();
    assert_eq!((guding.arg.as_str(), guding.arg2.as_str()), ("1", "2"));
    let vine = room.logs_of("#VineDamage").next().unwrap();
    assert_eq!((vine.arg.as_str(), vine.arg2.as_str()), ("2", "3"));
}

/// The Silver lion cap sees the Guding blade's amplification.
#[test]
fn test_silver_lion_caps_after_guding_blade() {
    let mut room = room(2);
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    equip(&mut room, p0, "guding_blade");
    equip(&mut room, p1, "silver_lion");

    room.damage(slash_damage(&room, p0, p1)).unwrap();

    assert_eq!(hp(&room, p1), 3);
    assert_eq!(room.logs_of("#GudingBladeEffect").count(), 1);
    assert_eq!(room.logs_of("#SilverLion").count(), 1);
}

/// Guding blade only applies when the target has no hand cards.
#[test]
fn test_guding_blade_requires_empty_hand() {
    let mut room = room(2);
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    equip(&mut room, p0, "guding_blade");

    room.damage(slash_damage(&room, p0, p1)).unwrap();
    assert_eq!(hp(&room, p1), 2);

    give(&mut room, p1, "jink");
    room.damage(slash_damage(&room, p0, p1)).unwrap();
    assert_eq!(hp(&room, p1), 1);
}

/// Guding blade ignores damage that did not come from a slash.
#[test]
fn test_guding_blade_ignores_non_slash_damage() {
    let mut room = room(2);
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    equip(&mut room, p0, "guding_blade");

    room.damage(DamageStruct::new(Some(p0), p1)).unwrap();
    assert_eq!(hp(&room, p1), 3);
}

// =============================================================================
// Zero damage
// =============================================================================

/// Zero and negative amounts are clamped and fire no reaction stage.
#[test]
fn test_zero_damage_is_applied_not_nullified() {
    let mut room = room(2);
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));

    let outcome = room.damage(DamageStruct::new(Some(p0), p1).with_amount(-3)).unwrap();

    assert_eq!(outcome, DamageOutcome::Applied { amount: 0, nature: Nature::Normal });
    assert_eq!(hp(&room, p1), 4);
    assert_eq!(room.logs_of("#ZeroDamage").count(), 1);
    assert_eq!(room.logs_of("#Damage").count(), 0);
}

/// Damage to a dead player does nothing.
#[test]
fn test_damage_to_dead_player_is_ignored() {
    let mut room = room(3);
    let p1 = PlayerId::new(1);
    room.kill_player(p1, None).unwrap();

    let outcome = room.damage(DamageStruct::new(None, p1)).unwrap();
    assert_eq!(outcome, DamageOutcome::Ignored);
}

// =============================================================================
// Iron chain conduction
// =============================================================================

/// Fire damage to a chained player spreads to every other chained player.
#[test]
fn test_fire_damage_conducts_through_chain() {
    let mut room = room(4);
    let (p0, p1, p2, p3) = (PlayerId::new(0), PlayerId::new(1), PlayerId::new(2), PlayerId::new(3));
    room.set_chained(p1, true);
    room.set_chained(p3, true);

    let damage = DamageStruct::new(Some(p0), p1).with_nature(Nature::Fire);
    room.damage(damage).unwrap();

    assert_eq!(hp(&room, p1), 3);
    assert_eq!(hp(&room, p3), 3);
    assert_eq!(hp(&room, p2), 4);
    assert!(!room.state().player(p1).chained);
    assert!(!room.state().player(p3).chained);
    assert_eq!(room.logs_of("#IronChainDamage").count(), 1);
}

/// Conducted damage uses the declared amount, not the amount after the
/// first target's armor.
#[test]
fn test_conduction_uses_declared_amount() {
    let mut room = room(3);
    let (p0, p1, p2) = (PlayerId::new(0), PlayerId::new(1), PlayerId::new(2));
    equip(&mut room, p1, "vine");
    room.set_chained(p1, true);
    room.set_chained(p2, true);

    room.damage(DamageStruct::new(Some(p0), p1).with_nature(Nature::Fire)).unwrap();

    assert_eq!(hp(&room, p1), 2);
    assert_eq!(hp(&room, p2), 3);
}

/// Normal damage neither unchains nor conducts.
#[test]
fn test_normal_damage_does_not_conduct() {
    let mut room = room(3);
    let (p1, p2) = (PlayerId::new(1), PlayerId::new(2));
    room.set_chained(p1, true);
    room.set_chained(p2, true);

    room.damage(DamageStruct::new(None, p1)).unwrap();

    assert_eq!(hp(&room, p2), 4);
    assert!(room.state().player(p1).chained);
}

// =============================================================================
// Recovery, dying and death
// =============================================================================

/// Recovery is capped at maximum HP.
#[test]
fn test_recover_is_capped() {
    let mut room = room(2);
    let p1 = PlayerId::new(1);
    room.damage(DamageStruct::new(None, p1)).unwrap();

    let healed = room
        .recover(RecoverStruct { who: None, to: p1, card: None, amount: 3 })
        .unwrap();

    assert_eq!(healed, 1);
    assert_eq!(hp(&room, p1), 4);
}

/// Without a rescue the player dies, loses every card and every skill.
#[test]
fn test_unrescued_player_dies() {
    let mut room = room(3);
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    let jink = give(&mut room, p1, "jink");
    let vine = equip(&mut room, p1, "vine");

    room.damage(DamageStruct::new(Some(p0), p1).with_amount(4)).unwrap();

    let player = room.state().player(p1);
    assert!(!player.alive);
    assert!(!player.has_flag("dying"));
    assert_eq!(room.state().place_of(jink), Some(Place::DISCARD_PILE));
    assert_eq!(room.state().place_of(vine), Some(Place::DISCARD_PILE));
    assert!(!room.triggers().has_skill(p1, "vine"));
    assert_eq!(room.logs_of("#Death").count(), 1);
    assert!(room.notifications().iter().any(|n| matches!(
        n,
        Notification::Property { player, name, value } if *player == p1 && name == "alive" && value == "false"
    )));
}

/// Another player's peach rescues a dying player.
#[test]
fn test_peach_rescues_dying_player() {
    let mut room = room(3);
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    let peach = give(&mut room, p0, "peach");
    room.set_ask_handler(Box::new(
        ScriptedAsk::new().card(p0, "peach", Some(CardChoice::Physical(peach))),
    ));

    room.damage(DamageStruct::new(Some(p0), p1).with_amount(4)).unwrap();

    assert!(room.state().player(p1).alive);
    assert_eq!(hp(&room, p1), 1);
    assert_eq!(room.state().place_of(peach), Some(Place::DISCARD_PILE));
    assert_eq!(room.logs_of("#Death").count(), 0);
}

/// Two points below zero need two peaches.
#[test]
fn test_deep_dying_needs_several_peaches() {
    let mut room = room(2);
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    let first = give(&mut room, p0, "peach");
    let second = give(&mut room, p0, "peach");
    room.set_ask_handler(Box::new(
        ScriptedAsk::new()
            .card(p0, "peach", Some(CardChoice::Physical(first)))
            .card(p0, "peach", Some(CardChoice::Physical(second))),
    ));

    room.damage(DamageStruct::new(Some(p0), p1).with_amount(5)).unwrap();

    assert!(room.state().player(p1).alive);
    assert_eq!(hp(&room, p1), 1);
}
