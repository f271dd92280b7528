mod common;

use common::{Fixture, RecordingCombat};
use creature_core::{
    AbilityId, Bolt, BoltEffect, Creature, CreatureId, CreatureMode, CreatureState, GridKind,
    Position, Simulation, StatusKind, TurnAction, TurnStart, distance_between,
};

const BLINK: Bolt = Bolt {
    id: AbilityId(9),
    effect: BoltEffect::Blinking,
};

fn caster(name: &str, at: Position, state: CreatureState, effect: BoltEffect) -> Creature {
    let mut monst = Creature::new(name, at).with_state(state);
    monst.abilities.bolts.push(Bolt {
        id: AbilityId(effect as u16),
        effect,
    });
    monst.behavior.always_use_ability = true;
    monst
}

fn take_turn(sim: &mut Simulation, fixture: &Fixture, combat: &mut RecordingCombat, id: CreatureId) -> TurnAction {
    sim.begin_turn(TurnStart::default());
    sim.advance_creature_turn(fixture.ctx(), combat, id)
        .unwrap()
        .action
}

#[test]
fn fugitive_blinks_down_the_safety_grid() {
    let player_at = Position::new(2, 3);
    let fixture = Fixture::open_room(30, 7, player_at);
    let mut sim = Simulation::new(fixture.dims(), 8);
    let mut combat = RecordingCombat::default();
    sim.spawn(Creature::player(player_at)).unwrap();
    let mut imp = Creature::new("imp", Position::new(4, 3)).with_state(CreatureState::Fleeing);
    imp.mode = CreatureMode::PermanentlyFleeing;
    imp.abilities.bolts.push(BLINK);
    imp.behavior.always_use_ability = true;
    let imp = sim.spawn(imp).unwrap();

    let TurnAction::Blinked { from, to } = take_turn(&mut sim, &fixture, &mut combat, imp) else {
        panic!("expected a blink");
    };
    assert_eq!(from, Position::new(4, 3));
    assert!(distance_between(from, to) > 1, "{from} -> {to} is a step, not a blink");
    assert!(distance_between(to, player_at) > distance_between(from, player_at));
    let grid = sim.shared_grid(GridKind::Safety).unwrap();
    assert!(grid.distance_at(to) < grid.distance_at(from));
    assert_eq!(sim.creature(imp).unwrap().position, to);
}

#[test]
fn hunter_blinks_up_the_scent_trail() {
    let player_at = Position::new(2, 3);
    let fixture = Fixture::open_room(30, 7, player_at);
    let mut sim = Simulation::new(fixture.dims(), 8);
    let mut combat = RecordingCombat::default();
    sim.spawn(Creature::player(player_at)).unwrap();
    let mut imp = Creature::new("imp", Position::new(14, 3)).with_state(CreatureState::TrackingScent);
    imp.abilities.bolts.push(BLINK);
    imp.behavior.always_use_ability = true;
    let imp = sim.spawn(imp).unwrap();

    let TurnAction::Blinked { from, to } = take_turn(&mut sim, &fixture, &mut combat, imp) else {
        panic!("expected a blink");
    };
    assert!(distance_between(from, player_at) - distance_between(to, player_at) > 1);
    assert!(!sim.world().is_occupied(from));
    assert!(combat.bolts.is_empty());
}

#[test]
fn damage_bolt_strikes_a_player_in_the_clear() {
    let player_at = Position::new(2, 3);
    let fixture = Fixture::open_room(20, 7, player_at);
    let mut sim = Simulation::new(fixture.dims(), 3);
    let mut combat = RecordingCombat::default();
    let player = sim.spawn(Creature::player(player_at)).unwrap();
    let shaman = sim
        .spawn(caster("goblin shaman", Position::new(8, 3), CreatureState::TrackingScent, BoltEffect::Damage))
        .unwrap();

    let action = take_turn(&mut sim, &fixture, &mut combat, shaman);
    let ability = AbilityId(BoltEffect::Damage as u16);
    assert_eq!(action, TurnAction::Cast { target: player, ability });
    assert_eq!(combat.bolts, vec![(shaman, player, ability)]);
    assert_eq!(sim.creature(shaman).unwrap().position, Position::new(8, 3));
}

#[test]
fn no_bolt_at_an_invisible_player() {
    let player_at = Position::new(2, 3);
    let fixture = Fixture::open_room(20, 7, player_at);
    let mut sim = Simulation::new(fixture.dims(), 3);
    let mut combat = RecordingCombat::default();
    let player = sim.spawn(Creature::player(player_at)).unwrap();
    sim.creature_mut(player).unwrap().status.set(StatusKind::Invisible, 20);
    let shaman = sim
        .spawn(caster("goblin shaman", Position::new(8, 3), CreatureState::TrackingScent, BoltEffect::Damage))
        .unwrap();

    let action = take_turn(&mut sim, &fixture, &mut combat, shaman);
    assert!(!matches!(action, TurnAction::Cast { .. }), "got {action}");
    assert!(combat.bolts.is_empty());
}

#[test]
fn no_bolt_through_a_creature_in_the_way() {
    let player_at = Position::new(2, 3);
    let fixture = Fixture::open_room(20, 7, player_at);
    let mut sim = Simulation::new(fixture.dims(), 3);
    let mut combat = RecordingCombat::default();
    sim.spawn(Creature::player(player_at)).unwrap();
    let shaman = sim
        .spawn(caster("goblin shaman", Position::new(8, 3), CreatureState::TrackingScent, BoltEffect::Damage))
        .unwrap();
    sim.spawn(Creature::new("kobold", Position::new(5, 3)).with_state(CreatureState::Sleeping))
        .unwrap();

    let action = take_turn(&mut sim, &fixture, &mut combat, shaman);
    assert!(!matches!(action, TurnAction::Cast { .. }), "got {action}");
    assert!(combat.bolts.is_empty());
}

/// A mystic hunting the player at (2,3) with one follower below it.
fn healing_scene(effect: BoltEffect, follower: Creature) -> (Simulation, CreatureId, CreatureId) {
    let player_at = Position::new(2, 3);
    let fixture = Fixture::open_room(20, 9, player_at);
    let mut sim = Simulation::new(fixture.dims(), 12);
    sim.spawn(Creature::player(player_at)).unwrap();
    let mystic = sim
        .spawn(caster("goblin mystic", Position::new(10, 3), CreatureState::TrackingScent, effect))
        .unwrap();
    sim.creature_mut(mystic).unwrap().bookkeeping.leader = true;
    let goblin = sim.spawn(follower.with_leader(mystic)).unwrap();
    (sim, mystic, goblin)
}

#[test]
fn healer_mends_a_wounded_teammate_not_the_player() {
    let fixture = Fixture::open_room(20, 9, Position::new(2, 3));
    let mut combat = RecordingCombat::default();
    let follower = Creature::new("goblin", Position::new(10, 5))
        .with_state(CreatureState::TrackingScent)
        .with_health(3, 10);
    let (mut sim, mystic, goblin) = healing_scene(BoltEffect::Heal, follower);

    let action = take_turn(&mut sim, &fixture, &mut combat, mystic);
    let ability = AbilityId(BoltEffect::Heal as u16);
    assert_eq!(action, TurnAction::Cast { target: goblin, ability });
    assert_eq!(combat.bolts, vec![(mystic, goblin, ability)]);
}

#[test]
fn healer_ignores_a_teammate_at_full_health() {
    let fixture = Fixture::open_room(20, 9, Position::new(2, 3));
    let mut combat = RecordingCombat::default();
    let follower = Creature::new("goblin", Position::new(10, 5)).with_state(CreatureState::TrackingScent);
    let (mut sim, mystic, _) = healing_scene(BoltEffect::Heal, follower);

    let action = take_turn(&mut sim, &fixture, &mut combat, mystic);
    assert!(!matches!(action, TurnAction::Cast { .. }), "got {action}");
    assert!(combat.bolts.is_empty());
}

#[test]
fn haste_goes_only_to_a_teammate_in_the_fight() {
    let fixture = Fixture::open_room(20, 9, Position::new(2, 3));

    let mut combat = RecordingCombat::default();
    let hunting = Creature::new("goblin", Position::new(10, 5)).with_state(CreatureState::TrackingScent);
    let (mut sim, mystic, goblin) = healing_scene(BoltEffect::Haste, hunting);
    let action = take_turn(&mut sim, &fixture, &mut combat, mystic);
    assert!(matches!(action, TurnAction::Cast { target, .. } if target == goblin), "got {action}");

    let mut combat = RecordingCombat::default();
    let idle = Creature::new("goblin", Position::new(10, 5)).with_state(CreatureState::Wandering);
    let (mut sim, mystic, _) = healing_scene(BoltEffect::Haste, idle);
    let action = take_turn(&mut sim, &fixture, &mut combat, mystic);
    assert!(!matches!(action, TurnAction::Cast { .. }), "got {action}");
    assert!(combat.bolts.is_empty());
}

#[test]
fn eager_summoner_calls_a_bound_minion() {
    let player_at = Position::new(2, 3);
    let fixture = Fixture::open_room(20, 7, player_at);
    let mut sim = Simulation::new(fixture.dims(), 21);
    let mut combat = RecordingCombat::default();
    sim.spawn(Creature::player(player_at)).unwrap();
    let mut conjurer = Creature::new("goblin conjurer", Position::new(10, 3)).with_state(CreatureState::TrackingScent);
    conjurer.abilities.summons = true;
    conjurer.behavior.always_use_ability = true;
    let conjurer = sim.spawn(conjurer).unwrap();

    let action = take_turn(&mut sim, &fixture, &mut combat, conjurer);
    assert_eq!(action, TurnAction::Summoned { count: 1 });
    assert!(sim.creature(conjurer).unwrap().bookkeeping.leader);
    let minion = sim
        .world()
        .monsters()
        .find(|monst| monst.id != conjurer)
        .unwrap();
    assert_eq!(minion.name, "goblin conjurer spawn");
    assert_eq!(minion.leader, Some(conjurer));
    assert_eq!(minion.state, CreatureState::TrackingScent);
    assert_eq!(distance_between(minion.position, Position::new(10, 3)), 1);
}

#[test]
fn allied_summoner_stops_at_five_allies() {
    let player_at = Position::new(2, 4);
    let fixture = Fixture::open_room(20, 9, player_at);
    let mut sim = Simulation::new(fixture.dims(), 33);
    let mut combat = RecordingCombat::default();
    let player = sim.spawn(Creature::player(player_at)).unwrap();
    let mut summoner = Creature::new("goblin conjurer", Position::new(4, 4))
        .with_state(CreatureState::Ally)
        .with_leader(player);
    summoner.abilities.summons = true;
    let summoner = sim.spawn(summoner).unwrap();
    for at in [Position::new(2, 2), Position::new(2, 6), Position::new(6, 6)] {
        sim.spawn(Creature::new("monkey", at).with_state(CreatureState::Ally).with_leader(player))
            .unwrap();
    }

    let mut summons = 0;
    for _ in 0..600 {
        if let TurnAction::Summoned { count } = take_turn(&mut sim, &fixture, &mut combat, summoner) {
            summons += count;
        }
    }
    let allies = sim.world().monsters().filter(|monst| monst.is_ally()).count();
    assert_eq!(summons, 1);
    assert_eq!(allies, 5);
}
