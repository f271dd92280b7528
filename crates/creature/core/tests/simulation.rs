mod common;

use common::{Fixture, RecordingCombat};
use creature_core::{
    CorpseGift, Creature, CreatureId, CreatureState, GridKind, Position, Relationship, Simulation,
    StateDigest, StatusKind, TransitionRule, TurnStart, WaypointSet,
};

const ROOM: (u32, u32) = (24, 13);

fn populate(sim: &mut Simulation, fixture: &Fixture) -> Vec<CreatureId> {
    let mut ids = vec![sim.spawn(Creature::player(Position::new(3, 6))).unwrap()];
    let leader = sim
        .spawn(Creature::new("goblin conjurer", Position::new(18, 3)))
        .unwrap();
    ids.push(leader);
    for at in [Position::new(19, 3), Position::new(18, 4)] {
        ids.push(
            sim.spawn(Creature::new("goblin", at).with_leader(leader))
                .unwrap(),
        );
    }
    ids.push(
        sim.spawn(Creature::new("kobold", Position::new(10, 10)).with_state(CreatureState::Sleeping))
            .unwrap(),
    );
    ids.push(
        sim.spawn(Creature::new("jackal", Position::new(12, 6)).with_state(CreatureState::TrackingScent))
            .unwrap(),
    );
    let player = ids[0];
    ids.push(
        sim.spawn(
            Creature::new("monkey", Position::new(4, 8))
                .with_state(CreatureState::Ally)
                .with_leader(player),
        )
        .unwrap(),
    );
    sim.set_waypoints(WaypointSet::build(
        &fixture.level,
        &[
            Position::new(2, 2),
            Position::new(21, 2),
            Position::new(2, 10),
            Position::new(21, 10),
            Position::new(12, 6),
        ],
    ));
    ids
}

fn run(seed: u64, rounds: usize) -> Vec<StateDigest> {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), seed);
    let mut combat = RecordingCombat::hitting_for(1);
    populate(&mut sim, &fixture);
    (0..rounds)
        .map(|_| {
            sim.run_round(fixture.ctx(), &mut combat, TurnStart::default());
            sim.state_digest()
        })
        .collect()
}

#[test]
fn identical_seeds_replay_identically() {
    let first = run(0xD00D, 40);
    let second = run(0xD00D, 40);
    assert_eq!(first, second);
    assert!(first.last().unwrap().draws > 0);
}

#[test]
fn digest_reflects_creature_health() {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), 1);
    let ids = populate(&mut sim, &fixture);
    let before = sim.state_digest();
    sim.creature_mut(ids[4]).unwrap().health.current -= 1;
    assert_ne!(before, sim.state_digest());
}

#[test]
fn pre_warmed_grids_are_fresh_until_the_next_turn() {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), 1);
    populate(&mut sim, &fixture);

    sim.begin_turn(TurnStart::default());
    assert!(sim.shared_grid(GridKind::PlayerPath).is_none());
    sim.recompute_shared_navigation_grids(fixture.ctx());
    let path = sim.shared_grid(GridKind::PlayerPath).unwrap();
    assert_eq!(path.distance_at(Position::new(3, 6)), 0);
    assert_eq!(path.distance_at(Position::new(8, 6)), 5);
    assert!(sim.shared_grid(GridKind::Safety).is_some());

    sim.begin_turn(TurnStart::default());
    assert!(sim.shared_grid(GridKind::PlayerPath).is_none());
}

#[test]
fn relationships_follow_teams() {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), 1);
    let ids = populate(&mut sim, &fixture);
    let (player, conjurer, goblin, ally) = (ids[0], ids[1], ids[2], ids[6]);
    let ctx = fixture.ctx();

    assert_eq!(sim.relationship_of(ctx, player, ally).unwrap(), Relationship::Ally);
    assert_eq!(sim.relationship_of(ctx, conjurer, goblin).unwrap(), Relationship::Ally);
    assert_eq!(sim.relationship_of(ctx, goblin, player).unwrap(), Relationship::Enemy);
    assert!(sim.relationship_of(ctx, player, CreatureId(999)).is_err());
}

#[test]
fn dead_leader_hands_the_horde_to_a_follower() {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), 1);
    let ids = populate(&mut sim, &fixture);
    let (conjurer, first, second) = (ids[1], ids[2], ids[3]);
    sim.creature_mut(conjurer).unwrap().bookkeeping.leader = true;
    sim.creature_mut(conjurer).unwrap().take_damage(100);

    sim.end_turn(fixture.ctx());

    assert!(sim.creature(conjurer).is_none());
    assert!(!sim.world().is_occupied(Position::new(18, 3)));
    let heir = sim.creature(first).unwrap();
    assert!(heir.bookkeeping.leader);
    assert_eq!(heir.leader, None);
    assert_eq!(sim.creature(second).unwrap().leader, Some(first));
    assert!(sim.world().audit_occupancy().is_ok());
}

#[test]
fn bound_followers_leave_with_their_leader() {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), 1);
    let ids = populate(&mut sim, &fixture);
    let (conjurer, first, second) = (ids[1], ids[2], ids[3]);
    for id in [first, second] {
        sim.creature_mut(id).unwrap().bookkeeping.bound_to_leader = true;
    }
    sim.creature_mut(conjurer).unwrap().bookkeeping.leader = true;
    sim.creature_mut(conjurer).unwrap().bookkeeping.dying = true;

    sim.end_turn(fixture.ctx());

    for id in [conjurer, first, second] {
        assert!(sim.creature(id).is_none());
    }
    assert!(sim.world().audit_occupancy().is_ok());
}

#[test]
fn statuses_wear_off_at_the_turn_boundary() {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), 1);
    let ids = populate(&mut sim, &fixture);
    let (jackal, ally) = (ids[5], ids[6]);

    {
        let monst = sim.creature_mut(ally).unwrap();
        monst.state = CreatureState::Fleeing;
        monst.status.set(StatusKind::MagicalFear, 1);
        monst.status.set(StatusKind::Invisible, 1000);
    }
    {
        let monst = sim.creature_mut(jackal).unwrap();
        monst.status.set(StatusKind::Poisoned, 2);
        monst.poison_amount = 3;
        monst.status.set(StatusKind::LifespanRemaining, 5);
    }

    sim.end_turn(fixture.ctx());

    let monkey = sim.creature(ally).unwrap();
    assert_eq!(monkey.state, CreatureState::Ally);
    assert!(!monkey.has_status(StatusKind::MagicalFear));
    assert_eq!(monkey.status.get(StatusKind::Invisible), 1000);

    let hurt = sim.creature(jackal).unwrap();
    assert_eq!(hurt.health.current, 7);
    assert_eq!(hurt.status.get(StatusKind::Poisoned), 1);
    assert_eq!(hurt.status.get(StatusKind::LifespanRemaining), 4);

    sim.end_turn(fixture.ctx());
    let hurt = sim.creature(jackal).unwrap();
    assert_eq!(hurt.health.current, 4);
    assert_eq!(hurt.poison_amount, 0);
}

#[test]
fn expired_lifespan_removes_the_creature() {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), 1);
    let ids = populate(&mut sim, &fixture);
    let jackal = ids[5];
    sim.creature_mut(jackal)
        .unwrap()
        .status
        .set(StatusKind::LifespanRemaining, 1);

    sim.end_turn(fixture.ctx());
    assert!(sim.creature(jackal).is_none());
}

#[test]
fn ally_absorbs_an_offered_corpse() {
    let fixture = Fixture::open_room(ROOM.0, ROOM.1, Position::new(3, 6));
    let mut sim = Simulation::new(fixture.dims(), 8);
    let mut combat = RecordingCombat::default();
    sim.spawn(Creature::player(Position::new(3, 6))).unwrap();
    let monkey = sim
        .spawn(
            Creature::new("monkey", Position::new(5, 6))
                .with_state(CreatureState::Ally)
                .with_leader(CreatureId(0)),
        )
        .unwrap();
    let corpse_at = Position::new(7, 6);
    sim.offer_corpse(&fixture.tuning, monkey, corpse_at, CorpseGift::FireImmunity)
        .unwrap();

    let mut finished_at = None;
    for _ in 0..(fixture.tuning.corpse_absorption_turns + 5) {
        sim.begin_turn(TurnStart::default());
        sim.advance_creature_turn(fixture.ctx(), &mut combat, monkey)
            .unwrap();
        let state = sim.creature(monkey).unwrap();
        if state.corpse.is_none() {
            finished_at = Some(state.position);
            break;
        }
    }

    assert_eq!(finished_at, Some(corpse_at));
    assert!(sim.creature(monkey).unwrap().has_status(StatusKind::ImmuneToFire));
}

#[test]
fn woken_teammates_lose_the_round_of_the_wake() {
    let player_at = Position::new(2, 4);
    let fixture = Fixture::open_room(40, 9, player_at);
    let mut sim = Simulation::new(fixture.dims(), 17);
    let mut combat = RecordingCombat::default();
    sim.spawn(Creature::player(player_at)).unwrap();
    let chieftain = sim
        .spawn(Creature::new("goblin chieftain", Position::new(3, 4)).with_state(CreatureState::Sleeping))
        .unwrap();
    sim.creature_mut(chieftain).unwrap().bookkeeping.leader = true;
    // Too far to ever notice the player on their own.
    let goblin = sim
        .spawn(
            Creature::new("goblin", Position::new(36, 4))
                .with_state(CreatureState::Sleeping)
                .with_leader(chieftain),
        )
        .unwrap();
    let stranger = sim
        .spawn(Creature::new("kobold", Position::new(36, 2)).with_state(CreatureState::Sleeping))
        .unwrap();

    for _ in 0..200 {
        let reports = sim.run_round(fixture.ctx(), &mut combat, TurnStart::default());
        let woke = reports.iter().any(|report| {
            report.creature == chieftain && report.transition == Some(TransitionRule::WakeUp)
        });
        if !woke {
            assert_eq!(sim.creature(goblin).unwrap().state, CreatureState::Sleeping);
            continue;
        }

        assert!(
            reports.iter().all(|report| report.creature != goblin),
            "the goblin acted in the round it was woken"
        );
        let roused = sim.creature(goblin).unwrap();
        assert_ne!(roused.state, CreatureState::Sleeping);
        assert_eq!(roused.position, Position::new(36, 4));
        assert!(roused.ticks_until_turn > 0);
        assert_eq!(sim.creature(stranger).unwrap().state, CreatureState::Sleeping);

        let reports = sim.run_round(fixture.ctx(), &mut combat, TurnStart::default());
        assert!(reports.iter().any(|report| report.creature == goblin));
        return;
    }
    panic!("the chieftain never woke");
}
