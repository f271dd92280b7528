mod common;

use common::{Fixture, RecordingCombat};
use creature_core::{Creature, CreatureState, Position, Simulation, TurnStart, WorldView};

const TRIALS: u64 = 1_000;
const TURN_CAP: u32 = 80;

/// Turn on which a sleeper ten cells from a visible player first wakes.
fn wake_turn(seed: u64) -> u32 {
    let player_at = Position::new(3, 5);
    let fixture = Fixture::open_room(20, 11, player_at);
    let mut sim = Simulation::new(fixture.dims(), seed);
    let mut combat = RecordingCombat::default();
    sim.spawn(Creature::player(player_at)).unwrap();
    let sleeper = sim
        .spawn(Creature::new("goblin", Position::new(13, 5)).with_state(CreatureState::Sleeping))
        .unwrap();

    for turn in 1..=TURN_CAP {
        sim.begin_turn(TurnStart {
            stealth_range: 15,
            player_rested: false,
        });
        sim.advance_creature_turn(fixture.ctx(), &mut combat, sleeper)
            .unwrap();
        if sim.creature(sleeper).unwrap().state != CreatureState::Sleeping {
            return turn;
        }
    }
    TURN_CAP + 1
}

#[test]
fn sleeper_wakes_with_geometric_waiting_time() {
    let turns: Vec<u32> = (0..TRIALS).map(wake_turn).collect();
    let mean = turns.iter().map(|&t| t as f64).sum::<f64>() / TRIALS as f64;
    let first = turns.iter().filter(|&&t| t == 1).count() as f64 / TRIALS as f64;
    let within_two = turns.iter().filter(|&&t| t <= 2).count() as f64 / TRIALS as f64;

    // p = 0.25: mean 4, P(T = 1) = 0.25, P(T <= 2) = 0.4375.
    assert!((3.5..=4.5).contains(&mean), "mean wake turn {mean}");
    assert!((0.20..=0.30).contains(&first), "woke on first turn {first}");
    assert!((0.38..=0.49).contains(&within_two), "woke within two turns {within_two}");
    assert!(turns.iter().all(|&t| t <= TURN_CAP));
}

#[test]
fn sleeper_out_of_view_never_wakes() {
    let player_at = Position::new(3, 5);
    let mut fixture = Fixture::open_room(20, 11, player_at);
    fixture.sight.everything = false;
    let mut sim = Simulation::new(fixture.dims(), 7);
    let mut combat = RecordingCombat::default();
    sim.spawn(Creature::player(player_at)).unwrap();
    let sleeper = sim
        .spawn(Creature::new("goblin", Position::new(13, 5)).with_state(CreatureState::Sleeping))
        .unwrap();

    for _ in 0..50 {
        sim.begin_turn(TurnStart::default());
        sim.advance_creature_turn(fixture.ctx(), &mut combat, sleeper)
            .unwrap();
    }
    assert_eq!(sim.creature(sleeper).unwrap().state, CreatureState::Sleeping);
}

#[test]
fn perceived_distance_takes_the_closer_reading() {
    let player_at = Position::new(3, 5);
    let fixture = Fixture::open_room(20, 11, player_at);
    let mut sim = Simulation::new(fixture.dims(), 1);
    let player = sim.spawn(Creature::player(player_at)).unwrap();
    let watcher = sim.spawn(Creature::new("jackal", Position::new(8, 5))).unwrap();

    let view = WorldView::new(fixture.ctx(), sim.world());
    let perceived = view.awareness_distance(
        view.creature(watcher).unwrap(),
        view.creature(player).unwrap(),
    );
    assert_eq!(perceived, 10);
}

#[test]
fn always_hunting_creatures_are_always_aware() {
    let player_at = Position::new(3, 5);
    let mut fixture = Fixture::open_room(20, 11, player_at);
    fixture.sight.everything = false;
    let mut sim = Simulation::new(fixture.dims(), 3);
    let player = sim.spawn(Creature::player(player_at)).unwrap();
    let mut hound = Creature::new("hound", Position::new(18, 9));
    hound.behavior.always_hunting = true;
    let hound = sim.spawn(hound).unwrap();

    let view = WorldView::new(fixture.ctx(), sim.world());
    let mut rng = creature_core::RngStream::seeded(11);
    let aware = view.aware_of_target(
        &mut rng,
        TurnStart::DEFAULT_STEALTH_RANGE,
        view.creature(hound).unwrap(),
        view.creature(player).unwrap(),
    );
    assert!(aware);
    assert_eq!(rng.draws(), 0);
}
