use std::path::{Path, PathBuf};

use creature_content::{CreatureCatalogLoader, MapLoader, Scenario, TuningLoader};
use creature_core::avoidance::avoided_flags;
use creature_core::{TerrainOracle, TurnAction, TurnStart};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn warren() -> Scenario {
    Scenario::new(
        MapLoader::load(&data("levels/warren.ron")).unwrap(),
        CreatureCatalogLoader::load(&data("creatures.ron")).unwrap(),
        TuningLoader::load(&data("tuning.toml")).unwrap(),
    )
}

#[test]
fn warren_replays_identically() {
    let scenario = warren();
    let first = scenario.start(42).unwrap().run(60, TurnStart::default());
    let second = scenario.start(42).unwrap().run(60, TurnStart::default());
    assert_eq!(first, second);
}

#[test]
fn warren_keeps_occupancy_and_terrain_rules() {
    let scenario = warren();
    let mut session = scenario.start(7).unwrap();
    for _ in 0..60 {
        for report in session.step(TurnStart::default()) {
            let TurnAction::Moved { to, .. } = report.action else {
                continue;
            };
            let Some(monst) = session.sim.creature(report.creature) else {
                continue;
            };
            assert!(
                !session.stage.terrain.has_flag(to, avoided_flags(monst)),
                "{} walked into {to}",
                monst.name
            );
        }
        assert!(session.sim.world().audit_occupancy().is_ok());
    }
}

#[test]
fn horde_is_wired_to_its_conjurer() {
    let scenario = warren();
    let session = scenario.start(1).unwrap();
    let world = session.sim.world();
    let conjurer = world
        .iter()
        .find(|monst| monst.name == "goblin conjurer")
        .unwrap();
    assert!(conjurer.bookkeeping.leader);
    let goblins: Vec<_> = world.iter().filter(|monst| monst.name == "goblin").collect();
    assert_eq!(goblins.len(), 4);
    assert!(goblins.iter().all(|goblin| goblin.leader == Some(conjurer.id)));
}
