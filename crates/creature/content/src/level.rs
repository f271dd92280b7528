//! A level ready to be played: layout, spawn table and placement.
use creature_core::{Creature, CreatureId, CreatureState, Simulation, WaypointSet};

use crate::catalog::CreatureCatalog;
use crate::error::ContentError;
use crate::layout::Layout;

/// What a spawn marker places.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnSpec {
    pub glyph: char,
    /// Catalog name.
    pub creature: String,
    /// Overrides the template's starting state. `Ally` follows the player.
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: Option<CreatureState>,
    /// Glyph of the horde leader; the first creature drawn with it leads.
    #[cfg_attr(feature = "serde", serde(default))]
    pub follows: Option<char>,
    /// Dies together with its leader.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bound: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub captive: bool,
}

impl SpawnSpec {
    pub fn new(glyph: char, creature: impl Into<String>) -> Self {
        Self {
            glyph,
            creature: creature.into(),
            state: None,
            follows: None,
            bound: false,
            captive: false,
        }
    }
}

/// A validated layout with a spawn entry for every marker it draws.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub layout: Layout,
    pub spawns: Vec<SpawnSpec>,
}

impl Level {
    pub fn new(layout: Layout, spawns: Vec<SpawnSpec>) -> Result<Self, ContentError> {
        for (index, spec) in spawns.iter().enumerate() {
            if spawns[..index].iter().any(|earlier| earlier.glyph == spec.glyph) {
                return Err(ContentError::DuplicateSpawnGlyph(spec.glyph));
            }
            if let Some(leader) = spec.follows
                && !layout.markers.iter().any(|&(glyph, _)| glyph == leader)
            {
                return Err(ContentError::UnknownLeader {
                    glyph: spec.glyph,
                    leader,
                });
            }
        }
        if let Some(&(glyph, _)) = layout
            .markers
            .iter()
            .find(|(glyph, _)| !spawns.iter().any(|spec| spec.glyph == *glyph))
        {
            return Err(ContentError::UnassignedMarker(glyph));
        }
        Ok(Self { layout, spawns })
    }

    fn spec(&self, glyph: char) -> Option<&SpawnSpec> {
        self.spawns.iter().find(|spec| spec.glyph == glyph)
    }

    /// Places the player and every marked creature, wires up hordes and
    /// installs the level's waypoints.
    ///
    /// # Returns
    ///
    /// The ids of everything placed, player first, then markers in reading order.
    pub fn populate(
        &self,
        sim: &mut Simulation,
        catalog: &CreatureCatalog,
    ) -> Result<Vec<CreatureId>, ContentError> {
        let player = sim.spawn(Creature::player(self.layout.player))?;
        let mut placed = Vec::with_capacity(self.layout.markers.len());
        for &(glyph, position) in &self.layout.markers {
            let spec = self.spec(glyph).ok_or(ContentError::UnassignedMarker(glyph))?;
            let mut creature = catalog.instantiate(&spec.creature, position)?;
            if let Some(state) = spec.state {
                creature.state = state;
            }
            if creature.state == CreatureState::Ally {
                creature = creature.with_leader(player);
            }
            creature.bookkeeping.captive = spec.captive;
            placed.push((glyph, sim.spawn(creature)?));
        }

        for &(glyph, id) in &placed {
            let Some(spec) = self.spec(glyph) else {
                continue;
            };
            let Some(leader) = spec
                .follows
                .and_then(|leader| placed.iter().find(|(other, _)| *other == leader))
                .map(|&(_, leader)| leader)
            else {
                continue;
            };
            if leader == id {
                continue;
            }
            if let Some(monst) = sim.creature_mut(leader) {
                monst.bookkeeping.leader = true;
            }
            if let Some(monst) = sim.creature_mut(id) {
                monst.leader = Some(leader);
                monst.bookkeeping.follower = true;
                monst.bookkeeping.bound_to_leader = spec.bound;
            }
        }

        sim.set_waypoints(WaypointSet::build(&self.layout.terrain, &self.layout.waypoints));
        tracing::info!(
            creatures = placed.len(),
            waypoints = self.layout.waypoints.len(),
            "level populated"
        );

        let mut ids = vec![player];
        ids.extend(placed.into_iter().map(|(_, id)| id));
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use creature_core::Position;

    use super::*;
    use crate::catalog::CreatureTemplate;

    fn catalog() -> CreatureCatalog {
        let template = |name: &str| CreatureTemplate {
            name: name.into(),
            max_health: 10,
            ..CreatureTemplate::default()
        };
        CreatureCatalog::new(vec![template("goblin"), template("goblin conjurer"), template("monkey")])
            .unwrap()
    }

    fn layout() -> Layout {
        Layout::parse(&[
            "##########", //
            "#@..m...g#",
            "#.....gcg#",
            "##########",
        ])
        .unwrap()
    }

    #[test]
    fn hordes_rally_behind_their_leader() {
        let mut goblin = SpawnSpec::new('g', "goblin");
        goblin.follows = Some('c');
        goblin.bound = true;
        let mut monkey = SpawnSpec::new('m', "monkey");
        monkey.state = Some(CreatureState::Ally);
        let level = Level::new(
            layout(),
            vec![goblin, SpawnSpec::new('c', "goblin conjurer"), monkey],
        )
        .unwrap();

        let mut sim = Simulation::new(level.layout.dimensions(), 1);
        let ids = level.populate(&mut sim, &catalog()).unwrap();
        assert_eq!(ids.len(), 5);

        let player = ids[0];
        let conjurer = sim.world().occupant(Position::new(7, 2)).unwrap();
        assert!(sim.creature(conjurer).unwrap().bookkeeping.leader);
        for at in [Position::new(8, 1), Position::new(6, 2), Position::new(8, 2)] {
            let goblin = sim.creature(sim.world().occupant(at).unwrap()).unwrap();
            assert_eq!(goblin.leader, Some(conjurer));
            assert!(goblin.bookkeeping.bound_to_leader);
        }
        let monkey = sim.creature(sim.world().occupant(Position::new(4, 1)).unwrap()).unwrap();
        assert_eq!(monkey.leader, Some(player));
        assert_eq!(monkey.state, CreatureState::Ally);
        assert_eq!(sim.waypoints().len(), 0);
    }

    #[test]
    fn every_marker_needs_an_entry() {
        let err = Level::new(layout(), vec![SpawnSpec::new('g', "goblin")]).unwrap_err();
        assert_eq!(err, ContentError::UnassignedMarker('m'));

        let mut stray = SpawnSpec::new('g', "goblin");
        stray.follows = Some('x');
        assert!(matches!(
            Level::new(layout(), vec![stray]),
            Err(ContentError::UnknownLeader { leader: 'x', .. })
        ));
    }

    #[test]
    fn unknown_creatures_fail_placement() {
        let level = Level::new(
            layout(),
            vec![
                SpawnSpec::new('g', "goblin"),
                SpawnSpec::new('c', "goblin war priest"),
                SpawnSpec::new('m', "monkey"),
            ],
        )
        .unwrap();
        let mut sim = Simulation::new(level.layout.dimensions(), 1);
        assert_eq!(
            level.populate(&mut sim, &catalog()),
            Err(ContentError::UnknownCreature("goblin war priest".into()))
        );
    }
}
