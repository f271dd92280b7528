//! Loaded content assembled into something that can run.
use std::sync::Arc;

use creature_core::{AiTuning, CreatureId, Simulation, StateDigest, TurnReport, TurnStart};

use crate::catalog::CreatureCatalog;
use crate::error::ContentError;
use crate::level::Level;
use crate::oracle::{CatalogCombat, Stage};

/// Everything needed to start a seeded run.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub level: Level,
    pub catalog: Arc<CreatureCatalog>,
    pub tuning: AiTuning,
}

impl Scenario {
    pub fn new(level: Level, catalog: CreatureCatalog, tuning: AiTuning) -> Self {
        Self {
            level,
            catalog: Arc::new(catalog),
            tuning,
        }
    }

    /// Builds a fresh simulation for `seed` and places the level's creatures.
    pub fn start(&self, seed: u64) -> Result<Session, ContentError> {
        let mut sim = Simulation::new(self.level.layout.dimensions(), seed);
        let placed = self.level.populate(&mut sim, &self.catalog)?;
        let stage = Stage::new(self.level.layout.terrain.clone(), self.tuning.clone());
        let combat = CatalogCombat::new(self.catalog.clone(), seed);
        tracing::debug!(seed, creatures = placed.len(), "session started");
        Ok(Session {
            sim,
            stage,
            combat,
            placed,
        })
    }
}

/// One seeded run of a scenario.
#[derive(Debug)]
pub struct Session {
    pub sim: Simulation,
    pub stage: Stage,
    pub combat: CatalogCombat,
    placed: Vec<CreatureId>,
}

impl Session {
    /// Ids placed at start, player first.
    pub fn placed(&self) -> &[CreatureId] {
        &self.placed
    }

    /// Refreshes sight and scent around the player, then runs one round.
    pub fn step(&mut self, start: TurnStart) -> Vec<TurnReport> {
        if let Some(player) = self.sim.world().player() {
            let at = player.position;
            self.stage.observe(at);
        }
        self.sim.run_round(self.stage.ctx(), &mut self.combat, start)
    }

    /// Runs `rounds` rounds and returns the digest after each.
    pub fn run(&mut self, rounds: usize, start: TurnStart) -> Vec<StateDigest> {
        (0..rounds)
            .map(|_| {
                self.step(start);
                self.sim.state_digest()
            })
            .collect()
    }
}
