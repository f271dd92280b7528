//! Reference implementations of the collaborator traits.
//!
//! [`Stage`] bundles the read-only oracles for one level and hands out
//! [`WorldContext`] snapshots. Between turns the harness calls
//! [`Stage::observe`] so sight and scent follow the player.
mod combat;
mod scent;
mod terrain;
mod visibility;

pub use combat::CatalogCombat;
pub use scent::ScentField;
pub use terrain::{AsciiTerrain, TerrainTile};
pub use visibility::RayVisibility;

use creature_core::{AiTuning, Position, TerrainOracle, WorldContext};

/// Terrain, sight and scent for one level, plus the tuning table.
#[derive(Clone, Debug)]
pub struct Stage {
    pub terrain: AsciiTerrain,
    pub visibility: RayVisibility,
    pub scent: ScentField,
    pub tuning: AiTuning,
}

impl Stage {
    pub fn new(terrain: AsciiTerrain, tuning: AiTuning) -> Self {
        let visibility = RayVisibility::new(&terrain);
        let scent = ScentField::new(terrain.dimensions());
        Self {
            terrain,
            visibility,
            scent,
            tuning,
        }
    }

    /// Recomputes the field of view from the player and lays a fresh scent trail.
    pub fn observe(&mut self, player: Position) {
        self.visibility.refresh(player);
        self.scent.lay(&self.terrain, &self.visibility, player);
    }

    pub fn ctx(&self) -> WorldContext<'_> {
        WorldContext::new(&self.terrain, &self.visibility, &self.scent, &self.tuning)
    }
}
