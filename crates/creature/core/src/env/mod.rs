//! Collaborator traits describing the world outside the creature AI.
//!
//! Terrain, the player's view, the scent trail and combat resolution are owned
//! by other subsystems. [`WorldContext`] bundles the read-only ones together
//! with the tuning table so decision code receives a single handle.
mod combat;
mod scent;
mod terrain;
mod visibility;

pub use combat::{AttackReport, BoltReport, CombatResolver};
pub use scent::ScentOracle;
pub use terrain::{TerrainFlags, TerrainOracle};
pub use visibility::VisibilityOracle;

use crate::config::AiTuning;

/// Read-only collaborators for one simulation step.
#[derive(Clone, Copy)]
pub struct WorldContext<'a> {
    pub terrain: &'a dyn TerrainOracle,
    pub visibility: &'a dyn VisibilityOracle,
    pub scent: &'a dyn ScentOracle,
    pub tuning: &'a AiTuning,
}

impl<'a> WorldContext<'a> {
    pub fn new(
        terrain: &'a dyn TerrainOracle,
        visibility: &'a dyn VisibilityOracle,
        scent: &'a dyn ScentOracle,
        tuning: &'a AiTuning,
    ) -> Self {
        Self {
            terrain,
            visibility,
            scent,
            tuning,
        }
    }
}
