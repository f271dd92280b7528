//! Cost grids derived from terrain and creatures, and the distance maps built on them.

use crate::creature::Creature;
use crate::env::{TerrainFlags, TerrainOracle};
use crate::geometry::Position;
use crate::grid::{CostGrid, DistanceGrid, StepCost, propagate};
use crate::view::WorldView;

/// Cost of stepping onto each cell for a traveller that knows about secret
/// doors: walls are obstructions or forbidden, `blocking` terrain is
/// forbidden, everything else costs one.
pub fn terrain_costs(terrain: &dyn TerrainOracle, blocking: TerrainFlags) -> CostGrid {
    let dims = terrain.dimensions();
    let mut costs = CostGrid::filled(dims, StepCost::default());
    for cell in dims.positions() {
        costs[cell] = terrain_cost(terrain, cell, blocking);
    }
    costs
}

fn terrain_cost(terrain: &dyn TerrainOracle, cell: Position, blocking: TerrainFlags) -> StepCost {
    if terrain.is_usable_secret(cell) {
        StepCost::Passable(1)
    } else if terrain.has_flag(cell, TerrainFlags::OBSTRUCTS_PASSABILITY) {
        wall_cost(terrain, cell)
    } else if terrain.has_flag(cell, blocking) {
        StepCost::Forbidden
    } else {
        StepCost::Passable(1)
    }
}

/// Walls that also cut diagonal movement are obstructions.
pub(crate) fn wall_cost(terrain: &dyn TerrainOracle, cell: Position) -> StepCost {
    if terrain.has_flag(cell, TerrainFlags::OBSTRUCTS_DIAGONAL_MOVEMENT) {
        StepCost::Obstruction
    } else {
        StepCost::Forbidden
    }
}

/// Walking distance from every cell to `target`.
///
/// With a `traveler`, cells it avoids are forbidden. Damage-immune creatures
/// that never move are always treated as walls.
pub fn calculate_distances(
    view: &WorldView<'_>,
    target: Position,
    blocking: TerrainFlags,
    traveler: Option<&Creature>,
    eight_ways: bool,
) -> DistanceGrid {
    let terrain = view.terrain();
    let dims = terrain.dimensions();
    let mut costs = CostGrid::filled(dims, StepCost::default());
    for cell in dims.positions() {
        let immovable = view
            .world
            .creature_at(cell)
            .is_some_and(Creature::is_immovable_obstacle);
        costs[cell] = if immovable {
            StepCost::Forbidden
        } else if terrain.is_usable_secret(cell) {
            StepCost::Passable(1)
        } else if terrain.has_flag(cell, TerrainFlags::OBSTRUCTS_PASSABILITY) {
            wall_cost(terrain, cell)
        } else if traveler.is_some_and(|t| view.avoids(t, cell)) || terrain.has_flag(cell, blocking) {
            StepCost::Forbidden
        } else {
            StepCost::Passable(1)
        };
    }
    let mut grid = DistanceGrid::unreachable(dims);
    propagate(&mut grid, &[target], &costs, eight_ways);
    grid
}
