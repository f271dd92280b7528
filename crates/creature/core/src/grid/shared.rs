//! Level-wide grids shared by every creature, rebuilt at most once per turn.

use tracing::trace;

use crate::config::AiTuning;
use crate::creature::{Creature, CreatureState, StatusKind};
use crate::env::{TerrainFlags, TerrainOracle};
use crate::geometry::{Direction, Position};
use crate::grid::{CostGrid, DistanceGrid, StepCost, calculate_distances, rescan, wall_cost};
use crate::view::WorldView;

/// Purpose of a shared grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumCount)]
pub enum GridKind {
    /// Walking distance to the player.
    PlayerPath,
    /// Low where the player is far away; fugitives descend it.
    Safety,
    /// Low where enemies of the player are far away; frightened allies descend it.
    AllySafety,
    /// Distance to the nearest cell free of harmful terrain.
    SafeTerrain,
}

impl GridKind {
    const fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, Default)]
struct GridSlot {
    grid: Option<DistanceGrid>,
    fresh: bool,
}

/// Cache of the shared grids with an "already built this turn" flag each.
///
/// [`SharedGrids::invalidate`] runs at every turn boundary; the next read of
/// a stale grid rebuilds it from the current world.
#[derive(Clone, Debug, Default)]
pub struct SharedGrids {
    slots: [GridSlot; <GridKind as strum::EnumCount>::COUNT],
}

impl SharedGrids {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        for slot in &mut self.slots {
            slot.fresh = false;
        }
    }

    pub fn is_fresh(&self, kind: GridKind) -> bool {
        self.slots[kind.slot()].fresh
    }

    /// The grid if it was built this turn.
    pub fn peek(&self, kind: GridKind) -> Option<&DistanceGrid> {
        let slot = &self.slots[kind.slot()];
        slot.grid.as_ref().filter(|_| slot.fresh)
    }

    /// The grid for this turn, rebuilding it first if stale.
    pub fn get(&mut self, view: &WorldView<'_>, kind: GridKind) -> &DistanceGrid {
        let slot = &mut self.slots[kind.slot()];
        if !slot.fresh || slot.grid.is_none() {
            trace!(grid = %kind, "rebuilding shared grid");
            slot.grid = Some(build(view, kind));
            slot.fresh = true;
        }
        slot.grid.get_or_insert_with(|| build(view, kind))
    }

    /// Rebuilds the player-path, safety and ally-safety grids now.
    pub fn refresh(&mut self, view: &WorldView<'_>) {
        for kind in [GridKind::PlayerPath, GridKind::Safety, GridKind::AllySafety] {
            self.slots[kind.slot()].fresh = false;
            self.get(view, kind);
        }
    }
}

fn build(view: &WorldView<'_>, kind: GridKind) -> DistanceGrid {
    let dims = view.terrain().dimensions();
    let Some(player) = view.player() else {
        return DistanceGrid::unreachable(dims);
    };
    match kind {
        GridKind::PlayerPath => calculate_distances(
            view,
            player.position,
            TerrainFlags::PATHING_BLOCKER,
            None,
            true,
        ),
        GridKind::Safety => safety_grid(view, player),
        GridKind::AllySafety => ally_safety_grid(view, player),
        GridKind::SafeTerrain => safe_terrain_grid(view),
    }
}

/// Walls that stay walls: anything obstructing that is not a usable secret door.
fn solid_wall(terrain: &dyn TerrainOracle, cell: Position) -> bool {
    terrain.has_flag(cell, TerrainFlags::OBSTRUCTS_PASSABILITY) && !terrain.is_usable_secret(cell)
}

/// Converts player distances into flight scores and re-propagates them for
/// monsters. Cells monsters may not enter are left alone.
fn invert_for_flight(terrain: &dyn TerrainOracle, grid: &mut DistanceGrid, monster_costs: &CostGrid) {
    for cell in grid.dimensions().positions() {
        if !monster_costs[cell].is_passable() {
            continue;
        }
        let mut distance = grid[cell];
        if distance == AiTuning::UNREACHABLE {
            distance = AiTuning::SAFETY_UNREACHABLE_DISTANCE;
        }
        let mut score = 50 * distance / (50 + distance) * -3;
        if terrain.is_in_loop(cell) {
            score -= AiTuning::LOOP_SAFETY_BONUS;
        }
        grid[cell] = score;
    }
    rescan(grid, monster_costs, false);
}

fn parks_in_place(monst: &Creature, tuning: &AiTuning) -> bool {
    (monst.state == CreatureState::Sleeping
        || monst.turns_spent_stationary > tuning.stationary_obstacle_turns
        || monst.movement.gets_turn_on_activation
        || monst.is_ally())
        && monst.state != CreatureState::Fleeing
}

fn safety_grid(view: &WorldView<'_>, player: &Creature) -> DistanceGrid {
    let terrain = view.terrain();
    let dims = terrain.dimensions();
    let levitating = player.is_levitating();
    let fireproof = player.has_status(StatusKind::ImmuneToFire);
    let mut grid = DistanceGrid::unreachable(dims);
    let mut player_costs = CostGrid::filled(dims, StepCost::Passable(1));
    let mut monster_costs = CostGrid::filled(dims, StepCost::Passable(1));

    let passable_if = |ok: bool| if ok { StepCost::Passable(1) } else { StepCost::Forbidden };
    for cell in dims.positions() {
        let (for_player, for_monsters) = if solid_wall(terrain, cell) {
            let wall = wall_cost(terrain, cell);
            (wall, wall)
        } else if terrain.has_flag(cell, TerrainFlags::SACRED) {
            (StepCost::Passable(1), StepCost::Forbidden)
        } else if terrain.has_flag(cell, TerrainFlags::LAVA_INSTA_DEATH) {
            (passable_if(levitating || !fireproof), StepCost::Forbidden)
        } else if view
            .world
            .creature_at(cell)
            .is_some_and(|monst| !monst.is_player && parks_in_place(monst, view.tuning()))
        {
            (StepCost::Passable(1), StepCost::Forbidden)
        } else if terrain.has_flag(cell, TerrainFlags::AUTO_DESCENT | TerrainFlags::IS_DF_TRAP) {
            (passable_if(levitating), StepCost::Forbidden)
        } else if terrain.has_flag(cell, TerrainFlags::IS_FIRE) {
            (passable_if(fireproof), StepCost::Forbidden)
        } else if terrain.has_flag(cell, TerrainFlags::IS_DEEP_WATER | TerrainFlags::SPONTANEOUSLY_IGNITES) {
            let wade = StepCost::Passable(AiTuning::HAZARD_STEP_COST);
            (if levitating { StepCost::Passable(1) } else { wade }, wade)
        } else if hidden_door(view, cell) {
            (StepCost::Passable(AiTuning::HIDDEN_DOOR_PLAYER_COST), StepCost::Passable(1))
        } else {
            (StepCost::Passable(1), StepCost::Passable(1))
        };
        player_costs[cell] = for_player;
        monster_costs[cell] = for_monsters;
    }

    grid[player.position] = 0;
    player_costs[player.position] = StepCost::Passable(1);
    monster_costs[player.position] = StepCost::Forbidden;
    for cell in dims.positions().filter(|&cell| terrain.is_stairs(cell)) {
        player_costs[cell] = StepCost::Forbidden;
        monster_costs[cell] = StepCost::Forbidden;
    }

    rescan(&mut grid, &player_costs, false);

    // A door the player has not spotted is no refuge itself; what lies past it is.
    for cell in dims.positions().filter(|&cell| hidden_door(view, cell)) {
        for dir in Direction::CARDINAL {
            let next = cell.step(dir);
            if dims.contains(next) && grid[cell] > grid[next] + 1 {
                grid[cell] = grid[next] + 1;
            }
        }
    }

    invert_for_flight(terrain, &mut grid, &monster_costs);
    for cell in dims.positions() {
        if !monster_costs[cell].is_passable() {
            grid[cell] = AiTuning::UNREACHABLE;
        }
    }
    grid
}

fn hidden_door(view: &WorldView<'_>, cell: Position) -> bool {
    view.terrain().is_usable_secret(cell) && !view.in_view(cell)
}

fn ally_safety_grid(view: &WorldView<'_>, player: &Creature) -> DistanceGrid {
    let terrain = view.terrain();
    let dims = terrain.dimensions();
    let mut grid = DistanceGrid::unreachable(dims);
    let mut player_costs = CostGrid::filled(dims, StepCost::Passable(1));
    let mut monster_costs = CostGrid::filled(dims, StepCost::Passable(1));

    for cell in dims.positions() {
        let (for_player, for_monsters) = if solid_wall(terrain, cell) {
            let wall = wall_cost(terrain, cell);
            (wall, wall)
        } else if terrain.has_flag(
            cell,
            TerrainFlags::PATHING_BLOCKER - TerrainFlags::OBSTRUCTS_PASSABILITY,
        ) {
            (StepCost::Forbidden, StepCost::Forbidden)
        } else if terrain.has_flag(cell, TerrainFlags::SACRED) {
            (StepCost::Passable(1), StepCost::Forbidden)
        } else if view
            .world
            .creature_at(cell)
            .is_some_and(|monst| !monst.is_player && view.are_enemies(player, monst))
        {
            grid[cell] = 0;
            (StepCost::Passable(1), StepCost::Forbidden)
        } else {
            (StepCost::Passable(1), StepCost::Passable(1))
        };
        player_costs[cell] = for_player;
        monster_costs[cell] = for_monsters;
    }
    player_costs[player.position] = StepCost::Forbidden;
    monster_costs[player.position] = StepCost::Forbidden;

    rescan(&mut grid, &player_costs, false);
    invert_for_flight(terrain, &mut grid, &monster_costs);
    grid
}

fn safe_terrain_grid(view: &WorldView<'_>) -> DistanceGrid {
    let terrain = view.terrain();
    let dims = terrain.dimensions();
    let tuning = view.tuning();
    let mut grid = DistanceGrid::unreachable(dims);
    let mut costs = CostGrid::filled(dims, StepCost::Passable(1));

    for cell in dims.positions() {
        let parked = view.world.creature_at(cell).is_some_and(|monst| {
            monst.turns_spent_stationary > tuning.stationary_hazard_turns
                || monst.movement.gets_turn_on_activation
        });
        if solid_wall(terrain, cell) {
            costs[cell] = wall_cost(terrain, cell);
        } else if parked
            || (terrain.has_flag(
                cell,
                TerrainFlags::PATHING_BLOCKER - TerrainFlags::HARMFUL_TERRAIN,
            ) && !terrain.has_flag(cell, TerrainFlags::IS_SECRET))
        {
            costs[cell] = StepCost::Forbidden;
        } else if !terrain.has_flag(cell, TerrainFlags::HARMFUL_TERRAIN | TerrainFlags::IS_DOOR) {
            grid[cell] = 0;
        }
    }
    rescan(&mut grid, &costs, false);
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_flags_reset_on_invalidate() {
        let mut grids = SharedGrids::new();
        grids.slots[GridKind::Safety.slot()] = GridSlot {
            grid: Some(DistanceGrid::unreachable(crate::geometry::Dimensions::new(3, 3))),
            fresh: true,
        };
        assert!(grids.is_fresh(GridKind::Safety));
        assert!(grids.peek(GridKind::Safety).is_some());
        grids.invalidate();
        assert!(!grids.is_fresh(GridKind::Safety));
        assert!(grids.peek(GridKind::Safety).is_none());
    }
}
