//! Read-only lens over the arena plus its collaborators.

use crate::config::AiTuning;
use crate::creature::{Creature, CreatureId, StatusKind};
use crate::env::{TerrainFlags, TerrainOracle, WorldContext};
use crate::geometry::{Position, distance_between, line_from};
use crate::world::World;

/// Everything a query about "what does this creature see or think" needs.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub ctx: WorldContext<'a>,
    pub world: &'a World,
}

impl<'a> WorldView<'a> {
    pub fn new(ctx: WorldContext<'a>, world: &'a World) -> Self {
        Self { ctx, world }
    }

    pub fn terrain(&self) -> &'a dyn TerrainOracle {
        self.ctx.terrain
    }

    pub fn tuning(&self) -> &'a AiTuning {
        self.ctx.tuning
    }

    pub fn creature(&self, id: CreatureId) -> Option<&'a Creature> {
        self.world.get(id)
    }

    pub fn player(&self) -> Option<&'a Creature> {
        self.world.player()
    }

    /// Whether the cell is in the player's field of view.
    pub fn in_view(&self, cell: Position) -> bool {
        self.ctx.visibility.in_field_of_view(cell)
    }

    /// Whether the player can currently see this creature.
    pub fn player_can_see(&self, creature: &Creature) -> bool {
        let Some(player) = self.player() else {
            return false;
        };
        creature.is_player
            || (!creature.has_status(StatusKind::Invisible)
                && !creature.bookkeeping.submerged
                && self
                    .ctx
                    .visibility
                    .can_directly_see(player.position, creature.position))
    }

    /// A straight bolt from `from` would reach `to` without striking a wall
    /// or another creature on the way.
    pub fn open_path_between(&self, from: Position, to: Position) -> bool {
        let steps = distance_between(from, to);
        for cell in line_from(from, to).take(steps as usize) {
            if cell == to {
                return !self.blocks_bolts(cell);
            }
            if self.blocks_bolts(cell) || self.world.is_occupied(cell) {
                return false;
            }
        }
        from == to
    }

    /// A straight walk toward `to` crosses no cell the creature avoids.
    pub fn traversible_path_between(&self, monst: &Creature, to: Position) -> bool {
        let steps = distance_between(monst.position, to);
        for cell in line_from(monst.position, to).take(steps as usize) {
            if cell == to {
                return true;
            }
            if self.avoids(monst, cell) {
                return false;
            }
        }
        true
    }

    /// Cell where a blink toward `target` lands: the last free cell before a
    /// wall, a creature, or the range limit.
    pub fn blink_landing(&self, origin: Position, target: Position, max_distance: i32) -> Position {
        let mut landing = origin;
        for cell in line_from(origin, target).take(max_distance.max(0) as usize) {
            if self.blocks_bolts(cell) || self.world.is_occupied(cell) {
                break;
            }
            landing = cell;
        }
        landing
    }

    fn blocks_bolts(&self, cell: Position) -> bool {
        !self.terrain().contains(cell)
            || self
                .terrain()
                .has_flag(cell, TerrainFlags::OBSTRUCTS_PASSABILITY)
    }

    /// Cells next to `origin`, nearest first, for displacing a creature that
    /// cannot stay where it was put.
    pub fn qualifying_cell_near(&self, monst: &Creature, origin: Position) -> Option<Position> {
        let dims = self.terrain().dimensions();
        let mut fallback = None;
        for radius in 1..dims.span() {
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    if dx.abs().max(dy.abs()) != radius {
                        continue;
                    }
                    let cell = origin.offset(dx, dy);
                    if !dims.contains(cell)
                        || self.world.is_occupied(cell)
                        || self.terrain().is_stairs(cell)
                        || !self.terrain().is_passable_or_secret_door(cell)
                    {
                        continue;
                    }
                    if !self.avoids(monst, cell) {
                        return Some(cell);
                    }
                    if fallback.is_none() {
                        fallback = Some(cell);
                    }
                }
            }
        }
        fallback
    }
}
