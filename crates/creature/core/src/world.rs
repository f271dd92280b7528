//! Creature arena and occupancy index.

use tracing::{debug, warn};

use crate::creature::{Creature, CreatureId};
use crate::error::WorldError;
use crate::geometry::{Dimensions, Position};
use crate::grid::Grid;

/// Every creature on the level, addressed by [`CreatureId`].
///
/// Slots are never reused, so iteration order (by id) is stable across a run.
/// The occupancy grid holds at most one creature per cell and always agrees
/// with the creatures' recorded positions.
#[derive(Clone, Debug)]
pub struct World {
    dims: Dimensions,
    slots: Vec<Option<Creature>>,
    occupancy: Grid<Option<CreatureId>>,
    player: Option<CreatureId>,
}

impl World {
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            slots: Vec::new(),
            occupancy: Grid::filled(dims, None),
            player: None,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Places a creature and assigns its id.
    pub fn spawn(&mut self, mut creature: Creature) -> Result<CreatureId, WorldError> {
        let position = creature.position;
        if !self.dims.contains(position) {
            return Err(WorldError::OutOfBounds(position));
        }
        if let Some(occupant) = self.occupancy[position] {
            return Err(WorldError::CellOccupied { position, occupant });
        }
        if creature.is_player
            && let Some(existing) = self.player
        {
            return Err(WorldError::DuplicatePlayer(existing));
        }

        let id = CreatureId(self.slots.len() as u32);
        creature.id = id;
        if creature.is_player {
            self.player = Some(id);
        }
        debug!(creature = %id, name = %creature.name, at = %position, "spawned");
        self.occupancy[position] = Some(id);
        self.slots.push(Some(creature));
        Ok(id)
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn try_get(&self, id: CreatureId) -> Result<&Creature, WorldError> {
        self.get(id).ok_or(WorldError::UnknownCreature(id))
    }

    pub fn player_id(&self) -> Option<CreatureId> {
        self.player
    }

    pub fn player(&self) -> Option<&Creature> {
        self.player.and_then(|id| self.get(id))
    }

    pub fn occupant(&self, position: Position) -> Option<CreatureId> {
        self.occupancy.get(position).copied().flatten()
    }

    pub fn creature_at(&self, position: Position) -> Option<&Creature> {
        self.occupant(position).and_then(|id| self.get(id))
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.occupant(position).is_some()
    }

    /// Live creatures in id order, the player included.
    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// The player first, then every other creature in id order.
    ///
    /// Scans that "consider the player, then the monsters" use this order.
    pub fn player_then_others(&self) -> impl Iterator<Item = &Creature> {
        self.player()
            .into_iter()
            .chain(self.iter().filter(|c| !c.is_player))
    }

    /// Creatures other than the player, in id order.
    pub fn monsters(&self) -> impl Iterator<Item = &Creature> {
        self.iter().filter(|c| !c.is_player)
    }

    pub fn ids(&self) -> Vec<CreatureId> {
        self.iter().map(|c| c.id).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves a creature to an empty cell.
    pub fn relocate(&mut self, id: CreatureId, to: Position) -> Result<(), WorldError> {
        if !self.dims.contains(to) {
            return Err(WorldError::OutOfBounds(to));
        }
        let from = self.try_get(id)?.position;
        if from == to {
            return Ok(());
        }
        if let Some(occupant) = self.occupancy[to] {
            return Err(WorldError::CellOccupied {
                position: to,
                occupant,
            });
        }
        debug_assert_eq!(self.occupancy[from], Some(id));
        self.occupancy[from] = None;
        self.occupancy[to] = Some(id);
        if let Some(creature) = self.get_mut(id) {
            creature.position = to;
            creature.turns_spent_stationary = 0;
        }
        Ok(())
    }

    /// Exchanges the cells of two creatures.
    pub fn swap(&mut self, a: CreatureId, b: CreatureId) -> Result<(), WorldError> {
        let pa = self.try_get(a)?.position;
        let pb = self.try_get(b)?.position;
        self.occupancy[pa] = Some(b);
        self.occupancy[pb] = Some(a);
        if let Some(creature) = self.get_mut(a) {
            creature.position = pb;
            creature.turns_spent_stationary = 0;
        }
        if let Some(creature) = self.get_mut(b) {
            creature.position = pa;
            creature.turns_spent_stationary = 0;
        }
        Ok(())
    }

    /// Moves `mover` onto `passer`'s cell and sets `passer` down wherever
    /// `landing` picks. `landing` sees the world with `mover` already moved
    /// and `passer` lifted off the grid; an occupied pick falls back to the
    /// cell `mover` left.
    pub fn pass_through(
        &mut self,
        mover: CreatureId,
        passer: CreatureId,
        landing: impl FnOnce(&World) -> Position,
    ) -> Result<Position, WorldError> {
        let from = self.try_get(mover)?.position;
        let to = self.try_get(passer)?.position;
        self.occupancy[from] = None;
        self.occupancy[to] = Some(mover);
        if let Some(creature) = self.get_mut(mover) {
            creature.position = to;
            creature.turns_spent_stationary = 0;
        }

        let mut cell = landing(self);
        if !self.dims.contains(cell) || self.occupancy[cell].is_some() {
            warn!(creature = %passer, at = %cell, "displacement target unusable; swapping instead");
            cell = from;
        }
        self.occupancy[cell] = Some(passer);
        if let Some(creature) = self.get_mut(passer) {
            creature.position = cell;
            creature.turns_spent_stationary = 0;
        }
        Ok(cell)
    }

    /// Removes a creature from the arena and the occupancy grid.
    pub fn remove(&mut self, id: CreatureId) -> Option<Creature> {
        let creature = self.slots.get_mut(id.0 as usize)?.take()?;
        if self.occupancy.get(creature.position).copied().flatten() == Some(id) {
            self.occupancy[creature.position] = None;
        } else {
            warn!(creature = %id, at = %creature.position, "removed creature was not on its recorded cell");
        }
        if self.player == Some(id) {
            self.player = None;
        }
        Some(creature)
    }

    /// Verifies that occupancy and recorded positions agree in both directions.
    pub fn audit_occupancy(&self) -> Result<(), WorldError> {
        for creature in self.iter() {
            if self.occupant(creature.position) != Some(creature.id) {
                return Err(WorldError::OccupancyDesync {
                    creature: creature.id,
                    position: creature.position,
                });
            }
        }
        for (position, occupant) in self.occupancy.iter() {
            if let Some(id) = *occupant
                && self.get(id).is_none_or(|c| c.position != position)
            {
                return Err(WorldError::OccupancyDesync {
                    creature: id,
                    position,
                });
            }
        }
        Ok(())
    }
}
