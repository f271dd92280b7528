//! Swarm repositioning: sidestep so a blocked teammate can reach the enemy.

use tracing::trace;

use crate::creature::Creature;
use crate::geometry::{Direction, distance_between};
use crate::relations::{are_teammates, eligible_for_swarming};
use crate::rng::RngStream;
use crate::view::WorldView;

impl WorldView<'_> {
    /// Direction `monst` should sidestep instead of striking `enemy`, if any.
    ///
    /// The sidestep cell must touch both `monst` and `enemy`, and some idle
    /// teammate behind `monst` must have no other way to reach the enemy.
    /// Draws eight times from `rng` whenever the preconditions hold.
    pub fn swarm_direction(
        &self,
        rng: &mut RngStream,
        monst: &Creature,
        enemy: &Creature,
    ) -> Option<Direction> {
        let terrain = self.terrain();
        if monst.is_player || !eligible_for_swarming(monst) {
            return None;
        }
        if distance_between(monst.position, enemy.position) != 1
            || terrain.diagonal_blocked(monst.position, enemy.position)
            || enemy.combat.attackable_thru_walls
            || !self.are_enemies(monst, enemy)
        {
            return None;
        }

        let mut order = Direction::ALL;
        let (cardinal, diagonal) = order.split_at_mut(4);
        rng.shuffle(cardinal);
        rng.shuffle(diagonal);

        let reaches_enemy = |from: Direction| {
            let cell = monst.position.step(from);
            terrain.contains(cell)
                && distance_between(enemy.position, cell) == 1
                && !self.world.is_occupied(cell)
                && !terrain.diagonal_blocked(monst.position, cell)
                && (!terrain.diagonal_blocked(enemy.position, cell)
                    || enemy.combat.attackable_thru_walls)
                && !self.avoids(monst, cell)
        };
        let target = order.into_iter().find(|&dir| reaches_enemy(dir))?;

        let beneficiary = self.world.player_then_others().find(|ally| {
            ally.id != monst.id
                && ally.id != enemy.id
                && are_teammates(monst, ally)
                && self.are_enemies(ally, enemy)
                && eligible_for_swarming(ally)
                && distance_between(monst.position, ally.position) == 1
                && !terrain.diagonal_blocked(monst.position, ally.position)
                && !self.avoids(ally, monst.position)
                && (distance_between(enemy.position, ally.position) > 1
                    || terrain.diagonal_blocked(enemy.position, ally.position))
                && !self.has_alternate_opening(ally, enemy)
                && !self.is_engaged_elsewhere(ally, monst, enemy)
        })?;
        trace!(creature = %monst.id, helps = %beneficiary.id, dir = ?target, "swarm sidestep");
        Some(target)
    }

    fn has_alternate_opening(&self, ally: &Creature, enemy: &Creature) -> bool {
        let terrain = self.terrain();
        Direction::ALL.into_iter().any(|dir| {
            let cell = ally.position.step(dir);
            terrain.contains(cell)
                && !self.world.is_occupied(cell)
                && distance_between(enemy.position, cell) == 1
                && !terrain.diagonal_blocked(enemy.position, cell)
                && !terrain.diagonal_blocked(ally.position, cell)
                && !self.avoids(ally, cell)
        })
    }

    fn is_engaged_elsewhere(&self, ally: &Creature, monst: &Creature, enemy: &Creature) -> bool {
        self.world.player_then_others().any(|other| {
            other.id != ally.id
                && other.id != monst.id
                && other.id != enemy.id
                && self.are_enemies(ally, other)
                && distance_between(ally.position, other.position) == 1
                && (!self.terrain().diagonal_blocked(ally.position, other.position)
                    || other.combat.attackable_thru_walls)
        })
    }
}
