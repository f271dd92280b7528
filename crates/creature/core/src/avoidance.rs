//! The avoidance predicate: whether a creature refuses to step into a cell.

use crate::creature::{Creature, CreatureState, StatusKind};
use crate::env::TerrainFlags;
use crate::geometry::{Position, distance_between};
use crate::view::WorldView;

/// Terrain hazards a creature shrugs off because of what it is.
pub fn terrain_immunities(monst: &Creature) -> TerrainFlags {
    let mut immune = TerrainFlags::empty();
    if monst.has_status(StatusKind::ImmuneToFire) {
        immune |= TerrainFlags::IS_FIRE
            | TerrainFlags::SPONTANEOUSLY_IGNITES
            | TerrainFlags::LAVA_INSTA_DEATH;
    }
    if monst.combat.invulnerable {
        immune |= TerrainFlags::HARMFUL_TERRAIN
            | TerrainFlags::ENTANGLES
            | TerrainFlags::SPONTANEOUSLY_IGNITES
            | TerrainFlags::LAVA_INSTA_DEATH;
    }
    if monst.movement.inanimate {
        immune |= TerrainFlags::CAUSES_DAMAGE
            | TerrainFlags::CAUSES_PARALYSIS
            | TerrainFlags::CAUSES_CONFUSION
            | TerrainFlags::CAUSES_NAUSEA
            | TerrainFlags::CAUSES_POISON;
    }
    if monst.is_levitating() {
        immune |= TerrainFlags::AUTO_DESCENT
            | TerrainFlags::CAUSES_POISON
            | TerrainFlags::IS_DEEP_WATER
            | TerrainFlags::IS_DF_TRAP
            | TerrainFlags::LAVA_INSTA_DEATH;
    }
    if monst.movement.immune_to_webs {
        immune |= TerrainFlags::ENTANGLES;
    }
    if monst.movement.immune_to_water {
        immune |= TerrainFlags::IS_DEEP_WATER;
    }
    if monst.is_player {
        immune |= TerrainFlags::SACRED;
    }
    immune
}

/// Terrain the creature would never choose to path through.
pub fn avoided_flags(monst: &Creature) -> TerrainFlags {
    (TerrainFlags::PATHING_BLOCKER | TerrainFlags::HARMFUL_TERRAIN | TerrainFlags::SACRED)
        - terrain_immunities(monst)
}

impl WorldView<'_> {
    /// True when `monst` refuses to enter `cell` of its own accord.
    ///
    /// Rules are checked in a fixed order and the first that applies wins.
    /// Cells holding a creature the mover is willing and able to hit are
    /// never avoided, so the predicate doubles as "may I attack there".
    pub fn avoids(&self, monst: &Creature, cell: Position) -> bool {
        let terrain = self.terrain();
        if !terrain.contains(cell) {
            return true;
        }
        let flags = terrain.flags_at(cell);
        let occupant = self
            .world
            .creature_at(cell)
            .filter(|other| other.id != monst.id);

        if terrain.is_stairs(cell) {
            return !monst.is_player;
        }

        if monst.movement.restricted_to_liquid && !flags.contains(TerrainFlags::ALLOWS_SUBMERGING) {
            return true;
        }

        if occupant.is_some_and(|other| other.is_player) && !monst.is_player && !monst.is_ally() {
            return false;
        }

        let adjacent = distance_between(monst.position, cell) <= 1;

        if flags.contains(TerrainFlags::OBSTRUCTS_PASSABILITY) {
            if !monst.is_player
                && flags.contains(TerrainFlags::IS_SECRET)
                && !terrain
                    .discovered_flags_at(cell)
                    .intersects(avoided_flags(monst))
            {
                return false;
            }
            return !(adjacent && occupant.is_some_and(|other| other.combat.attackable_thru_walls));
        }

        if adjacent
            && let Some(defender) = occupant
            && !defender.is_dying()
            && self.will_attack(monst, defender)
        {
            return self.attack_would_be_futile(monst, defender);
        }

        if let Some(defender) = occupant
            && !defender.is_dying()
            && self.are_enemies(monst, defender)
            && self.attack_would_be_futile(monst, defender)
        {
            return true;
        }

        if flags.contains(TerrainFlags::IS_SECRET) && monst.is_player {
            return false;
        }

        let immune = terrain_immunities(monst);
        let exposed = flags - immune;
        let webs_hold = !flags.contains(TerrainFlags::ENTANGLES) || !monst.movement.immune_to_webs;
        let here = monst.position;

        if exposed.contains(TerrainFlags::SACRED) {
            return true;
        }

        // brimstone
        if !monst.has_status(StatusKind::ImmuneToFire)
            && !monst.combat.invulnerable
            && flags.contains(TerrainFlags::SPONTANEOUSLY_IGNITES)
            && !self.world.is_occupied(cell)
            && !terrain.has_flag(here, TerrainFlags::IS_FIRE | TerrainFlags::SPONTANEOUSLY_IGNITES)
            && (monst.is_player
                || !matches!(monst.state, CreatureState::TrackingScent | CreatureState::Fleeing))
        {
            return true;
        }

        if !monst.is_player
            && monst.state == CreatureState::Wandering
            && monst.movement.fiery
            && flags.contains(TerrainFlags::IS_FLAMMABLE)
        {
            return true;
        }

        if !monst.is_player
            && monst.has_status(StatusKind::Burning)
            && (terrain.burned_flags_at(cell) - immune).intersects(
                TerrainFlags::CAUSES_EXPLOSIVE_DAMAGE
                    | TerrainFlags::CAUSES_DAMAGE
                    | TerrainFlags::AUTO_DESCENT,
            )
        {
            return true;
        }

        if exposed.contains(TerrainFlags::IS_FIRE)
            && !terrain.has_flag(here, TerrainFlags::IS_FIRE)
            && !self.world.is_occupied(cell)
        {
            return true;
        }

        let non_fire_harm = TerrainFlags::HARMFUL_TERRAIN - TerrainFlags::IS_FIRE;
        if exposed.intersects(non_fire_harm) && !terrain.has_flag(here, non_fire_harm) {
            return true;
        }

        if exposed.contains(TerrainFlags::AUTO_DESCENT) && webs_hold {
            return true;
        }

        if exposed.contains(TerrainFlags::IS_DF_TRAP)
            && (monst.is_player
                || monst.state == CreatureState::Wandering
                || (monst.is_ally() && !flags.contains(TerrainFlags::IS_SECRET)))
            && !monst.has_status(StatusKind::Entranced)
            && webs_hold
        {
            return true;
        }

        if exposed.contains(TerrainFlags::LAVA_INSTA_DEATH) && webs_hold {
            return true;
        }

        if exposed.contains(TerrainFlags::IS_DEEP_WATER)
            && webs_hold
            && !terrain.has_flag(here, TerrainFlags::IS_DEEP_WATER)
        {
            return true;
        }

        // lichen
        if exposed.contains(TerrainFlags::CAUSES_POISON)
            && !terrain.has_flag(here, TerrainFlags::CAUSES_POISON)
            && (monst.is_player
                || monst.state != CreatureState::TrackingScent
                || monst.health.current < 10)
        {
            return true;
        }

        monst.behavior.avoid_corridors
            && !(monst.has_status(StatusKind::Enraged)
                && monst.health.current <= monst.health.max / 2)
            && monst.state == CreatureState::TrackingScent
            && (monst.bookkeeping.follower || monst.bookkeeping.leader)
            && terrain.passable_arc_count(cell) >= 2
            && terrain.passable_arc_count(here) < 2
            && !terrain.has_flag(here, TerrainFlags::HARMFUL_TERRAIN - immune)
    }
}
