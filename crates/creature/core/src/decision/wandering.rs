//! Wandering: escaping hazards, minding the pack leader and walking the
//! waypoint network.

use crate::creature::{Creature, CreatureId, CreatureState, StatusKind};
use crate::decision::hunting::{notices, player_in_reach_of_swimmer};
use crate::decision::movement::{attack, mill_about, move_passively_towards, path_toward_creature};
use crate::decision::{Status, Turn, magic, random_valid_direction};
use crate::env::TerrainFlags;
use crate::geometry::{Direction, distance_between};
use crate::grid::{GridKind, WaypointSet, next_step};
use crate::state_machine::{choose_new_wander_destination, is_valid_wander_destination};
use crate::view::WorldView;

pub(crate) fn wander(turn: &mut Turn<'_, '_>, id: CreatureId) -> Status {
    let Some(monst) = turn.world.get(id) else {
        return Status::Failure;
    };
    let swimmer_stranded = monst.movement.restricted_to_liquid && !player_in_reach_of_swimmer(turn, id);
    if monst.state != CreatureState::Wandering && !swimmer_stranded {
        return Status::Failure;
    }

    if escape_hazard(turn, id, true) {
        return Status::Success;
    }
    if rescue_captive_leader(turn, id) {
        return Status::Success;
    }
    if brawl_with_neighbour(turn, id) {
        return Status::Success;
    }

    let Some(monst) = turn.world.get(id) else {
        return Status::Success;
    };
    match monst.leader.filter(|_| monst.bookkeeping.follower) {
        Some(leader) => keep_up_with_leader(turn, id, leader),
        None => walk_waypoints(turn, id),
    }
    Status::Success
}

/// Whether the creature should get off its cell this turn.
fn standing_in_harm(view: &WorldView<'_>, monst: &Creature, ally_rules: bool) -> bool {
    let terrain = view.terrain();
    let at = monst.position;
    let fireproof = monst.has_status(StatusKind::ImmuneToFire) || monst.combat.invulnerable;
    if !ally_rules {
        return terrain.has_flag(at, TerrainFlags::HARMFUL_TERRAIN - TerrainFlags::IS_FIRE)
            || (terrain.has_flag(at, TerrainFlags::IS_FIRE) && !fireproof);
    }
    let injuries = TerrainFlags::CAUSES_DAMAGE | TerrainFlags::CAUSES_PARALYSIS | TerrainFlags::CAUSES_CONFUSION;
    let always = TerrainFlags::HARMFUL_TERRAIN - TerrainFlags::IS_FIRE - injuries;
    terrain.has_flag(at, always)
        || (terrain.has_flag(at, TerrainFlags::IS_FIRE) && !monst.has_status(StatusKind::ImmuneToFire))
        || (terrain.has_flag(at, injuries) && !monst.movement.inanimate && !monst.combat.invulnerable)
}

/// Leaves harmful terrain by blink or by walking down the safe-terrain grid.
///
/// Wild creatures use the plain harm test and will fight their way out; allies
/// use a stricter test and never start fights while escaping.
pub(crate) fn escape_hazard(turn: &mut Turn<'_, '_>, id: CreatureId, wild: bool) -> bool {
    let in_harm = {
        let view = turn.view();
        view.creature(id)
            .is_some_and(|monst| standing_in_harm(&view, monst, !wild))
    };
    if !in_harm {
        return false;
    }

    let grid = {
        let view = WorldView::new(turn.ctx, turn.world);
        turn.grids.get(&view, GridKind::SafeTerrain).clone()
    };
    if magic::blink_to_preference(turn, id, |cell| grid.distance_at(cell), false) {
        return true;
    }
    let target = {
        let view = turn.view();
        view.creature(id).and_then(|monst| {
            next_step(&view, &grid, monst.position, Some(monst), true).map(|dir| monst.position.step(dir))
        })
    };
    target.is_some_and(|to| move_passively_towards(turn, id, to, wild))
}

/// Followers of a captive leader try to break it free when it can take the hit.
fn rescue_captive_leader(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let plan = {
        let view = turn.view();
        let Some(monst) = view.creature(id) else {
            return false;
        };
        let Some(leader) = monst
            .leader
            .filter(|_| monst.bookkeeping.follower)
            .and_then(|leader| view.creature(leader))
        else {
            return false;
        };
        let viable = leader.bookkeeping.captive
            && leader.health.current > monst.max_damage
            && leader.turns_between_regen > 0
            && !monst.combat.poisons
            && !view.terrain().diagonal_blocked(monst.position, leader.position);
        viable.then(|| {
            (
                leader.id,
                distance_between(monst.position, leader.position) == 1,
                monst.attack_speed,
            )
        })
    };
    let Some((leader, adjacent, attack_speed)) = plan else {
        return false;
    };
    if adjacent {
        turn.set_ticks(id, attack_speed);
        attack(turn, id, leader);
    } else {
        path_toward_creature(turn, id, leader);
    }
    true
}

/// A wandering creature picks a fight with a hostile neighbour.
fn brawl_with_neighbour(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let wandering = turn
        .world
        .get(id)
        .is_some_and(|monst| monst.state == CreatureState::Wandering);
    if !wandering {
        return false;
    }
    let others: Vec<CreatureId> = turn.world.monsters().map(|other| other.id).collect();
    for other_id in others {
        let target = {
            let view = WorldView::new(turn.ctx, turn.world);
            let (Some(monst), Some(other)) = (view.creature(id), view.creature(other_id)) else {
                continue;
            };
            (view.will_attack(monst, other)
                && distance_between(monst.position, other.position) == 1
                && notices(turn.rng, &view, other.has_status(StatusKind::Invisible)))
            .then_some(other.position)
        };
        if let Some(target) = target
            && move_passively_towards(turn, id, target, true)
        {
            return true;
        }
    }
    false
}

fn keep_up_with_leader(turn: &mut Turn<'_, '_>, id: CreatureId, leader_id: CreatureId) {
    let tuning = turn.ctx.tuning;
    let (Some(monst), Some(leader)) = (turn.world.get(id), turn.world.get(leader_id)) else {
        return;
    };
    if distance_between(monst.position, leader.position) > tuning.follower_leash {
        path_toward_creature(turn, id, leader_id);
    } else if leader.movement.immobile {
        mill_about(turn, id, tuning.worshiper_mill_percent);
    } else if leader.bookkeeping.captive {
        mill_about(turn, id, tuning.captor_mill_percent);
    } else {
        mill_about(turn, id, tuning.mill_percent);
    }
}

fn waypoint_step(view: &WorldView<'_>, waypoints: &WaypointSet, monst: &Creature) -> Option<Direction> {
    let index = monst.target_waypoint?;
    if !is_valid_wander_destination(view, waypoints, monst.id, index) {
        return None;
    }
    next_step(view, waypoints.grid(index)?, monst.position, Some(monst), false)
}

/// Steps toward the target waypoint, choosing a new one when the current one
/// is done or unreachable. With nowhere to go, drifts at random.
fn walk_waypoints(turn: &mut Turn<'_, '_>, id: CreatureId) {
    let step = |turn: &mut Turn<'_, '_>| -> Option<Direction> {
        let view = WorldView::new(turn.ctx, turn.world);
        waypoint_step(&view, turn.waypoints, view.creature(id)?)
    };
    let mut dir = step(turn);
    if dir.is_none() {
        choose_new_wander_destination(turn, id);
        dir = step(turn);
    }
    let target = {
        let view = WorldView::new(turn.ctx, turn.world);
        let Some(monst) = view.creature(id) else {
            return;
        };
        dir.or_else(|| random_valid_direction(&view, turn.rng, monst, true))
            .map(|dir| monst.position.step(dir))
    };
    if let Some(to) = target {
        move_passively_towards(turn, id, to, true);
    }
}
