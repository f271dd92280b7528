//! The player's allies: fight near the player, flee when outmatched, eat
//! corpses and otherwise stay close.

use tracing::trace;

use crate::creature::{CreatureId, CreatureState, StatusKind};
use crate::decision::hunting::notices;
use crate::decision::movement::{mill_about, move_creature, move_passively_towards, path_toward_creature};
use crate::decision::scent::scent_direction;
use crate::decision::wandering::escape_hazard;
use crate::decision::{Status, Turn, magic};
use crate::env::TerrainFlags;
use crate::geometry::distance_between;
use crate::grid::{CostGrid, DistanceGrid, GridKind, StepCost, next_step, rescan, wall_cost};
use crate::view::WorldView;

/// Value of an unexplored cell in the enemy map before the scan.
const ENEMY_MAP_FAR: i32 = 10_000;

pub(crate) fn ally_turn(turn: &mut Turn<'_, '_>, id: CreatureId) -> Status {
    let player_id = turn.world.player_id();
    let Some(monst) = turn.world.get_mut(id) else {
        return Status::Failure;
    };
    if !monst.is_ally() {
        return Status::Failure;
    }
    if monst.leader.is_none() {
        monst.leader = player_id;
        monst.bookkeeping.follower = true;
    }

    if escape_hazard(turn, id, false) {
        return Status::Success;
    }

    let closest = closest_enemy(turn, id);
    if should_flee(turn, id, closest) && flee_to_safety(turn, id) {
        return Status::Success;
    }

    if magic::use_magic(turn, id) {
        turn.charge_casting(id);
        return Status::Success;
    }

    if engage(turn, id, closest) {
        return Status::Success;
    }
    if approach_corpse(turn, id) {
        return Status::Success;
    }
    stay_close(turn, id);
    Status::Success
}

/// Nearest monster the ally would fight, with the distance to it.
fn closest_enemy(turn: &mut Turn<'_, '_>, id: CreatureId) -> Option<(CreatureId, i32)> {
    let view = WorldView::new(turn.ctx, turn.world);
    let monst = view.creature(id)?;
    let terrain = view.terrain();
    let mut shortest = terrain.dimensions().span();
    let mut closest = None;
    for target in view.world.monsters() {
        let distance = distance_between(monst.position, target.position);
        if target.id != id
            && (!target.bookkeeping.submerged || monst.bookkeeping.submerged)
            && view.will_attack(monst, target)
            && distance < shortest
            && view.traversible_path_between(monst, target.position)
            && (!terrain.has_flag(target.position, TerrainFlags::OBSTRUCTS_PASSABILITY)
                || target.combat.attackable_thru_walls)
            && notices(turn.rng, &view, target.has_status(StatusKind::Invisible))
        {
            shortest = distance;
            closest = Some((target.id, distance));
        }
    }
    closest
}

/// Weak allies near an enemy retreat, as do allies facing something they fear.
fn should_flee(turn: &Turn<'_, '_>, id: CreatureId, closest: Option<(CreatureId, i32)>) -> bool {
    let view = turn.view();
    let tuning = view.tuning();
    let (Some(monst), Some((enemy, distance))) = (view.creature(id), closest) else {
        return false;
    };
    let Some(enemy) = view.creature(enemy) else {
        return false;
    };
    if monst.health.max <= 1 || monst.has_status(StatusKind::LifespanRemaining) {
        return false;
    }
    let own = monst.health.percent();
    let player_percent = view.player().map_or(100, |player| player.health.percent());
    let weak = distance < tuning.ally_flee_enemy_distance
        && own <= tuning.ally_flee_health_percent
        && monst.turns_between_regen > 0
        && (monst.behavior.flees_near_death || own * 2 < player_percent);
    weak || view.flees_from(monst, enemy)
}

fn flee_to_safety(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let Some(monst) = turn.world.get(id) else {
        return false;
    };
    let always = monst.behavior.always_use_ability;
    if monst.abilities.can_blink()
        && magic::wants_to_use_ability(turn, id)
        && magic::blink_to_safety(turn, id)
    {
        return true;
    }
    if magic::summons(turn, id, always) {
        return true;
    }

    let step = {
        let view = WorldView::new(turn.ctx, turn.world);
        let grid = turn.grids.get(&view, GridKind::AllySafety);
        view.creature(id).and_then(|monst| {
            let dir = next_step(&view, grid, monst.position, Some(monst), true)?;
            let to = monst.position.step(dir);
            (grid.distance_at(to) < grid.distance_at(monst.position)).then_some((dir, to))
        })
    };
    let Some((dir, to)) = step else {
        return false;
    };
    move_creature(turn, id, dir) || move_passively_towards(turn, id, to, true)
}

/// How far from the player the ally may stray to fight.
fn leash_length(turn: &Turn<'_, '_>, id: CreatureId, closest: Option<(CreatureId, i32)>) -> i32 {
    let view = turn.view();
    let tuning = view.tuning();
    let unlimited = view.terrain().dimensions().span();
    let Some(monst) = view.creature(id) else {
        return 0;
    };
    let mut leash = if monst.bookkeeping.seized {
        unlimited
    } else if turn.start.player_rested {
        tuning.ally_leash_rested
    } else {
        tuning.ally_leash
    };
    if let Some((enemy, 1)) = closest
        && let Some(enemy) = view.creature(enemy)
    {
        let slower_pursuer = enemy.movement_speed < monst.movement_speed
            && !enemy.movement.flits
            && !enemy.movement.immobile
            && enemy.state == CreatureState::TrackingScent;
        leash = if slower_pursuer { unlimited } else { leash + 1 };
    }
    leash
}

fn engage(turn: &mut Turn<'_, '_>, id: CreatureId, closest: Option<(CreatureId, i32)>) -> bool {
    let Some((enemy_id, shortest)) = closest else {
        return false;
    };
    let leash = leash_length(turn, id, closest);
    let target_at = {
        let view = turn.view();
        let (Some(monst), Some(enemy)) = (view.creature(id), view.creature(enemy_id)) else {
            return false;
        };
        let near_player = view
            .player()
            .is_some_and(|player| distance_between(monst.position, player.position) < leash);
        let willing = (near_player || monst.bookkeeping.does_not_track_leader)
            && !monst.behavior.maintains_distance
            && !view.attack_would_be_futile(monst, enemy);
        if !willing {
            return false;
        }
        enemy.position
    };

    let blinks = turn
        .world
        .get(id)
        .is_some_and(|monst| monst.abilities.can_blink());
    if blinks && magic::wants_to_use_ability(turn, id) {
        let grid = enemy_map(turn, id, shortest);
        if magic::blink_to_preference(turn, id, |cell| grid.distance_at(cell), false) {
            return true;
        }
    }
    trace!(creature = %id, enemy = %enemy_id, "ally engaging");
    move_passively_towards(turn, id, target_at, true);
    true
}

/// Distance to the nearest enemy worth blinking at.
fn enemy_map(turn: &mut Turn<'_, '_>, id: CreatureId, shortest: i32) -> DistanceGrid {
    let view = WorldView::new(turn.ctx, turn.world);
    let terrain = view.terrain();
    let dims = terrain.dimensions();
    let mut grid = DistanceGrid::filled(dims, ENEMY_MAP_FAR);
    let mut costs = CostGrid::filled(dims, StepCost::Passable(1));
    let Some(monst) = view.creature(id) else {
        return grid;
    };

    for cell in dims.positions() {
        if terrain.has_flag(cell, TerrainFlags::OBSTRUCTS_PASSABILITY) {
            costs[cell] = wall_cost(terrain, cell);
            grid[cell] = 0;
        } else if view.avoids(monst, cell) {
            costs[cell] = StepCost::Forbidden;
            grid[cell] = 0;
        }
    }
    let always = monst.behavior.always_use_ability;
    for target in view.world.monsters() {
        if target.id != id
            && (!target.bookkeeping.submerged || monst.bookkeeping.submerged)
            && view.will_attack(monst, target)
            && distance_between(monst.position, target.position) <= shortest
            && view.traversible_path_between(monst, target.position)
            && (!view.avoids(monst, target.position) || target.combat.attackable_thru_walls)
            && (always || notices(turn.rng, &view, target.has_status(StatusKind::Invisible)))
        {
            grid[target.position] = 0;
            costs[target.position] = StepCost::Passable(1);
        }
    }
    rescan(&mut grid, &costs, true);
    grid
}

/// Walks to an offered corpse and starts absorbing it on arrival.
fn approach_corpse(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let Some(monst) = turn.world.get(id) else {
        return false;
    };
    let Some(claim) = monst.corpse else {
        return false;
    };
    let burning = monst.has_status(StatusKind::Burning) && !monst.has_status(StatusKind::ImmuneToFire);
    if monst.has_status(StatusKind::Poisoned) || burning {
        return false;
    }
    move_passively_towards(turn, id, claim.position, false);

    let absorption_turns = turn.ctx.tuning.corpse_absorption_turns;
    if let Some(monst) = turn.world.get_mut(id)
        && monst.position == claim.position
        && !monst.bookkeeping.absorbing
    {
        monst.bookkeeping.absorbing = true;
        if let Some(claim) = monst.corpse.as_mut() {
            claim.counter = absorption_turns;
        }
        trace!(creature = %id, at = %claim.position, "began absorbing");
    }
    true
}

/// Idles near the player, or follows the scent and then the leader's map.
fn stay_close(turn: &mut Turn<'_, '_>, id: CreatureId) {
    let tuning = turn.ctx.tuning;
    let (origin, leader, given_up, distance_to_player, mills) = {
        let view = turn.view();
        let Some(monst) = view.creature(id) else {
            return;
        };
        let distance = view
            .player()
            .map_or(0, |player| distance_between(monst.position, player.position));
        let mills = monst.bookkeeping.does_not_track_leader
            || (distance < tuning.ally_mill_distance && view.in_view(monst.position));
        (
            monst.position,
            monst.leader,
            monst.bookkeeping.given_up_on_scent,
            distance,
            mills,
        )
    };

    if mills {
        if let Some(monst) = turn.world.get_mut(id) {
            monst.bookkeeping.given_up_on_scent = false;
        }
        mill_about(turn, id, tuning.mill_percent);
        return;
    }

    if !given_up && distance_to_player > tuning.ally_blink_toward_distance && magic::blink_up_scent(turn, id) {
        return;
    }
    let dir = {
        let view = turn.view();
        view.creature(id).and_then(|monst| scent_direction(&view, monst))
    };
    match dir.filter(|_| !given_up) {
        Some(dir) => {
            move_passively_towards(turn, id, origin.step(dir), false);
        }
        None => {
            if let Some(monst) = turn.world.get_mut(id) {
                monst.bookkeeping.given_up_on_scent = true;
            }
            if let Some(leader) = leader {
                path_toward_creature(turn, id, leader);
            }
        }
    }
}
