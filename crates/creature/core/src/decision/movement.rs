//! Single steps: moving, swapping, swarming and attacking.

use tracing::{debug, trace, warn};

use crate::creature::{Creature, CreatureId, CreatureMode, CreatureState, StatusKind};
use crate::decision::{Turn, TurnAction, magic};
use crate::env::TerrainFlags;
use crate::geometry::{Direction, Position, distance_between};
use crate::grid::{DistanceGrid, calculate_distances, next_step};
use crate::rng::RngStream;
use crate::state_machine::wake_up;
use crate::view::WorldView;

/// A uniformly chosen open direction from the creature's cell.
///
/// Open means in bounds, not a wall, not cut diagonally and, when
/// `respect_avoidance` is set, not avoided unless the player stands there and
/// the creature is hostile. Draws only when there are at least two options.
pub(crate) fn random_valid_direction(
    view: &WorldView<'_>,
    rng: &mut RngStream,
    monst: &Creature,
    respect_avoidance: bool,
) -> Option<Direction> {
    let terrain = view.terrain();
    let from = monst.position;
    let valid: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&dir| {
            let cell = from.step(dir);
            terrain.contains(cell)
                && !terrain.has_flag(cell, TerrainFlags::OBSTRUCTS_PASSABILITY)
                && !terrain.diagonal_blocked(from, cell)
                && (!respect_avoidance
                    || !view.avoids(monst, cell)
                    || (view.world.creature_at(cell).is_some_and(|c| c.is_player) && !monst.is_ally()))
        })
        .collect();
    if valid.is_empty() {
        return None;
    }
    let pick = rng.range(0, valid.len() as i32 - 1) as usize;
    valid.get(pick).copied()
}

/// Tries to step one cell in `dir`: a move, a swap, a swarm sidestep or an
/// attack, depending on what stands there. Returns whether the turn was used.
pub(crate) fn move_creature(turn: &mut Turn<'_, '_>, id: CreatureId, dir: Direction) -> bool {
    let Some(monst) = turn.world.get(id) else {
        return false;
    };
    let from = monst.position;
    if !turn.ctx.terrain.contains(from.step(dir)) {
        return false;
    }

    if monst.has_status(StatusKind::Nauseous) && turn.rng.percent(25) {
        let ticks = monst.movement_speed;
        turn.set_ticks(id, ticks);
        turn.record(TurnAction::Idle);
        return true;
    }

    let mut dir = dir;
    if !monst.has_status(StatusKind::Entranced) {
        let view = WorldView::new(turn.ctx, turn.world);
        let lurch = if monst.has_status(StatusKind::Confused) {
            random_valid_direction(&view, turn.rng, monst, false)
        } else if monst.movement.flits
            && !monst.bookkeeping.seizing
            && turn.rng.percent(view.tuning().flit_percent)
        {
            random_valid_direction(&view, turn.rng, monst, true)
        } else {
            None
        };
        if let Some(lurch) = lurch {
            dir = lurch;
        }
    }

    let terrain = turn.ctx.terrain;
    let to = from.step(dir);
    let Some(monst) = turn.world.get(id) else {
        return false;
    };
    if monst.movement.restricted_to_liquid && !terrain.has_flag(to, TerrainFlags::ALLOWS_SUBMERGING) {
        return false;
    }

    if monst.has_status(StatusKind::Stuck)
        && !turn.world.is_occupied(to)
        && terrain.has_flag(from, TerrainFlags::ENTANGLES)
        && !monst.movement.immune_to_webs
        && !monst.combat.invulnerable
        && let Some(monst) = turn.world.get_mut(id)
    {
        let left = monst.status.get(StatusKind::Stuck) - 1;
        monst.status.set(StatusKind::Stuck, left);
        if left > 0 {
            monst.ticks_until_turn = monst.movement_speed;
            turn.record(TurnAction::Idle);
            return true;
        }
    }

    let defender = turn.world.occupant(to);
    if defender.is_none() && !release_grip(turn, id) {
        return true;
    }

    let view = turn.view();
    let Some(monst) = view.creature(id) else {
        return false;
    };
    let defender = defender.and_then(|other| view.creature(other));
    let reachable = defender.is_some_and(|d| d.combat.attackable_thru_walls)
        || (terrain.is_passable_or_secret_door(to)
            && !terrain.diagonal_blocked(from, to)
            && terrain.is_passable_or_secret_door(from));
    let willing = defender.is_none_or(|d| view.can_pass(monst, d) || view.will_attack(monst, d));
    if !reachable || !willing {
        return false;
    }

    let Some(defender) = defender else {
        let speed = monst.movement_speed;
        if let Err(err) = turn.world.relocate(id, to) {
            warn!(creature = %id, %err, "move rejected");
            return false;
        }
        turn.set_ticks(id, speed);
        turn.record(TurnAction::Moved { from, to });
        return true;
    };

    let defender_id = defender.id;
    let speed = monst.movement_speed;
    if view.can_pass(monst, defender) {
        swap_past(turn, id, defender_id);
        turn.set_ticks(id, speed);
        turn.record(TurnAction::Swapped { with: defender_id });
        return true;
    }

    let view = WorldView::new(turn.ctx, turn.world);
    let (Some(monst), Some(defender)) = (view.creature(id), view.creature(defender_id)) else {
        return false;
    };
    let attack_speed = monst.attack_speed;
    let surfaces = !(monst.combat.seizes && !monst.bookkeeping.seizing);
    if let Some(side) = view.swarm_direction(turn.rng, monst, defender) {
        let to = from.step(side);
        if turn.world.relocate(id, to).is_ok() {
            debug!(creature = %id, %from, %to, "swarmed");
            turn.set_ticks(id, speed);
            turn.record(TurnAction::Swarmed { from, to });
            return true;
        }
    }

    if let Some(monst) = turn.world.get_mut(id) {
        monst.ticks_until_turn = attack_speed;
        if surfaces {
            monst.bookkeeping.submerged = false;
        }
    }
    let still_willing = {
        let view = turn.view();
        match (view.creature(id), view.creature(defender_id)) {
            (Some(monst), Some(defender)) => view.will_attack(monst, defender),
            _ => false,
        }
    };
    if still_willing {
        attack(turn, id, defender_id);
    }
    true
}

/// A seized creature stays put while an enemy still holds it. Returns false
/// when the creature is held, having spent its turn struggling.
fn release_grip(turn: &mut Turn<'_, '_>, id: CreatureId) -> bool {
    let view = turn.view();
    let Some(monst) = view.creature(id) else {
        return true;
    };
    if monst.bookkeeping.seized {
        let held = view.world.monsters().any(|other| {
            other.bookkeeping.seizing
                && view.are_enemies(monst, other)
                && distance_between(monst.position, other.position) == 1
                && !view.terrain().diagonal_blocked(monst.position, other.position)
        });
        if held {
            let speed = monst.movement_speed;
            turn.set_ticks(id, speed);
            turn.record(TurnAction::Idle);
            return false;
        }
    }
    if let Some(monst) = turn.world.get_mut(id) {
        monst.bookkeeping.seized = false;
        monst.bookkeeping.seizing = false;
    }
    true
}

/// Trades places with a teammate. A teammate that would land somewhere it
/// avoids is set down on the nearest cell it accepts instead.
fn swap_past(turn: &mut Turn<'_, '_>, id: CreatureId, passer: CreatureId) {
    let ctx = turn.ctx;
    let Some(vacated) = turn.world.get(id).map(|monst| monst.position) else {
        return;
    };
    let result = turn.world.pass_through(id, passer, |world| {
        let view = WorldView::new(ctx, world);
        let Some(other) = view.creature(passer) else {
            return vacated;
        };
        if !view.avoids(other, vacated) {
            return vacated;
        }
        view.qualifying_cell_near(other, vacated).unwrap_or_else(|| {
            warn!(creature = %passer, at = %vacated, "no safe cell to displace into");
            vacated
        })
    });
    if let Err(err) = result {
        warn!(creature = %id, %err, "swap failed");
    }
}

/// Resolves a melee attack and applies its consequences to both sides.
pub(crate) fn attack(turn: &mut Turn<'_, '_>, attacker_id: CreatureId, defender_id: CreatureId) -> bool {
    let (Some(attacker), Some(defender)) = (turn.world.get(attacker_id), turn.world.get(defender_id)) else {
        return false;
    };
    if defender.is_levitating() && attacker.movement.restricted_to_liquid {
        return false;
    }
    let defender_was_asleep = !defender.is_player
        && !defender.movement.inanimate
        && defender.state == CreatureState::Sleeping;
    let grabs = attacker.combat.seizes
        && (!attacker.bookkeeping.seizing || !defender.bookkeeping.seized)
        && distance_between(attacker.position, defender.position) == 1
        && !turn
            .ctx
            .terrain
            .diagonal_blocked(attacker.position, defender.position);
    let provoked = !attacker.is_player && defender.is_player && attacker.state == CreatureState::Wandering;

    if let Some(defender) = turn.world.get_mut(defender_id) {
        defender.status.set(StatusKind::Entranced, 0);
        if defender.has_status(StatusKind::MagicalFear) {
            defender.status.set(StatusKind::MagicalFear, 1);
        }
    }
    if provoked && let Some(attacker) = turn.world.get_mut(attacker_id) {
        attacker.state = CreatureState::TrackingScent;
    }

    if grabs {
        if let Some(attacker) = turn.world.get_mut(attacker_id) {
            attacker.bookkeeping.seizing = true;
        }
        if let Some(defender) = turn.world.get_mut(defender_id) {
            defender.bookkeeping.seized = true;
        }
        trace!(attacker = %attacker_id, defender = %defender_id, "seized");
        turn.record(TurnAction::Attacked {
            target: defender_id,
            hit: false,
        });
        return false;
    }

    let (Some(attacker), Some(defender)) = (turn.world.get(attacker_id), turn.world.get(defender_id)) else {
        return false;
    };
    let report = turn.combat.perform_attack(attacker, defender);
    let steals = report.hit
        && attacker.combat.hit_steal_flee
        && !attacker.carries_item
        && defender.is_player
        && !attacker.has_status(StatusKind::Confused);

    if let Some(defender) = turn.world.get_mut(defender_id) {
        if report.hit {
            if defender_was_asleep {
                defender.ticks_until_turn += defender.movement_speed.max(defender.attack_speed);
                if !defender.is_ally() {
                    defender.state = CreatureState::TrackingScent;
                }
            }
            defender.take_damage(report.damage);
            if !defender.is_player
                && !defender.is_ally()
                && defender.behavior.flees_near_death
                && defender.health.max / 4 >= defender.health.current
            {
                defender.state = CreatureState::Fleeing;
            }
        }
    }
    if let Some(attacker) = turn.world.get_mut(attacker_id) {
        attacker.take_damage(report.reflected);
        if steals {
            attacker.carries_item = true;
            attacker.mode = CreatureMode::PermanentlyFleeing;
            attacker.state = CreatureState::Fleeing;
        }
    }
    let still_asleep = turn
        .world
        .get(defender_id)
        .is_some_and(|d| !d.is_player && d.state == CreatureState::Sleeping);
    if still_asleep {
        wake_up(turn, defender_id);
    }
    trace!(attacker = %attacker_id, defender = %defender_id, hit = report.hit, damage = report.damage, "attack");
    turn.record(TurnAction::Attacked {
        target: defender_id,
        hit: report.hit,
    });
    report.hit
}

/// One approach step toward `target` without pathfinding.
///
/// Tries the direct diagonal or straight step first. If that is refused, a
/// cardinally adjacent target is given up on; otherwise the two axes are
/// tried (the longer one first) followed by the two flanking diagonals.
/// Creatures that are not hunting sometimes favour the dominant axis.
pub(crate) fn move_passively_towards(
    turn: &mut Turn<'_, '_>,
    id: CreatureId,
    target: Position,
    willing_to_attack_player: bool,
) -> bool {
    let Some(monst) = turn.world.get(id) else {
        return false;
    };
    let origin = monst.position;
    let dx = (target.x - origin.x).signum();
    let dy = (target.y - origin.y).signum();
    if dx == 0 && dy == 0 {
        return false;
    }
    if !turn.ctx.terrain.contains(origin.offset(dx, dy)) {
        return false;
    }

    let span_x = (target.x - origin.x).abs();
    let span_y = (target.y - origin.y).abs();
    if monst.state != CreatureState::TrackingScent && dx != 0 && dy != 0 {
        if span_x > span_y && turn.rng.range(0, span_x) > span_y {
            if try_step(turn, id, origin, dx, 0, willing_to_attack_player) {
                return true;
            }
        } else if span_x < span_y
            && turn.rng.range(0, span_y) > span_x
            && try_step(turn, id, origin, 0, dy, willing_to_attack_player)
        {
            return true;
        }
    }

    if try_step(turn, id, origin, dx, dy, willing_to_attack_player) {
        return true;
    }
    if distance_between(origin, target) <= 1 && (dx == 0 || dy == 0) {
        return false;
    }
    let fallbacks = if span_x < span_y {
        [(0, dy), (dx, 0), (-1, dy), (1, dy)]
    } else {
        [(dx, 0), (0, dy), (dx, -1), (dx, 1)]
    };
    fallbacks
        .into_iter()
        .any(|(sx, sy)| try_step(turn, id, origin, sx, sy, willing_to_attack_player))
}

fn try_step(
    turn: &mut Turn<'_, '_>,
    id: CreatureId,
    origin: Position,
    dx: i32,
    dy: i32,
    willing_to_attack_player: bool,
) -> bool {
    let Some(dir) = Direction::from_delta(dx, dy) else {
        return false;
    };
    let cell = origin.offset(dx, dy);
    let refused = {
        let view = turn.view();
        let Some(monst) = view.creature(id) else {
            return false;
        };
        view.avoids(monst, cell)
            || (!willing_to_attack_player
                && view.world.creature_at(cell).is_some_and(|c| c.is_player))
    };
    !refused && move_creature(turn, id, dir)
}

/// With `chance` percent, one passive step in a random acceptable direction.
pub(crate) fn mill_about(turn: &mut Turn<'_, '_>, id: CreatureId, chance: i32) {
    if !turn.rng.percent(chance) {
        return;
    }
    let view = WorldView::new(turn.ctx, turn.world);
    let Some(monst) = view.creature(id) else {
        return;
    };
    let origin = monst.position;
    if let Some(dir) = random_valid_direction(&view, turn.rng, monst, true) {
        move_passively_towards(turn, id, origin.step(dir), false);
    }
}

/// Heads for another creature, by straight line when it is clear and by the
/// target's own distance map otherwise.
pub(crate) fn path_toward_creature(turn: &mut Turn<'_, '_>, id: CreatureId, target_id: CreatureId) {
    let view = turn.view();
    let (Some(monst), Some(target)) = (view.creature(id), view.creature(target_id)) else {
        return;
    };
    let willing = monst.state != CreatureState::Ally;
    let target_at = target.position;

    if view.traversible_path_between(monst, target_at) {
        let close = distance_between(monst.position, target_at) <= 2;
        if close && let Some(monst) = turn.world.get_mut(id) {
            monst.bookkeeping.given_up_on_scent = false;
        }
        move_passively_towards(turn, id, target_at, willing);
        return;
    }

    let stale = target.map_to_me.as_deref().is_none_or(|grid| {
        grid.distance_at(target_at) > view.tuning().map_recompute_distance
    });
    if stale {
        let grid = calculate_distances(&view, target_at, TerrainFlags::empty(), Some(monst), false);
        trace!(creature = %id, target = %target_id, "rebuilt distance map to target");
        if let Some(target) = turn.world.get_mut(target_id) {
            target.map_to_me = Some(Box::new(grid));
        }
    }

    let Some(grid) = turn
        .world
        .get_mut(target_id)
        .and_then(|target| target.map_to_me.take())
    else {
        return;
    };
    follow_grid_toward(turn, id, target_id, &grid, willing);
    if let Some(target) = turn.world.get_mut(target_id)
        && target.map_to_me.is_none()
    {
        target.map_to_me = Some(grid);
    }
}

fn follow_grid_toward(
    turn: &mut Turn<'_, '_>,
    id: CreatureId,
    target_id: CreatureId,
    grid: &DistanceGrid,
    willing: bool,
) {
    let view = turn.view();
    let (Some(monst), Some(target)) = (view.creature(id), view.creature(target_id)) else {
        return;
    };
    let far = distance_between(monst.position, target.position) > view.tuning().blink_toward_distance;
    if (far || view.are_enemies(monst, target))
        && magic::blink_to_preference(turn, id, |cell| grid.distance_at(cell), false)
    {
        return;
    }

    let view = WorldView::new(turn.ctx, turn.world);
    let Some(monst) = view.creature(id) else {
        return;
    };
    let origin = monst.position;
    let dir = next_step(&view, grid, origin, Some(monst), true)
        .or_else(|| random_valid_direction(&view, turn.rng, monst, true));
    if let Some(dir) = dir {
        move_passively_towards(turn, id, origin.step(dir), willing);
    }
}
