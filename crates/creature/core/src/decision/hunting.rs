//! Behaviours for creatures that are after something: stationary casters,
//! discordant brawlers and scent trackers.

use tracing::trace;

use crate::creature::{CreatureId, CreatureState, StatusKind};
use crate::decision::movement::{move_creature, move_passively_towards, path_toward_creature};
use crate::decision::scent::{is_local_scent_maximum, scent_direction};
use crate::decision::{Status, Turn, magic};
use crate::env::TerrainFlags;
use crate::geometry::{Position, distance_between};
use crate::rng::RngStream;
use crate::state_machine::wander_toward;
use crate::view::WorldView;

/// Creatures that cannot move only ever cast.
pub(crate) fn immobile_turn(turn: &mut Turn<'_, '_>, id: CreatureId) -> Status {
    let Some(monst) = turn.world.get(id) else {
        return Status::Failure;
    };
    if !monst.movement.immobile {
        return Status::Failure;
    }
    let attack_speed = monst.attack_speed;
    if magic::use_magic(turn, id) {
        turn.charge_casting(id);
    } else {
        turn.set_ticks(id, attack_speed);
    }
    Status::Success
}

/// Invisible creatures are only noticed some of the time.
pub(crate) fn notices(rng: &mut RngStream, view: &WorldView<'_>, invisible: bool) -> bool {
    !invisible || rng.percent(view.tuning().invisible_notice_percent)
}

/// A discordant creature turns on whoever is nearest.
pub(crate) fn discordant_turn(turn: &mut Turn<'_, '_>, id: CreatureId) -> Status {
    let Some(monst) = turn.world.get(id) else {
        return Status::Failure;
    };
    if !monst.has_status(StatusKind::Discordant) || monst.state == CreatureState::Fleeing {
        return Status::Failure;
    }

    let closest = {
        let view = WorldView::new(turn.ctx, turn.world);
        let mut shortest = view.terrain().dimensions().span();
        let mut closest: Option<Position> = None;
        for target in view.world.player_then_others() {
            let distance = distance_between(monst.position, target.position);
            if target.id != id
                && (!target.bookkeeping.submerged || monst.bookkeeping.submerged)
                && view.will_attack(monst, target)
                && distance < shortest
                && view.traversible_path_between(monst, target.position)
                && (!view.avoids(monst, target.position) || target.combat.attackable_thru_walls)
                && notices(turn.rng, &view, target.has_status(StatusKind::Invisible))
            {
                shortest = distance;
                closest = Some(target.position);
            }
        }
        closest
    };
    let Some(target_at) = closest else {
        return Status::Failure;
    };
    trace!(creature = %id, target = %target_at, "discordant target");

    if magic::use_magic(turn, id) {
        turn.charge_casting(id);
        return Status::Success;
    }
    let Some(monst) = turn.world.get(id) else {
        return Status::Failure;
    };
    if monst.behavior.maintains_distance {
        return Status::Failure;
    }
    let willing = monst.state == CreatureState::Ally;
    move_passively_towards(turn, id, target_at, willing).into()
}

/// Whether a liquid-bound creature can reach the player at all.
pub(crate) fn player_in_reach_of_swimmer(turn: &Turn<'_, '_>, id: CreatureId) -> bool {
    let restricted = turn
        .world
        .get(id)
        .is_some_and(|monst| monst.movement.restricted_to_liquid);
    !restricted
        || turn
            .player_position()
            .is_some_and(|at| turn.ctx.terrain.has_flag(at, TerrainFlags::ALLOWS_SUBMERGING))
}

/// Follows the player: magic first, then nearby fights, then the scent trail.
pub(crate) fn hunt(turn: &mut Turn<'_, '_>, id: CreatureId) -> Status {
    let Some(monst) = turn.world.get(id) else {
        return Status::Failure;
    };
    let hunting = monst.state == CreatureState::TrackingScent
        || (monst.is_ally() && monst.has_status(StatusKind::Discordant));
    if !hunting || !player_in_reach_of_swimmer(turn, id) {
        return Status::Failure;
    }
    let origin = monst.position;

    let blinks = monst.abilities.can_blink();
    if magic::use_magic(turn, id)
        || (blinks && magic::wants_to_use_ability(turn, id) && magic::blink_up_scent(turn, id))
    {
        turn.charge_casting(id);
        return Status::Success;
    }

    let Some(player) = turn.world.player() else {
        return Status::Success;
    };
    let (player_id, player_at) = (player.id, player.position);
    if distance_between(origin, player_at) > 1 || turn.ctx.terrain.diagonal_blocked(origin, player_at) {
        let others: Vec<CreatureId> = turn.world.monsters().map(|other| other.id).collect();
        for other_id in others {
            let target = {
                let view = WorldView::new(turn.ctx, turn.world);
                let (Some(monst), Some(other)) = (view.creature(id), view.creature(other_id)) else {
                    continue;
                };
                (view.will_attack(monst, other)
                    && distance_between(origin, other.position) == 1
                    && notices(turn.rng, &view, other.has_status(StatusKind::Invisible)))
                .then_some(other.position)
            };
            if let Some(target) = target
                && move_passively_towards(turn, id, target, true)
            {
                return Status::Success;
            }
        }
    }

    let view = turn.view();
    let Some(monst) = view.creature(id) else {
        return Status::Success;
    };
    let charges = monst.is_levitating()
        || monst.movement.restricted_to_liquid
        || monst.bookkeeping.submerged
        || ((monst.movement.immune_to_webs || monst.combat.invulnerable) && monst.abilities.can_shoot_webs());
    if charges && view.in_view(monst.position) {
        move_passively_towards(turn, id, player_at, true);
        return Status::Success;
    }
    if monst.behavior.always_hunting && monst.bookkeeping.given_up_on_scent {
        path_toward_creature(turn, id, player_id);
        return Status::Success;
    }

    if let Some(dir) = scent_direction(&view, monst) {
        move_creature(turn, id, dir);
        return Status::Success;
    }

    let dead_end = is_local_scent_maximum(&view, monst.position)
        && !monst.is_ally()
        && !view.in_view(monst.position);
    if dead_end {
        if monst.behavior.always_hunting {
            path_toward_creature(turn, id, player_id);
            if let Some(monst) = turn.world.get_mut(id) {
                monst.bookkeeping.given_up_on_scent = true;
            }
        } else {
            let last_seen = monst.last_seen_player_at;
            if let Some(monst) = turn.world.get_mut(id) {
                monst.state = CreatureState::Wandering;
            }
            trace!(creature = %id, %last_seen, "lost the trail");
            wander_toward(turn, id, last_seen);
        }
    }
    Status::Success
}
