use crate::creature::{CreatureId, CreatureState, StatusKind};
use crate::decision::movement::{move_creature, move_passively_towards};
use crate::decision::{Status, Turn, magic};
use crate::geometry::{Direction, distance_between};
use crate::grid::next_step;

/// Runs down the safety grid. A cornered fugitive that cannot take a single
/// step lashes out at whatever is adjacent.
pub(crate) fn flee(turn: &mut Turn<'_, '_>, id: CreatureId) -> Status {
    let Some(monst) = turn.world.get(id) else {
        return Status::Failure;
    };
    if monst.state != CreatureState::Fleeing {
        return Status::Failure;
    }
    let always = monst.behavior.always_use_ability;

    if monst.abilities.can_blink()
        && magic::wants_to_use_ability(turn, id)
        && magic::blink_to_safety(turn, id)
    {
        return Status::Success;
    }
    if magic::summons(turn, id, always) {
        return Status::Success;
    }

    let source = magic::safety_source(turn, id);
    let step = magic::with_safety_grid(turn, id, source, |view, grid| {
        let monst = view.creature(id)?;
        next_step(view, grid, monst.position, None, true).map(|dir| (monst.position, dir))
    })
    .flatten();

    let escaped = step.is_some_and(|(origin, dir)| {
        move_creature(turn, id, dir) || move_passively_towards(turn, id, origin.step(dir), true)
    });
    if !escaped {
        lash_out(turn, id);
    }
    Status::Success
}

fn lash_out(turn: &mut Turn<'_, '_>, id: CreatureId) {
    let target = {
        let view = turn.view();
        let Some(monst) = view.creature(id) else {
            return;
        };
        if monst.has_status(StatusKind::MagicalFear) {
            return;
        }
        view.world
            .player_then_others()
            .find(|other| {
                view.will_attack(monst, other) && distance_between(monst.position, other.position) <= 1
            })
            .map(|other| (monst.position, other.position))
    };
    if let Some((origin, at)) = target
        && let Some(dir) = Direction::from_delta(at.x - origin.x, at.y - origin.y)
    {
        move_creature(turn, id, dir);
    }
}
