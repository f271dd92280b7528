use crate::creature::Creature;
use crate::geometry::{Direction, Position};
use crate::grid::DistanceGrid;
use crate::view::WorldView;

/// Direction of steepest strict descent on `grid` from `from`.
///
/// Cells the mover avoids are skipped, as are cells held by a creature it
/// can neither pass, fight nor travel with. Scanning runs diagonals first
/// when `prefer_diagonals` is set, so ties go to diagonal steps.
pub fn next_step(
    view: &WorldView<'_>,
    grid: &DistanceGrid,
    from: Position,
    mover: Option<&Creature>,
    prefer_diagonals: bool,
) -> Option<Direction> {
    let terrain = view.terrain();
    let here = grid.distance_at(from);
    let mut best_score = 0;
    let mut best = None;

    let mut order = Direction::ALL;
    if prefer_diagonals {
        order.reverse();
    }
    for dir in order {
        let cell = from.step(dir);
        if !terrain.contains(cell) {
            continue;
        }
        let blocked = mover.is_some_and(|monst| {
            view.avoids(monst, cell)
                || view.world.creature_at(cell).is_some_and(|blocker| {
                    blocker.id != monst.id
                        && !view.can_pass(monst, blocker)
                        && !view.are_teammates(monst, blocker)
                        && !view.are_enemies(monst, blocker)
                })
        });
        let score = here - grid.distance_at(cell);
        if score > best_score
            && !terrain.diagonal_blocked(from, cell)
            && terrain.is_passable_or_secret_door(cell)
            && !blocked
        {
            best = Some(dir);
            best_score = score;
        }
    }
    best
}
