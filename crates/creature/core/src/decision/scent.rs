//! Following the player's scent trail.

use crate::creature::Creature;
use crate::env::{ScentOracle, TerrainFlags};
use crate::geometry::{Direction, Position};
use crate::view::WorldView;

const WINDOW: i32 = 5;
const HALF: i32 = WINDOW / 2;

/// Scent values around one cell with local edits layered over the oracle.
///
/// Smoothing only ever touches the cardinal neighbours, so a 5x5 window is
/// enough to hold every value it reads or writes.
struct ScentWindow<'a> {
    oracle: &'a dyn ScentOracle,
    center: Position,
    edits: [[Option<i32>; WINDOW as usize]; WINDOW as usize],
}

impl<'a> ScentWindow<'a> {
    fn new(oracle: &'a dyn ScentOracle, center: Position) -> Self {
        Self {
            oracle,
            center,
            edits: [[None; WINDOW as usize]; WINDOW as usize],
        }
    }

    fn slot(&self, cell: Position) -> Option<(usize, usize)> {
        let dx = cell.x - self.center.x + HALF;
        let dy = cell.y - self.center.y + HALF;
        ((0..WINDOW).contains(&dx) && (0..WINDOW).contains(&dy)).then_some((dx as usize, dy as usize))
    }

    fn get(&self, cell: Position) -> i32 {
        self.slot(cell)
            .and_then(|(x, y)| self.edits[x][y])
            .unwrap_or_else(|| self.oracle.scent_at(cell))
    }

    fn set(&mut self, cell: Position, value: i32) {
        if let Some((x, y)) = self.slot(cell) {
            self.edits[x][y] = Some(value);
        }
    }

    /// Diffuses scent one step into the cardinal neighbours, which unsticks a
    /// tracker caught in a diagonal kink.
    fn smooth(&mut self, in_map: impl Fn(Position) -> bool) {
        for dir in Direction::CARDINAL {
            let near = self.center.step(dir);
            for dir2 in Direction::CARDINAL {
                let far = near.step(dir2);
                if in_map(near) && in_map(far) {
                    let value = self.get(near).max(self.get(far) - 1);
                    self.set(near, value);
                }
            }
        }
    }
}

/// The neighbour with the freshest scent, provided it beats the creature's
/// own cell. Smooths once and retries before giving up.
pub(crate) fn scent_direction(view: &WorldView<'_>, monst: &Creature) -> Option<Direction> {
    let terrain = view.terrain();
    let here = monst.position;
    let mut window = ScentWindow::new(view.ctx.scent, here);
    let mut best_scent = 0;
    let mut best = None;

    for attempt in 0..2 {
        for dir in Direction::ALL {
            let cell = here.step(dir);
            if !terrain.contains(cell) {
                continue;
            }
            let scent = window.get(cell);
            let occupant_ok = view
                .world
                .creature_at(cell)
                .is_none_or(|other| other.is_player || view.can_pass(monst, other));
            if scent > best_scent
                && occupant_ok
                && !terrain.has_flag(cell, TerrainFlags::OBSTRUCTS_PASSABILITY)
                && !terrain.diagonal_blocked(here, cell)
                && !view.avoids(monst, cell)
            {
                best_scent = scent;
                best = Some(dir);
            }
        }
        if best.is_some() && best_scent > window.get(here) {
            return best;
        }
        if attempt == 0 {
            window.smooth(|cell| terrain.contains(cell));
        }
    }
    None
}

/// No open neighbour smells fresher than this cell.
pub(crate) fn is_local_scent_maximum(view: &WorldView<'_>, at: Position) -> bool {
    let terrain = view.terrain();
    let baseline = view.ctx.scent.scent_at(at);
    !Direction::ALL.into_iter().any(|dir| {
        let cell = at.step(dir);
        terrain.contains(cell)
            && view.ctx.scent.scent_at(cell) > baseline
            && !terrain.has_flag(cell, TerrainFlags::OBSTRUCTS_PASSABILITY)
            && !terrain.diagonal_blocked(at, cell)
    })
}
