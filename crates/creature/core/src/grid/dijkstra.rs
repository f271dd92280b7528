//! Shortest-path propagation over cost grids.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::config::AiTuning;
use crate::geometry::{Direction, Position};
use crate::grid::{CostGrid, DistanceGrid, StepCost};

/// Fills `grid` with walking distances to the nearest source.
///
/// Every cell starts unreachable, sources start at zero, and the border ring
/// is never entered. A diagonal step is refused when either orthogonal cell it
/// cuts past is an [`StepCost::Obstruction`].
pub fn propagate(
    grid: &mut DistanceGrid,
    sources: &[Position],
    costs: &CostGrid,
    allow_diagonals: bool,
) {
    debug_assert_eq!(grid.dimensions(), costs.dimensions());
    grid.fill(AiTuning::UNREACHABLE);
    let dims = grid.dimensions();
    let mut seeds = Vec::with_capacity(sources.len());
    for &source in sources {
        if dims.contains(source) && !dims.is_border(source) {
            grid[source] = 0;
            seeds.push(source);
        }
    }
    relax(grid, costs, allow_diagonals, seeds);
}

/// Re-propagates a grid whose cells already hold goal values.
///
/// Every enterable cell below the unreachable sentinel acts as a source with
/// its current value, so negative seeds (as in flee maps) work too.
pub fn rescan(grid: &mut DistanceGrid, costs: &CostGrid, allow_diagonals: bool) {
    debug_assert_eq!(grid.dimensions(), costs.dimensions());
    let seeds: Vec<Position> = grid
        .dimensions()
        .positions()
        .filter(|&p| costs.effective(p).is_passable() && grid[p] < AiTuning::UNREACHABLE)
        .collect();
    relax(grid, costs, allow_diagonals, seeds);
}

fn relax(grid: &mut DistanceGrid, costs: &CostGrid, allow_diagonals: bool, seeds: Vec<Position>) {
    let directions: &[Direction] = if allow_diagonals {
        &Direction::ALL
    } else {
        &Direction::CARDINAL
    };

    // (distance, insertion order, cell); the sequence number keeps ties deterministic.
    let mut frontier = BinaryHeap::new();
    let mut sequence: u64 = 0;
    for seed in seeds {
        frontier.push(Reverse((grid[seed], sequence, seed)));
        sequence += 1;
    }

    while let Some(Reverse((distance, _, head))) = frontier.pop() {
        if distance > grid[head] {
            continue;
        }
        for &direction in directions {
            let next = head.step(direction);
            let StepCost::Passable(cost) = costs.effective(next) else {
                continue;
            };
            if direction.is_diagonal() {
                let (dx, dy) = direction.delta();
                if costs.effective(head.offset(dx, 0)).blocks_diagonals()
                    || costs.effective(head.offset(0, dy)).blocks_diagonals()
                {
                    continue;
                }
            }
            let candidate = distance.saturating_add(cost).min(AiTuning::UNREACHABLE);
            if candidate < grid[next] {
                grid[next] = candidate;
                frontier.push(Reverse((candidate, sequence, next)));
                sequence += 1;
            }
        }
    }
}
