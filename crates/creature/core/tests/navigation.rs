mod common;

use common::AsciiLevel;
use creature_core::{
    AiTuning, Direction, DistanceGrid, Position, StepCost, TerrainFlags, TerrainOracle,
    propagate, terrain_costs,
};

const LEVEL: &[&str] = &[
    "############",
    "#....#.....#",
    "#.##.#.~~..#",
    "#..#...~~#.#",
    "#..#####.#.#",
    "#.......^#.#",
    "############",
];

/// Relaxes every edge until nothing changes: slow, obviously correct.
fn brute_force(costs: &creature_core::CostGrid, source: Position) -> DistanceGrid {
    let dims = costs.dimensions();
    let mut grid = DistanceGrid::unreachable(dims);
    grid[source] = 0;
    loop {
        let mut changed = false;
        for cell in dims.positions() {
            let StepCost::Passable(cost) = costs.effective(cell) else {
                continue;
            };
            for dir in Direction::ALL {
                let from = cell.step(dir);
                if !dims.contains(from) || grid[from] >= AiTuning::UNREACHABLE {
                    continue;
                }
                if dir.is_diagonal() {
                    let (dx, dy) = dir.delta();
                    // corners between `from` and `cell`
                    let a = Position::new(cell.x + dx, cell.y);
                    let b = Position::new(cell.x, cell.y + dy);
                    if costs.effective(a).blocks_diagonals() || costs.effective(b).blocks_diagonals() {
                        continue;
                    }
                }
                let candidate = grid[from] + cost;
                if candidate < grid[cell] {
                    grid[cell] = candidate;
                    changed = true;
                }
            }
        }
        if !changed {
            return grid;
        }
    }
}

#[test]
fn propagation_matches_exhaustive_relaxation() {
    let level = AsciiLevel::parse(LEVEL);
    let costs = terrain_costs(&level, TerrainFlags::PATHING_BLOCKER);
    for source in [Position::new(1, 1), Position::new(10, 5), Position::new(6, 3)] {
        let mut grid = DistanceGrid::unreachable(level.dimensions());
        propagate(&mut grid, &[source], &costs, true);
        let expected = brute_force(&costs, source);
        for (cell, &value) in grid.iter() {
            assert_eq!(value, expected[cell], "from {source} at {cell}");
        }
    }
}

#[test]
fn walls_and_blocked_terrain_stay_unreachable() {
    let level = AsciiLevel::parse(LEVEL);
    let costs = terrain_costs(&level, TerrainFlags::PATHING_BLOCKER);
    let mut grid = DistanceGrid::unreachable(level.dimensions());
    propagate(&mut grid, &[Position::new(1, 1)], &costs, true);

    assert_eq!(grid[Position::new(0, 0)], AiTuning::UNREACHABLE);
    assert_eq!(grid[Position::new(2, 2)], AiTuning::UNREACHABLE);
    assert_eq!(grid[Position::new(7, 2)], AiTuning::UNREACHABLE, "deep water is forbidden");
    assert!(grid[Position::new(10, 5)] < AiTuning::UNREACHABLE);
}

#[test]
fn several_sources_take_the_nearest() {
    let level = AsciiLevel::room(12, 7);
    let costs = terrain_costs(&level, TerrainFlags::PATHING_BLOCKER);
    let mut grid = DistanceGrid::unreachable(level.dimensions());
    propagate(&mut grid, &[Position::new(1, 3), Position::new(10, 3)], &costs, true);
    assert_eq!(grid[Position::new(3, 3)], 2);
    assert_eq!(grid[Position::new(8, 3)], 2);
    assert_eq!(grid[Position::new(5, 3)], 4);
}

#[test]
fn diagonal_around_a_wall_corner_is_refused() {
    let level = AsciiLevel::parse(&[
        "#####", //
        "#..##",
        "##..#",
        "#####",
    ]);
    let costs = terrain_costs(&level, TerrainFlags::PATHING_BLOCKER);
    let mut grid = DistanceGrid::unreachable(level.dimensions());
    propagate(&mut grid, &[Position::new(1, 1)], &costs, true);
    // (2,2) is reachable only through (2,1), never by cutting the corner.
    assert_eq!(grid[Position::new(2, 2)], 2);
    assert_eq!(grid[Position::new(3, 2)], 3);
}
