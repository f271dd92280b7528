use crate::config::AiTuning;
use crate::env::{TerrainFlags, TerrainOracle};
use crate::geometry::Position;
use crate::grid::{DistanceGrid, propagate, terrain_costs};

/// Patrol points scattered over the level, each with its distance grid.
///
/// Wandering creatures pick one as a destination and descend its grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaypointSet {
    points: Vec<Position>,
    grids: Vec<DistanceGrid>,
}

impl WaypointSet {
    /// Computes a distance grid for every point. Extra points beyond
    /// [`AiTuning::MAX_WAYPOINTS`] are dropped.
    pub fn build(terrain: &dyn TerrainOracle, points: &[Position]) -> Self {
        let dims = terrain.dimensions();
        let costs = terrain_costs(terrain, TerrainFlags::PATHING_BLOCKER | TerrainFlags::HARMFUL_TERRAIN);
        let mut set = Self::default();
        for &point in points.iter().take(AiTuning::MAX_WAYPOINTS) {
            let mut grid = DistanceGrid::unreachable(dims);
            propagate(&mut grid, &[point], &costs, true);
            set.points.push(point);
            set.grids.push(grid);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<Position> {
        self.points.get(index).copied()
    }

    pub fn grid(&self, index: usize) -> Option<&DistanceGrid> {
        self.grids.get(index)
    }

    /// Walking distance from a cell to a waypoint.
    pub fn distance(&self, index: usize, from: Position) -> i32 {
        self.grids
            .get(index)
            .map_or(AiTuning::UNREACHABLE, |grid| grid.distance_at(from))
    }

    /// Waypoint with the smallest walking distance to a cell, ignoring visit state.
    pub fn closest_to(&self, cell: Position) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        for index in 0..self.len() {
            let distance = self.distance(index, cell);
            if distance < AiTuning::PERCEPTION_CAP && best.is_none_or(|(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Which waypoints a creature has already reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaypointVisits(u64);

impl WaypointVisits {
    pub fn is_visited(&self, index: usize) -> bool {
        index < AiTuning::MAX_WAYPOINTS && self.0 & (1 << index) != 0
    }

    pub fn mark(&mut self, index: usize) {
        if index < AiTuning::MAX_WAYPOINTS {
            self.0 |= 1 << index;
        }
    }

    pub fn clear(&mut self, index: usize) {
        if index < AiTuning::MAX_WAYPOINTS {
            self.0 &= !(1 << index);
        }
    }

    pub fn clear_all(&mut self) {
        self.0 = 0;
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }
}
