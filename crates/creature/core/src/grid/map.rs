use core::ops::{Index, IndexMut};

use crate::config::AiTuning;
use crate::geometry::{Dimensions, Position};

/// Dense per-cell storage covering the whole level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid<T> {
    dims: Dimensions,
    cells: Vec<T>,
}

/// Walking distances (or any per-cell score) toward some goal.
pub type DistanceGrid = Grid<i32>;

impl<T: Clone> Grid<T> {
    pub fn filled(dims: Dimensions, value: T) -> Self {
        Self {
            dims,
            cells: vec![value; dims.cell_count()],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    fn slot(&self, position: Position) -> Option<usize> {
        self.dims
            .contains(position)
            .then(|| position.y as usize * self.dims.width as usize + position.x as usize)
    }

    pub fn get(&self, position: Position) -> Option<&T> {
        self.slot(position).map(|slot| &self.cells[slot])
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        self.slot(position).map(move |slot| &mut self.cells[slot])
    }

    /// Writes a cell. Out-of-range writes are ignored and reported as `false`.
    pub fn set(&mut self, position: Position, value: T) -> bool {
        match self.get_mut(position) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Cells paired with their positions, in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        self.dims.positions().map(move |p| (p, &self[p]))
    }
}

impl DistanceGrid {
    /// A grid where every cell is unreachable.
    pub fn unreachable(dims: Dimensions) -> Self {
        Self::filled(dims, AiTuning::UNREACHABLE)
    }

    /// Value at a cell, or the unreachable sentinel outside the map.
    pub fn distance_at(&self, position: Position) -> i32 {
        self.get(position)
            .copied()
            .unwrap_or(AiTuning::UNREACHABLE)
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    fn index(&self, position: Position) -> &T {
        match self.slot(position) {
            Some(slot) => &self.cells[slot],
            None => panic!("grid access at {position} outside {:?}", self.dims),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    fn index_mut(&mut self, position: Position) -> &mut T {
        match self.slot(position) {
            Some(slot) => &mut self.cells[slot],
            None => panic!("grid access at {position} outside {:?}", self.dims),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_bounds_checked() {
        let grid = Grid::filled(Dimensions::new(4, 3), 7);
        assert_eq!(grid.get(Position::new(3, 2)), Some(&7));
        assert_eq!(grid.get(Position::new(4, 0)), None);
        assert_eq!(grid.get(Position::new(0, -1)), None);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn indexing_out_of_range_panics() {
        let grid = Grid::filled(Dimensions::new(2, 2), 0);
        let _ = grid[Position::new(5, 5)];
    }

    #[test]
    fn distance_outside_is_unreachable() {
        let grid = DistanceGrid::filled(Dimensions::new(2, 2), 0);
        assert_eq!(grid.distance_at(Position::new(-1, 0)), AiTuning::UNREACHABLE);
    }
}
