use crate::geometry::Position;
use crate::grid::Grid;

/// Price of entering a cell during propagation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepCost {
    /// Enterable at the given positive cost.
    Passable(i32),
    /// Not enterable, but diagonal moves may cut past it.
    Forbidden,
    /// Not enterable, and it also blocks diagonal moves around its corners.
    Obstruction,
}

impl StepCost {
    pub const fn is_passable(self) -> bool {
        matches!(self, StepCost::Passable(_))
    }

    pub const fn blocks_diagonals(self) -> bool {
        matches!(self, StepCost::Obstruction)
    }
}

impl Default for StepCost {
    fn default() -> Self {
        StepCost::Passable(1)
    }
}

pub type CostGrid = Grid<StepCost>;

impl CostGrid {
    /// Cost of a cell, treating the map border and the outside as obstructions.
    pub fn effective(&self, position: Position) -> StepCost {
        let dims = self.dimensions();
        if !dims.contains(position) || dims.is_border(position) {
            return StepCost::Obstruction;
        }
        self[position]
    }
}
