use crate::geometry::Position;

/// The player's view of the level, computed elsewhere each turn.
pub trait VisibilityOracle {
    /// Whether the cell is inside the player's current field of view.
    fn in_field_of_view(&self, cell: Position) -> bool;

    /// Whether an observer at one cell has a direct line of sight to another.
    fn can_directly_see(&self, observer: Position, target: Position) -> bool;
}
