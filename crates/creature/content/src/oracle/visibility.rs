//! Line-of-sight over static terrain.
use creature_core::geometry::line_from;
use creature_core::{Dimensions, Position, TerrainFlags, TerrainOracle, VisibilityOracle};

/// Field of view traced with straight rays from the player.
///
/// Opaque cells are copied out of the terrain once; [`RayVisibility::refresh`]
/// recomputes the visible set whenever the player moves.
#[derive(Clone, Debug)]
pub struct RayVisibility {
    dimensions: Dimensions,
    opaque: Vec<bool>,
    visible: Vec<bool>,
    origin: Option<Position>,
}

impl RayVisibility {
    pub fn new(terrain: &dyn TerrainOracle) -> Self {
        let dimensions = terrain.dimensions();
        let mut opaque = vec![false; dimensions.cell_count()];
        for cell in dimensions.positions() {
            opaque[index(dimensions, cell)] =
                terrain.flags_at(cell).contains(TerrainFlags::OBSTRUCTS_VISION);
        }
        Self {
            dimensions,
            opaque,
            visible: vec![false; dimensions.cell_count()],
            origin: None,
        }
    }

    /// Recomputes the field of view from `origin`.
    ///
    /// A cell is visible when the ray toward it crosses no opaque cell before
    /// arriving, so walls facing the player are seen and what lies behind
    /// them is not.
    pub fn refresh(&mut self, origin: Position) {
        if self.origin == Some(origin) {
            return;
        }
        self.visible.fill(false);
        self.origin = None;
        if !self.dimensions.contains(origin) {
            return;
        }
        for cell in self.dimensions.positions() {
            if self.can_directly_see(origin, cell) {
                self.visible[index(self.dimensions, cell)] = true;
            }
        }
        self.origin = Some(origin);
        tracing::trace!(
            %origin,
            visible = self.visible.iter().filter(|seen| **seen).count(),
            "field of view"
        );
    }

    fn is_opaque(&self, cell: Position) -> bool {
        !self.dimensions.contains(cell) || self.opaque[index(self.dimensions, cell)]
    }
}

impl VisibilityOracle for RayVisibility {
    fn in_field_of_view(&self, cell: Position) -> bool {
        self.dimensions.contains(cell) && self.visible[index(self.dimensions, cell)]
    }

    fn can_directly_see(&self, observer: Position, target: Position) -> bool {
        line_from(observer, target)
            .take_while(|&cell| cell != target)
            .all(|cell| !self.is_opaque(cell))
    }
}

fn index(dimensions: Dimensions, cell: Position) -> usize {
    cell.y as usize * dimensions.width as usize + cell.x as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    fn sight_from(rows: &[&str]) -> RayVisibility {
        let layout = Layout::parse(rows).unwrap();
        let mut sight = RayVisibility::new(&layout.terrain);
        sight.refresh(layout.player);
        sight
    }

    #[test]
    fn walls_cast_shadows() {
        let sight = sight_from(&[
            "#########", //
            "#@..#...#",
            "#.......#",
            "#########",
        ]);
        assert!(sight.in_field_of_view(Position::new(3, 1)));
        assert!(sight.in_field_of_view(Position::new(4, 1)), "the wall itself is seen");
        assert!(!sight.in_field_of_view(Position::new(6, 1)));
        assert!(sight.in_field_of_view(Position::new(7, 2)));
    }

    #[test]
    fn closed_doors_block_sight_into_the_next_room() {
        let sight = sight_from(&[
            "#########", //
            "#@..+...#",
            "#########",
        ]);
        assert!(sight.in_field_of_view(Position::new(4, 1)));
        assert!(!sight.in_field_of_view(Position::new(5, 1)));
    }

    #[test]
    fn sight_between_creatures_is_symmetric_in_an_open_room() {
        let sight = sight_from(&[
            "########", //
            "#@.....#",
            "#......#",
            "########",
        ]);
        let (a, b) = (Position::new(2, 2), Position::new(6, 1));
        assert!(sight.can_directly_see(a, b));
        assert!(sight.can_directly_see(b, a));
        assert!(!sight.can_directly_see(a, Position::new(7, 4)));
    }
}
