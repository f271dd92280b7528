//! Grid geometry: positions, the eight compass directions, distance metrics and
//! straight-line tracing.

use core::fmt;

/// Cell coordinate on the dungeon grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Adjacent cell in the given direction. May lie outside the map.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev distance; diagonal steps count as one.
    pub fn distance_to(self, other: Self) -> i32 {
        distance_between(self, other)
    }

    pub fn is_adjacent_to(self, other: Self) -> bool {
        distance_between(self, other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Extent of the dungeon grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    /// True for cells on the outermost ring. Those cells are never walkable.
    pub fn is_border(&self, position: Position) -> bool {
        position.x == 0
            || position.y == 0
            || position.x == self.width as i32 - 1
            || position.y == self.height as i32 - 1
    }

    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Larger of the two extents, used as an "effectively infinite" radius.
    pub fn span(&self) -> i32 {
        self.width.max(self.height) as i32
    }

    /// Every cell in scan order: columns left to right, each column top to bottom.
    pub fn positions(self) -> impl Iterator<Item = Position> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..width).flat_map(move |x| (0..height).map(move |y| Position::new(x, y)))
    }
}

/// The eight compass directions. The first four are cardinal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    DownLeft,
    UpRight,
    DownRight,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::DownLeft,
        Direction::UpRight,
        Direction::DownRight,
    ];

    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::UpLeft => (-1, -1),
            Direction::DownLeft => (-1, 1),
            Direction::UpRight => (1, -1),
            Direction::DownRight => (1, 1),
        }
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::UpLeft | Direction::DownLeft | Direction::UpRight | Direction::DownRight
        )
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.delta() == (dx, dy))
    }

    /// Direction of a single step from `from` toward `to`, using the sign of each axis.
    pub fn toward(from: Position, to: Position) -> Option<Self> {
        Self::from_delta((to.x - from.x).signum(), (to.y - from.y).signum())
    }
}

/// Chebyshev distance.
pub fn distance_between(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Distance in scent units: twice the major axis plus the minor axis.
///
/// Roughly double a Euclidean estimate, so it compares directly against scent
/// ages which advance by three per turn.
pub fn scent_distance(a: Position, b: Position) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if dx > dy { 2 * dx + dy } else { dx + 2 * dy }
}

/// Cells visited by a straight line leaving `origin` through `target`.
///
/// The origin itself is excluded and the line keeps going past the target, so
/// callers stop it with `take_while` or `take`. Yields nothing when both points
/// coincide.
pub fn line_from(origin: Position, target: Position) -> LineCells {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    LineCells {
        origin,
        dx,
        dy,
        steps: dx.abs().max(dy.abs()),
        index: 0,
    }
}

/// Iterator returned by [`line_from`].
#[derive(Clone, Debug)]
pub struct LineCells {
    origin: Position,
    dx: i32,
    dy: i32,
    steps: i32,
    index: i32,
}

impl Iterator for LineCells {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.steps == 0 {
            return None;
        }
        self.index += 1;
        let i = self.index;
        Some(Position::new(
            self.origin.x + div_round(self.dx * i, self.steps),
            self.origin.y + div_round(self.dy * i, self.steps),
        ))
    }
}

/// Integer division rounding half away from zero.
fn div_round(numerator: i32, denominator: i32) -> i32 {
    let doubled = 2 * numerator.abs() + denominator;
    let magnitude = doubled / (2 * denominator);
    if numerator < 0 { -magnitude } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scent_distance_weights_major_axis() {
        let origin = Position::new(10, 10);
        assert_eq!(scent_distance(origin, Position::new(13, 11)), 7);
        assert_eq!(scent_distance(origin, Position::new(11, 13)), 7);
        assert_eq!(scent_distance(origin, Position::new(12, 12)), 6);
        assert_eq!(scent_distance(origin, origin), 0);
    }

    #[test]
    fn line_passes_through_target_and_beyond() {
        let origin = Position::new(0, 0);
        let target = Position::new(4, 2);
        let cells: Vec<_> = line_from(origin, target).take(8).collect();
        assert_eq!(cells[3], target);
        assert_eq!(cells[7], Position::new(8, 4));
        for pair in cells.windows(2) {
            assert_eq!(distance_between(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn line_to_self_is_empty() {
        let p = Position::new(3, 3);
        assert_eq!(line_from(p, p).next(), None);
    }

    #[test]
    fn toward_uses_axis_signs() {
        let from = Position::new(5, 5);
        assert_eq!(
            Direction::toward(from, Position::new(9, 2)),
            Some(Direction::UpRight)
        );
        assert_eq!(Direction::toward(from, Position::new(5, 9)), Some(Direction::Down));
        assert_eq!(Direction::toward(from, from), None);
    }

    #[test]
    fn scan_order_is_column_major() {
        let dims = Dimensions::new(2, 3);
        let order: Vec<_> = dims.positions().collect();
        assert_eq!(order[0], Position::new(0, 0));
        assert_eq!(order[1], Position::new(0, 1));
        assert_eq!(order[3], Position::new(1, 0));
        assert_eq!(order.len(), 6);
    }
}
