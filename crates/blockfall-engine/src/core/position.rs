use serde::{Deserialize, Serialize};

/// A cell coordinate on the board.
///
/// `x` grows to the right and `y` grows upward: `y = 0` is the bottom row,
/// so gravity moves pieces toward decreasing `y`.
///
/// Positions are plain values. Translation produces a new position:
///
/// ```
/// use blockfall_engine::Position;
///
/// let anchor = Position::new(4, 16);
/// assert_eq!(anchor + Position::new(1, -1), Position::new(5, 15));
/// assert_eq!(anchor - Position::new(4, 16), Position::ORIGIN);
/// ```
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this position shifted by `(dx, dy)`.
    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_sub_are_inverse() {
        let a = Position::new(3, -2);
        let b = Position::new(-7, 5);
        assert_eq!(a + b - b, a);
        assert_eq!(a - a, Position::ORIGIN);
    }

    #[test]
    fn test_translated_matches_add() {
        let p = Position::new(4, 16);
        assert_eq!(p.translated(0, -1), p + Position::new(0, -1));
        assert_eq!(p.translated(-2, 3), Position::new(2, 19));
    }

    #[test]
    fn test_equality_is_by_value() {
        assert_eq!(Position::from((1, 2)), Position::new(1, 2));
        assert_ne!(Position::new(1, 2), Position::new(2, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(-1, 7).to_string(), "(-1, 7)");
    }
}
