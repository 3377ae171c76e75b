use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::position::Position;

/// A tetromino at a specific anchor and orientation.
///
/// Pieces are immutable values: [`translated`](Self::translated) and
/// [`rotated`](Self::rotated) return new candidates and never touch the
/// original, so a candidate can be validated against the board before it
/// replaces the committed piece.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Piece, PieceKind, Position};
///
/// let piece = Piece::new(PieceKind::T, Position::new(4, 16));
/// let candidate = piece.translated(0, -1).rotated();
///
/// assert_eq!(piece.anchor(), Position::new(4, 16));
/// assert_eq!(candidate.anchor(), Position::new(4, 15));
/// assert_eq!(candidate.rotation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    anchor: Position,
    rotation: PieceRotation,
    color: PieceColor,
    blocks: [Position; 4],
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind, anchor: Position) -> Self {
        Self {
            kind,
            anchor,
            rotation: PieceRotation::default(),
            color: kind.color(),
            blocks: kind.shape(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn color(&self) -> PieceColor {
        self.color
    }

    /// Blocks relative to the anchor, before rotation.
    #[must_use]
    pub fn blocks(&self) -> &[Position; 4] {
        &self.blocks
    }

    /// Board coordinates currently covered by this piece.
    #[must_use]
    pub fn absolute_blocks(&self) -> [Position; 4] {
        self.blocks
            .map(|block| self.rotation.apply(block) + self.anchor)
    }

    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            anchor: self.anchor.translated(dx, dy),
            ..*self
        }
    }

    /// Returns the candidate rotated a quarter turn.
    ///
    /// No wall kick is attempted; callers reject the candidate when it collides.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }

    /// Returns the same piece moved to a new anchor with its rotation reset.
    #[must_use]
    pub fn respawned_at(&self, anchor: Position) -> Self {
        Self::new(self.kind, anchor)
    }
}

/// Rotation state of a piece.
///
/// One of four quarter-turn states. Rotation is a cyclic group of order 4,
/// so every operation wraps modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    /// Creates a rotation state, reducing `quarter_turns` modulo 4.
    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    /// Rotates `block` around the origin by this state's quarter turns.
    ///
    /// - 0: `(x, y)`
    /// - 1: `(-y, x)`
    /// - 2: `(-x, -y)`
    /// - 3: `(y, -x)`
    #[must_use]
    pub const fn apply(self, block: Position) -> Position {
        let Position { x, y } = block;
        match self.0 % 4 {
            0 => Position::new(x, y),
            1 => Position::new(-y, x),
            2 => Position::new(-x, -y),
            _ => Position::new(y, -x),
        }
    }
}

/// Fixed color of each piece kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum PieceColor {
    #[display("cyan")]
    Cyan,
    #[display("yellow")]
    Yellow,
    #[display("purple")]
    Purple,
    #[display("green")]
    Green,
    #[display("red")]
    Red,
    #[display("blue")]
    Blue,
    #[display("orange")]
    Orange,
}

impl PieceColor {
    /// Returns the color as a `#RRGGBB` string.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            PieceColor::Cyan => "#00FFFF",
            PieceColor::Yellow => "#FFFF00",
            PieceColor::Purple => "#800080",
            PieceColor::Green => "#00FF00",
            PieceColor::Red => "#FF0000",
            PieceColor::Blue => "#0000FF",
            PieceColor::Orange => "#FFA500",
        }
    }

    /// Returns the color as an `(r, g, b)` triple.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            PieceColor::Cyan => (0x00, 0xFF, 0xFF),
            PieceColor::Yellow => (0xFF, 0xFF, 0x00),
            PieceColor::Purple => (0x80, 0x00, 0x80),
            PieceColor::Green => (0x00, 0xFF, 0x00),
            PieceColor::Red => (0xFF, 0x00, 0x00),
            PieceColor::Blue => (0x00, 0x00, 0xFF),
            PieceColor::Orange => (0xFF, 0xA5, 0x00),
        }
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

/// Uniform choice among the seven kinds, independent of history.
impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; PieceKind::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Canonical blocks of this kind at rotation 0, relative to the anchor.
    #[must_use]
    pub const fn shape(self) -> [Position; 4] {
        PIECE_SHAPES[self as usize]
    }

    #[must_use]
    pub const fn color(self) -> PieceColor {
        match self {
            PieceKind::I => PieceColor::Cyan,
            PieceKind::O => PieceColor::Yellow,
            PieceKind::T => PieceColor::Purple,
            PieceKind::S => PieceColor::Green,
            PieceKind::Z => PieceColor::Red,
            PieceKind::J => PieceColor::Blue,
            PieceKind::L => PieceColor::Orange,
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('L'), Some(PieceKind::L));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

const PIECE_SHAPES: [[Position; 4]; PieceKind::LEN] = {
    const fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }
    [
        // I-piece
        [p(0, 0), p(1, 0), p(2, 0), p(3, 0)],
        // O-piece
        [p(0, 0), p(1, 0), p(0, 1), p(1, 1)],
        // T-piece
        [p(1, 0), p(0, 1), p(1, 1), p(2, 1)],
        // S-piece
        [p(1, 0), p(2, 0), p(0, 1), p(1, 1)],
        // Z-piece
        [p(0, 0), p(1, 0), p(1, 1), p(2, 1)],
        // J-piece
        [p(0, 0), p(0, 1), p(1, 1), p(2, 1)],
        // L-piece
        [p(2, 0), p(0, 1), p(1, 1), p(2, 1)],
    ]
};
