use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{
    piece::{Piece, PieceColor},
    position::Position,
};

/// Board width in cells.
pub const BOARD_WIDTH: usize = 10;

/// Board height in cells.
pub const BOARD_HEIGHT: usize = 20;

/// Anchor of every freshly spawned piece: `(width / 2 - 1, height - 4)`.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const SPAWN_POSITION: Position =
    Position::new(BOARD_WIDTH as i32 / 2 - 1, BOARD_HEIGHT as i32 - 4);

/// A single grid slot: empty, or holding the color of a locked block.
pub type Cell = Option<PieceColor>;

type Column = [Cell; BOARD_HEIGHT];
type Grid = [Column; BOARD_WIDTH];

const EMPTY_GRID: Grid = [[None; BOARD_HEIGHT]; BOARD_WIDTH];

/// A locked block, as handed out to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledBlock {
    pub position: Position,
    pub color: PieceColor,
}

/// The fixed 10×20 playfield holding only locked blocks.
///
/// The grid is indexed `[x][y]` with `y = 0` at the bottom. The board never
/// holds a live piece; the falling piece is owned by the game state and only
/// its cells are written here when it locks.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Piece, PieceKind, Position};
///
/// let mut board = Board::new();
/// let piece = Piece::new(PieceKind::I, Position::new(0, 0));
///
/// assert!(board.is_valid_position(&piece));
/// board.place_piece(&piece);
/// assert!(!board.is_valid_position(&piece));
/// assert_eq!(board.filled_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    /// Creates an empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self { grid: EMPTY_GRID }
    }

    fn index(position: Position) -> Option<(usize, usize)> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        (x < BOARD_WIDTH && y < BOARD_HEIGHT).then_some((x, y))
    }

    /// Returns the cell at `position`, or `None` when it lies outside the board.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<Cell> {
        Self::index(position).map(|(x, y)| self.grid[x][y])
    }

    /// Returns `true` if every block of `piece` is inside the board and on an
    /// empty cell.
    #[must_use]
    pub fn is_valid_position(&self, piece: &Piece) -> bool {
        piece
            .absolute_blocks()
            .into_iter()
            .all(|block| matches!(self.cell(block), Some(None)))
    }

    /// Writes the piece's color into every in-bounds cell it covers.
    ///
    /// Blocks outside the board are ignored; callers are expected to have
    /// checked [`is_valid_position`](Self::is_valid_position) first.
    pub fn place_piece(&mut self, piece: &Piece) {
        for block in piece.absolute_blocks() {
            if let Some((x, y)) = Self::index(block) {
                self.grid[x][y] = Some(piece.color());
            }
        }
    }

    fn is_row_complete(&self, y: usize) -> bool {
        self.grid.iter().all(|column| column[y].is_some())
    }

    /// Returns the indices of fully occupied rows, bottom to top.
    #[must_use]
    pub fn completed_lines(&self) -> ArrayVec<usize, BOARD_HEIGHT> {
        (0..BOARD_HEIGHT)
            .filter(|&y| self.is_row_complete(y))
            .collect()
    }

    /// Removes `rows` and compacts the remaining rows downward.
    ///
    /// Rows not listed keep their relative order and are packed from row 0
    /// upward; the vacated rows at the top are left empty. The grid is
    /// rebuilt aside and swapped in with a single assignment. Passing no rows
    /// leaves the board untouched.
    pub fn clear_lines(&mut self, rows: &[usize]) {
        if rows.is_empty() {
            return;
        }

        let mut grid = EMPTY_GRID;
        let kept_rows = (0..BOARD_HEIGHT).filter(|y| !rows.contains(y));
        for (target_y, source_y) in kept_rows.enumerate() {
            for (target, source) in grid.iter_mut().zip(&self.grid) {
                target[target_y] = source[source_y];
            }
        }
        self.grid = grid;
    }

    /// Returns a copy of every occupied cell, column by column.
    #[must_use]
    pub fn filled_blocks(&self) -> Vec<FilledBlock> {
        Self::positions()
            .filter_map(|position| {
                let color = self.cell(position).flatten()?;
                Some(FilledBlock { position, color })
            })
            .collect()
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn positions() -> impl Iterator<Item = Position> {
        (0..BOARD_WIDTH).flat_map(|x| {
            (0..BOARD_HEIGHT).map(move |y| Position::new(x as i32, y as i32))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::core::piece::PieceKind;

    use super::*;

    /// Fills row `y` with `color`, leaving the columns in `holes` empty.
    fn fill_row(board: &mut Board, y: usize, color: PieceColor, holes: &[usize]) {
        for x in (0..BOARD_WIDTH).filter(|x| !holes.contains(x)) {
            board.grid[x][y] = Some(color);
        }
    }

    fn row(board: &Board, y: usize) -> [Cell; BOARD_WIDTH] {
        std::array::from_fn(|x| board.grid[x][y])
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.filled_count(), 0);
        assert!(board.filled_blocks().is_empty());
        assert!(board.completed_lines().is_empty());
    }

    #[test]
    fn test_spawn_position() {
        assert_eq!(SPAWN_POSITION, Position::new(4, 16));
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let board = Board::new();
        assert_eq!(board.cell(Position::new(0, 0)), Some(None));
        assert_eq!(board.cell(Position::new(-1, 0)), None);
        assert_eq!(board.cell(Position::new(0, -1)), None);
        assert_eq!(board.cell(Position::new(10, 0)), None);
        assert_eq!(board.cell(Position::new(0, 20)), None);
    }

    #[test]
    fn test_is_valid_position_bounds() {
        let board = Board::new();
        let piece = Piece::new(PieceKind::I, Position::new(0, 0));
        assert!(board.is_valid_position(&piece));
        assert!(board.is_valid_position(&piece.translated(6, 19)));
        assert!(!board.is_valid_position(&piece.translated(7, 0)));
        assert!(!board.is_valid_position(&piece.translated(-1, 0)));
        assert!(!board.is_valid_position(&piece.translated(0, -1)));
        assert!(!board.is_valid_position(&piece.translated(0, 20)));
    }

    #[test]
    fn test_is_valid_position_collision() {
        let mut board = Board::new();
        board.grid[5][3] = Some(PieceColor::Red);
        let piece = Piece::new(PieceKind::O, Position::new(4, 2));
        assert!(!board.is_valid_position(&piece));
        assert!(board.is_valid_position(&piece.translated(-2, 0)));
    }

    #[test]
    fn test_place_piece_writes_color() {
        let mut board = Board::new();
        let piece = Piece::new(PieceKind::T, Position::new(3, 0));
        board.place_piece(&piece);

        let mut blocks = board.filled_blocks();
        blocks.sort_by_key(|b| (b.position.y, b.position.x));
        let expected = [(4, 0), (3, 1), (4, 1), (5, 1)].map(|(x, y)| FilledBlock {
            position: Position::new(x, y),
            color: PieceColor::Purple,
        });
        assert_eq!(blocks, expected);
    }

    #[test]
    fn test_place_piece_ignores_out_of_bounds_blocks() {
        let mut board = Board::new();
        let piece = Piece::new(PieceKind::I, Position::new(8, 19));
        board.place_piece(&piece);
        assert_eq!(board.filled_count(), 2);
        assert_eq!(board.cell(Position::new(8, 19)), Some(Some(PieceColor::Cyan)));
        assert_eq!(board.cell(Position::new(9, 19)), Some(Some(PieceColor::Cyan)));
    }

    #[test]
    fn test_completed_lines_ascending() {
        let mut board = Board::new();
        fill_row(&mut board, 7, PieceColor::Blue, &[]);
        fill_row(&mut board, 2, PieceColor::Red, &[]);
        fill_row(&mut board, 4, PieceColor::Green, &[3]);
        assert_eq!(board.completed_lines().as_slice(), &[2, 7]);
    }

    #[test]
    fn test_complete_bottom_row_scenario() {
        let mut board = Board::new();
        // Row 0 filled by placements: two I-pieces, then an O-piece on columns 8-9.
        board.place_piece(&Piece::new(PieceKind::I, Position::new(0, 0)));
        board.place_piece(&Piece::new(PieceKind::I, Position::new(4, 0)));
        board.place_piece(&Piece::new(PieceKind::O, Position::new(8, 0)));
        // Row 1 has one gap at column 0.
        fill_row(&mut board, 1, PieceColor::Green, &[0, 8, 9]);

        assert_eq!(board.completed_lines().as_slice(), &[0]);
        let row1 = row(&board, 1);

        board.clear_lines(&[0]);

        assert_eq!(row(&board, 0), row1);
        assert_eq!(row(&board, 0)[0], None);
        assert_eq!(row(&board, BOARD_HEIGHT - 1), [None; BOARD_WIDTH]);
        assert!(board.completed_lines().is_empty());
    }

    #[test]
    fn test_clear_lines_empty_is_noop() {
        let mut board = Board::new();
        fill_row(&mut board, 0, PieceColor::Red, &[]);
        fill_row(&mut board, 5, PieceColor::Blue, &[2]);
        let before = board.clone();
        board.clear_lines(&[]);
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_lines_preserves_order_and_count() {
        let mut board = Board::new();
        let colors = [
            PieceColor::Cyan,
            PieceColor::Yellow,
            PieceColor::Purple,
            PieceColor::Green,
            PieceColor::Red,
            PieceColor::Blue,
            PieceColor::Orange,
        ];
        // Partial rows with distinct colors and a hole at a distinct column.
        for (y, color) in colors.iter().enumerate() {
            fill_row(&mut board, y, *color, &[y]);
        }
        fill_row(&mut board, 1, PieceColor::Red, &[]);
        fill_row(&mut board, 4, PieceColor::Red, &[]);
        fill_row(&mut board, 6, PieceColor::Red, &[]);

        let before_count = board.filled_count();
        let survivors: Vec<_> = [0, 2, 3, 5].map(|y| row(&board, y)).to_vec();

        let cleared = board.completed_lines();
        assert_eq!(cleared.as_slice(), &[1, 4, 6]);
        board.clear_lines(&cleared);

        assert_eq!(board.filled_count(), before_count - BOARD_WIDTH * cleared.len());
        for (y, expected) in survivors.iter().enumerate() {
            assert_eq!(&row(&board, y), expected, "row {y}");
        }
        for y in survivors.len()..BOARD_HEIGHT {
            assert_eq!(row(&board, y), [None; BOARD_WIDTH], "row {y}");
        }
    }

    #[test]
    fn test_clear_lines_ignores_out_of_range_rows() {
        let mut board = Board::new();
        fill_row(&mut board, 0, PieceColor::Red, &[4]);
        let before = board.clone();
        board.clear_lines(&[BOARD_HEIGHT + 3]);
        assert_eq!(board, before);
    }

    #[test]
    fn test_filled_blocks_is_a_copy() {
        let mut board = Board::new();
        board.place_piece(&Piece::new(PieceKind::O, Position::new(0, 0)));
        let mut blocks = board.filled_blocks();
        blocks.clear();
        assert_eq!(board.filled_blocks().len(), 4);
    }
}
