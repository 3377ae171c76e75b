use std::iter;

use blockfall_engine::{BOARD_HEIGHT, BOARD_WIDTH, Cell, FilledBlock, PieceView, Position};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use crate::ui::widgets::BlockDisplay;

type Grid = [[Cell; BOARD_WIDTH]; BOARD_HEIGHT];

/// The playfield with its locked blocks and the falling piece.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    filled_blocks: &'a [FilledBlock],
    falling_piece: Option<PieceView>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(filled_blocks: &'a [FilledBlock]) -> Self {
        Self {
            filled_blocks,
            falling_piece: None,
            block: None,
        }
    }

    pub fn falling_piece(self, piece: Option<PieceView>) -> Self {
        Self {
            falling_piece: piece,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u16 {
        BOARD_WIDTH as u16 * BlockDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        BOARD_HEIGHT as u16 * BlockDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Builds the grid in screen order: row 0 is the top of the board.
    fn screen_rows(&self) -> Grid {
        let mut grid = [[None; BOARD_WIDTH]; BOARD_HEIGHT];
        let mut put = |position: Position, color| {
            let (Ok(x), Ok(y)) = (usize::try_from(position.x), usize::try_from(position.y))
            else {
                return;
            };
            if x < BOARD_WIDTH && y < BOARD_HEIGHT {
                grid[BOARD_HEIGHT - 1 - y][x] = Some(color);
            }
        };
        for block in self.filled_blocks {
            put(block.position, block.color);
        }
        if let Some(piece) = &self.falling_piece {
            for position in piece.blocks {
                put(position, piece.color);
            }
        }
        grid
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..BOARD_WIDTH).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..BOARD_HEIGHT).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<BOARD_HEIGHT>(&vertical)
            .into_iter()
            .map(|row| row.layout::<BOARD_WIDTH>(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.screen_rows()) {
            for (grid_cell, cell) in iter::zip(grid_row, row) {
                BlockDisplay::from_cell(cell, true).render(grid_cell, buf);
            }
        }
    }
}
