use blockfall_engine::{PieceView, Position};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::BlockDisplay;

/// Preview of a single piece, centered in its panel.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceView>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: Option<PieceView>) -> Self {
        Self { piece, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Shifts `blocks` so the bounding box starts at the origin.
///
/// Returns the shifted blocks with the box width and height.
fn normalize(blocks: [Position; 4]) -> ([Position; 4], (u16, u16)) {
    let min_x = blocks.iter().map(|p| p.x).min().unwrap_or(0);
    let min_y = blocks.iter().map(|p| p.y).min().unwrap_or(0);
    let shifted = blocks.map(|p| p.translated(-min_x, -min_y));
    let extent = |coord: fn(&Position) -> i32| {
        let max = shifted.iter().map(coord).max().unwrap_or(0);
        u16::try_from(max + 1).unwrap_or(0)
    };
    let size = (extent(|p| p.x), extent(|p| p.y));
    (shifted, size)
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(piece) = self.piece else {
            return;
        };
        let (blocks, (width, height)) = normalize(piece.blocks);
        let piece_area = area.centered(
            Constraint::Length(width * BlockDisplay::width()),
            Constraint::Length(height * BlockDisplay::height()),
        );

        let col_constraints = (0..width).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..height).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        let occupied_block = BlockDisplay::from_cell(Some(piece.color), false);
        let empty_block = BlockDisplay::from_cell(None, false);
        for (row, grid_row) in grid_rows.enumerate() {
            // Screen rows run top-down; piece rows run bottom-up.
            let y = i32::from(height) - 1 - i32::try_from(row).unwrap_or(0);
            for (x, grid_cell) in grid_row.into_iter().enumerate() {
                let position = Position::new(i32::try_from(x).unwrap_or(0), y);
                if blocks.contains(&position) {
                    Widget::render(&occupied_block, grid_cell, buf);
                } else {
                    Widget::render(&empty_block, grid_cell, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{Piece, PieceColor, PieceKind, SPAWN_POSITION};

    use crate::ui::widgets::color;

    use super::*;

    #[test]
    fn test_normalize_shapes() {
        let view = PieceView::from(&Piece::new(PieceKind::I, SPAWN_POSITION));
        let (blocks, size) = normalize(view.blocks);
        assert_eq!(size, (4, 1));
        assert_eq!(blocks[0], Position::ORIGIN);

        let rotated = Piece::new(PieceKind::I, SPAWN_POSITION).rotated();
        let (_, size) = normalize(PieceView::from(&rotated).blocks);
        assert_eq!(size, (1, 4));

        let view = PieceView::from(&Piece::new(PieceKind::T, SPAWN_POSITION));
        assert_eq!(normalize(view.blocks).1, (3, 2));
    }

    #[test]
    fn test_renders_t_piece_upright() {
        let piece = PieceView::from(&Piece::new(PieceKind::T, SPAWN_POSITION));
        let display = PieceDisplay::new().piece(Some(piece));
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);

        // T occupies the full top row and the middle of the bottom row.
        let purple = color::piece(PieceColor::Purple);
        assert_eq!(buf[(1, 0)].bg, purple);
        assert_eq!(buf[(3, 0)].bg, purple);
        assert_eq!(buf[(5, 0)].bg, purple);
        assert_eq!(buf[(3, 1)].bg, purple);
        assert_eq!(buf[(1, 1)].bg, color::BLACK);
        assert_eq!(buf[(5, 1)].bg, color::BLACK);
    }

    #[test]
    fn test_empty_preview() {
        let display = PieceDisplay::new();
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }
}
