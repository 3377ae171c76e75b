use blockfall_engine::TOP_SCORES_LEN;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::style;

/// Ranked list of the best scores, with empty slots shown as dashes.
pub struct TopScoresDisplay<'a> {
    scores: &'a [u64],
    highlight: Option<u64>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> TopScoresDisplay<'a> {
    pub fn new(scores: &'a [u64]) -> Self {
        Self {
            scores,
            highlight: None,
            block: None,
        }
    }

    /// Highlights the first entry equal to `score`.
    pub fn highlight(self, score: Option<u64>) -> Self {
        Self {
            highlight: score,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        20 + super::block_horizontal_margin(self.block.as_ref())
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        TOP_SCORES_LEN as u16 + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for TopScoresDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let rows = Layout::vertical((0..TOP_SCORES_LEN).map(|_| Constraint::Length(1))).split(area);
        let highlighted = self
            .highlight
            .and_then(|score| self.scores.iter().position(|&s| s == score));

        for (rank, row_area) in rows.iter().copied().enumerate() {
            let style = if highlighted == Some(rank) {
                style::HIGHLIGHT
            } else {
                style::DEFAULT
            };
            let score = self
                .scores
                .get(rank)
                .map_or_else(|| "-".to_owned(), u64::to_string);
            let [rank_area, score_area] = row_area.layout(&Layout::horizontal([
                Constraint::Length(4),
                Constraint::Fill(1),
            ]));
            Line::styled(format!("{:>2}.", rank + 1), style)
                .left_aligned()
                .render(rank_area, buf);
            Line::styled(score, style)
                .right_aligned()
                .render(score_area, buf);
        }
    }
}
