use blockfall_engine::{GamePhase, GameSnapshot};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::ui::widgets::{
    BoardDisplay, PieceDisplay, StatsDisplay, TopScoresDisplay, color, style,
};

/// Full game screen: stats and top scores, the board, and the next piece.
#[derive(Debug)]
pub struct GameDisplay<'a> {
    snapshot: &'a GameSnapshot,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> GameDisplay<'a> {
    pub fn new(snapshot: &'a GameSnapshot) -> Self {
        Self {
            snapshot,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let snapshot = self.snapshot;
        let block_padding = Padding::symmetric(self.horizontal_padding, self.vertical_padding);
        let border_style = match snapshot.phase {
            GamePhase::Menu => color::GRAY,
            GamePhase::Playing => color::WHITE,
            GamePhase::Paused => color::YELLOW,
            GamePhase::GameOver => color::RED,
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let game_board = BoardDisplay::new(&snapshot.filled_blocks)
            .falling_piece(snapshot.current_piece)
            .block(
                Block::bordered()
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let next_panel = PieceDisplay::new()
            .piece(snapshot.next_piece)
            .block(panel("NEXT"));
        let stats = StatsDisplay::new(snapshot).block(panel("STATS"));
        let latest_score = snapshot.phase.is_game_over().then_some(snapshot.score);
        let top_scores = TopScoresDisplay::new(&snapshot.top_scores)
            .highlight(latest_score)
            .block(panel("TOP 10"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(u16::max(stats.width(), top_scores.width())),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area, top_scores_area] = Layout::vertical([
            Constraint::Length(stats.height()),
            Constraint::Length(top_scores.height()),
        ])
        .spacing(1)
        .areas(left_column);

        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);

        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let game_board_width = game_board.width();
        stats.render(stats_area, buf);
        top_scores.render(top_scores_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        let popup = match snapshot.phase {
            GamePhase::Playing => None,
            GamePhase::Menu => Some((
                vec![Line::from("BLOCKFALL"), Line::from("PRESS ENTER")],
                Style::new().fg(color::BLACK).bg(color::CYAN),
            )),
            GamePhase::Paused => Some((
                vec![Line::from("PAUSED")],
                Style::new().fg(color::BLACK).bg(color::YELLOW),
            )),
            GamePhase::GameOver => Some((
                vec![
                    Line::from("GAME OVER!!"),
                    Line::from(format!("SCORE {}", snapshot.score)),
                ],
                Style::new().fg(color::WHITE).bg(color::RED),
            )),
        };

        if let Some((lines, style)) = popup {
            #[expect(clippy::cast_possible_truncation)]
            let text_height = lines.len() as u16;
            let block = Block::new().style(style);
            let text = Text::from(lines).style(style).centered();
            let area = board_area.centered(
                Constraint::Length(game_board_width),
                Constraint::Length(text_height + 2),
            );
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(text_height)), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{GameState, PieceGenerator};

    use super::*;

    fn screen_text(snapshot: &GameSnapshot) -> String {
        let area = Rect::new(0, 0, 80, 25);
        let mut buf = Buffer::empty(area);
        GameDisplay::new(snapshot).render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_overlay_per_phase() {
        let mut state = GameState::new(PieceGenerator::from_seed(8));
        let menu = screen_text(&GameSnapshot::capture(&state, 0, &[]));
        assert!(menu.contains("PRESS ENTER"));

        let _ = state.start();
        let playing = screen_text(&GameSnapshot::capture(&state, 1200, &[1200]));
        assert!(!playing.contains("PRESS ENTER"));
        assert!(!playing.contains("PAUSED"));
        assert!(playing.contains("NEXT"));
        assert!(playing.contains("TOP 10"));
        assert!(playing.contains("1200"));

        let _ = state.toggle_pause();
        let paused = screen_text(&GameSnapshot::capture(&state, 0, &[]));
        assert!(paused.contains("PAUSED"));
    }
}
