use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{FilledBlock, Piece, PieceColor, PieceKind, Position};

use super::{GamePhase, GameState};

/// A piece reduced to what a renderer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub kind: PieceKind,
    pub color: PieceColor,
    /// Absolute board coordinates.
    pub blocks: [Position; 4],
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind(),
            color: piece.color(),
            blocks: piece.absolute_blocks(),
        }
    }
}

/// A copy of everything visible about a game at one instant.
///
/// Snapshots own their data, so holding one never blocks or aliases the
/// controller's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub filled_blocks: Vec<FilledBlock>,
    pub current_piece: Option<PieceView>,
    pub next_piece: Option<PieceView>,
    pub score: u64,
    pub level: u64,
    pub lines_cleared: u64,
    /// Gravity interval at the current level.
    pub drop_interval: Duration,
    pub high_score: u64,
    pub top_scores: Vec<u64>,
}

impl GameSnapshot {
    #[must_use]
    pub fn capture(state: &GameState, high_score: u64, top_scores: &[u64]) -> Self {
        let stats = state.stats();
        Self {
            phase: state.phase(),
            filled_blocks: state.board().filled_blocks(),
            current_piece: state.current_piece().map(PieceView::from),
            next_piece: state.next_piece().map(PieceView::from),
            score: stats.score(),
            level: stats.level(),
            lines_cleared: stats.lines_cleared(),
            drop_interval: state.drop_interval(),
            high_score,
            top_scores: top_scores.to_vec(),
        }
    }
}
