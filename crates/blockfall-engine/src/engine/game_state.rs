use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::{Board, Piece};

use super::{GameStats, PieceGenerator};

/// Phase of the game state machine.
///
/// ```text
/// Menu ──start──▶ Playing ◀──pause──▶ Paused
///                    │
///               failed spawn
///                    ▼
///                 GameOver ──restart──▶ Playing
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
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum GamePhase {
    #[default]
    Menu,
    Playing,
    Paused,
    #[display("Game Over")]
    GameOver,
}

/// What the gravity timer must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// (Re)arm the timer with the given interval.
    Restart(Duration),
    Stop,
}

/// Side effects of one transition, for the caller to carry out.
///
/// The state machine never touches timers, stores or observers itself; it
/// reports what changed and the controller acts on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use]
pub struct Outcome {
    /// Whether the command had any effect.
    pub applied: bool,
    pub state_changed: bool,
    pub board_changed: bool,
    pub timer: Option<TimerAction>,
    /// Final score, set when this transition ended the game.
    pub game_over: Option<u64>,
}

impl Outcome {
    const REJECTED: Self = Self {
        applied: false,
        state_changed: false,
        board_changed: false,
        timer: None,
        game_over: None,
    };

    fn board_moved() -> Self {
        Self {
            applied: true,
            board_changed: true,
            ..Self::REJECTED
        }
    }
}

/// Board, pieces and statistics of one game, with its phase transitions.
///
/// Every method is a plain synchronous transition; timing and
/// serialization are handled by [`GameController`](super::GameController).
///
/// # Example
///
/// ```
/// use blockfall_engine::{GamePhase, GameState, PieceGenerator};
///
/// let mut state = GameState::new(PieceGenerator::from_seed(1));
/// assert!(!state.move_piece(-1, 0).applied);
///
/// let _ = state.start();
/// assert_eq!(state.phase(), GamePhase::Playing);
/// assert!(state.current_piece().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct GameState {
    phase: GamePhase,
    board: Board,
    stats: GameStats,
    current: Option<Piece>,
    next: Option<Piece>,
    generator: PieceGenerator,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(PieceGenerator::new())
    }
}

impl GameState {
    /// Creates a state in the [`GamePhase::Menu`] phase with an empty board.
    #[must_use]
    pub fn new(generator: PieceGenerator) -> Self {
        Self {
            phase: GamePhase::Menu,
            board: Board::new(),
            stats: GameStats::new(),
            current: None,
            next: None,
            generator,
        }
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn next_piece(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        self.stats.drop_interval()
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn stats_mut(&mut self) -> &mut GameStats {
        &mut self.stats
    }

    /// Starts a new game from any phase.
    ///
    /// The board is replaced, fresh current and next pieces are drawn, and
    /// the statistics reset to score 0, level 1, no lines.
    pub fn start(&mut self) -> Outcome {
        self.board = Board::new();
        self.stats = GameStats::new();
        self.current = Some(self.generator.next_piece());
        self.next = Some(self.generator.next_piece());
        self.phase = GamePhase::Playing;
        info!("game started");
        Outcome {
            applied: true,
            state_changed: true,
            board_changed: true,
            timer: Some(TimerAction::Restart(self.drop_interval())),
            game_over: None,
        }
    }

    /// Toggles between [`GamePhase::Playing`] and [`GamePhase::Paused`].
    ///
    /// Has no effect in the other phases.
    pub fn toggle_pause(&mut self) -> Outcome {
        let (phase, timer) = match self.phase {
            GamePhase::Playing => (GamePhase::Paused, TimerAction::Stop),
            GamePhase::Paused => (
                GamePhase::Playing,
                TimerAction::Restart(self.drop_interval()),
            ),
            GamePhase::Menu | GamePhase::GameOver => return Outcome::REJECTED,
        };
        debug!("{} -> {phase}", self.phase);
        self.phase = phase;
        Outcome {
            applied: true,
            state_changed: true,
            timer: Some(timer),
            ..Outcome::REJECTED
        }
    }

    /// Returns to the menu, keeping the last board and statistics on display.
    pub fn show_menu(&mut self) -> Outcome {
        if self.phase.is_menu() {
            return Outcome::REJECTED;
        }
        self.phase = GamePhase::Menu;
        Outcome {
            applied: true,
            state_changed: true,
            timer: Some(TimerAction::Stop),
            ..Outcome::REJECTED
        }
    }

    fn playing_piece(&self) -> Option<Piece> {
        if self.phase.is_playing() {
            self.current
        } else {
            None
        }
    }

    /// Moves the current piece by `(dx, dy)` if the target is free.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> Outcome {
        let Some(piece) = self.playing_piece() else {
            return Outcome::REJECTED;
        };
        self.try_commit(piece.translated(dx, dy))
    }

    /// Rotates the current piece a quarter turn if the result is free.
    pub fn rotate_piece(&mut self) -> Outcome {
        let Some(piece) = self.playing_piece() else {
            return Outcome::REJECTED;
        };
        self.try_commit(piece.rotated())
    }

    /// Drops the current piece as far as it goes and locks it immediately.
    pub fn drop_piece(&mut self) -> Outcome {
        let Some(mut piece) = self.playing_piece() else {
            return Outcome::REJECTED;
        };
        loop {
            let candidate = piece.translated(0, -1);
            if !self.board.is_valid_position(&candidate) {
                break;
            }
            piece = candidate;
        }
        self.current = Some(piece);
        self.lock_piece(piece)
    }

    /// Applies one step of gravity.
    ///
    /// The piece moves down one row, or locks when it cannot.
    pub fn tick(&mut self) -> Outcome {
        let Some(piece) = self.playing_piece() else {
            return Outcome::REJECTED;
        };
        let outcome = self.try_commit(piece.translated(0, -1));
        if outcome.applied {
            return outcome;
        }
        self.lock_piece(piece)
    }

    fn try_commit(&mut self, candidate: Piece) -> Outcome {
        if !self.board.is_valid_position(&candidate) {
            return Outcome::REJECTED;
        }
        self.current = Some(candidate);
        Outcome::board_moved()
    }

    fn lock_piece(&mut self, piece: Piece) -> Outcome {
        debug!("locking {:?} at {}", piece.kind(), piece.anchor());
        self.board.place_piece(&piece);
        let mut outcome = Outcome::board_moved();
        self.resolve_lines(&mut outcome);
        self.spawn_next(&mut outcome);
        outcome
    }

    fn resolve_lines(&mut self, outcome: &mut Outcome) {
        let rows = self.board.completed_lines();
        if rows.is_empty() {
            return;
        }
        self.board.clear_lines(&rows);
        let clear = self.stats.record_line_clear(rows.len());
        debug!("cleared {} lines for {} points", clear.lines, clear.points);
        outcome.state_changed = true;
        if clear.level_changed() {
            info!("level up: {}", clear.level);
        }
        if self.phase.is_playing() {
            outcome.timer = Some(TimerAction::Restart(self.drop_interval()));
        }
    }

    fn spawn_next(&mut self, outcome: &mut Outcome) {
        let next = self.next.take().unwrap_or_else(|| self.generator.next_piece());
        self.current = Some(next);
        self.next = Some(self.generator.next_piece());
        debug!("spawned {:?}", next.kind());
        if self.board.is_valid_position(&next) {
            return;
        }
        self.phase = GamePhase::GameOver;
        info!("game over with score {}", self.stats.score());
        outcome.state_changed = true;
        outcome.timer = Some(TimerAction::Stop);
        outcome.game_over = Some(self.stats.score());
    }
}
