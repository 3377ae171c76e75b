//! Game flow on top of the core data structures.
//!
//! - [`GameStats`] - Score, level and line count with the scoring rules
//! - [`PieceGenerator`] - Uniform random piece supply
//! - [`GameState`] - Pure state machine over board, pieces and statistics
//! - [`GameController`] - Serialized, timer-driven facade with observers
//! - [`GameSnapshot`] - Owned copy of everything a renderer needs
//! - [`ScoreStore`] - High score and top-score persistence
//!
//! # Game Flow
//!
//! 1. [`GameController::start_game`] resets the board and arms the gravity timer
//! 2. Commands move, rotate or hard-drop the falling piece
//! 3. Each tick moves the piece down or locks it into the board
//! 4. Completed rows are cleared and scored, and the next piece spawns
//! 5. A spawn that collides ends the game and the score is saved
//!
//! # Example
//!
//! ```
//! use std::sync::mpsc;
//!
//! use blockfall_engine::{
//!     GameController, GameEvent, GameSnapshot, KeyValueScoreStore, MemoryStorage,
//! };
//!
//! let controller = GameController::new(KeyValueScoreStore::new(MemoryStorage::new()));
//! let (tx, rx) = mpsc::channel();
//! controller.subscribe(move |event: GameEvent, snapshot: &GameSnapshot| {
//!     tx.send((event, snapshot.clone())).ok();
//! });
//!
//! controller.start_game();
//! let (event, snapshot) = rx.recv().unwrap();
//! assert_eq!(event, GameEvent::StateChanged);
//! assert!(snapshot.phase.is_playing());
//! ```

pub use self::{
    controller::*, game_state::*, game_stats::*, piece_generator::*, score_store::*,
    snapshot::*,
};

mod controller;
mod game_state;
mod game_stats;
mod piece_generator;
mod score_store;
mod snapshot;
mod ticker;
