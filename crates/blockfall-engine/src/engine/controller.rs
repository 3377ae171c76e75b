use std::{
    mem,
    ops::ControlFlow,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak},
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, warn};

use super::{
    GamePhase, GameSnapshot, GameState, GameStats, Outcome, PieceGenerator, ScoreStore,
    TimerAction, ticker::Ticker,
};

/// Kind of change announced to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum GameEvent {
    /// Phase, score, level or line count changed.
    StateChanged,
    /// The board or one of the pieces changed.
    BoardUpdated,
    /// High score or top scores were refreshed from the store.
    ScoresUpdated,
}

/// Receives change notifications from a [`GameController`].
///
/// Observers are called after the transition is complete, with the
/// controller still serialized. They must not call back into the
/// controller; forwarding the snapshot over a channel is the usual pattern.
pub trait GameObserver: Send + Sync {
    fn on_event(&self, event: GameEvent, snapshot: &GameSnapshot);
}

impl<F> GameObserver for F
where
    F: Fn(GameEvent, &GameSnapshot) + Send + Sync,
{
    fn on_event(&self, event: GameEvent, snapshot: &GameSnapshot) {
        self(event, snapshot);
    }
}

/// Thread-safe game facade driven by commands and a gravity timer.
///
/// Every command and every tick runs under one lock, so the board and
/// pieces are never seen half-updated. Score persistence runs on
/// background threads; [`wait_for_persistence`](Self::wait_for_persistence)
/// joins it.
///
/// # Example
///
/// ```
/// use blockfall_engine::{
///     GameController, GamePhase, KeyValueScoreStore, MemoryStorage, PieceGenerator,
/// };
///
/// let store = KeyValueScoreStore::new(MemoryStorage::new());
/// let controller = GameController::with_generator(store, PieceGenerator::from_seed(7));
/// assert_eq!(controller.phase(), GamePhase::Menu);
///
/// controller.start_game();
/// assert!(controller.move_piece(-1, 0));
///
/// controller.pause_game();
/// assert_eq!(controller.phase(), GamePhase::Paused);
/// assert!(!controller.rotate_piece());
/// ```
pub struct GameController {
    inner: Arc<Inner>,
}

struct Inner {
    core: Mutex<Core>,
    observers: RwLock<Vec<Box<dyn GameObserver>>>,
    scores: Arc<Mutex<ScoreWorker>>,
    persistence: Mutex<Vec<JoinHandle<()>>>,
}

struct Core {
    state: GameState,
    ticker: Ticker,
    high_score: u64,
    top_scores: Vec<u64>,
    scores_revision: u64,
}

/// Store access, serialized so reads reflect every earlier write.
struct ScoreWorker {
    store: Box<dyn ScoreStore>,
    revision: u64,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for GameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameController")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl GameController {
    /// Creates a controller in the menu phase, drawing pieces from the OS RNG.
    #[must_use]
    pub fn new<S>(store: S) -> Self
    where
        S: ScoreStore + 'static,
    {
        Self::with_generator(store, PieceGenerator::new())
    }

    /// Creates a controller drawing pieces from `generator`.
    #[must_use]
    pub fn with_generator<S>(store: S, generator: PieceGenerator) -> Self
    where
        S: ScoreStore + 'static,
    {
        let core = Core {
            state: GameState::new(generator),
            ticker: Ticker::default(),
            high_score: 0,
            top_scores: vec![],
            scores_revision: 0,
        };
        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(core),
                observers: RwLock::new(vec![]),
                scores: Arc::new(Mutex::new(ScoreWorker {
                    store: Box::new(store),
                    revision: 0,
                })),
                persistence: Mutex::new(vec![]),
            }),
        }
    }

    /// Registers an observer for every subsequent change.
    pub fn subscribe<O>(&self, observer: O)
    where
        O: GameObserver + 'static,
    {
        self.inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(observer));
    }

    /// Starts a new game from any phase.
    pub fn start_game(&self) {
        self.inner.run(GameState::start);
    }

    /// Toggles between playing and paused; ignored in other phases.
    pub fn pause_game(&self) -> bool {
        self.inner.run(GameState::toggle_pause)
    }

    /// Stops the timer and starts a new game.
    pub fn restart_game(&self) {
        let mut core = self.inner.lock_core();
        core.ticker.stop();
        let outcome = core.state.start();
        self.inner.finish(&mut core, outcome);
    }

    /// Returns to the menu.
    pub fn show_menu(&self) -> bool {
        self.inner.run(GameState::show_menu)
    }

    /// Moves the current piece by `(dx, dy)`. Returns whether it moved.
    pub fn move_piece(&self, dx: i32, dy: i32) -> bool {
        self.inner.run(|state| state.move_piece(dx, dy))
    }

    /// Rotates the current piece a quarter turn. Returns whether it rotated.
    pub fn rotate_piece(&self) -> bool {
        self.inner.run(GameState::rotate_piece)
    }

    /// Hard-drops and locks the current piece. Returns whether a piece dropped.
    pub fn drop_piece(&self) -> bool {
        self.inner.run(GameState::drop_piece)
    }

    /// Refreshes the high score and top scores from the store in the background.
    pub fn load_scores(&self) {
        self.inner.spawn_score_refresh(None);
    }

    /// Blocks until every pending store operation has finished.
    pub fn wait_for_persistence(&self) {
        loop {
            let handles = mem::take(&mut *lock(&self.inner.persistence));
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if handle.join().is_err() {
                    warn!("score persistence thread panicked");
                }
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.inner.lock_core().snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.inner.lock_core().state.phase()
    }

    #[must_use]
    pub fn stats(&self) -> GameStats {
        self.inner.lock_core().state.stats().clone()
    }

    /// Current gravity interval.
    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        self.inner.lock_core().state.drop_interval()
    }

    #[cfg(test)]
    fn with_state<T>(&self, f: impl FnOnce(&mut GameState) -> T) -> T {
        f(&mut self.inner.lock_core().state)
    }
}

impl Drop for GameController {
    fn drop(&mut self) {
        self.inner.lock_core().ticker.stop();
    }
}

impl Core {
    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.state, self.high_score, &self.top_scores)
    }
}

impl Inner {
    fn lock_core(&self) -> MutexGuard<'_, Core> {
        lock(&self.core)
    }

    fn run<F>(self: &Arc<Self>, transition: F) -> bool
    where
        F: FnOnce(&mut GameState) -> Outcome,
    {
        let mut core = self.lock_core();
        let outcome = transition(&mut core.state);
        self.finish(&mut core, outcome)
    }

    fn tick(self: &Arc<Self>, generation: u64) -> ControlFlow<()> {
        let mut core = self.lock_core();
        if core.ticker.generation() != generation {
            return ControlFlow::Break(());
        }
        let outcome = core.state.tick();
        self.finish(&mut core, outcome);
        ControlFlow::Continue(())
    }

    fn finish(self: &Arc<Self>, core: &mut Core, outcome: Outcome) -> bool {
        match outcome.timer {
            Some(TimerAction::Restart(interval)) => self.arm_ticker(core, interval),
            Some(TimerAction::Stop) => core.ticker.stop(),
            None => {}
        }
        if let Some(score) = outcome.game_over {
            self.spawn_score_refresh(Some(score));
        }
        if outcome.state_changed {
            self.notify(core, GameEvent::StateChanged);
        }
        if outcome.board_changed {
            self.notify(core, GameEvent::BoardUpdated);
        }
        outcome.applied
    }

    fn arm_ticker(self: &Arc<Self>, core: &mut Core, interval: Duration) {
        debug!("gravity every {interval:?}");
        let inner = Arc::downgrade(self);
        core.ticker.start(interval, move |generation| {
            let Some(inner) = Weak::upgrade(&inner) else {
                return ControlFlow::Break(());
            };
            inner.tick(generation)
        });
    }

    fn notify(&self, core: &Core, event: GameEvent) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if observers.is_empty() {
            return;
        }
        let snapshot = core.snapshot();
        for observer in observers.iter() {
            observer.on_event(event, &snapshot);
        }
    }

    /// Runs store work off the command path.
    ///
    /// With `Some(score)` the score is added first. The refreshed values are
    /// written back only if no later refresh has already landed.
    fn spawn_score_refresh(self: &Arc<Self>, new_score: Option<u64>) {
        let scores = Arc::clone(&self.scores);
        let inner = Arc::downgrade(self);
        let spawned = thread::Builder::new()
            .name("blockfall-scores".to_owned())
            .spawn(move || {
                let (revision, high_score, top_scores) = {
                    let mut worker = lock(&scores);
                    if let Some(score) = new_score {
                        worker.store.add_score(score);
                    }
                    worker.revision += 1;
                    (
                        worker.revision,
                        worker.store.high_score(),
                        worker.store.top_scores(),
                    )
                };
                if let Some(inner) = inner.upgrade() {
                    inner.update_scores(revision, high_score, top_scores);
                }
            });
        match spawned {
            Ok(handle) => lock(&self.persistence).push(handle),
            Err(e) => warn!("failed to spawn score persistence thread: {e}"),
        }
    }

    fn update_scores(&self, revision: u64, high_score: u64, top_scores: Vec<u64>) {
        let mut core = self.lock_core();
        if revision <= core.scores_revision {
            return;
        }
        core.scores_revision = revision;
        core.high_score = high_score;
        core.top_scores = top_scores;
        debug!("scores refreshed: high score {high_score}");
        self.notify(&core, GameEvent::ScoresUpdated);
    }
}
