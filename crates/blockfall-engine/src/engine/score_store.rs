use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use log::warn;

/// Maximum number of entries kept in the top-score list.
pub const TOP_SCORES_LEN: usize = 10;

/// Key holding the high score as a decimal string.
pub const HIGH_SCORE_KEY: &str = "tetris_highscore";

/// Key holding the top scores as comma-separated decimal integers.
pub const TOP_SCORES_KEY: &str = "tetris_topscores";

/// Persistence of the high score and the top-score list.
///
/// Implementations never fail: read errors yield the defaults (`0` and an
/// empty list) and write errors are dropped.
pub trait ScoreStore: Send + Sync {
    fn high_score(&self) -> u64;

    /// Returns at most [`TOP_SCORES_LEN`] scores, highest first.
    fn top_scores(&self) -> Vec<u64>;

    /// Merges `score` into the top scores and raises the high score if beaten.
    fn add_score(&self, score: u64);
}

impl<T> ScoreStore for Arc<T>
where
    T: ScoreStore + ?Sized,
{
    fn high_score(&self) -> u64 {
        (**self).high_score()
    }

    fn top_scores(&self) -> Vec<u64> {
        (**self).top_scores()
    }

    fn add_score(&self, score: u64) {
        (**self).add_score(score);
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StorageError {
    #[display("storage I/O failed: {_0}")]
    Io(std::io::Error),
    #[display("malformed storage data: {_0}")]
    Malformed(#[error(not(source))] String),
    #[display("storage unavailable")]
    #[from(ignore)]
    Unavailable,
}

/// A string key-value backend, such as a file or browser-style local storage.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// [`ScoreStore`] encoding its data as strings in a [`KeyValueStorage`].
///
/// # Example
///
/// ```
/// use blockfall_engine::{KeyValueScoreStore, MemoryStorage, ScoreStore};
///
/// let store = KeyValueScoreStore::new(MemoryStorage::new());
/// store.add_score(100);
/// store.add_score(50);
/// store.add_score(200);
///
/// assert_eq!(store.top_scores(), vec![200, 100, 50]);
/// assert_eq!(store.high_score(), 200);
/// ```
#[derive(Debug, Default)]
pub struct KeyValueScoreStore<S> {
    storage: S,
}

impl<S> KeyValueScoreStore<S>
where
    S: KeyValueStorage,
{
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn try_high_score(&self) -> Result<u64, StorageError> {
        let value = self.storage.get(HIGH_SCORE_KEY)?;
        Ok(value.and_then(|s| s.trim().parse().ok()).unwrap_or(0))
    }

    fn try_top_scores(&self) -> Result<Vec<u64>, StorageError> {
        let value = self.storage.get(TOP_SCORES_KEY)?.unwrap_or_default();
        Ok(parse_scores(&value))
    }

    fn try_add_score(&self, score: u64) -> Result<(), StorageError> {
        let mut scores = self.try_top_scores()?;
        scores.push(score);
        sort_and_truncate(&mut scores);
        self.storage.set(TOP_SCORES_KEY, &format_scores(&scores))?;

        if score > self.try_high_score()? {
            self.storage.set(HIGH_SCORE_KEY, &score.to_string())?;
        }
        Ok(())
    }
}

impl<S> ScoreStore for KeyValueScoreStore<S>
where
    S: KeyValueStorage,
{
    fn high_score(&self) -> u64 {
        self.try_high_score().unwrap_or_else(|e| {
            warn!("failed to read high score: {e}");
            0
        })
    }

    fn top_scores(&self) -> Vec<u64> {
        self.try_top_scores().unwrap_or_else(|e| {
            warn!("failed to read top scores: {e}");
            vec![]
        })
    }

    fn add_score(&self, score: u64) {
        if let Err(e) = self.try_add_score(score) {
            warn!("failed to save score {score}: {e}");
        }
    }
}

/// Parses a comma-separated score list.
///
/// Entries that are not positive integers are dropped. The result is sorted
/// highest first and truncated to [`TOP_SCORES_LEN`].
#[must_use]
pub fn parse_scores(s: &str) -> Vec<u64> {
    let mut scores = s
        .split(',')
        .filter_map(|entry| entry.trim().parse::<u64>().ok())
        .filter(|&score| score > 0)
        .collect::<Vec<_>>();
    sort_and_truncate(&mut scores);
    scores
}

fn sort_and_truncate(scores: &mut Vec<u64>) {
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores.truncate(TOP_SCORES_LEN);
}

fn format_scores(scores: &[u64]) -> String {
    scores
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// In-memory [`KeyValueStorage`].
///
/// Can be switched into a failing mode to exercise the error paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` and `set` fail when `failing` is `true`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> KeyValueScoreStore<MemoryStorage> {
        KeyValueScoreStore::new(MemoryStorage::new())
    }

    #[test]
    fn test_empty_store_defaults() {
        let store = store();
        assert_eq!(store.high_score(), 0);
        assert!(store.top_scores().is_empty());
    }

    #[test]
    fn test_add_scores_scenario() {
        let store = store();
        store.add_score(100);
        store.add_score(50);
        store.add_score(200);
        assert_eq!(store.top_scores(), vec![200, 100, 50]);
        assert_eq!(store.high_score(), 200);
    }

    #[test]
    fn test_persisted_representation() {
        let store = store();
        store.add_score(100);
        store.add_score(300);
        assert_eq!(
            store.storage().get(TOP_SCORES_KEY).unwrap().as_deref(),
            Some("300,100")
        );
        assert_eq!(
            store.storage().get(HIGH_SCORE_KEY).unwrap().as_deref(),
            Some("300")
        );
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let store = store();
        store.add_score(500);
        store.add_score(20);
        assert_eq!(store.high_score(), 500);
        assert_eq!(store.top_scores(), vec![500, 20]);
    }

    #[test]
    fn test_top_scores_truncated_to_ten() {
        let store = store();
        for score in 1..=15 {
            store.add_score(score * 10);
        }
        let top = store.top_scores();
        assert_eq!(top.len(), TOP_SCORES_LEN);
        assert_eq!(top.first(), Some(&150));
        assert_eq!(top.last(), Some(&60));
        assert!(top.is_sorted_by(|a, b| a >= b));
    }

    #[test]
    fn test_zero_score_is_not_listed() {
        let store = store();
        store.add_score(0);
        assert!(store.top_scores().is_empty());
        assert_eq!(store.high_score(), 0);
    }

    #[test]
    fn test_parse_scores_drops_garbage() {
        assert_eq!(parse_scores(""), Vec::<u64>::new());
        assert_eq!(parse_scores("10, x,0,-5,30,,20"), vec![30, 20, 10]);
    }

    #[test]
    fn test_malformed_high_score_reads_as_zero() {
        let store = store();
        store.storage().set(HIGH_SCORE_KEY, "lots").unwrap();
        assert_eq!(store.high_score(), 0);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let store = store();
        store.add_score(100);
        store.storage().set_failing(true);

        assert_eq!(store.high_score(), 0);
        assert!(store.top_scores().is_empty());
        store.add_score(900);

        store.storage().set_failing(false);
        assert_eq!(store.top_scores(), vec![100]);
        assert_eq!(store.high_score(), 100);
    }

    #[test]
    fn test_storage_error_display() {
        assert_eq!(StorageError::Unavailable.to_string(), "storage unavailable");
        assert_eq!(
            StorageError::Malformed("not an object".to_owned()).to_string(),
            "malformed storage data: not an object"
        );
    }
}
