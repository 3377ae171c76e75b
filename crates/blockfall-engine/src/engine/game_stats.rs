use std::time::Duration;

/// Base points for clearing 1-4 lines at once, indexed by line count.
const SCORE_TABLE: [u64; 5] = [0, 100, 300, 500, 800];

/// Lines needed to advance one level.
const LINES_PER_LEVEL: u64 = 10;

const BASE_DROP_INTERVAL: Duration = Duration::from_millis(1000);
const DROP_INTERVAL_STEP: Duration = Duration::from_millis(50);
const MIN_DROP_INTERVAL: Duration = Duration::from_millis(50);

/// Returns the base points for clearing `lines` rows at once.
///
/// Counts above four cannot happen with a four-block piece on a ten-wide
/// board, but still score `lines × 100`.
#[must_use]
pub fn line_clear_points(lines: usize) -> u64 {
    SCORE_TABLE
        .get(lines)
        .copied()
        .unwrap_or_else(|| lines as u64 * 100)
}

/// Returns the gravity interval for `level`: `max(50ms, 1000ms - (level - 1) × 50ms)`.
#[must_use]
pub fn drop_interval(level: u64) -> Duration {
    let steps = u32::try_from(level.saturating_sub(1)).unwrap_or(u32::MAX);
    BASE_DROP_INTERVAL
        .saturating_sub(DROP_INTERVAL_STEP.saturating_mul(steps))
        .max(MIN_DROP_INTERVAL)
}

/// Score, level and line count of one game.
///
/// # Scoring
///
/// Only line clears score. The base points from the table below are
/// multiplied by the level in effect *before* the clear:
///
/// | Lines | Points |
/// |-------|--------|
/// | 1     | 100    |
/// | 2     | 300    |
/// | 3     | 500    |
/// | 4     | 800    |
///
/// Drops score nothing. The level is `lines_cleared / 10 + 1`.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_line_clear(4);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.lines_cleared(), 4);
/// assert_eq!(stats.level(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: u64,
    level: u64,
    lines_cleared: u64,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of recording a line clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClear {
    pub lines: usize,
    pub points: u64,
    pub previous_level: u64,
    pub level: u64,
}

impl LineClear {
    #[must_use]
    pub fn level_changed(&self) -> bool {
        self.previous_level != self.level
    }
}

impl GameStats {
    /// Creates statistics for a fresh game: score 0, level 1, no lines.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lines_cleared: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> u64 {
        self.level
    }

    #[must_use]
    pub const fn lines_cleared(&self) -> u64 {
        self.lines_cleared
    }

    /// Gravity interval for the current level.
    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        drop_interval(self.level)
    }

    /// Adds a clear of `lines` rows and recomputes the level.
    pub fn record_line_clear(&mut self, lines: usize) -> LineClear {
        let previous_level = self.level;
        let points = line_clear_points(lines) * previous_level;
        self.score += points;
        self.lines_cleared += lines as u64;
        self.level = self.lines_cleared / LINES_PER_LEVEL + 1;
        LineClear {
            lines,
            points,
            previous_level,
            level: self.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_clear_points_table() {
        assert_eq!(line_clear_points(0), 0);
        assert_eq!(line_clear_points(1), 100);
        assert_eq!(line_clear_points(2), 300);
        assert_eq!(line_clear_points(3), 500);
        assert_eq!(line_clear_points(4), 800);
        assert_eq!(line_clear_points(5), 500);
        assert_eq!(line_clear_points(7), 700);
    }

    #[test]
    fn test_drop_interval_by_level() {
        assert_eq!(drop_interval(1), Duration::from_millis(1000));
        assert_eq!(drop_interval(2), Duration::from_millis(950));
        assert_eq!(drop_interval(10), Duration::from_millis(550));
        assert_eq!(drop_interval(19), Duration::from_millis(100));
        assert_eq!(drop_interval(20), Duration::from_millis(50));
        assert_eq!(drop_interval(21), Duration::from_millis(50));
        assert_eq!(drop_interval(1000), Duration::from_millis(50));
        assert_eq!(drop_interval(u64::MAX), Duration::from_millis(50));
    }

    #[test]
    fn test_new_stats() {
        let stats = GameStats::new();
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.lines_cleared(), 0);
        assert_eq!(stats.drop_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_points_use_level_before_clear() {
        let mut stats = GameStats::new();
        // Nine lines at level 1.
        for _ in 0..3 {
            stats.record_line_clear(3);
        }
        assert_eq!(stats.score(), 1500);
        assert_eq!(stats.level(), 1);

        // The tenth line is still scored at level 1, then the level rises.
        let clear = stats.record_line_clear(1);
        assert_eq!(clear.points, 100);
        assert!(clear.level_changed());
        assert_eq!(stats.level(), 2);
        assert_eq!(stats.score(), 1600);

        let clear = stats.record_line_clear(4);
        assert_eq!(clear.points, 1600);
        assert!(!clear.level_changed());
        assert_eq!(stats.score(), 3200);
    }

    #[test]
    fn test_level_tracks_lines() {
        let mut stats = GameStats::new();
        for n in [1, 2, 3, 4, 4, 3, 2, 1, 4, 4, 4, 4] {
            stats.record_line_clear(n);
            assert_eq!(stats.level(), stats.lines_cleared() / 10 + 1);
        }
        assert_eq!(stats.lines_cleared(), 36);
        assert_eq!(stats.level(), 4);
    }

    #[test]
    fn test_score_formula_for_every_count() {
        for level_lines in [0, 10, 40] {
            for n in 1..=6 {
                let mut stats = GameStats::new();
                if level_lines > 0 {
                    stats.record_line_clear(level_lines);
                }
                let level = stats.level();
                let before = stats.score();
                stats.record_line_clear(n);
                let expected = match n {
                    1 => 100,
                    2 => 300,
                    3 => 500,
                    4 => 800,
                    _ => n as u64 * 100,
                } * level;
                assert_eq!(stats.score() - before, expected, "n={n} level={level}");
            }
        }
    }
}
