use std::time::{Duration, Instant};

use crossterm::event;

use crate::tui::event::TuiEvent;

/// Event loop state management.
///
/// Returns the next event via `next()`. A render is requested after every
/// tick and every crossterm event. Without a tick interval only crossterm
/// events are waited for.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    last_tick: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub(super) fn new() -> Self {
        Self {
            tick_interval: None,
            last_tick: Instant::now(),
            dirty: true, // Initial render is required on startup
        }
    }

    /// Sets the tick interval.
    ///
    /// Pass `None` to disable tick events.
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    /// Returns the next event.
    ///
    /// Blocks until a tick is due, a render is pending, or a crossterm event occurs.
    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(tick_interval) = self.tick_interval
                && now.duration_since(self.last_tick) >= tick_interval
            {
                self.last_tick = now;
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            if self.dirty {
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.compute_timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn compute_timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self.last_tick + self.tick_interval?;
        Some(next_tick_at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_event_is_render() {
        let mut events = EventLoop::new();
        events.set_tick_interval(Some(Duration::from_secs(60)));
        assert!(events.next().unwrap().is_render());
    }

    #[test]
    fn test_tick_then_render() {
        let mut events = EventLoop::new();
        events.set_tick_interval(Some(Duration::ZERO));
        assert!(events.next().unwrap().is_tick());
        events.set_tick_interval(Some(Duration::from_secs(60)));
        assert!(events.next().unwrap().is_render());
    }

    #[test]
    fn test_timeout_until_next_tick() {
        let mut events = EventLoop::new();
        let now = events.last_tick;
        assert_eq!(events.compute_timeout(now), None);

        events.set_tick_interval(Some(Duration::from_millis(40)));
        assert_eq!(
            events.compute_timeout(now + Duration::from_millis(10)),
            Some(Duration::from_millis(30))
        );
        assert_eq!(
            events.compute_timeout(now + Duration::from_millis(90)),
            Some(Duration::ZERO)
        );
    }
}
