use std::{
    ops::ControlFlow,
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use log::{trace, warn};

/// Recurring timer running its callback on a dedicated thread.
///
/// Each [`start`](Self::start) spawns a fresh thread tagged with a new
/// generation number and disarms the previous one. The callback receives
/// its generation so the owner can discard ticks from a disarmed timer: the
/// owner bumps the generation (via `start` or [`stop`](Self::stop)) while
/// holding the same lock the callback takes, so no stale tick is processed
/// once `stop` has returned.
///
/// Late ticks are not caught up; the next wait starts when the callback
/// returns.
#[derive(Debug, Default)]
pub(crate) struct Ticker {
    generation: u64,
    stop_tx: Option<Sender<()>>,
}

impl Ticker {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    /// Arms the timer, replacing any running one.
    ///
    /// `on_tick` is called with this arming's generation every `interval`
    /// until it returns [`ControlFlow::Break`] or the timer is disarmed.
    pub(crate) fn start<F>(&mut self, interval: Duration, mut on_tick: F)
    where
        F: FnMut(u64) -> ControlFlow<()> + Send + 'static,
    {
        self.stop();
        let generation = self.generation;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let spawned = thread::Builder::new()
            .name(format!("blockfall-ticker-{generation}"))
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if on_tick(generation).is_break() {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                trace!("ticker {generation} exited");
            });

        match spawned {
            Ok(_) => self.stop_tx = Some(stop_tx),
            Err(e) => warn!("failed to spawn ticker thread: {e}"),
        }
    }

    /// Disarms the timer.
    ///
    /// The thread notices the closed channel and exits on its own; any tick
    /// it is about to deliver carries a stale generation.
    pub(crate) fn stop(&mut self) {
        self.generation += 1;
        self.stop_tx = None;
    }
}
