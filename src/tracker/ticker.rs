use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::utils::clock::Clock;

/// A single timer tick. `generation` identifies the ticker that produced it so ticks that were
/// already queued when their ticker got cancelled can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Handle to a running ticker task. Dropping it cancels the task.
pub struct Ticker {
    generation: u64,
    shutdown: CancellationToken,
}

impl Ticker {
    pub fn spawn(
        generation: u64,
        interval: Duration,
        clock: Arc<dyn Clock>,
        next: mpsc::Sender<Tick>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        debug!("Starting ticker {generation}");
        tokio::spawn(run(generation, interval, clock, next, shutdown.clone()));
        Self {
            generation,
            shutdown,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        if !self.shutdown.is_cancelled() {
            debug!("Cancelling ticker {}", self.generation);
            self.shutdown.cancel();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Ticks on a fixed cadence. Deadlines are computed from the first instant rather than from the
/// previous wake up, so slow consumers don't make the ticker drift.
async fn run(
    generation: u64,
    interval: Duration,
    clock: Arc<dyn Clock>,
    next: mpsc::Sender<Tick>,
    shutdown: CancellationToken,
) {
    let mut tick_point = clock.instant();
    loop {
        tick_point += interval;

        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = clock.sleep_until(tick_point) => ()
        }

        trace!("Tick from ticker {generation}");
        tokio::select! {
            _ = shutdown.cancelled() => return,
            sent = next.send(Tick { generation }) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}
