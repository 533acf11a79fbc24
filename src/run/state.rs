use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::metrics::{RequestOutcome, RunSummary, StatsAccumulator};
use crate::progress::{ProgressEvent, ProgressPublisher};

const STOP_REQUESTED: u8 = 0b01;
const FINISHED: u8 = 0b10;

#[derive(Debug)]
struct Counters {
    issued: u64,
    completed: u64,
    stats: StatsAccumulator,
}

/// Shared bookkeeping for one run.
///
/// Invariant: `completed <= issued <= total`, and the accumulator holds
/// exactly `completed` outcomes. Stop and finish share one atomic so a stop
/// is either seen by `finish` or rejected.
pub struct RunState {
    total: u64,
    started_at: Instant,
    phase: AtomicU8,
    counters: Mutex<Counters>,
    publisher: Arc<dyn ProgressPublisher>,
}

impl RunState {
    #[must_use]
    pub fn new(total: u64, publisher: Arc<dyn ProgressPublisher>) -> Self {
        Self {
            total,
            started_at: Instant::now(),
            phase: AtomicU8::new(0),
            counters: Mutex::new(Counters {
                issued: 0,
                completed: 0,
                stats: StatsAccumulator::new(total),
            }),
            publisher,
        }
    }

    /// Claims the next request slot. Returns `false` once every request has
    /// been issued or a stop was requested.
    pub fn try_issue(&self) -> bool {
        let mut counters = self.lock();
        if self.phase.load(Ordering::SeqCst) != 0 || counters.issued >= self.total {
            return false;
        }
        counters.issued = counters.issued.saturating_add(1);
        true
    }

    /// Records a completed request and publishes the resulting snapshot.
    pub fn record(&self, outcome: RequestOutcome) {
        let mut counters = self.lock();
        counters.completed = counters.completed.saturating_add(1);
        counters.stats.record(outcome);
        let snapshot = counters.stats.snapshot(self.elapsed_ms());
        self.publisher.publish(ProgressEvent::Progress(snapshot));
    }

    /// Stops further issuance. Returns `false` when the run already finished,
    /// in which case the summary does not report a stop. Never takes the state
    /// lock, so it is safe to call from inside a progress publisher.
    #[must_use]
    pub fn request_stop(&self) -> bool {
        self.phase
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |phase| {
                (phase & FINISHED == 0).then_some(phase | STOP_REQUESTED)
            })
            .is_ok()
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.phase.load(Ordering::SeqCst) & STOP_REQUESTED != 0
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase.load(Ordering::SeqCst) & FINISHED != 0
    }

    #[must_use]
    pub fn issued(&self) -> u64 {
        self.lock().issued
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.lock().completed
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Marks the run terminal and computes its summary.
    pub fn finish(&self) -> RunSummary {
        let counters = self.lock();
        let phase = self.phase.fetch_or(FINISHED, Ordering::SeqCst);
        counters
            .stats
            .finalize(self.elapsed_ms(), phase & STOP_REQUESTED != 0)
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunState")
            .field("total", &self.total)
            .field("stop_requested", &self.is_stop_requested())
            .finish_non_exhaustive()
    }
}
