use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::http::{RequestExecutor, RequestSpec};
use crate::metrics::RequestOutcome;

use super::RunState;

const PANIC_LABEL: &str = "panic";

/// Fixed pool of worker slots pulling tickets from a [`RunState`].
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyScheduler {
    slots: usize,
}

impl ConcurrencyScheduler {
    #[must_use]
    pub const fn new(slots: usize) -> Self {
        Self { slots }
    }

    #[must_use]
    pub const fn slots(&self) -> usize {
        self.slots
    }

    /// Runs until every slot has drained: all requests were issued and
    /// completed, or a stop was requested and in-flight requests finished.
    pub async fn run(
        &self,
        state: &Arc<RunState>,
        executor: &Arc<dyn RequestExecutor>,
        request: &Arc<RequestSpec>,
    ) {
        let mut slots = JoinSet::new();
        for slot_id in 0..self.slots {
            slots.spawn(run_slot(
                slot_id,
                Arc::clone(state),
                Arc::clone(executor),
                Arc::clone(request),
            ));
        }

        while let Some(result) = slots.join_next().await {
            match result {
                Ok((slot_id, handled)) => {
                    debug!("Slot {} drained after {} requests", slot_id, handled);
                }
                Err(err) => warn!("Worker slot failed: {}", err),
            }
        }
    }
}

async fn run_slot(
    slot_id: usize,
    state: Arc<RunState>,
    executor: Arc<dyn RequestExecutor>,
    request: Arc<RequestSpec>,
) -> (usize, u64) {
    let mut handled: u64 = 0;
    while state.try_issue() {
        let outcome = match AssertUnwindSafe(executor.execute(&request))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_panic) => {
                warn!("Request executor panicked in slot {}", slot_id);
                RequestOutcome::failure(PANIC_LABEL, 0)
            }
        };
        state.record(outcome);
        handled = handled.saturating_add(1);
    }
    (slot_id, handled)
}
