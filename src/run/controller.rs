use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, RunError};
use crate::http::RequestExecutor;
use crate::metrics::RunSummary;
use crate::progress::{ProgressEvent, ProgressPublisher};

use super::{ConcurrencyScheduler, RunConfig, RunState};

/// A finished run as kept by the controller.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub config: Arc<RunConfig>,
    pub summary: RunSummary,
}

/// Handle to a started run, resolved through [`RunController::await_result`].
#[derive(Debug)]
pub struct RunHandle {
    id: u64,
    driver: JoinHandle<RunSummary>,
}

impl RunHandle {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
struct ActiveRun {
    id: u64,
    state: Arc<RunState>,
}

#[derive(Debug, Default)]
struct ControllerInner {
    next_run_id: u64,
    active: Option<ActiveRun>,
    latest: Option<CompletedRun>,
}

/// Starts, stops and tracks load-test runs. At most one run is active at a
/// time; the most recent finished run is kept for reporting.
#[derive(Clone)]
pub struct RunController {
    executor: Arc<dyn RequestExecutor>,
    publisher: Arc<dyn ProgressPublisher>,
    inner: Arc<Mutex<ControllerInner>>,
}

impl RunController {
    #[must_use]
    pub fn new(executor: Arc<dyn RequestExecutor>, publisher: Arc<dyn ProgressPublisher>) -> Self {
        Self {
            executor,
            publisher,
            inner: Arc::new(Mutex::new(ControllerInner::default())),
        }
    }

    /// Validates `config` and spawns the run on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed configuration (before any
    /// request is sent), [`RunError::NoRuntime`] when called outside a Tokio
    /// runtime, or [`RunError::AlreadyRunning`] while another run is active.
    pub fn start(&self, config: RunConfig) -> AppResult<RunHandle> {
        let request = Arc::new(config.request_spec()?);
        let runtime = Handle::try_current()
            .map_err(|err| AppError::run(RunError::NoRuntime { source: err }))?;
        let config = Arc::new(config);
        let total = config.total_requests.get();
        let slots = config.effective_concurrency();
        let state = Arc::new(RunState::new(total, Arc::clone(&self.publisher)));

        let id = {
            let mut inner = self.lock();
            if inner.active.is_some() {
                return Err(AppError::run(RunError::AlreadyRunning));
            }
            let id = inner.next_run_id;
            inner.next_run_id = inner.next_run_id.saturating_add(1);
            inner.active = Some(ActiveRun {
                id,
                state: Arc::clone(&state),
            });
            id
        };

        info!(
            "Starting load test {}: {} {} ({} requests, {} concurrent)",
            id,
            config.method.as_str(),
            request.url,
            total,
            slots
        );
        self.publisher.publish(ProgressEvent::Started {
            total,
            concurrency: slots,
        });

        let scheduler = ConcurrencyScheduler::new(slots);
        let executor = Arc::clone(&self.executor);
        let publisher = Arc::clone(&self.publisher);
        let inner = Arc::clone(&self.inner);
        let driver = runtime.spawn(async move {
            scheduler.run(&state, &executor, &request).await;
            let summary = state.finish();
            info!(
                "Load test {} finished: {}/{} requests in {}ms{}",
                id,
                summary.total_requests,
                summary.requested_requests,
                summary.total_time_ms,
                if summary.stopped { " (stopped)" } else { "" }
            );
            {
                let mut guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
                clear_active(&mut guard, id);
                guard.latest = Some(CompletedRun {
                    config,
                    summary: summary.clone(),
                });
            }
            publisher.publish(ProgressEvent::Finished(summary.clone()));
            summary
        });

        Ok(RunHandle { id, driver })
    }

    /// Requests cooperative cancellation of the run behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoActiveRun`] when that run already finished or is
    /// not the active one.
    pub fn request_stop(&self, handle: &RunHandle) -> AppResult<()> {
        let inner = self.lock();
        match inner.active.as_ref() {
            Some(active) if active.id == handle.id && active.state.request_stop() => {
                info!("Stop requested for load test {}", active.id);
                Ok(())
            }
            Some(_) | None => Err(AppError::run(RunError::NoActiveRun)),
        }
    }

    /// Requests cooperative cancellation of whichever run is active.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoActiveRun`] when nothing is running or the
    /// active run is already finishing.
    pub fn stop_active(&self) -> AppResult<()> {
        let inner = self.lock();
        let active = inner
            .active
            .as_ref()
            .filter(|active| active.state.request_stop())
            .ok_or_else(|| AppError::run(RunError::NoActiveRun))?;
        info!("Stop requested for load test {}", active.id);
        Ok(())
    }

    /// Waits for the run to become terminal and returns its summary.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::DriverFailed`] when the driver task panicked or
    /// was cancelled.
    pub async fn await_result(&self, handle: RunHandle) -> AppResult<RunSummary> {
        let RunHandle { id, driver } = handle;
        match driver.await {
            Ok(summary) => Ok(summary),
            Err(err) => {
                warn!("Load test {} driver failed: {}", id, err);
                clear_active(&mut self.lock(), id);
                Err(AppError::run(RunError::DriverFailed { source: err }))
            }
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock().active.is_some()
    }

    /// The most recent finished run, if any.
    #[must_use]
    pub fn latest(&self) -> Option<CompletedRun> {
        self.lock().latest.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RunController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunController")
            .field("inner", &*self.lock())
            .finish_non_exhaustive()
    }
}

fn clear_active(inner: &mut ControllerInner, id: u64) {
    if inner.active.as_ref().is_some_and(|active| active.id == id) {
        inner.active = None;
    }
}
