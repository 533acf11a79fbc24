use std::io::IsTerminal;
use std::sync::Arc;

use tracing::warn;

use volley::args::TesterArgs;
use volley::error::{AppError, AppResult};
use volley::http::HttpExecutor;
use volley::progress::ObserverRegistry;
use volley::report::ReportStore;
use volley::run::{RunConfig, RunController};

use super::progress::setup_progress_indicator;
use super::summary::print_summary;
use crate::system::shutdown::{setup_signal_shutdown_handler, setup_stop_bridge, shutdown_channel};

pub(crate) async fn run_load_test(args: &TesterArgs) -> AppResult<()> {
    let config = RunConfig::from_args(args)?;
    let executor = Arc::new(HttpExecutor::new(
        config.timeout,
        config.effective_concurrency(),
    )?);
    let registry = Arc::new(ObserverRegistry::new());

    let progress_task = (!args.no_progress && std::io::stderr().is_terminal())
        .then(|| setup_progress_indicator(registry.subscribe(), args.no_color));

    let controller = RunController::new(executor, registry);
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_task = setup_signal_shutdown_handler(&shutdown_tx);
    let stop_bridge = setup_stop_bridge(&shutdown_tx, controller.clone());

    let handle = controller.start(config)?;
    let result = controller.await_result(handle).await;

    stop_bridge.abort();
    signal_task.abort();
    if let Some(task) = progress_task {
        if result.is_err() {
            task.abort();
        } else if let Err(err) = task.await {
            warn!("Progress indicator failed: {}", err);
        }
    }

    let summary = result?;
    print_summary(&summary);

    if !args.no_report {
        let store = ReportStore::new(&args.report_dir);
        let path = store.save_latest(&controller).map_err(AppError::report)?;
        println!("Report saved to {}", path.display());
    }
    Ok(())
}
