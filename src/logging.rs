use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Daily-rolling file logging for embedders that want the engine's
/// tracing output on disk. Safe to call more than once; only the first
/// call installs the subscriber.
pub fn init_logging(log_dir: &str) {
    let file_appender = rolling::daily(log_dir, "payroll.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    if LOG_GUARD.set(guard).is_err() {
        return;
    }

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .try_init()
        .ok();
}
