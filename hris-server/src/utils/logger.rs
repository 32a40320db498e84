//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise `level` applies to this crate and the
//! HTTP trace layer.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the logger on stdout
pub fn init_logger(level: &str) {
    init_logger_with_file(level, None);
}

/// Initialize the logger, writing to daily rolling files when `log_dir` is set
pub fn init_logger_with_file(level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hris_server={level},tower_http={level}")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        match std::fs::create_dir_all(log_path) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(log_path, "hris-server");
                subscriber.with_ansi(false).with_writer(file_appender).init();
                return;
            }
            Err(e) => eprintln!("Cannot create log dir {dir}: {e}, logging to stdout"),
        }
    }

    subscriber.init();
}
