use std::{
    fs::OpenOptions,
    io,
    path::Path,
    sync::Mutex,
};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

fn env_filter() -> EnvFilter {
    // 默认 info，可通过 RUST_LOG 覆盖，例如 RUST_LOG=info,service=debug
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output on stdout.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber appending to a log file.
///
/// Parent directories are created as needed. ANSI colouring is disabled so the
/// file stays greppable.
pub fn init_logging_file(path: &Path, json: bool) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let writer = Mutex::new(file);

    if json {
        let _ = fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .try_init();
    }
    Ok(())
}
