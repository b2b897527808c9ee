//! Logging setup for the relay process
//!
//! Log lines go to stderr. `RUST_LOG` takes precedence over `--log-level`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// HTTP stack crates that are only interesting when debugging transport issues
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "h2", "reqwest", "rustls"];

/// Filter used when `RUST_LOG` is unset
///
/// `level` applies to everything except the HTTP stack, which stays at `warn`.
pub fn default_filter(level: &str) -> String {
    let mut directives = vec![level.to_string()];
    directives.extend(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)));
    directives.join(",")
}

/// Install the global tracing subscriber
///
/// `level` is a plain level (`info`, `debug`) or a full filter directive.
/// Set `RUST_LOG=incident_jira_relay=debug` to see outgoing Jira payloads.
///
/// # Errors
/// Returns an error if `level` does not parse or a subscriber is already installed.
pub fn init(level: &str) -> crate::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter(level)).map_err(|e| {
            crate::SyncError::Config(format!("Invalid log level {:?}: {}", level, e))
        })?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| crate::SyncError::Other(format!("Failed to initialize tracing: {}", e)))?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init("debug");
}
