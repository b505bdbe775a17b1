//! Logger initialization — `tracing-subscriber` with env-filter.
//!
//! Call [`init`] once at startup, after the config is resolved, so the
//! configured level actually lands on the global subscriber. `RUST_LOG`
//! takes precedence over the configured level when set and valid.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize the global tracing subscriber at `level`.
///
/// Subsequent calls (tests sharing a process) are accepted and ignored.
pub fn init(level: &str) -> Result<(), AppError> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let filter = resolve_filter(std::env::var("RUST_LOG").ok().as_deref(), level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| AppError::Logger(format!("subscriber init: {e}")))
}

/// Pick the filter: a valid `RUST_LOG` directive wins, otherwise the
/// configured level.
fn resolve_filter(env_directive: Option<&str>, level: &str) -> Result<EnvFilter, AppError> {
    if let Some(directive) = env_directive {
        if let Ok(filter) = EnvFilter::try_new(directive) {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(level)
        .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
}
